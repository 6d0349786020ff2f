//! Resizable byte buffers and whole-file I/O.
//!
//! [`Buffer`] is an owned byte container whose allocations are fallible.
//! [`fs::read_file`] and [`fs::write_file`] move a whole file into or out of
//! a buffer in one blocking call. [`Platform`] exposes the same operations
//! through versioned handles with sentinel/boolean failure reporting.

#[macro_use(defer)]
extern crate scopeguard;

pub mod buf;
mod config;
pub mod driver;
mod error;
pub mod fs;
pub mod platform;

pub use buf::Buffer;
pub use config::{DriverKind, Options};
pub use driver::Driver;
pub use error::{Error, Result};
pub use platform::{BufferHandle, Platform};
