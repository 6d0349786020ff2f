use std::{collections::TryReserveError, io};

/// Errors produced by buffer and file operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Storage for a buffer could not be reserved.
    #[error("buffer allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    /// The file system reported a length that does not fit in memory.
    #[error("file of {0} bytes does not fit in memory")]
    FileTooLarge(u64),

    /// A write stopped making progress before every byte was written.
    #[error("short write: wrote {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },

    /// A buffer handle did not resolve to a live buffer.
    #[error("invalid buffer handle")]
    InvalidHandle,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
