use std::io;

use crate::driver::Driver;

/// Which backend performs file reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// io_uring when the kernel supports it, blocking syscalls otherwise.
    Auto,
    /// `pread`/`pwrite` on the calling thread.
    Blocking,
    /// io_uring, one operation in flight at a time.
    Uring,
}

/// Driver configuration.
///
/// ```
/// use seaplatform::{DriverKind, Options};
///
/// let opts = Options::new().driver(DriverKind::Blocking).file_mode(0o600);
/// let driver = opts.build_driver().unwrap();
/// assert_eq!(driver.kind(), DriverKind::Blocking);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    pub(crate) driver: DriverKind,
    pub(crate) uring_entries: u32,
    pub(crate) file_mode: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    pub const DEFAULT_URING_ENTRIES: u32 = 8;
    pub const DEFAULT_FILE_MODE: u32 = 0o666;

    pub fn new() -> Self {
        Self {
            driver: DriverKind::Auto,
            uring_entries: Self::DEFAULT_URING_ENTRIES,
            file_mode: Self::DEFAULT_FILE_MODE,
        }
    }

    pub fn driver(mut self, kind: DriverKind) -> Self {
        self.driver = kind;
        self
    }

    /// Size of the io_uring submission queue. Rounded up to a power of two
    /// by the kernel.
    pub fn uring_entries(mut self, entries: u32) -> Self {
        self.uring_entries = entries;
        self
    }

    /// Permission bits for files created by a write, before the process
    /// umask is applied.
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    pub fn build_driver(&self) -> io::Result<Driver> {
        Driver::new(self)
    }
}

#[cfg(test)]
mod test {
    use super::{DriverKind, Options};

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.driver, DriverKind::Auto);
        assert_eq!(opts.uring_entries, Options::DEFAULT_URING_ENTRIES);
        assert_eq!(opts.file_mode, 0o666);
    }

    #[test]
    fn builder_overrides() {
        let opts = Options::new()
            .driver(DriverKind::Uring)
            .uring_entries(32)
            .file_mode(0o640);
        assert_eq!(opts.driver, DriverKind::Uring);
        assert_eq!(opts.uring_entries, 32);
        assert_eq!(opts.file_mode, 0o640);
    }
}
