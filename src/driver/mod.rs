//! Backends performing whole-file reads and writes.

use std::{cmp, io, os::unix::io::RawFd, path::Path};

use scopeguard::ScopeGuard;

use crate::{
    buf::Buffer,
    config::{DriverKind, Options},
    error::{Error, Result},
};

use self::uring::UringDriver;

mod blocking;
mod sys;
mod uring;

scoped_tls::scoped_thread_local!(static CURRENT: Driver);

// Size of the stack probe used to detect bytes past the length reported by
// fstat.
const PROBE_SIZE: usize = 32;

enum Backend {
    Blocking,
    Uring(UringDriver),
}

/// Performs the positioned reads and writes behind [`crate::fs`].
///
/// A driver is bound to the thread that uses it. Install one as the current
/// thread's driver with [`Driver::with`]; outside of it the free functions in
/// [`crate::fs`] use blocking syscalls.
pub struct Driver {
    backend: Backend,
    file_mode: u32,
}

impl Driver {
    pub fn new(opts: &Options) -> io::Result<Driver> {
        let backend = match opts.driver {
            DriverKind::Blocking => Backend::Blocking,
            DriverKind::Uring => Backend::Uring(UringDriver::new(opts.uring_entries)?),
            DriverKind::Auto if uring::is_supported() => {
                match UringDriver::new(opts.uring_entries) {
                    Ok(driver) => Backend::Uring(driver),
                    Err(error) => {
                        tracing::debug!(%error, "io_uring setup failed, using blocking driver");
                        Backend::Blocking
                    }
                }
            }
            DriverKind::Auto => Backend::Blocking,
        };

        let driver = Driver {
            backend,
            file_mode: opts.file_mode,
        };
        tracing::debug!(requested = ?opts.driver, kind = ?driver.kind(), "driver ready");
        Ok(driver)
    }

    /// A blocking driver with default options. Never fails.
    pub fn blocking() -> Driver {
        Driver {
            backend: Backend::Blocking,
            file_mode: Options::DEFAULT_FILE_MODE,
        }
    }

    /// The backend in use: `Blocking` or `Uring`, never `Auto`.
    pub fn kind(&self) -> DriverKind {
        match self.backend {
            Backend::Blocking => DriverKind::Blocking,
            Backend::Uring(_) => DriverKind::Uring,
        }
    }

    /// Runs `f` with this driver installed as the current thread's driver.
    pub fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT.set(self, f)
    }

    pub(crate) fn current<R>(f: impl FnOnce(&Driver) -> R) -> R {
        if CURRENT.is_set() {
            CURRENT.with(f)
        } else {
            f(&Driver::blocking())
        }
    }

    /// Reads the whole file at `path`.
    ///
    /// The result is sized to the bytes actually read, which can differ from
    /// the length reported when the file was opened if it changes meanwhile.
    pub fn read_file(&self, path: &Path) -> Result<Buffer> {
        let fd = sys::open(path, libc::O_RDONLY, 0)?;
        defer! {
            let _ = sys::close(fd);
        }

        let hint = sys::file_size(fd)?;
        let hint = usize::try_from(hint).map_err(|_| Error::FileTooLarge(hint))?;

        let mut buf = Buffer::with_size(hint)?;
        let mut filled = 0;

        loop {
            if filled == buf.len() {
                let mut probe = [0u8; PROBE_SIZE];
                let n = self.read_at(fd, &mut probe, filled as u64)?;
                if n == 0 {
                    break;
                }

                buf.resize(cmp::max(filled + n, filled.saturating_mul(2)))?;
                buf[filled..filled + n].copy_from_slice(&probe[..n]);
                filled += n;
                continue;
            }

            let n = self.read_at(fd, &mut buf[filled..], filled as u64)?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        buf.resize(filled)?;
        tracing::debug!(path = %path.display(), len = filled, "read file");
        Ok(buf)
    }

    /// Replaces the contents of the file at `path` with `bytes`, creating it
    /// if needed.
    pub fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let fd = sys::open(
            path,
            libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            self.file_mode,
        )?;
        let fd = scopeguard::guard(fd, |fd| {
            let _ = sys::close(fd);
        });

        let mut written = 0;
        while written < bytes.len() {
            match self.write_at(*fd, &bytes[written..], written as u64)? {
                0 => {
                    return Err(Error::ShortWrite {
                        expected: bytes.len(),
                        written,
                    })
                }
                n => written += n,
            }
        }

        // Delayed write errors surface on close.
        sys::close(ScopeGuard::into_inner(fd))?;
        tracing::debug!(path = %path.display(), len = written, "wrote file");
        Ok(())
    }

    fn read_at(&self, fd: RawFd, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        loop {
            let res = match &self.backend {
                Backend::Blocking => blocking::read_at(fd, buf, offset),
                Backend::Uring(uring) => uring.read_at(fd, buf, offset),
            };
            match res {
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                res => {
                    tracing::trace!(fd, offset, requested = buf.len(), result = ?res, "read_at");
                    return res;
                }
            }
        }
    }

    fn write_at(&self, fd: RawFd, buf: &[u8], offset: u64) -> io::Result<usize> {
        loop {
            let res = match &self.backend {
                Backend::Blocking => blocking::write_at(fd, buf, offset),
                Backend::Uring(uring) => uring.write_at(fd, buf, offset),
            };
            match res {
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                res => {
                    tracing::trace!(fd, offset, requested = buf.len(), result = ?res, "write_at");
                    return res;
                }
            }
        }
    }
}
