//! Whole-file reads and writes.
//!
//! Both functions block until the whole file has been transferred. They run
//! on the driver installed with [`Driver::with`], or on blocking syscalls when
//! no driver is installed on the calling thread.

use std::path::Path;

use crate::{
    buf::{self, Buffer, IoBuf},
    driver::Driver,
    error::Result,
};

/// Reads the entire contents of a file into a new [`Buffer`].
///
/// The buffer is sized to the number of bytes read. An empty file yields an
/// empty buffer.
///
/// # Errors
///
/// Fails if the file cannot be opened or read, or if its contents do not fit
/// in memory.
pub fn read_file(path: impl AsRef<Path>) -> Result<Buffer> {
    Driver::current(|driver| driver.read_file(path.as_ref()))
}

/// Writes the initialized bytes of `buf` to a file, replacing its contents.
///
/// The file is created if it does not exist and truncated if it does.
///
/// # Errors
///
/// Fails if the file cannot be opened, if a write fails or stops making
/// progress ([`Error::ShortWrite`]), or if closing the file reports an error.
///
/// [`Error::ShortWrite`]: crate::Error::ShortWrite
pub fn write_file<B>(path: impl AsRef<Path>, buf: &B) -> Result<()>
where
    B: IoBuf + ?Sized,
{
    Driver::current(|driver| driver.write_file(path.as_ref(), buf::deref(buf)))
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::{read_file, write_file};
    use crate::{
        buf::{Buffer, IoBuf},
        DriverKind, Error, Options,
    };

    #[test]
    fn round_trip_buffer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");

        let mut buf = Buffer::with_size(4096).unwrap();
        for (i, b) in buf.iter_mut().enumerate() {
            *b = i as u8;
        }

        write_file(&path, &buf).unwrap();
        assert_eq!(read_file(&path).unwrap(), buf);
    }

    #[test]
    fn round_trip_zero_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty");

        write_file(&path, &Buffer::new()).unwrap();
        let buf = read_file(&path).unwrap();
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn writes_other_payloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payload");

        write_file(&path, "text").unwrap();
        assert_eq!(&read_file(&path).unwrap()[..], b"text");

        write_file(&path, &b"bytes"[..]).unwrap();
        assert_eq!(&read_file(&path).unwrap()[..], b"bytes");

        let vec = b"0123456789".to_vec();
        write_file(&path, &(&vec).slice(3..6)).unwrap();
        assert_eq!(&read_file(&path).unwrap()[..], b"345");
    }

    #[test]
    fn missing_file() {
        assert!(matches!(read_file("/nonexistent/path"), Err(Error::Io(_))));
    }

    #[test]
    fn uses_installed_driver() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("installed");
        let driver = Options::new()
            .driver(DriverKind::Auto)
            .file_mode(0o600)
            .build_driver()
            .unwrap();

        driver.with(|| {
            write_file(&path, "through the driver").unwrap();
            assert_eq!(&read_file(&path).unwrap()[..], b"through the driver");
        });

        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
