use std::{fmt, ops};

use crate::error::Result;

use super::{IoBuf, IoBufMut};

/// An owned, contiguous, resizable run of bytes.
///
/// Every byte of a `Buffer` is initialized: fresh storage and bytes exposed
/// by growing [`resize`](Buffer::resize) are zero-filled. Allocation is
/// fallible; running out of memory is reported as [`Error::Alloc`] instead of
/// aborting the process.
///
/// [`Error::Alloc`]: crate::Error::Alloc
#[derive(Default, PartialEq, Eq, Hash)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    /// Creates an empty buffer. Does not allocate.
    pub const fn new() -> Buffer {
        Buffer { bytes: Vec::new() }
    }

    /// Creates a zero-filled buffer of `size` bytes.
    ///
    /// A `size` of zero yields a valid, empty buffer.
    pub fn with_size(size: usize) -> Result<Buffer> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(size)?;
        bytes.resize(size, 0);
        Ok(Buffer { bytes })
    }

    /// Creates a buffer holding a copy of `data`.
    ///
    /// The buffer does not keep any reference to `data`.
    pub fn copy_from_slice(data: &[u8]) -> Result<Buffer> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(data.len())?;
        bytes.extend_from_slice(data);
        Ok(Buffer { bytes })
    }

    /// Resizes the buffer to `size` bytes.
    ///
    /// Bytes up to `min(len, size)` are preserved and bytes past the old
    /// length are zero-filled. If storage cannot be reserved the buffer is
    /// left untouched.
    pub fn resize(&mut self, size: usize) -> Result<()> {
        if let Some(additional) = size.checked_sub(self.bytes.len()) {
            self.bytes.try_reserve_exact(additional)?;
        }
        self.bytes.resize(size, 0);
        Ok(())
    }

    /// Copies the buffer, reporting allocation failure.
    pub fn try_clone(&self) -> Result<Buffer> {
        Buffer::copy_from_slice(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pointer to the first byte, valid for `len()` bytes until the buffer
    /// is resized or dropped.
    ///
    /// Never null, even for an empty buffer.
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Mutable counterpart of [`as_ptr`](Buffer::as_ptr).
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer").field("len", &self.len()).finish()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Buffer { bytes }
    }
}

impl From<Buffer> for Vec<u8> {
    fn from(buf: Buffer) -> Self {
        buf.bytes
    }
}

impl ops::Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl ops::DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsMut<[u8]> for Buffer {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

// Spare capacity left behind by shrinking is not exposed, so the total is the
// length.
unsafe impl IoBuf for Buffer {
    fn read_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    fn bytes_init(&self) -> usize {
        self.bytes.len()
    }

    fn bytes_total(&self) -> usize {
        self.bytes.len()
    }
}

unsafe impl IoBufMut for Buffer {
    fn write_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr()
    }
}

#[cfg(test)]
mod test {
    use super::Buffer;
    use crate::Error;

    #[test]
    fn with_size_is_zeroed() {
        for n in [1, 7, 4096] {
            let buf = Buffer::with_size(n).unwrap();
            assert_eq!(buf.len(), n);
            assert!(buf.iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn zero_size_is_valid_and_empty() {
        let mut buf = Buffer::with_size(0).unwrap();
        assert!(buf.is_empty());
        assert!(!buf.as_ptr().is_null());
        assert!(!buf.as_mut_ptr().is_null());
    }

    #[test]
    fn unsatisfiable_size_fails() {
        assert!(matches!(Buffer::with_size(usize::MAX), Err(Error::Alloc(_))));
    }

    #[test]
    fn copy_is_independent_of_source() {
        let mut source = *b"abcdef";
        let buf = Buffer::copy_from_slice(&source).unwrap();
        source[0] = b'z';

        assert_eq!(&source, b"zbcdef");
        assert_eq!(&buf[..], b"abcdef");
    }

    #[test]
    fn grow_preserves_and_zero_fills() {
        let mut buf = Buffer::copy_from_slice(b"abc").unwrap();
        buf.resize(6).unwrap();

        assert_eq!(buf.len(), 6);
        assert_eq!(&buf[..], b"abc\0\0\0");
    }

    #[test]
    fn shrink_preserves_prefix() {
        let mut buf = Buffer::copy_from_slice(b"abcdef").unwrap();
        buf.resize(2).unwrap();
        assert_eq!(&buf[..], b"ab");

        // Bytes cut off by a shrink do not come back on the next grow.
        buf.resize(4).unwrap();
        assert_eq!(&buf[..], b"ab\0\0");
    }

    #[test]
    fn failed_resize_leaves_buffer_untouched() {
        let mut buf = Buffer::copy_from_slice(b"keep").unwrap();
        let ptr = buf.as_ptr();

        assert!(matches!(buf.resize(usize::MAX), Err(Error::Alloc(_))));
        assert_eq!(&buf[..], b"keep");
        assert_eq!(buf.as_ptr(), ptr);
    }

    #[test]
    fn writes_through_pointer() {
        let mut buf = Buffer::with_size(3).unwrap();
        unsafe { buf.as_mut_ptr().add(1).write(0xff) };
        assert_eq!(&buf[..], &[0, 0xff, 0]);
    }

    #[test]
    fn distinct_buffers_across_threads() {
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                std::thread::spawn(move || {
                    let mut buf = Buffer::with_size(1024).unwrap();
                    buf.fill(i);
                    buf.resize(2048).unwrap();
                    buf
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let buf = handle.join().unwrap();
            assert!(buf[..1024].iter().all(|&b| b == i as u8));
            assert!(buf[1024..].iter().all(|&b| b == 0));
        }
    }
}
