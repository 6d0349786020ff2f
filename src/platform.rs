//! Handle-based buffer API.
//!
//! A [`Platform`] owns an arena of buffers addressed by [`BufferHandle`]s.
//! Failure is reported the way a C platform layer would report it: a
//! constructor that fails returns an invalid handle, a mutation that fails
//! returns `false` and leaves the buffer as it was, and queries on an invalid
//! handle return `0` or null. Handles are versioned, so a destructed handle
//! stays invalid even after its slot is reused, and destructing it again is a
//! no-op.
//!
//! ```
//! use seaplatform::Platform;
//!
//! let mut platform = Platform::new();
//! let buf = platform.construct_with_buffer(b"hello", 5);
//! assert!(platform.is_valid(buf));
//! assert!(platform.resize(buf, 8));
//! assert_eq!(platform.data(buf), Some(&b"hello\0\0\0"[..]));
//!
//! platform.destruct(buf);
//! platform.destruct(buf);
//! assert!(!platform.is_valid(buf));
//! ```

use std::{io, path::Path, ptr};

use slotmap::{new_key_type, Key, SlotMap};

use crate::{
    buf::Buffer,
    config::Options,
    driver::Driver,
    error::{Error, Result},
};

new_key_type! {
    /// Names a buffer owned by a [`Platform`].
    ///
    /// The default value is the invalid handle.
    pub struct BufferHandle;
}

impl BufferHandle {
    /// The handle returned by failed constructors. Never valid.
    pub fn invalid() -> Self {
        Self::null()
    }
}

/// An arena of buffers plus the driver used for file I/O.
pub struct Platform {
    buffers: SlotMap<BufferHandle, Buffer>,
    driver: Driver,
}

impl Default for Platform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform {
    /// Creates a platform doing file I/O with blocking syscalls.
    pub fn new() -> Self {
        Self::with_driver(Driver::blocking())
    }

    pub fn with_options(opts: &Options) -> io::Result<Self> {
        Driver::new(opts).map(Self::with_driver)
    }

    pub fn with_driver(driver: Driver) -> Self {
        Self {
            buffers: SlotMap::with_key(),
            driver,
        }
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Constructs a zero-filled buffer of `size_in_bytes` bytes.
    ///
    /// A size of zero gives a valid, empty buffer. Returns the invalid handle
    /// if storage cannot be allocated.
    pub fn construct(&mut self, size_in_bytes: usize) -> BufferHandle {
        self.insert_result(Buffer::with_size(size_in_bytes))
    }

    /// Constructs a buffer holding a copy of the first `size_in_bytes` bytes
    /// of `data`.
    ///
    /// `data` is not retained. Returns the invalid handle if `data` is
    /// shorter than `size_in_bytes` or if storage cannot be allocated.
    pub fn construct_with_buffer(&mut self, data: &[u8], size_in_bytes: usize) -> BufferHandle {
        match data.get(..size_in_bytes) {
            Some(data) => self.insert_result(Buffer::copy_from_slice(data)),
            None => {
                log::debug!(
                    "construct_with_buffer: asked for {} bytes from a {} byte source",
                    size_in_bytes,
                    data.len()
                );
                BufferHandle::invalid()
            }
        }
    }

    /// Takes ownership of an existing buffer.
    pub fn insert(&mut self, buf: Buffer) -> BufferHandle {
        self.buffers.insert(buf)
    }

    /// Removes a buffer from the arena without dropping it. The handle
    /// becomes invalid.
    pub fn take(&mut self, handle: BufferHandle) -> Option<Buffer> {
        self.buffers.remove(handle)
    }

    /// Releases the buffer. Does nothing if the handle is already invalid.
    pub fn destruct(&mut self, handle: BufferHandle) {
        if self.buffers.remove(handle).is_none() {
            log::debug!("destruct: ignoring invalid handle {:?}", handle);
        }
    }

    pub fn is_valid(&self, handle: BufferHandle) -> bool {
        self.buffers.contains_key(handle)
    }

    /// Resizes the buffer, preserving its prefix and zero-filling new bytes.
    ///
    /// Returns `false` without touching the buffer if the handle is invalid
    /// or storage cannot be allocated.
    pub fn resize(&mut self, handle: BufferHandle, size_in_bytes: usize) -> bool {
        let res = self
            .get_mut(handle)
            .and_then(|buf| buf.resize(size_in_bytes));
        Self::succeeded("resize", res)
    }

    /// Size in bytes, `0` for an invalid handle.
    pub fn size(&self, handle: BufferHandle) -> usize {
        self.buffers.get(handle).map_or(0, Buffer::len)
    }

    /// Raw pointer to the first byte, or null for an invalid handle.
    ///
    /// The pointer is valid for reads and writes of [`size`](Self::size)
    /// bytes until the buffer is resized or destructed. For an empty buffer
    /// it is non-null but must not be dereferenced.
    pub fn data_as_ptr(&mut self, handle: BufferHandle) -> *mut u8 {
        self.buffers
            .get_mut(handle)
            .map_or(ptr::null_mut(), Buffer::as_mut_ptr)
    }

    pub fn data(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(handle).map(Buffer::as_slice)
    }

    pub fn data_mut(&mut self, handle: BufferHandle) -> Option<&mut [u8]> {
        self.buffers.get_mut(handle).map(Buffer::as_mut_slice)
    }

    pub fn get(&self, handle: BufferHandle) -> Result<&Buffer> {
        self.buffers.get(handle).ok_or(Error::InvalidHandle)
    }

    pub fn get_mut(&mut self, handle: BufferHandle) -> Result<&mut Buffer> {
        self.buffers.get_mut(handle).ok_or(Error::InvalidHandle)
    }

    /// Reads a whole file into a new buffer. Returns the invalid handle if
    /// the file cannot be opened or read, or if allocation fails.
    pub fn read_file(&mut self, filepath: impl AsRef<Path>) -> BufferHandle {
        let res = self.driver.read_file(filepath.as_ref());
        self.insert_result(res)
    }

    /// Writes the buffer to a file, creating or truncating it.
    ///
    /// An invalid handle returns `false` before the file system is touched.
    pub fn write_file(&self, filepath: impl AsRef<Path>, handle: BufferHandle) -> bool {
        let res = self
            .get(handle)
            .and_then(|buf| self.driver.write_file(filepath.as_ref(), buf));
        Self::succeeded("write_file", res)
    }

    fn insert_result(&mut self, res: Result<Buffer>) -> BufferHandle {
        match res {
            Ok(buf) => self.buffers.insert(buf),
            Err(err) => {
                log::debug!("returning invalid handle: {}", err);
                BufferHandle::invalid()
            }
        }
    }

    fn succeeded(op: &str, res: Result<()>) -> bool {
        match res {
            Ok(()) => true,
            Err(err) => {
                log::debug!("{} failed: {}", op, err);
                false
            }
        }
    }
}
