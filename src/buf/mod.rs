//! Owned byte buffers and the traits file operations take as payloads.

mod buffer;
mod io_buf;
mod io_buf_mut;
mod slice;

pub use buffer::Buffer;
pub use io_buf::IoBuf;
pub use io_buf_mut::IoBufMut;
pub use slice::Slice;

pub(crate) fn deref<B: IoBuf + ?Sized>(buf: &B) -> &[u8] {
    // Safety: The `IoBuf` trait is marked as unsafe and is expected to be
    // implemented correctly
    unsafe { std::slice::from_raw_parts(buf.read_ptr(), buf.bytes_init()) }
}

pub(crate) fn deref_mut<B: IoBufMut + ?Sized>(buf: &mut B) -> &mut [u8] {
    // Safety: The `IoBufMut` trait is marked as unsafe and is expected to be
    // implemented correctly
    unsafe { std::slice::from_raw_parts_mut(buf.write_ptr(), buf.bytes_init()) }
}
