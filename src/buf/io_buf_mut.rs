use super::IoBuf;

/// A buffer whose initialized bytes may be overwritten in place.
///
/// # Safety
///
/// `write_ptr` must point to the same storage as [`IoBuf::read_ptr`], valid
/// for writes of `bytes_init` bytes while `self` is mutably borrowed.
pub unsafe trait IoBufMut: IoBuf {
    /// Returns a raw mutable pointer to the first byte.
    fn write_ptr(&mut self) -> *mut u8;
}

unsafe impl<T: IoBufMut + ?Sized> IoBufMut for &mut T {
    fn write_ptr(&mut self) -> *mut u8 {
        (**self).write_ptr()
    }
}

unsafe impl IoBufMut for Vec<u8> {
    fn write_ptr(&mut self) -> *mut u8 {
        self.as_mut_ptr()
    }
}

unsafe impl IoBufMut for Box<[u8]> {
    fn write_ptr(&mut self) -> *mut u8 {
        self.as_mut_ptr()
    }
}

unsafe impl IoBufMut for [u8] {
    fn write_ptr(&mut self) -> *mut u8 {
        self.as_mut_ptr()
    }
}
