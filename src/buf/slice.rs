use std::{cmp, ops};

use super::{IoBuf, IoBufMut};

/// An owned view into a byte range of a buffer.
///
/// Works like `&buf[begin..end]` but owns (or borrows, when `T` is a
/// reference) the underlying buffer, so a sub-range can be written to a file
/// with [`crate::fs::write_file`].
///
/// Slices are created with [`IoBuf::slice`].
///
/// # Examples
///
/// ```
/// use seaplatform::buf::{Buffer, IoBuf};
///
/// let buf = Buffer::copy_from_slice(b"hello world").unwrap();
/// let world = (&buf).slice(6..);
/// assert_eq!(&world[..], b"world");
/// ```
pub struct Slice<T> {
    buf: T,
    begin: usize,
    end: usize,
}

impl<T: IoBuf> Slice<T> {
    pub(crate) fn new(buf: T, begin: usize, end: usize) -> Slice<T> {
        assert!(end <= buf.bytes_total(), "slice end out of range");
        assert!(begin <= buf.bytes_init(), "slice begin out of range");
        assert!(begin <= end, "slice begin past end");
        Slice { buf, begin, end }
    }
}

impl<T> Slice<T> {
    /// Offset in the underlying buffer at which this view starts.
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// Offset in the underlying buffer at which this view ends.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Gets a reference to the underlying buffer, escaping the view.
    pub fn get_ref(&self) -> &T {
        &self.buf
    }

    /// Gets a mutable reference to the underlying buffer, escaping the view.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.buf
    }

    /// Unwraps the view, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buf
    }
}

impl<T: IoBuf> Slice<T> {
    // The part of `begin..end` holding initialized bytes. A view over a
    // `Vec<u8>` may reach into spare capacity; those bytes are never exposed.
    fn visible(&self) -> ops::Range<usize> {
        self.begin..cmp::max(self.begin, cmp::min(self.end, self.buf.bytes_init()))
    }
}

impl<T: IoBuf> ops::Deref for Slice<T> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &super::deref(&self.buf)[self.visible()]
    }
}

impl<T: IoBufMut> ops::DerefMut for Slice<T> {
    fn deref_mut(&mut self) -> &mut [u8] {
        let range = self.visible();
        &mut super::deref_mut(&mut self.buf)[range]
    }
}

// A view is written out like any other payload: its initialized bytes are
// those of the parent that fall inside the range.
unsafe impl<T: IoBuf> IoBuf for Slice<T> {
    fn read_ptr(&self) -> *const u8 {
        ops::Deref::deref(self).as_ptr()
    }

    fn bytes_init(&self) -> usize {
        self.visible().len()
    }

    fn bytes_total(&self) -> usize {
        self.end - self.begin
    }
}

unsafe impl<T: IoBufMut> IoBufMut for Slice<T> {
    fn write_ptr(&mut self) -> *mut u8 {
        ops::DerefMut::deref_mut(self).as_mut_ptr()
    }
}

#[cfg(test)]
mod test {
    use crate::buf::{Buffer, IoBuf};

    #[test]
    fn view_of_range() {
        let buf = Buffer::copy_from_slice(b"0123456789").unwrap();
        let view = (&buf).slice(2..5);

        assert_eq!(view.begin(), 2);
        assert_eq!(view.end(), 5);
        assert_eq!(&view[..], b"234");
        assert_eq!(view.bytes_init(), 3);
    }

    #[test]
    fn end_clamped_to_initialized_bytes() {
        let mut vec = Vec::with_capacity(16);
        vec.extend_from_slice(b"abc");
        let view = vec.slice(1..);

        assert_eq!(view.bytes_total(), view.get_ref().capacity() - 1);
        assert_eq!(&view[..], b"bc");
    }

    #[test]
    fn write_through_view() {
        let mut buf = Buffer::with_size(4).unwrap();
        {
            let mut view = (&mut buf).slice(1..3);
            view.copy_from_slice(b"xy");
        }
        assert_eq!(&buf[..], b"\0xy\0");
    }

    #[test]
    fn excluded_start_bound() {
        use std::ops::Bound;

        let buf = Buffer::copy_from_slice(b"abcd").unwrap();
        let view = (&buf).slice((Bound::Excluded(0), Bound::Unbounded));
        assert_eq!(&view[..], b"bcd");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn excluded_start_bound_overflow() {
        use std::ops::Bound;

        let buf = Buffer::new();
        let _ = (&buf).slice((Bound::Excluded(usize::MAX), Bound::Unbounded));
    }

    #[test]
    #[should_panic]
    fn begin_past_initialized() {
        let buf = Buffer::with_size(2).unwrap();
        let _ = (&buf).slice(3..3);
    }
}
