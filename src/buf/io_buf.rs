use std::ops;

use super::Slice;

/// A contiguous run of initialized bytes that can be handed to a file write.
///
/// # Safety
///
/// `read_ptr` must point to at least `bytes_init` initialized bytes, and the
/// pointer must stay valid for as long as `self` is borrowed. `bytes_init`
/// must never exceed `bytes_total`.
pub unsafe trait IoBuf {
    /// Returns a raw pointer to the first byte.
    fn read_ptr(&self) -> *const u8;

    /// Number of initialized bytes.
    ///
    /// For `Vec<u8>` this is `len()`.
    fn bytes_init(&self) -> usize;

    /// Total size of the storage, including uninitialized bytes.
    ///
    /// For `Vec<u8>` this is `capacity()`.
    fn bytes_total(&self) -> usize;

    /// Returns a view of the buffer restricted to `range`.
    ///
    /// The view owns `self`; pass a reference to keep using the buffer
    /// afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the range ends past `bytes_total` or starts past
    /// `bytes_init`.
    fn slice(self, range: impl ops::RangeBounds<usize>) -> Slice<Self>
    where
        Self: Sized,
    {
        use ops::Bound;

        let begin = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.checked_add(1).expect("out of range"),
            Bound::Unbounded => 0,
        };

        let end = match range.end_bound() {
            Bound::Included(&n) => n.checked_add(1).expect("out of range"),
            Bound::Excluded(&n) => n,
            Bound::Unbounded => self.bytes_total(),
        };

        Slice::new(self, begin, end)
    }
}

unsafe impl<T: IoBuf + ?Sized> IoBuf for &T {
    fn read_ptr(&self) -> *const u8 {
        (**self).read_ptr()
    }

    fn bytes_init(&self) -> usize {
        (**self).bytes_init()
    }

    fn bytes_total(&self) -> usize {
        (**self).bytes_total()
    }
}

unsafe impl<T: IoBuf + ?Sized> IoBuf for &mut T {
    fn read_ptr(&self) -> *const u8 {
        (**self).read_ptr()
    }

    fn bytes_init(&self) -> usize {
        (**self).bytes_init()
    }

    fn bytes_total(&self) -> usize {
        (**self).bytes_total()
    }
}

unsafe impl IoBuf for Vec<u8> {
    fn read_ptr(&self) -> *const u8 {
        self.as_ptr()
    }

    fn bytes_init(&self) -> usize {
        self.len()
    }

    fn bytes_total(&self) -> usize {
        self.capacity()
    }
}

unsafe impl IoBuf for Box<[u8]> {
    fn read_ptr(&self) -> *const u8 {
        self.as_ptr()
    }

    fn bytes_init(&self) -> usize {
        self.len()
    }

    fn bytes_total(&self) -> usize {
        self.len()
    }
}

unsafe impl IoBuf for [u8] {
    fn read_ptr(&self) -> *const u8 {
        self.as_ptr()
    }

    fn bytes_init(&self) -> usize {
        self.len()
    }

    fn bytes_total(&self) -> usize {
        self.len()
    }
}

unsafe impl IoBuf for str {
    fn read_ptr(&self) -> *const u8 {
        self.as_ptr()
    }

    fn bytes_init(&self) -> usize {
        self.len()
    }

    fn bytes_total(&self) -> usize {
        self.len()
    }
}
