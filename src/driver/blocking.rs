use std::{io, os::unix::io::RawFd};

use super::sys::cvt_size;

pub(super) fn read_at(fd: RawFd, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    cvt_size(unsafe {
        libc::pread(
            fd,
            buf.as_mut_ptr() as *mut libc::c_void,
            buf.len(),
            offset as libc::off_t,
        )
    })
}

pub(super) fn write_at(fd: RawFd, buf: &[u8], offset: u64) -> io::Result<usize> {
    cvt_size(unsafe {
        libc::pwrite(
            fd,
            buf.as_ptr() as *const libc::c_void,
            buf.len(),
            offset as libc::off_t,
        )
    })
}
