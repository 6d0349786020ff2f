use std::{
    ffi::CString,
    io, mem,
    os::unix::{ffi::OsStrExt, io::RawFd},
    path::Path,
};

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

pub(super) fn cvt_size(ret: libc::ssize_t) -> io::Result<usize> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret as usize)
    }
}

/// Opens `path` with `O_CLOEXEC` added to `flags`. `mode` only matters when
/// `flags` contains `O_CREAT`.
pub(super) fn open(path: &Path, flags: libc::c_int, mode: u32) -> io::Result<RawFd> {
    let path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "path contains an interior nul byte",
        )
    })?;

    loop {
        let ret = unsafe {
            libc::open(
                path.as_ptr(),
                flags | libc::O_CLOEXEC,
                mode as libc::c_uint,
            )
        };
        match cvt(ret) {
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            res => return res,
        }
    }
}

// Linux releases the descriptor even when close fails, so EINTR is not
// retried.
pub(super) fn close(fd: RawFd) -> io::Result<()> {
    cvt(unsafe { libc::close(fd) }).map(drop)
}

pub(super) fn file_size(fd: RawFd) -> io::Result<u64> {
    let mut stat: libc::stat = unsafe { mem::zeroed() };
    cvt(unsafe { libc::fstat(fd, &mut stat) })?;
    Ok(stat.st_size as u64)
}
