use std::{
    cell::{Cell, RefCell},
    io,
    os::unix::io::RawFd,
    thread,
};

use io_uring::{cqueue, opcode, squeue, types, IoUring, Probe};
use once_cell::sync::Lazy;

const READ_USERDATA: u64 = 1;
const WRITE_USERDATA: u64 = 2;

static SUPPORTED: Lazy<bool> = Lazy::new(|| match UringDriver::new(2) {
    Ok(_) => true,
    Err(error) => {
        tracing::debug!(%error, "io_uring is not available");
        false
    }
});

/// Whether this process can set up an io_uring instance. Probed once.
pub(crate) fn is_supported() -> bool {
    *SUPPORTED
}

/// Synchronous io_uring backend.
///
/// Each call pushes a single SQE and blocks until its CQE arrives, so the
/// buffer handed to the kernel is borrowed for the whole operation.
pub(crate) struct UringDriver {
    ring: RefCell<IoUring>,

    // Set when the ring failed while an operation may still be in flight.
    // The buffer of that operation can no longer be trusted, so nothing else
    // is submitted.
    poisoned: Cell<bool>,
}

impl UringDriver {
    pub(crate) fn new(entries: u32) -> io::Result<Self> {
        let ring = IoUring::new(entries)?;

        // IORING_OP_READ and IORING_OP_WRITE arrived in 5.6, together with
        // opcode probing.
        let mut probe = Probe::new();
        ring.submitter().register_probe(&mut probe)?;
        if !probe.is_supported(opcode::Read::CODE) || !probe.is_supported(opcode::Write::CODE) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "io_uring lacks read/write opcodes",
            ));
        }

        Ok(Self {
            ring: RefCell::new(ring),
            poisoned: Cell::new(false),
        })
    }

    pub(crate) fn read_at(&self, fd: RawFd, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let entry = opcode::Read::new(types::Fd(fd), buf.as_mut_ptr(), clamp_len(buf.len()))
            .offset(offset as _)
            .build()
            .user_data(READ_USERDATA);

        // Safety: `buf` stays mutably borrowed until the completion is reaped.
        unsafe { self.submit_and_wait(entry, READ_USERDATA) }.map(|n| n as usize)
    }

    pub(crate) fn write_at(&self, fd: RawFd, buf: &[u8], offset: u64) -> io::Result<usize> {
        let entry = opcode::Write::new(types::Fd(fd), buf.as_ptr(), clamp_len(buf.len()))
            .offset(offset as _)
            .build()
            .user_data(WRITE_USERDATA);

        // Safety: `buf` stays borrowed until the completion is reaped.
        unsafe { self.submit_and_wait(entry, WRITE_USERDATA) }.map(|n| n as usize)
    }

    /// # Safety
    ///
    /// Every pointer referenced by `entry` must stay valid until this returns.
    unsafe fn submit_and_wait(&self, entry: squeue::Entry, user_data: u64) -> io::Result<u32> {
        if self.poisoned.get() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "io_uring driver is poisoned",
            ));
        }

        let mut ring = self.ring.borrow_mut();

        if ring.submission().push(&entry).is_err() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "io_uring submission queue is full",
            ));
        }

        loop {
            match ring.submit_and_wait(1) {
                Ok(_) => {}
                // The entry may already be in the kernel; keep waiting for it.
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    self.poisoned.set(true);
                    tracing::warn!(%error, "io_uring wait failed, driver poisoned");

                    // Still queued: the kernel never saw the entry, and a
                    // poisoned driver never submits again.
                    if !ring.submission().is_empty() {
                        return Err(error);
                    }

                    // Consumed: the kernel owns the buffer until the
                    // completion arrives, so it has to be reaped first.
                    return Self::reap(&mut ring, user_data);
                }
            }

            if let Some(res) = Self::find_completion(&mut ring, user_data) {
                return res;
            }
        }
    }

    /// Blocks until the completion for `user_data` is available, retrying
    /// failed waits.
    fn reap(ring: &mut IoUring, user_data: u64) -> io::Result<u32> {
        loop {
            if let Some(res) = Self::find_completion(ring, user_data) {
                return res;
            }
            if let Err(error) = ring.submitter().submit_and_wait(1) {
                if error.kind() != io::ErrorKind::Interrupted {
                    tracing::warn!(%error, "io_uring wait failed while reaping");
                    thread::yield_now();
                }
            }
        }
    }

    fn find_completion(ring: &mut IoUring, user_data: u64) -> Option<io::Result<u32>> {
        let mut cq = ring.completion();
        cq.sync();
        cq.find(|cqe| cqe.user_data() == user_data)
            .map(|cqe| resultify(&cqe))
    }
}

fn clamp_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn resultify(cqe: &cqueue::Entry) -> io::Result<u32> {
    let res = cqe.result();

    if res >= 0 {
        Ok(res as u32)
    } else {
        Err(io::Error::from_raw_os_error(-res))
    }
}

#[cfg(test)]
mod test {
    use io_uring::opcode;

    use super::{UringDriver, WRITE_USERDATA};

    fn driver() -> Option<UringDriver> {
        match UringDriver::new(4) {
            Ok(driver) => Some(driver),
            Err(error) => {
                log::warn!("skipping io_uring test: {}", error);
                None
            }
        }
    }

    #[test]
    fn reaps_entry_already_in_kernel() {
        let Some(driver) = driver() else { return };
        let mut ring = driver.ring.borrow_mut();

        let nop = opcode::Nop::new().build().user_data(WRITE_USERDATA);
        unsafe { ring.submission().push(&nop).unwrap() };
        ring.submit().unwrap();
        assert!(ring.submission().is_empty());

        assert_eq!(UringDriver::reap(&mut ring, WRITE_USERDATA).unwrap(), 0);
        assert!(UringDriver::find_completion(&mut ring, WRITE_USERDATA).is_none());
    }

    #[test]
    fn poisoned_driver_refuses_work() {
        let Some(driver) = driver() else { return };
        driver.poisoned.set(true);

        let mut buf = [0u8; 8];
        let err = driver.read_at(0, &mut buf, 0).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::Other);
        assert_eq!(buf, [0u8; 8]);
    }
}
