use std::io;

use libc::{EBADF, EDQUOT, EINTR, EIO, ENOSPC, c_int};

use crate::fd::error::{CloseError, IOError, InterruptError, StorageExhaustedError};
use crate::fd::panic::{BadFdPanic, Panic, UnexpectedErrorPanic};
use crate::policy::FailurePolicy;
use crate::scoped::Scoped;

/// A [`Scoped`] owner of a raw file descriptor, closed exactly once.
pub type ScopedFd = Scoped<c_int, CloseError, fn(c_int) -> Result<(), CloseError>>;

/// Reads the errno left behind by a failed libc call.
pub(crate) fn err_no() -> c_int {
    // SAFETY: raw_os_error guarantees Some if constructed from last_os_error.
    unsafe { io::Error::last_os_error().raw_os_error().unwrap_unchecked() }
}

/// Closes a raw file descriptor, mapping errno onto typed failures.
///
/// The descriptor is invalidated whatever the outcome; none of the failures leave anything to
/// retry with.
///
/// # Panics
/// Panics on `EBADF`: the descriptor was closed already or never open, so whoever handed it
/// over did not own it. Also panics on any errno `close(2)` does not document.
pub fn close_fd(fd: c_int) -> Result<(), CloseError> {
    // SAFETY: close invalidates the descriptor regardless of the outcome; the caller has handed
    // it over for good.
    if unsafe { libc::close(fd) } == -1 {
        match err_no() {
            EBADF =>           BadFdPanic.panic(),
            EINTR =>           Err(InterruptError)?,
            EIO =>             Err(IOError)?,
            ENOSPC | EDQUOT => Err(StorageExhaustedError)?,
            e =>               UnexpectedErrorPanic(e).panic(),
        }
    }
    Ok(())
}

/// Wraps an already-open file descriptor, to be closed by [`close_fd`] exactly once.
///
/// # Examples
/// ```no_run
/// use libc::O_RDONLY;
/// use scoped_handle::fd::{CloseError, scoped_fd};
///
/// let fd = match unsafe { libc::open(c"/etc/hostname".as_ptr(), O_RDONLY) } {
///     -1 => panic!("open failed"),
///     fd => fd,
/// };
/// let mut file = scoped_fd(fd);
/// // ...read through *file.get()...
/// file.release()?;
/// # Ok::<(), CloseError>(())
/// ```
pub const fn scoped_fd(fd: c_int) -> ScopedFd {
    Scoped::new(fd, close_fd)
}

/// Like [`scoped_fd`], with an explicit policy for close failures during drop.
pub const fn scoped_fd_with_policy(fd: c_int, policy: FailurePolicy) -> ScopedFd {
    Scoped::with_policy(fd, close_fd, policy)
}
