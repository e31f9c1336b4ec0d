#![cfg(test)]

use libc::O_RDONLY;

use super::*;
use crate::util::panic::assert_panics;

/// Opens /dev/null, which is always present and closes without writeback.
fn open_dev_null() -> ScopedFd {
    // SAFETY: The path is a valid nul-terminated string and the flags request read only.
    match unsafe { libc::open(c"/dev/null".as_ptr(), O_RDONLY) } {
        -1 => panic!("failed to open /dev/null: errno {}", err_no()),
        fd => scoped_fd(fd),
    }
}

#[test]
fn test_explicit_close() {
    let mut file = open_dev_null();
    assert!(*file.get() >= 0, "Opening should produce a real descriptor.");

    assert!(file.release().is_ok(), "Closing /dev/null should succeed.");
    assert!(file.is_released());
    assert!(file.release().is_ok(), "Repeat release should be a no-op.");
}

#[test]
fn test_close_on_drop() {
    // The descriptor number may be reissued to a parallel test as soon as the close lands, so
    // there is nothing to probe afterwards; this exercises the drop path over the real close.
    let file = open_dev_null();
    drop(file);
}

#[test]
fn test_close_unowned_fd_panics() {
    assert_panics!({
        let mut stale = scoped_fd(-1);
        let _ = stale.release();
    }, "Closing a descriptor that was never open should panic.");
}
