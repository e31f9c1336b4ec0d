#![cfg(test)]

use std::ptr;
use std::thread;

use super::*;
use crate::util::panic::assert_panics;
use crate::util::probe::{InjectedFailure, ReleaseProbe};

#[test]
fn test_last_owner_releases() {
    let probe = ReleaseProbe::new();
    let first = shared(7, probe.releaser());
    let second = first.clone();

    drop(first);
    assert_eq!(probe.count(), 0, "An owner remains, so nothing should be released yet.");

    drop(second);
    assert_eq!(probe.count(), 1, "The last owner should release exactly once.");
}

#[test]
fn test_release_order_independent() {
    let probe = ReleaseProbe::new();
    let root = shared(7, probe.releaser());
    let mut owners: Vec<_> = (0..4).map(|_| root.clone()).collect();
    owners.push(root);
    owners.swap(0, 3);
    owners.swap(1, 4);

    while let Some(owner) = owners.pop() {
        drop(owner);
        if !owners.is_empty() {
            assert_eq!(probe.count(), 0, "Owners remain, so nothing should be released yet.");
        }
    }
    assert_eq!(probe.count(), 1, "Five owners should amount to exactly one release.");
}

#[test]
fn test_owners_counts_every_share() {
    let root = shared((), |_| {});
    assert_eq!(root.owners(), 1, "A fresh owner should count itself.");

    let extra = root.clone();
    assert_eq!(root.owners(), 2);
    assert_eq!(extra.owners(), 2, "Every owner should see the same count.");

    drop(root);
    assert_eq!(extra.owners(), 1);
}

#[test]
fn test_explicit_release_leaves_other_owners() {
    let probe = ReleaseProbe::new();
    let mut first = Shared::new(7, probe.ok_releaser());
    let second = first.clone();

    assert_eq!(first.release(), Ok(()), "A non-last release should have nothing to run.");
    assert!(first.is_released());
    assert_eq!(first.owners(), 0, "A released owner should no longer count itself.");
    assert_eq!(probe.count(), 0, "The handle should survive for the remaining owner.");
    assert_eq!(*second.get(), 7, "The remaining owner should still reach the handle.");

    drop(second);
    assert_eq!(probe.count(), 1);
}

#[test]
fn test_last_explicit_release_propagates_failure() {
    let probe = ReleaseProbe::new();
    let mut only = Shared::new(7, probe.failing_releaser());

    assert_eq!(
        only.release(),
        Err(InjectedFailure),
        "The last release should hand its failure to the caller."
    );
    assert_eq!(probe.count(), 1);

    drop(only);
    assert_eq!(probe.count(), 1, "A failed release shouldn't be retried at drop.");
}

#[test]
fn test_drop_failure_is_swallowed() {
    let probe = ReleaseProbe::new();
    let mut first = Shared::new(7, probe.failing_releaser());
    let second = first.clone();

    assert_eq!(first.release(), Ok(()), "Only the last owner should observe the failure.");
    // Default policy: the last drop logs the failure and completes normally.
    drop(second);
    assert_eq!(probe.count(), 1, "The failing release should still run exactly once.");
}

#[test]
fn test_clone_of_released_is_released() {
    let probe = ReleaseProbe::new();
    let mut owner = Shared::new((), probe.ok_releaser());
    assert_eq!(owner.release(), Ok(()));
    assert_eq!(probe.count(), 1);

    let copy = owner.clone();
    assert!(copy.is_released(), "A released owner should have no share to duplicate.");
    assert_eq!(copy.owners(), 0);
    assert_eq!(copy.try_get(), None);

    drop(copy);
    drop(owner);
    assert_eq!(probe.count(), 1, "Released owners shouldn't release again.");
}

#[test]
fn test_accessors() {
    let probe = ReleaseProbe::new();
    let mut owner = shared("handle-s", probe.releaser());

    assert_eq!(*owner.get(), "handle-s", "Borrowing should return the constructed handle.");
    assert_eq!(owner.try_get(), Some(&"handle-s"));
    assert!(!owner.is_released());

    assert_eq!(owner.release(), Ok(()));
    assert_eq!(owner.try_get(), None, "A released owner should have no handle to borrow.");

    assert_panics!({
        let probe = ReleaseProbe::new();
        let mut owner = Shared::new((), probe.ok_releaser());
        assert_eq!(owner.release(), Ok(()));
        owner.get();
    }, "Accessing a released owner should panic.");
}

#[test]
fn test_clones_share_one_handle() {
    let root = shared(vec![1, 2, 3], |_| {});
    let copy = root.clone();

    assert_eq!(root.get(), copy.get(), "Every owner should see the same handle.");
    assert!(ptr::eq(root.get(), copy.get()), "Clones shouldn't duplicate the handle.");
}

#[test]
fn test_release_on_unwind() {
    let probe = ReleaseProbe::new();
    assert_panics!({
        let root = shared(7, probe.releaser());
        let _guard = root.clone();
        panic!("simulated failure");
    });
    assert_eq!(probe.count(), 1, "Unwinding through every owner should still release once.");
}

#[test]
fn test_threaded_owners_release_once() {
    let probe = ReleaseProbe::new();
    let root = shared(7, probe.releaser());

    thread::scope(|scope| {
        for _ in 0..8 {
            let owner = root.clone();
            scope.spawn(move || {
                assert_eq!(*owner.get(), 7);
            });
        }
        scope.spawn(move || drop(root));
    });

    assert_eq!(
        probe.count(),
        1,
        "Owners across all threads should amount to exactly one release."
    );
}
