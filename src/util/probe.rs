use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use derive_more::{Display, Error};

/// Counts how many times a release function has been invoked.
///
/// The probe hands out release functions wired to a shared atomic counter, so a test can
/// construct owners, destroy them in any order (or on any thread) and then assert on exactly
/// how many releases actually happened.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReleaseProbe(Arc<AtomicUsize>);

impl ReleaseProbe {
    pub fn new() -> ReleaseProbe {
        ReleaseProbe::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// An infallible release function that bumps the counter.
    pub fn releaser<T>(&self) -> impl FnOnce(T) {
        let counter = Arc::clone(&self.0);
        move |_handle| {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// A release function that bumps the counter and then succeeds.
    pub fn ok_releaser<T>(&self) -> impl FnOnce(T) -> Result<(), InjectedFailure> {
        let counter = Arc::clone(&self.0);
        move |_handle| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// A release function that bumps the counter and then reports failure.
    pub fn failing_releaser<T>(&self) -> impl FnOnce(T) -> Result<(), InjectedFailure> {
        let counter = Arc::clone(&self.0);
        move |_handle| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(InjectedFailure)
        }
    }
}

#[derive(Debug, Display, Error, PartialEq, Eq)]
#[display("injected release failure")]
pub(crate) struct InjectedFailure;
