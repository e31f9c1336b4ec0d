//! The policy applied to release failures that surface while an owner is being dropped.

use std::fmt::Display;
use std::process;

use log::error;

/// Selects the diagnostic channel for a release failure reported during drop.
///
/// A failure that surfaces during automatic cleanup cannot be returned to anyone: the owner may
/// well be dropping because the stack is already unwinding from an unrelated panic, and a second
/// failure cannot be composed with the first. The two variants here are the two classic
/// treatments: report and carry on, or treat the process as unrecoverable.
///
/// Failures from an explicit [`release`](crate::scoped::Scoped::release) call are unaffected by
/// this policy; those propagate to the caller as ordinary [`Result`]s.
///
/// # Examples
/// ```
/// # use scoped_handle::policy::FailurePolicy;
/// # use scoped_handle::scoped::Scoped;
/// let owner = Scoped::with_policy(7, |_| Err("connection already gone"), FailurePolicy::Log);
/// drop(owner); // the failure is logged, not propagated
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure through [`log::error!`] and continue. The default.
    #[default]
    Log,
    /// Report the failure on stderr and [`abort`](process::abort) the process.
    Abort,
}

impl FailurePolicy {
    pub(crate) fn absorb<E: Display>(self, failure: E) {
        match self {
            FailurePolicy::Log => error!("release failed during drop: {failure}"),
            FailurePolicy::Abort => {
                // Written straight to stderr: a logger may not be installed, and this line is
                // the last thing the process says.
                eprintln!("release failed during drop, aborting: {failure}");
                process::abort();
            }
        }
    }
}
