#![cfg(target_os = "linux")]

//! Scoped ownership of raw file descriptors.
//!
//! The descriptor is the classic handle that must be released exactly once: a double close can
//! tear a descriptor out from under an unrelated part of the process that reused the number.
//! [`scoped_fd`] wraps an already-open descriptor in a [`Scoped`](crate::scoped::Scoped) owner
//! whose release maps the errno from `close(2)` onto typed failures.

mod close;
mod error;
mod panic;
mod tests;

pub use close::*;
pub use error::*;
