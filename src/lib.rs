//! This crate binds the release of externally managed resources to the lifetime of a value:
//! a handle goes in, and the matching cleanup call is guaranteed to run exactly once, on every
//! way out of the owning scope.
//!
//! # Purpose
//! Every codebase that touches raw handles (file descriptors, C API objects, locks taken through
//! a foreign interface) ends up rewriting the same three wrappers: close-on-drop, unlock-on-exit
//! and last-owner-closes. This crate is those wrappers written once, properly, with the failure
//! handling thought through instead of bolted on.
//!
//! # Method
//! Two owner types cover the two ownership modes:
//! - [`Scoped`](scoped::Scoped) owns a handle uniquely. Ownership moves; copying doesn't compile.
//! - [`Shared`](shared::Shared) owns a handle jointly behind an atomic reference count. Cloning
//!   shares; the release runs when the last clone goes away.
//!
//! Neither type acquires anything. The caller performs the acquisition and hands over the
//! already-valid handle together with the release function, preferably in the same expression,
//! so no step in between can fail and leak it.
//!
//! Neither type converts implicitly to the handle either. Access goes through explicit
//! borrowing accessors, which means the borrow checker stops the classic bug where a copied-out
//! raw handle quietly outlives its owner.
//!
//! # Error Handling
//! Release functions report failure as ordinary [`Result`]s. What happens to an `Err` depends on
//! where it surfaces: an explicit `release()` call hands it straight back to the caller, while a
//! failure during drop is absorbed according to the owner's
//! [`FailurePolicy`](policy::FailurePolicy) (log it, or abort the process), because a value being
//! dropped mid-unwind has nobody left to return an error to.
//!
//! Misusing an owner after it has given the handle up (accessing a released owner) is a panic,
//! not an error. Errors are for failures of the resource; panics are for bugs in the program.
//!
//! # Dependencies
//! `derive_more` carries the repetitive parts of the error types. `log` is the diagnostic
//! channel for failures that drop has to swallow. The [`fd`] module relies on `libc` for its
//! thin syscall wrapper and is feature-gated so the rest of the crate stays dependency-light.

#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod policy;
pub mod scoped;

#[cfg(feature = "shared")]
pub mod shared;

#[cfg(feature = "fd")]
pub mod fd;

#[cfg(test)]
pub(crate) mod util;
