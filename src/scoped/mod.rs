//! Unique ownership of a resource handle. Revolves around [`Scoped`] and its free constructor
//! [`scoped`].
//!
//! Unique ownership is the default mode: exactly one live owner at a time, ownership moves with
//! the value and copying does not compile.

mod scoped;

pub use scoped::*;
