//! Reference-counted shared ownership of a resource handle.
//!
//! [`Shared`] extends the exactly-once release guarantee of
//! [`Scoped`](crate::scoped::Scoped) across any number of owners: every clone is a new owner,
//! and the release function runs when the last one goes away. The count is atomic, so owners
//! can live and die on different threads.

mod shared;
mod tests;

pub use shared::*;
