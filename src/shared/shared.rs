use std::convert::Infallible;
use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;
use std::process;
use std::ptr::NonNull;
use std::sync::atomic::{self, AtomicUsize, Ordering};

use crate::policy::FailurePolicy;

/// Hard cap on the owner count. Wrapping past this would eventually read as zero again and
/// release a handle that still has owners.
const MAX_OWNERS: usize = isize::MAX as usize;

/// The heap allocation all owners point at: the live owner count alongside the handle and the
/// release function that will consume it.
struct Inner<T, F> {
    owners: AtomicUsize,
    policy: FailurePolicy,
    handle: T,
    release: F,
}

/// A reference-counted owner sharing the release of one resource handle.
///
/// Cloning a `Shared` creates a new owner of the *same* handle and raises an atomic count.
/// Dropping or explicitly releasing an owner lowers it, and whichever owner turns out to be the
/// last runs the release function. Release happens exactly once across the whole group, in
/// whatever order and on whatever threads the owners go away.
///
/// Use [`Scoped`](crate::scoped::Scoped) instead when one scope is responsible for the handle;
/// it has no count to maintain and no allocation.
///
/// # Examples
/// ```
/// use scoped_handle::shared::shared;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// static RETURNED: AtomicUsize = AtomicUsize::new(0);
/// fn return_to_pool(conn: u32) {
///     RETURNED.fetch_add(1, Ordering::SeqCst);
/// }
///
/// let first = shared(17, return_to_pool);
/// let second = first.clone();
/// assert_eq!(first.owners(), 2);
///
/// drop(first);
/// assert_eq!(RETURNED.load(Ordering::SeqCst), 0); // an owner remains
///
/// drop(second);
/// assert_eq!(RETURNED.load(Ordering::SeqCst), 1); // the last owner released
/// ```
#[must_use = "dropping a Shared immediately surrenders its share of the handle"]
pub struct Shared<T, E, F>
where
    F: FnOnce(T) -> Result<(), E>,
    E: Display,
{
    inner: Option<NonNull<Inner<T, F>>>,
    _owns: PhantomData<Inner<T, F>>,
    _failure: PhantomData<fn() -> E>,
}

impl<T, E, F> Shared<T, E, F>
where
    F: FnOnce(T) -> Result<(), E>,
    E: Display,
{
    /// Takes ownership of `handle`, to be passed to `release` once the last owner is gone.
    ///
    /// The returned value is the sole owner until it is cloned. As with
    /// [`Scoped`](crate::scoped::Scoped), the handle must already be valid, and release failures
    /// during drop fall under [`FailurePolicy::Log`] unless
    /// [`with_policy`](Shared::with_policy) selects otherwise.
    pub fn new(handle: T, release: F) -> Shared<T, E, F> {
        Shared::with_policy(handle, release, FailurePolicy::Log)
    }

    /// Like [`new`](Shared::new), with an explicit policy for release failures during drop.
    ///
    /// The policy is fixed for the whole owner group; clones carry it implicitly.
    pub fn with_policy(handle: T, release: F, policy: FailurePolicy) -> Shared<T, E, F> {
        let inner = Box::new(Inner {
            owners: AtomicUsize::new(1),
            policy,
            handle,
            release,
        });
        Shared {
            inner: Some(NonNull::from(Box::leak(inner))),
            _owns: PhantomData,
            _failure: PhantomData,
        }
    }

    /// Surrenders this owner's share now instead of at drop, reporting the outcome.
    ///
    /// If other owners remain the handle stays alive for them, nothing runs, and the result is
    /// `Ok`. If this was the last owner the release function runs, and unlike a failure during
    /// drop, its failure propagates to the caller. Either way this owner transitions to
    /// released, and a repeat call does nothing and returns `Ok`.
    ///
    /// # Examples
    /// ```
    /// # use scoped_handle::shared::Shared;
    /// fn close(id: u32) -> Result<(), String> { Ok(()) }
    ///
    /// let mut first = Shared::new(3, close);
    /// let second = first.clone();
    ///
    /// first.release()?; // a share remains; the handle survives
    /// assert!(first.is_released());
    /// assert_eq!(second.owners(), 1);
    /// # Ok::<(), String>(())
    /// ```
    pub fn release(&mut self) -> Result<(), E> {
        match self.detach() {
            Some((handle, release, _)) => release(handle),
            None => Ok(()),
        }
    }

    /// Borrows the handle without giving up this owner's share.
    ///
    /// All owners borrow the same handle; none of them can observe it after the last share is
    /// gone, because borrows are tied to a live owner.
    ///
    /// # Panics
    /// Panics if this owner has already surrendered its share.
    pub fn get(&self) -> &T {
        match self.try_get() {
            Some(handle) => handle,
            None => panic!("failed to access handle after release"),
        }
    }

    /// Borrows the handle, or returns [`None`] if this owner has already surrendered its share.
    pub fn try_get(&self) -> Option<&T> {
        match &self.inner {
            // SAFETY: This owner still holds a count contribution, so the allocation is live.
            Some(ptr) => Some(&unsafe { ptr.as_ref() }.handle),
            None => None,
        }
    }

    /// Returns the number of owners currently sharing the handle, including this one.
    ///
    /// Returns 0 once this owner has surrendered its share. The count is a snapshot: other
    /// threads may clone or drop owners while the caller looks at it.
    pub fn owners(&self) -> usize {
        match self.inner {
            // SAFETY: This owner still holds a count contribution, so the allocation is live.
            Some(ptr) => unsafe { ptr.as_ref() }.owners.load(Ordering::Acquire),
            None => 0,
        }
    }

    /// Returns true once this owner has surrendered its share, whether or not other owners keep
    /// the handle alive.
    pub const fn is_released(&self) -> bool {
        self.inner.is_none()
    }

    /// Lowers the count and reclaims the allocation if this owner was the last, returning the
    /// handle, the release function and the group's failure policy.
    fn detach(&mut self) -> Option<(T, F, FailurePolicy)> {
        let ptr = self.inner.take()?;
        // SAFETY: The count contribution is surrendered by this very decrement, so the
        // allocation is still live here.
        if unsafe { ptr.as_ref() }.owners.fetch_sub(1, Ordering::Release) != 1 {
            return None;
        }
        // Pairs with the Release decrements above: every other owner's final use of the handle
        // is ordered before this reclaim.
        atomic::fence(Ordering::Acquire);
        // SAFETY: The count hit zero, so no owner is left to touch the allocation; this is its
        // unique final access, and it came from Box::leak in with_policy.
        let inner = unsafe { Box::from_raw(ptr.as_ptr()) };
        let Inner { policy, handle, release, .. } = *inner;
        Some((handle, release, policy))
    }
}

impl<T, E, F> Clone for Shared<T, E, F>
where
    F: FnOnce(T) -> Result<(), E>,
    E: Display,
{
    /// Creates a new owner of the same handle.
    ///
    /// Cloning an owner that has already surrendered its share yields another released owner.
    fn clone(&self) -> Shared<T, E, F> {
        if let Some(ptr) = self.inner {
            // SAFETY: self still holds a count contribution, so the allocation is live.
            let previous = unsafe { ptr.as_ref() }.owners.fetch_add(1, Ordering::Relaxed);
            if previous > MAX_OWNERS {
                // A count this high can only come from forgotten owners; aborting beats letting
                // it wrap.
                process::abort();
            }
        }
        Shared {
            inner: self.inner,
            _owns: PhantomData,
            _failure: PhantomData,
        }
    }
}

impl<T, E, F> Drop for Shared<T, E, F>
where
    F: FnOnce(T) -> Result<(), E>,
    E: Display,
{
    fn drop(&mut self) {
        if let Some((handle, release, policy)) = self.detach() {
            if let Err(failure) = release(handle) {
                policy.absorb(failure);
            }
        }
    }
}

// SAFETY: Sending an owner moves a borrow point for T to the receiving thread while other owners
// may still borrow it, and the last owner consumes T and F on whichever thread it lands on, so
// both T and F must be Send and T additionally Sync. The count itself is atomic.
unsafe impl<T, E, F> Send for Shared<T, E, F>
where
    T: Send + Sync,
    F: FnOnce(T) -> Result<(), E> + Send,
    E: Display,
{
}

// SAFETY: &Shared only hands out &T and count snapshots, but a clone taken through it is a full
// owner, so the requirements match Send.
unsafe impl<T, E, F> Sync for Shared<T, E, F>
where
    T: Send + Sync,
    F: FnOnce(T) -> Result<(), E> + Send,
    E: Display,
{
}

impl<T, E, F> Debug for Shared<T, E, F>
where
    T: Debug,
    F: FnOnce(T) -> Result<(), E>,
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.try_get() {
            Some(handle) => write!(f, "Shared({:?})", handle),
            None => write!(f, "Shared(released)"),
        }
    }
}

/// Creates a [`Shared`] owner from a release function that cannot fail.
///
/// The counterpart of [`scoped`](crate::scoped::scoped) for handles with more than one owner.
///
/// # Examples
/// ```
/// use scoped_handle::shared::shared;
///
/// let first = shared("session-9", |_| {});
/// let second = first.clone();
/// assert!(std::ptr::eq(first.get(), second.get()));
/// ```
pub fn shared<T, F>(
    handle: T,
    release: F,
) -> Shared<T, Infallible, impl FnOnce(T) -> Result<(), Infallible>>
where
    F: FnOnce(T),
{
    Shared::new(handle, move |handle| {
        release(handle);
        Ok(())
    })
}
