use std::convert::Infallible;
use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;

use crate::policy::FailurePolicy;

/// The owned state: the handle together with the release function that will consume it.
struct Owned<T, F> {
    handle: T,
    release: F,
}

/// A unique owner binding the release of a resource handle to its own lifetime.
///
/// A `Scoped` is constructed around a handle that the caller has *already* acquired, such as an
/// open descriptor or a held lock. From that point the release function is guaranteed to run
/// exactly once: at drop, at an explicit [`release`](Scoped::release), or never if the caller
/// takes the handle back with [`into_handle`](Scoped::into_handle). Every exit path from the
/// owning scope is covered, including panic unwinding.
///
/// Ownership is unique: it moves with the value, and a move leaves no source behind to release
/// anything. Copying does not compile:
///
/// ```compile_fail
/// use scoped_handle::scoped::scoped;
///
/// fn duplicate<T: Clone>(value: &T) -> T {
///     value.clone()
/// }
///
/// let owner = scoped((), |_| {});
/// let copy = duplicate(&owner); // Scoped is not Clone
/// ```
///
/// For shared ownership with a reference count, see [`Shared`](crate::shared::Shared).
///
/// # Examples
/// Constructing directly with a fallible release function:
///
/// ```
/// use scoped_handle::scoped::Scoped;
///
/// fn close(id: u32) -> Result<(), String> {
///     if id == 0 { Err("bad handle".to_owned()) } else { Ok(()) }
/// }
///
/// let mut session = Scoped::new(17, close);
/// assert_eq!(*session.get(), 17);
/// session.release()?;
/// # Ok::<(), String>(())
/// ```
///
/// Acquisition belongs to the caller, and the idiomatic place for the wrapper is the same
/// expression, so nothing can intervene between acquiring and owning:
///
/// ```no_run
/// # use scoped_handle::scoped::scoped;
/// # struct Font;
/// # fn lease_font(name: &str) -> Font { Font }
/// # fn return_font(f: Font) {}
/// let font = scoped(lease_font("mono-9"), return_font);
/// ```
#[must_use = "dropping a Scoped immediately releases its handle"]
pub struct Scoped<T, E, F>
where
    F: FnOnce(T) -> Result<(), E>,
    E: Display,
{
    state: Option<Owned<T, F>>,
    policy: FailurePolicy,
    _failure: PhantomData<fn() -> E>,
}

impl<T, E, F> Scoped<T, E, F>
where
    F: FnOnce(T) -> Result<(), E>,
    E: Display,
{
    /// Takes ownership of `handle`, to be passed to `release` exactly once.
    ///
    /// The handle must already be valid: this constructor performs no acquisition and cannot
    /// fail. Release failures during drop fall under [`FailurePolicy::Log`]; use
    /// [`with_policy`](Scoped::with_policy) to select a different policy.
    pub const fn new(handle: T, release: F) -> Scoped<T, E, F> {
        Scoped::with_policy(handle, release, FailurePolicy::Log)
    }

    /// Like [`new`](Scoped::new), with an explicit policy for release failures during drop.
    ///
    /// # Examples
    /// ```
    /// use scoped_handle::policy::FailurePolicy;
    /// use scoped_handle::scoped::Scoped;
    ///
    /// fn close(id: u32) -> Result<(), String> { Ok(()) }
    ///
    /// // A resource we can't afford to leak silently.
    /// let session = Scoped::with_policy(3, close, FailurePolicy::Abort);
    /// ```
    pub const fn with_policy(handle: T, release: F, policy: FailurePolicy) -> Scoped<T, E, F> {
        Scoped {
            state: Some(Owned { handle, release }),
            policy,
            _failure: PhantomData,
        }
    }

    /// Releases the handle now instead of at drop, reporting the outcome.
    ///
    /// Unlike a failure during drop, a failure from an explicit call propagates: the caller is
    /// still around to handle it. The handle is passed to the release function before the
    /// outcome is known, so even a failed call transitions this owner to released and drop will
    /// not try again; release runs at most once, success or not.
    ///
    /// Calling this on an already-released owner does nothing and returns `Ok`.
    ///
    /// # Examples
    /// ```
    /// # use scoped_handle::scoped::Scoped;
    /// let mut owner = Scoped::new(7, |_| Err("close failed"));
    /// assert_eq!(owner.release(), Err("close failed"));
    /// assert!(owner.is_released());
    /// assert_eq!(owner.release(), Ok(())); // repeat calls are no-ops
    /// ```
    pub fn release(&mut self) -> Result<(), E> {
        match self.state.take() {
            Some(Owned { handle, release }) => release(handle),
            None => Ok(()),
        }
    }

    /// Borrows the handle without giving up ownership.
    ///
    /// The borrow is tied to this owner, so the handle cannot be observed after its release.
    /// Copying the underlying value out (for a `Copy` handle type) and releasing it manually
    /// behind the owner's back is the one misuse this type cannot prevent; the release function
    /// would then run on a dead handle.
    ///
    /// # Panics
    /// Panics if the handle has already been released.
    pub const fn get(&self) -> &T {
        match &self.state {
            Some(owned) => &owned.handle,
            None => panic!("failed to access handle after release"),
        }
    }

    /// Borrows the handle, or returns [`None`] if it has already been released.
    pub const fn try_get(&self) -> Option<&T> {
        match &self.state {
            Some(owned) => Some(&owned.handle),
            None => None,
        }
    }

    /// Returns true once the handle has been handed to the release function or taken back by
    /// the caller.
    pub const fn is_released(&self) -> bool {
        self.state.is_none()
    }

    /// Relinquishes ownership *without* releasing, returning the raw handle.
    ///
    /// The release function is discarded and will never run; from here on the handle is the
    /// caller's problem again. This owner's drop becomes a no-op.
    ///
    /// # Panics
    /// Panics if the handle has already been released.
    ///
    /// # Examples
    /// ```
    /// # use scoped_handle::scoped::scoped;
    /// let owner = scoped(vec![1, 2], |_| unreachable!("must not release"));
    /// assert_eq!(owner.into_handle(), vec![1, 2]);
    /// ```
    pub fn into_handle(mut self) -> T {
        match self.state.take() {
            Some(owned) => owned.handle,
            None => panic!("failed to take handle after release"),
        }
    }
}

impl<T, E, F> Drop for Scoped<T, E, F>
where
    F: FnOnce(T) -> Result<(), E>,
    E: Display,
{
    fn drop(&mut self) {
        if let Some(Owned { handle, release }) = self.state.take() {
            if let Err(failure) = release(handle) {
                self.policy.absorb(failure);
            }
        }
    }
}

impl<T, E, F> Debug for Scoped<T, E, F>
where
    T: Debug,
    F: FnOnce(T) -> Result<(), E>,
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(owned) => write!(f, "Scoped({:?})", owned.handle),
            None => write!(f, "Scoped(released)"),
        }
    }
}

/// Creates a [`Scoped`] owner from a release function that cannot fail.
///
/// Most cleanup calls have nothing useful to report, like returning an object to a pool or
/// unhooking a callback. This constructor saves such callers from wrapping their release in
/// `Ok(())`.
///
/// # Examples
/// ```
/// use scoped_handle::scoped::scoped;
/// use std::cell::Cell;
///
/// let unlocked = Cell::new(false);
/// {
///     let _held = scoped("door", |_| unlocked.set(true));
///     assert!(!unlocked.get());
/// }
/// assert!(unlocked.get());
/// ```
pub fn scoped<T, F>(
    handle: T,
    release: F,
) -> Scoped<T, Infallible, impl FnOnce(T) -> Result<(), Infallible>>
where
    F: FnOnce(T),
{
    Scoped::new(handle, move |handle| {
        release(handle);
        Ok(())
    })
}
