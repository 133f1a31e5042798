//! # Timed spinlock
//!
//! A bounded-spin mutual exclusion primitive built on a single
//! [`AtomicU8Cell`] flag. Acquisition never blocks: [`RawSpinLock::try_acquire`]
//! makes at most `max_iterations` failed attempts and then gives up, so the
//! worst-case spin is fixed when the lock is created.
//!
//! Two layers are provided:
//! - [`RawSpinLock`]: just the flag. `try_acquire` / `release`, no data.
//! - [`SpinLock<T>`]: owns a `T` behind a raw lock and hands out a
//!   [`SpinGuard`] that releases on drop.
//!
//! ## Safety
//! - Not reentrant, not fair, no owner tracking.
//! - **Not for interrupt context.** If the holder is preempted by an
//!   interrupt whose handler spins on the same lock, that handler burns its
//!   whole budget and fails (or, with a large budget, stalls the system).
//!
//! ## Example
//! ```rust
//! use embd_atomic::SpinLock;
//!
//! static COUNTER: SpinLock<u32> = SpinLock::new(0, 1_000);
//!
//! fn increment() -> bool {
//!     COUNTER.with_lock(|count| *count += 1).is_some()
//! }
//!
//! assert!(increment());
//! assert_eq!(*COUNTER.try_lock().unwrap(), 1);
//! ```

use core::cell::UnsafeCell;
use core::fmt;
use core::hint::spin_loop;
use core::ops::{Deref, DerefMut};

use crate::cell::AtomicU8Cell;
use crate::order::MemoryOrder;
use crate::platform::{DefaultPlatform, Platform};

const UNLOCKED: u8 = 0;
const LOCKED: u8 = 1;

/// A flag lock with a fixed spin budget.
pub struct RawSpinLock<P: Platform = DefaultPlatform> {
    locked: AtomicU8Cell<P>,
    max_iterations: usize,
}

impl<P: Platform> RawSpinLock<P> {
    /// Creates an unlocked lock whose [`try_acquire`](RawSpinLock::try_acquire)
    /// gives up after `max_iterations` failed attempts.
    ///
    /// A budget of 0 still makes one attempt.
    #[inline(always)]
    pub const fn new(max_iterations: usize) -> Self {
        Self {
            locked: AtomicU8Cell::new(UNLOCKED),
            max_iterations,
        }
    }

    /// Tries to take the lock, spinning at most `max_iterations` times.
    ///
    /// Each attempt is a single weak compare-exchange, so a lost reservation
    /// costs one iteration of the budget like any other failure.
    ///
    /// Returns `true` once the lock is held by the caller, `false` when the
    /// budget ran out.
    ///
    /// Must not be called from interrupt context.
    pub fn try_acquire(&self) -> bool {
        let budget = self.max_iterations.max(1);
        let mut failures = 0;
        loop {
            let mut expected = UNLOCKED;
            if self.locked.compare_exchange_weak(&mut expected, LOCKED) {
                return true;
            }
            failures += 1;
            if failures >= budget {
                log::trace!("spinlock: gave up after {failures} attempts");
                return false;
            }
            spin_loop();
        }
    }

    /// Releases the lock.
    ///
    /// # Safety
    /// The caller must hold the lock, acquired through a successful
    /// [`try_acquire`](RawSpinLock::try_acquire). Releasing a lock held by
    /// someone else breaks mutual exclusion.
    #[inline]
    pub unsafe fn release(&self) {
        debug_assert!(self.is_locked(), "released a spinlock that is not held");
        self.locked.store_explicit(UNLOCKED, MemoryOrder::Release);
    }

    /// Checks whether the lock is currently held.
    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.locked.load_explicit(MemoryOrder::Relaxed) == LOCKED
    }

    /// The spin budget the lock was created with.
    #[inline(always)]
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

impl<P: Platform> fmt::Debug for RawSpinLock<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSpinLock")
            .field("locked", &self.is_locked())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// Data protected by a [`RawSpinLock`].
pub struct SpinLock<T, P: Platform = DefaultPlatform> {
    raw: RawSpinLock<P>,
    data: UnsafeCell<T>,
}

/// A guard that releases the [`SpinLock`] when dropped.
///
/// Returned from [`SpinLock::try_lock`]; implements [`Deref`] and
/// [`DerefMut`] to access the protected data.
pub struct SpinGuard<'a, T, P: Platform = DefaultPlatform> {
    lock: &'a SpinLock<T, P>,
}

impl<T, P: Platform> Drop for SpinGuard<'_, T, P> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: a guard exists only while its lock is held.
        unsafe { self.lock.raw.release() }
    }
}

impl<T, P: Platform> SpinLock<T, P> {
    /// Creates a new [`SpinLock`] wrapping `data`, with a spin budget of
    /// `max_iterations` per acquisition.
    ///
    /// # Example
    /// ```
    /// use embd_atomic::SpinLock;
    ///
    /// let lock: SpinLock<i32> = SpinLock::new(123, 16);
    /// assert_eq!(*lock.try_lock().unwrap(), 123);
    /// ```
    #[inline(always)]
    pub const fn new(data: T, max_iterations: usize) -> Self {
        SpinLock {
            raw: RawSpinLock::new(max_iterations),
            data: UnsafeCell::new(data),
        }
    }

    /// Attempts to acquire the lock within its spin budget.
    ///
    /// Returns `Some(SpinGuard)` on success, `None` if the budget ran out.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinGuard<'_, T, P>> {
        if self.raw.try_acquire() {
            Some(SpinGuard { lock: self })
        } else {
            None
        }
    }

    /// Runs `f` with exclusive access to the data, or returns `None` without
    /// running it if the lock could not be taken in time.
    ///
    /// # Example
    /// ```
    /// use embd_atomic::SpinLock;
    ///
    /// let lock: SpinLock<i32> = SpinLock::new(0, 16);
    /// assert_eq!(lock.with_lock(|data| { *data += 1; *data }), Some(1));
    /// ```
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.try_lock()?;
        Some(f(&mut *guard))
    }

    /// Checks whether the lock is currently held.
    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Mutable access to the data; the borrow rules out other holders.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consumes the lock, returning the data.
    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T, P: Platform> Deref for SpinGuard<'_, T, P> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T, P: Platform> DerefMut for SpinGuard<'_, T, P> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T, P: Platform> fmt::Debug for SpinLock<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinLock").field("raw", &self.raw).finish_non_exhaustive()
    }
}

// Safety: SpinLock enforces mutual exclusion via the flag cell.
unsafe impl<T: Send, P: Platform> Send for SpinLock<T, P> {}
unsafe impl<T: Send, P: Platform> Sync for SpinLock<T, P> {}
