//! # AtomicCell
//!
//! An 8, 16 or 32-bit word that is only read and written through atomic
//! operations built from the platform's exclusive-access primitive and
//! explicit barriers. Intended for targets where the compiler provides no
//! atomics of its own.
//!
//! ## Operations
//! - [`load`](AtomicCell::load) / [`store`](AtomicCell::store): acquire load
//!   and release store.
//! - [`load_explicit`](AtomicCell::load_explicit) /
//!   [`store_explicit`](AtomicCell::store_explicit): caller-chosen
//!   [`MemoryOrder`].
//! - [`compare_exchange_weak`](AtomicCell::compare_exchange_weak): one
//!   load-linked / compare / store-conditional attempt. May fail spuriously.
//! - [`compare_exchange_strong`](AtomicCell::compare_exchange_strong):
//!   retries lost reservations internally; fails only on a real mismatch.
//!
//! On failure both compare-exchange flavors report through the `expected`
//! argument: it is overwritten with the observed value when the values
//! differed, and left untouched when only the reservation was lost.
//!
//! ## Example
//! ```rust
//! use embd_atomic::AtomicU32Cell;
//!
//! static STATE: AtomicU32Cell = AtomicU32Cell::new(0);
//!
//! let mut expected = 0;
//! assert!(STATE.compare_exchange_strong(&mut expected, 5));
//! assert_eq!(STATE.load(), 5);
//!
//! let mut expected = 0;
//! assert!(!STATE.compare_exchange_strong(&mut expected, 5));
//! assert_eq!(expected, 5);
//! ```

use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;

use crate::order::{fence, BarrierScope, MemoryOrder};
use crate::platform::{DefaultPlatform, Platform};
use crate::word::Word;

/// Atomic word of width `W`, using platform strategy `P`.
#[repr(transparent)]
pub struct AtomicCell<W: Word, P: Platform = DefaultPlatform> {
    value: UnsafeCell<W>,
    platform: PhantomData<fn() -> P>,
}

pub type AtomicU8Cell<P = DefaultPlatform> = AtomicCell<u8, P>;
pub type AtomicU16Cell<P = DefaultPlatform> = AtomicCell<u16, P>;
pub type AtomicU32Cell<P = DefaultPlatform> = AtomicCell<u32, P>;

/// Outcome of one exclusive-access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt<W> {
    Stored,
    Mismatch(W),
    ReservationLost,
}

impl<W: Word, P: Platform> AtomicCell<W, P> {
    /// Creates a new cell holding `value`.
    #[inline(always)]
    pub const fn new(value: W) -> Self {
        Self {
            value: UnsafeCell::new(value),
            platform: PhantomData,
        }
    }

    /// Consumes the cell, returning the contained value.
    #[inline]
    pub fn into_inner(self) -> W {
        self.value.into_inner()
    }

    /// Mutable access to the value. No barriers are needed since the borrow
    /// guarantees no concurrent access.
    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        self.value.get_mut()
    }

    /// Loads the value with [`MemoryOrder::Acquire`].
    #[inline(always)]
    pub fn load(&self) -> W {
        self.load_explicit(MemoryOrder::Acquire)
    }

    /// Stores `value` with [`MemoryOrder::Release`].
    #[inline(always)]
    pub fn store(&self, value: W) {
        self.store_explicit(value, MemoryOrder::Release)
    }

    /// Loads the value with the given ordering.
    #[inline(always)]
    pub fn load_explicit(&self, order: MemoryOrder) -> W {
        let plan = order.plan(P::TOPOLOGY);
        fence::<P>(plan.before);
        // SAFETY: the cell owns the word and only ever accesses it through `P`.
        let value = unsafe { P::read(self.value.get()) };
        fence::<P>(plan.after);
        value
    }

    /// Stores `value` with the given ordering.
    ///
    /// A plain single-copy-atomic write; it cannot fail. On exclusive-access
    /// hardware it also breaks any other observer's reservation on the cell.
    #[inline(always)]
    pub fn store_explicit(&self, value: W, order: MemoryOrder) {
        let plan = order.plan(P::TOPOLOGY);
        fence::<P>(plan.before);
        // SAFETY: the cell owns the word and only ever accesses it through `P`.
        unsafe { P::write(self.value.get(), value) };
        fence::<P>(plan.after);
    }

    /// Stores `desired` if the cell holds `*expected`, with a single
    /// exclusive-access attempt.
    ///
    /// Returns `true` if `desired` was written. On `false`:
    /// - if the cell held a different value, it is written to `*expected`;
    /// - if the reservation was lost, `*expected` is left as is and the call
    ///   may simply be retried.
    ///
    /// Equivalent to the explicit form with `AcqRel` on success and
    /// `Acquire` on failure.
    #[inline(always)]
    pub fn compare_exchange_weak(&self, expected: &mut W, desired: W) -> bool {
        self.compare_exchange_weak_explicit(
            expected,
            desired,
            MemoryOrder::AcqRel,
            MemoryOrder::Acquire,
        )
    }

    /// Like [`compare_exchange_weak`](AtomicCell::compare_exchange_weak) but
    /// never fails because of a lost reservation: returns `false` only when
    /// the cell held a value other than `*expected`.
    #[inline(always)]
    pub fn compare_exchange_strong(&self, expected: &mut W, desired: W) -> bool {
        self.compare_exchange_strong_explicit(
            expected,
            desired,
            MemoryOrder::AcqRel,
            MemoryOrder::Acquire,
        )
    }

    /// [`compare_exchange_weak`](AtomicCell::compare_exchange_weak) with
    /// explicit orderings for the success and mismatch paths.
    ///
    /// The load-linked is always preceded by at least an acquire-scope
    /// barrier, whatever `success` is. A lost reservation only gets a
    /// compiler barrier. `failure` must not be
    /// [`Release`](MemoryOrder::Release) or [`AcqRel`](MemoryOrder::AcqRel).
    pub fn compare_exchange_weak_explicit(
        &self,
        expected: &mut W,
        desired: W,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        debug_assert!(
            failure.is_valid_failure(),
            "invalid compare-exchange failure ordering: {failure:?}"
        );
        fence::<P>(Self::lead_in(success));

        // A mismatching attempt leaves its reservation open; the next
        // load-linked replaces it.
        let attempt = self.attempt(*expected, desired);
        self.settle(attempt, expected, success, failure)
    }

    /// [`compare_exchange_strong`](AtomicCell::compare_exchange_strong) with
    /// explicit orderings for the success and mismatch paths.
    ///
    /// Once started, the retry loop ends only on success or on a real
    /// mismatch.
    pub fn compare_exchange_strong_explicit(
        &self,
        expected: &mut W,
        desired: W,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        debug_assert!(
            failure.is_valid_failure(),
            "invalid compare-exchange failure ordering: {failure:?}"
        );
        fence::<P>(Self::lead_in(success));

        loop {
            match self.attempt(*expected, desired) {
                Attempt::ReservationLost => fence::<P>(None),
                Attempt::Mismatch(observed) => {
                    P::clear_reservation();
                    return self.settle(Attempt::Mismatch(observed), expected, success, failure);
                }
                Attempt::Stored => {
                    return self.settle(Attempt::Stored, expected, success, failure);
                }
            }
        }
    }

    /// Barrier ahead of the first load-linked: the release side of
    /// `success`, or the acquire scope when `success` has none.
    #[inline(always)]
    fn lead_in(success: MemoryOrder) -> Option<BarrierScope> {
        success
            .plan(P::TOPOLOGY)
            .before
            .or(MemoryOrder::Acquire.plan(P::TOPOLOGY).after)
    }

    /// One load-linked / compare / store-conditional sequence.
    #[inline(always)]
    fn attempt(&self, expected: W, desired: W) -> Attempt<W> {
        let ptr = self.value.get();
        P::exclusive_window(|| {
            // SAFETY: `ptr` is the cell's own storage, accessed only via `P`.
            let observed = unsafe { P::load_linked(ptr) };
            if observed != expected {
                return Attempt::Mismatch(observed);
            }
            if unsafe { P::store_conditional(ptr, observed, desired) } {
                Attempt::Stored
            } else {
                Attempt::ReservationLost
            }
        })
    }

    /// Emits the trailing barrier for `attempt` and reports the outcome.
    #[inline(always)]
    fn settle(
        &self,
        attempt: Attempt<W>,
        expected: &mut W,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        match attempt {
            Attempt::Stored => {
                fence::<P>(success.plan(P::TOPOLOGY).after);
                true
            }
            Attempt::Mismatch(observed) => {
                *expected = observed;
                fence::<P>(failure.plan(P::TOPOLOGY).after);
                false
            }
            Attempt::ReservationLost => {
                fence::<P>(None);
                false
            }
        }
    }
}

impl<W: Word + Default, P: Platform> Default for AtomicCell<W, P> {
    fn default() -> Self {
        Self::new(W::default())
    }
}

impl<W: Word, P: Platform> From<W> for AtomicCell<W, P> {
    fn from(value: W) -> Self {
        Self::new(value)
    }
}

impl<W: Word, P: Platform> fmt::Debug for AtomicCell<W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicCell")
            .field(&self.load_explicit(MemoryOrder::Relaxed))
            .finish()
    }
}

// Safety: every access to the word goes through the platform's atomic
// primitives.
unsafe impl<W: Word, P: Platform> Sync for AtomicCell<W, P> {}
unsafe impl<W: Word, P: Platform> Send for AtomicCell<W, P> {}
