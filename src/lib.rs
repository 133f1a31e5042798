//! # embd-atomic
//!
//! A **`no_std`** layer of atomic primitives for embedded targets whose
//! compiler provides no atomics. Everything is built from two hardware
//! facilities: the exclusive-access pair (load-linked / store-conditional,
//! `LDREX`/`STREX` on ARM) and the data memory barrier family (`DMB`).
//!
//! The crate includes:
//!
//! - [`MemoryOrder`] — C11-style orderings, mapped to barrier plans by
//!   [`MemoryOrder::plan`].
//! - [`AtomicCell<W>`] — an 8/16/32-bit cell with load, store and weak/strong
//!   compare-exchange, in default-ordering and explicit-ordering flavors.
//! - [`RawSpinLock`] / [`SpinLock<T>`] — a spinlock with a fixed spin budget
//!   and a try-acquire contract.
//!
//! ## 🚀 Quick Example
//!
//! ```rust
//! use embd_atomic::{AtomicU32Cell, MemoryOrder, RawSpinLock};
//!
//! static READY: AtomicU32Cell = AtomicU32Cell::new(0);
//! static LOCK: RawSpinLock = RawSpinLock::new(1_000);
//!
//! READY.store(1);
//! assert_eq!(READY.load_explicit(MemoryOrder::SeqCst), 1);
//!
//! if LOCK.try_acquire() {
//!     // critical section
//!     unsafe { LOCK.release() };
//! }
//! ```
//!
//! ## 🧠 Design
//!
//! Layering is strictly bottom-up: the spinlock only uses the cell's weak
//! compare-exchange and explicit store; the cell only uses the barrier
//! mapper and a [`Platform`].
//!
//! A [`Platform`] is chosen per cell and lock by type parameter:
//!
//! - [`MultiCore`] (default): true exclusive access, system-wide barriers.
//! - [`SingleCore`]: plain access with interrupts masked around each
//!   compare-exchange attempt via `critical-section`. Selected as the default
//!   by the `single-core` feature.
//!
//! ## ⚠️ Safety & Usage Notes
//!
//! - Exclusive-access instructions require ARMv6K / ARMv7 or later. Other
//!   architectures get an emulation intended for host testing.
//! - [`RawSpinLock::try_acquire`] must not be called from interrupt context.
//! - Releasing a lock you do not hold is undefined behavior; debug builds
//!   assert against it.
//!
//! ## Feature flags
//!
//! - **`std`** (default) — builds the demo binary.
//! - **`single-core`** — makes [`SingleCore`] the [`DefaultPlatform`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

mod arch;
pub mod cell;
pub mod order;
pub mod platform;
pub mod spinlock;
pub mod word;

#[cfg(test)]
mod testing;

pub use cell::{AtomicCell, AtomicU16Cell, AtomicU32Cell, AtomicU8Cell};
pub use order::{BarrierPlan, BarrierScope, MemoryOrder, Topology};
pub use platform::{DefaultPlatform, MultiCore, Platform, SingleCore};
pub use spinlock::{RawSpinLock, SpinGuard, SpinLock};
pub use word::Word;
