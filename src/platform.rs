//! # Platform strategies
//!
//! A [`Platform`] bundles the two things an atomic cell needs from the target:
//! data memory barriers and an exclusive-access primitive. Two strategies are
//! provided:
//!
//! - [`MultiCore`]: real load-linked / store-conditional. Correct with any
//!   number of cores sharing memory.
//! - [`SingleCore`]: plain loads and stores, with every compare-exchange
//!   attempt run inside a [`critical_section`] so no interrupt handler can
//!   touch the cell between the read and the write.
//!
//! [`DefaultPlatform`] is [`MultiCore`] unless the `single-core` feature is
//! enabled. Cells and locks take the platform as a type parameter, so both
//! strategies can coexist in one program.
//!
//! Using [`SingleCore`] requires a `critical-section` implementation to be
//! linked in (for example the one `cortex-m` provides with its
//! `critical-section-single-core` feature).

use crate::arch;
use crate::order::{BarrierScope, Topology};
use crate::word::Word;

/// Barrier and exclusive-access strategy for a target.
///
/// # Safety
/// Implementations must make [`store_conditional`](Platform::store_conditional)
/// fail whenever the word may have been written since the paired
/// [`load_linked`](Platform::load_linked), counting writes from other cores
/// and from interrupt handlers. Plain [`read`](Platform::read) and
/// [`write`](Platform::write) must be single-copy atomic.
pub unsafe trait Platform: 'static {
    /// Drives barrier scope selection in [`MemoryOrder::plan`](crate::MemoryOrder::plan).
    const TOPOLOGY: Topology;

    /// Issues a hardware data memory barrier.
    fn data_barrier(scope: BarrierScope);

    /// Reads `ptr`, establishing a reservation on it.
    ///
    /// # Safety
    /// `ptr` must point to a live, aligned word only accessed through this
    /// platform.
    unsafe fn load_linked<W: Word>(ptr: *const W) -> W;

    /// Writes `value` if the reservation taken by the last
    /// [`load_linked`](Platform::load_linked) (which observed `linked`) is
    /// still held. Success consumes the reservation.
    ///
    /// # Safety
    /// Same as [`load_linked`](Platform::load_linked), and must follow a
    /// `load_linked` on the same address.
    unsafe fn store_conditional<W: Word>(ptr: *mut W, linked: W, value: W) -> bool;

    /// Drops a reservation that will not be followed by a store.
    fn clear_reservation();

    /// # Safety
    /// Same as [`load_linked`](Platform::load_linked).
    unsafe fn read<W: Word>(ptr: *const W) -> W;

    /// # Safety
    /// Same as [`load_linked`](Platform::load_linked).
    unsafe fn write<W: Word>(ptr: *mut W, value: W);

    /// Runs one load-linked / compare / store-conditional attempt.
    #[inline(always)]
    fn exclusive_window<R>(attempt: impl FnOnce() -> R) -> R {
        attempt()
    }
}

/// Shared-memory multiprocessor: true exclusive access, system-wide barriers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiCore;

unsafe impl Platform for MultiCore {
    const TOPOLOGY: Topology = Topology::MultiCore;

    #[inline(always)]
    fn data_barrier(scope: BarrierScope) {
        arch::data_memory_barrier(scope);
    }

    #[inline(always)]
    unsafe fn load_linked<W: Word>(ptr: *const W) -> W {
        unsafe { W::load_exclusive(ptr) }
    }

    #[inline(always)]
    unsafe fn store_conditional<W: Word>(ptr: *mut W, linked: W, value: W) -> bool {
        unsafe { W::store_exclusive(ptr, linked, value) }
    }

    #[inline(always)]
    fn clear_reservation() {
        arch::clear_exclusive();
    }

    #[inline(always)]
    unsafe fn read<W: Word>(ptr: *const W) -> W {
        unsafe { W::read(ptr) }
    }

    #[inline(always)]
    unsafe fn write<W: Word>(ptr: *mut W, value: W) {
        unsafe { W::write(ptr, value) }
    }
}

/// One core, preempted only by interrupts.
///
/// No reservation is taken. Instead, interrupts are masked for the length of
/// each compare-exchange attempt, which makes the store-conditional
/// infallible.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleCore;

unsafe impl Platform for SingleCore {
    const TOPOLOGY: Topology = Topology::SingleCore;

    #[inline(always)]
    fn data_barrier(scope: BarrierScope) {
        arch::data_memory_barrier(scope);
    }

    #[inline(always)]
    unsafe fn load_linked<W: Word>(ptr: *const W) -> W {
        unsafe { W::read(ptr) }
    }

    #[inline(always)]
    unsafe fn store_conditional<W: Word>(ptr: *mut W, _linked: W, value: W) -> bool {
        unsafe { W::write(ptr, value) };
        true
    }

    #[inline(always)]
    fn clear_reservation() {}

    #[inline(always)]
    unsafe fn read<W: Word>(ptr: *const W) -> W {
        unsafe { W::read(ptr) }
    }

    #[inline(always)]
    unsafe fn write<W: Word>(ptr: *mut W, value: W) {
        unsafe { W::write(ptr, value) }
    }

    #[inline(always)]
    fn exclusive_window<R>(attempt: impl FnOnce() -> R) -> R {
        critical_section::with(|_| attempt())
    }
}

#[cfg(not(feature = "single-core"))]
pub type DefaultPlatform = MultiCore;

#[cfg(feature = "single-core")]
pub type DefaultPlatform = SingleCore;
