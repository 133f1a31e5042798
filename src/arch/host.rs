//! Exclusive-access emulation for targets without `LDREX`/`STREX`.
//!
//! The reservation is represented by the value observed at load-linked time:
//! the store-conditional is a weak compare-exchange against it. That fails
//! whenever another writer changed the word in between, and may also fail
//! spuriously on hosts whose own compare-exchange is LL/SC based. The ABA
//! window this leaves open does not change the result of a compare-exchange
//! on the cell, which is the only consumer.

use core::sync::atomic::{fence, AtomicU16, AtomicU32, AtomicU8, Ordering};

use crate::order::BarrierScope;
use crate::word::Word;

#[inline(always)]
pub(crate) fn data_memory_barrier(scope: BarrierScope) {
    match scope {
        BarrierScope::System | BarrierScope::InnerShareable => fence(Ordering::SeqCst),
        BarrierScope::SystemStore | BarrierScope::InnerShareableStore => {
            fence(Ordering::Release)
        }
    }
}

/// Reservations live only inside a single compare-exchange here.
#[inline(always)]
pub(crate) fn clear_exclusive() {}

macro_rules! host_word {
    ($($ty:ty => $atomic:ty;)*) => {$(
        impl Word for $ty {
            #[inline(always)]
            unsafe fn read(ptr: *const Self) -> Self {
                // SAFETY: the cell is only touched through these primitives,
                // and its storage is aligned for the atomic of equal width.
                unsafe { <$atomic>::from_ptr(ptr.cast_mut()) }.load(Ordering::Relaxed)
            }

            #[inline(always)]
            unsafe fn write(ptr: *mut Self, value: Self) {
                unsafe { <$atomic>::from_ptr(ptr) }.store(value, Ordering::Relaxed)
            }

            #[inline(always)]
            unsafe fn load_exclusive(ptr: *const Self) -> Self {
                unsafe { Self::read(ptr) }
            }

            #[inline(always)]
            unsafe fn store_exclusive(ptr: *mut Self, linked: Self, value: Self) -> bool {
                unsafe { <$atomic>::from_ptr(ptr) }
                    .compare_exchange_weak(linked, value, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
            }
        }
    )*};
}

host_word! {
    u8 => AtomicU8;
    u16 => AtomicU16;
    u32 => AtomicU32;
}
