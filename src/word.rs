//! Machine words an [`AtomicCell`](crate::AtomicCell) can hold.
//!
//! [`Word`] is implemented for `u8`, `u16` and `u32` only, and is sealed.
//! Each implementation forwards to the target's access primitives in
//! the `arch` module: single-copy-atomic plain loads and stores, and the
//! exclusive (load-linked / store-conditional) pair of matching width.

use core::fmt::Debug;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// An integer of a width the hardware can access exclusively.
///
/// The methods are the raw per-width primitives. They carry no ordering
/// and issue no barriers; callers go through a [`Platform`](crate::Platform).
pub trait Word: Copy + Eq + Debug + Send + Sync + 'static + sealed::Sealed {
    /// Single-copy-atomic read.
    ///
    /// # Safety
    /// `ptr` must be valid, aligned, and only accessed through these
    /// primitives for the duration of the call.
    unsafe fn read(ptr: *const Self) -> Self;

    /// Single-copy-atomic write.
    ///
    /// # Safety
    /// Same contract as [`Word::read`].
    unsafe fn write(ptr: *mut Self, value: Self);

    /// Reads `ptr` and opens an exclusive reservation on it.
    ///
    /// # Safety
    /// Same contract as [`Word::read`].
    unsafe fn load_exclusive(ptr: *const Self) -> Self;

    /// Writes `value` if the reservation opened by the matching
    /// [`load_exclusive`](Word::load_exclusive) (which returned `linked`)
    /// is still live. Returns `true` on success.
    ///
    /// # Safety
    /// Same contract as [`Word::read`].
    unsafe fn store_exclusive(ptr: *mut Self, linked: Self, value: Self) -> bool;
}

macro_rules! seal {
    ($($ty:ty),*) => {$(
        impl sealed::Sealed for $ty {}
    )*};
}

seal!(u8, u16, u32);
