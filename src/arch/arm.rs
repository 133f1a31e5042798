use core::arch::asm;
use core::ptr;

use crate::order::BarrierScope;
use crate::word::Word;

/// `DMB` with the option matching `scope`.
///
/// No `nomem` option: the asm block doubles as a compiler barrier.
#[inline(always)]
pub(crate) fn data_memory_barrier(scope: BarrierScope) {
    unsafe {
        match scope {
            BarrierScope::System => asm!("dmb sy", options(nostack, preserves_flags)),
            BarrierScope::SystemStore => asm!("dmb st", options(nostack, preserves_flags)),
            BarrierScope::InnerShareable => asm!("dmb ish", options(nostack, preserves_flags)),
            BarrierScope::InnerShareableStore => {
                asm!("dmb ishst", options(nostack, preserves_flags))
            }
        }
    }
}

#[inline(always)]
pub(crate) fn clear_exclusive() {
    unsafe { asm!("clrex", options(nomem, nostack, preserves_flags)) }
}

macro_rules! arm_word {
    ($($ty:ty => $ldrex:literal, $strex:literal;)*) => {$(
        impl Word for $ty {
            #[inline(always)]
            unsafe fn read(ptr: *const Self) -> Self {
                // Aligned accesses up to 32 bits are single-copy atomic.
                unsafe { ptr::read_volatile(ptr) }
            }

            #[inline(always)]
            unsafe fn write(ptr: *mut Self, value: Self) {
                unsafe { ptr::write_volatile(ptr, value) }
            }

            #[inline(always)]
            unsafe fn load_exclusive(ptr: *const Self) -> Self {
                let value: u32;
                unsafe {
                    asm!(
                        concat!($ldrex, " {value}, [{ptr}]"),
                        value = out(reg) value,
                        ptr = in(reg) ptr,
                        options(nostack, preserves_flags),
                    );
                }
                value as $ty
            }

            #[inline(always)]
            unsafe fn store_exclusive(ptr: *mut Self, _linked: Self, value: Self) -> bool {
                let status: u32;
                unsafe {
                    asm!(
                        concat!($strex, " {status}, {value}, [{ptr}]"),
                        status = out(reg) status,
                        value = in(reg) value as u32,
                        ptr = in(reg) ptr,
                        options(nostack, preserves_flags),
                    );
                }
                status == 0
            }
        }
    )*};
}

arm_word! {
    u8 => "ldrexb", "strexb";
    u16 => "ldrexh", "strexh";
    u32 => "ldrex", "strex";
}
