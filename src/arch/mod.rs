//! Per-target hardware primitives.
//!
//! On 32-bit ARM (ARMv6K / ARMv7 and later) the exclusive-access pair maps to
//! `LDREX{B,H}` / `STREX{B,H}`, reservations are dropped with `CLREX` and
//! barriers are `DMB` with an explicit option. Every other target gets an
//! emulation on top of `core::sync::atomic`, so the crate can be exercised on
//! a development host.

#[cfg(target_arch = "arm")]
mod arm;
#[cfg(target_arch = "arm")]
pub(crate) use arm::{clear_exclusive, data_memory_barrier};

#[cfg(not(target_arch = "arm"))]
mod host;
#[cfg(not(target_arch = "arm"))]
pub(crate) use host::{clear_exclusive, data_memory_barrier};
