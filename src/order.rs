//! # Memory orders and barrier mapping
//!
//! Translates an abstract [`MemoryOrder`] into the concrete barriers that have
//! to surround a memory access: a hardware data memory barrier of the right
//! scope, and a compiler barrier that keeps the access from being hoisted or
//! sunk across the call.
//!
//! The mapping is pure. Scope selection only depends on the [`Topology`] the
//! platform was built for:
//!
//! | Order             | Placement           | Multi-core     | Single-core             |
//! |-------------------|---------------------|----------------|-------------------------|
//! | `Relaxed`         | none                | —              | —                       |
//! | `Consume/Acquire` | after the access    | `System`       | `InnerShareable`        |
//! | `Release`         | before the access   | `SystemStore`  | `InnerShareableStore`   |
//! | `AcqRel/SeqCst`   | before and after    | `System`       | `System`                |
//!
//! The compiler barrier is emitted on both sides in every case, `Relaxed`
//! included.

use core::sync::atomic::{compiler_fence, Ordering};

use crate::platform::Platform;

/// Ordering requirement attached to a single atomic operation.
///
/// Mirrors the C11 memory orders. `Consume` is treated exactly like
/// `Acquire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOrder {
    Relaxed,
    Consume,
    Acquire,
    Release,
    AcqRel,
    SeqCst,
}

/// Whether the target is a single core preempted only by interrupts, or
/// several cores sharing memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    SingleCore,
    MultiCore,
}

/// Scope of a hardware data memory barrier (`DMB <option>` on ARM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierScope {
    /// Full system, loads and stores (`DMB SY`).
    System,
    /// Full system, stores only (`DMB ST`).
    SystemStore,
    /// Inner shareable domain, loads and stores (`DMB ISH`).
    InnerShareable,
    /// Inner shareable domain, stores only (`DMB ISHST`).
    InnerShareableStore,
}

/// Hardware barriers to issue around one memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarrierPlan {
    pub before: Option<BarrierScope>,
    pub after: Option<BarrierScope>,
}

impl MemoryOrder {
    /// Barrier placement for this order on the given topology.
    ///
    /// # Examples
    /// ```
    /// use embd_atomic::{BarrierScope, MemoryOrder, Topology};
    ///
    /// let plan = MemoryOrder::Release.plan(Topology::MultiCore);
    /// assert_eq!(plan.before, Some(BarrierScope::SystemStore));
    /// assert_eq!(plan.after, None);
    /// ```
    #[inline(always)]
    pub const fn plan(self, topology: Topology) -> BarrierPlan {
        let (full, acquire, release) = match topology {
            Topology::MultiCore => (
                BarrierScope::System,
                BarrierScope::System,
                BarrierScope::SystemStore,
            ),
            Topology::SingleCore => (
                BarrierScope::System,
                BarrierScope::InnerShareable,
                BarrierScope::InnerShareableStore,
            ),
        };

        match self {
            MemoryOrder::Relaxed => BarrierPlan {
                before: None,
                after: None,
            },
            MemoryOrder::Consume | MemoryOrder::Acquire => BarrierPlan {
                before: None,
                after: Some(acquire),
            },
            MemoryOrder::Release => BarrierPlan {
                before: Some(release),
                after: None,
            },
            MemoryOrder::AcqRel | MemoryOrder::SeqCst => BarrierPlan {
                before: Some(full),
                after: Some(full),
            },
        }
    }

    /// Returns `true` if this order may be used for the failure path of a
    /// compare-exchange (it must not carry release semantics).
    #[inline(always)]
    pub const fn is_valid_failure(self) -> bool {
        !matches!(self, MemoryOrder::Release | MemoryOrder::AcqRel)
    }
}

/// Issues the optional hardware barrier followed by a compiler barrier.
#[inline(always)]
pub(crate) fn fence<P: Platform>(scope: Option<BarrierScope>) {
    if let Some(scope) = scope {
        P::data_barrier(scope);
    }
    compiler_fence(Ordering::SeqCst);
}
