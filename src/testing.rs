//! Instrumented platform for unit tests.
//!
//! [`Probe`] delegates to [`MultiCore`] but counts load-linked attempts,
//! records every barrier and access it is asked for, and can be told to lose
//! the next few reservations. State is thread-local so tests running in
//! parallel do not see each other.

use std::cell::{Cell, RefCell};

use crate::order::{BarrierScope, Topology};
use crate::platform::{MultiCore, Platform};
use crate::word::Word;

std::thread_local! {
    static LINKED: Cell<usize> = const { Cell::new(0) };
    static LOSE_NEXT: Cell<usize> = const { Cell::new(0) };
    static CLEARED: Cell<usize> = const { Cell::new(0) };
    static EVENTS: RefCell<Vec<Event>> = const { RefCell::new(Vec::new()) };
}

/// One platform call, in the order the cell issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Barrier(BarrierScope),
    LoadLinked,
    StoreConditional(bool),
    ClearReservation,
    Read,
    Write,
}

fn record(event: Event) {
    EVENTS.with(|e| e.borrow_mut().push(event));
}

pub(crate) struct Probe;

impl Probe {
    /// Makes the next `n` store-conditionals on this thread fail.
    pub(crate) fn lose_reservations(n: usize) {
        LOSE_NEXT.with(|c| c.set(n));
    }

    pub(crate) fn linked() -> usize {
        LINKED.with(Cell::get)
    }

    pub(crate) fn cleared() -> usize {
        CLEARED.with(Cell::get)
    }

    /// Drains the events recorded on this thread.
    pub(crate) fn take_events() -> Vec<Event> {
        EVENTS.with(|e| e.take())
    }

    pub(crate) fn reset() {
        EVENTS.with(|e| e.borrow_mut().clear());
        LINKED.with(|c| c.set(0));
        LOSE_NEXT.with(|c| c.set(0));
        CLEARED.with(|c| c.set(0));
    }
}

unsafe impl Platform for Probe {
    const TOPOLOGY: Topology = Topology::MultiCore;

    fn data_barrier(scope: BarrierScope) {
        record(Event::Barrier(scope));
        MultiCore::data_barrier(scope);
    }

    unsafe fn load_linked<W: Word>(ptr: *const W) -> W {
        LINKED.with(|c| c.set(c.get() + 1));
        record(Event::LoadLinked);
        unsafe { MultiCore::load_linked(ptr) }
    }

    unsafe fn store_conditional<W: Word>(ptr: *mut W, linked: W, value: W) -> bool {
        let lose = LOSE_NEXT.with(|c| {
            let left = c.get();
            if left > 0 {
                c.set(left - 1);
            }
            left > 0
        });
        if lose {
            record(Event::StoreConditional(false));
            return false;
        }
        // Retry until the host primitive agrees, so only injected losses
        // are observable.
        let stored = loop {
            if unsafe { MultiCore::store_conditional(ptr, linked, value) } {
                break true;
            }
            if unsafe { MultiCore::read(ptr) } != linked {
                break false;
            }
        };
        record(Event::StoreConditional(stored));
        stored
    }

    fn clear_reservation() {
        CLEARED.with(|c| c.set(c.get() + 1));
        record(Event::ClearReservation);
        MultiCore::clear_reservation();
    }

    unsafe fn read<W: Word>(ptr: *const W) -> W {
        record(Event::Read);
        unsafe { MultiCore::read(ptr) }
    }

    unsafe fn write<W: Word>(ptr: *mut W, value: W) {
        record(Event::Write);
        unsafe { MultiCore::write(ptr, value) }
    }
}
