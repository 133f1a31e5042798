//! Demonstrates the bounded `SpinLock` from `embd-atomic`.
//!
//! Spawns 16 threads that each try to bump a shared counter 100 000 times.
//! Every attempt has a fixed spin budget, so under contention some attempts
//! time out instead of waiting; the counter must still equal the number of
//! successful acquisitions.

use embd_atomic::SpinLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

// Shared static spinlock protecting a 64-bit counter, 64 spins per attempt.
static Q: SpinLock<u64> = SpinLock::new(0, 64);

static ACQUIRED: AtomicU64 = AtomicU64::new(0);
static TIMED_OUT: AtomicU64 = AtomicU64::new(0);

fn add() {
    for _ in 0..100_000 {
        match Q.with_lock(|count| *count += 1) {
            Some(()) => ACQUIRED.fetch_add(1, Ordering::Relaxed),
            None => TIMED_OUT.fetch_add(1, Ordering::Relaxed),
        };
    }
}

fn main() {
    println!("Starting timed spinlock test...");

    let mut threads = Vec::with_capacity(16);
    for _ in 0..16 {
        threads.push(thread::spawn(add));
    }

    for t in threads {
        let _ = t.join();
    }

    let total = Q.with_lock(|count| *count);
    println!(
        "Final counter value: {:?} (acquired {}, timed out {})",
        total,
        ACQUIRED.load(Ordering::Relaxed),
        TIMED_OUT.load(Ordering::Relaxed),
    );
}
