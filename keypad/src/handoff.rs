//! Single-slot rendezvous between the edge interrupts and the dispatch loop.
//!
//! The signal behaves like a semaphore whose count saturates at one. Any
//! number of raises before the consumer drains collapse into a single pending
//! wake; the consumer then reads whatever the shared report holds at that
//! moment, so intermediate states are coalesced rather than queued.

use core::sync::atomic::{AtomicBool, Ordering};

pub struct HandoffSignal {
    pending: AtomicBool,
}

impl HandoffSignal {
    pub const fn new() -> Self {
        Self { pending: AtomicBool::new(false) }
    }

    /// Mark a wake as pending. Never blocks, safe from interrupt context.
    ///
    /// On target the caller follows this with `sev` so a consumer parked in
    /// `wfe` re-checks the flag.
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Consume the pending wake, if there is one.
    ///
    /// Cortex-M0+ has no compare-and-swap, so the load and the clear happen
    /// inside a critical section instead of a single `swap`.
    pub fn try_take(&self) -> bool {
        critical_section::with(|_| {
            let pending = self.pending.load(Ordering::Acquire);
            if pending {
                self.pending.store(false, Ordering::Relaxed);
            }
            pending
        })
    }

    /// Block until a wake is consumed, calling `park` between checks.
    pub fn wait(&self, mut park: impl FnMut()) {
        while !self.try_take() {
            park();
        }
    }
}

impl Default for HandoffSignal {
    fn default() -> Self {
        Self::new()
    }
}
