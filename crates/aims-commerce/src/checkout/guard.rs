//! One-shot latch for non-idempotent calls.

use std::sync::atomic::{AtomicBool, Ordering};

/// Lets exactly one caller through for the lifetime of the latch.
///
/// Once taken the latch stays taken, whether or not the guarded call
/// succeeded. A fresh latch is needed to try again.
#[derive(Debug, Default)]
pub struct SingleFlight {
    taken: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the latch. Returns `false` if someone already has.
    pub fn try_begin(&self) -> bool {
        self.taken
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_taken(&self) -> bool {
        self.taken.load(Ordering::Acquire)
    }
}
