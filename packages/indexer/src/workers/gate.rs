use std::sync::atomic::{AtomicBool, Ordering};

/// Single-permit gate held for the duration of one pass.
#[derive(Debug, Default)]
pub struct PassGate {
    running: AtomicBool,
}

impl PassGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the permit, or `None` when a pass is already in flight.
    pub fn try_acquire(&self) -> Option<PassGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard { gate: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases the gate when dropped, including on early return and unwind.
#[derive(Debug)]
pub struct PassGuard<'a> {
    gate: &'a PassGate,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.gate.running.store(false, Ordering::Release);
    }
}
