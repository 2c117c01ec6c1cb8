use std::sync::atomic::{AtomicBool, Ordering};

/// Per-form flag: at most one pending request at a time
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

/// Clears the flag when dropped
#[derive(Debug)]
pub struct InFlightGuard<'a>(&'a AtomicBool);

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// None while another request holds the flag
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.0))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
