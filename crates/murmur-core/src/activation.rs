use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide relay gate. Starts inactive and is never persisted, so an
/// administrator has to re-enable the bot after every restart.
#[derive(Debug, Default)]
pub struct ActivationState {
    active: AtomicBool,
}

impl ActivationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns the previous value.
    pub fn activate(&self) -> bool {
        self.set(true)
    }

    /// Returns the previous value.
    pub fn deactivate(&self) -> bool {
        self.set(false)
    }

    /// Atomic swap; returns the previous value.
    pub fn set(&self, active: bool) -> bool {
        self.active.swap(active, Ordering::SeqCst)
    }
}
