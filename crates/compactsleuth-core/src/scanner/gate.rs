/// Session-wide pause/resume switch for all scanning.
///
/// Pausing is cooperative: an in-flight walk stops at the next entry it
/// checks, and new browse calls return empty. Nothing is queued and nothing
/// blocks waiting for the gate to reopen.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Cheaply clonable handle; every clone controls the same gate.
#[derive(Clone, Debug)]
pub struct ProcessingGate {
    enabled: Arc<AtomicBool>,
}

impl Default for ProcessingGate {
    fn default() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl ProcessingGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop new scanning work from starting.
    pub fn pause(&self) {
        info!("Pausing processing");
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Allow scanning again.
    pub fn resume(&self) {
        info!("Resuming processing");
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Whether scanning is currently allowed.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_defaults_open_and_clones_share_state() {
        let gate = ProcessingGate::new();
        assert!(gate.is_open());

        let other = gate.clone();
        other.pause();
        assert!(!gate.is_open());

        gate.resume();
        assert!(other.is_open());
    }
}
