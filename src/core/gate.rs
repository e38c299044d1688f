//! Re-entrancy guard for fetches
//!
//! The gate is a plain atomic flag, not part of the feed's reactive state, so
//! that two triggers firing back to back observe each other's test-and-set
//! before either suspends. Entering hands out a [`GatePass`]; the gate reopens
//! when the pass is dropped, which covers success, failure and panics alike.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// At most one holder at a time per feed kind
#[derive(Debug, Clone, Default)]
pub struct FetchGate {
    in_flight: Arc<AtomicBool>,
}

impl FetchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims the gate
    ///
    /// Returns `None` if a fetch is already in flight.
    pub fn try_enter(&self) -> Option<GatePass> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| GatePass {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Proof of admission; reopens the gate on drop
#[derive(Debug)]
#[must_use = "dropping the pass immediately reopens the gate"]
pub struct GatePass {
    in_flight: Arc<AtomicBool>,
}

impl GatePass {
    /// Reopens the gate explicitly
    pub fn exit(self) {}
}

impl Drop for GatePass {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_gate_default_is_open() {
        let gate = FetchGate::new();
        assert!(!gate.is_in_flight());
    }

    #[test]
    fn test_second_enter_is_rejected() {
        let gate = FetchGate::new();

        let pass = gate.try_enter();
        assert!(pass.is_some());
        assert!(gate.is_in_flight());
        assert!(gate.try_enter().is_none());

        drop(pass);
        assert!(!gate.is_in_flight());
        assert!(gate.try_enter().is_some());
    }

    #[test]
    fn test_exit_reopens_gate() {
        let gate = FetchGate::new();
        let pass = gate.try_enter().expect("gate should be open");
        pass.exit();
        assert!(!gate.is_in_flight());
    }

    #[test]
    fn test_pass_released_on_panic() {
        let gate = FetchGate::new();
        let cloned = gate.clone();

        let result = thread::spawn(move || {
            let _pass = cloned.try_enter().expect("gate should be open");
            panic!("fetch blew up");
        })
        .join();

        assert!(result.is_err());
        assert!(!gate.is_in_flight());
    }

    #[test]
    fn test_concurrent_enter_admits_exactly_one() {
        let gate = FetchGate::new();
        let barrier = Arc::new(std::sync::Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = gate.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    // Keep the pass alive until every thread has tried
                    gate.try_enter().map(|pass| {
                        std::mem::forget(pass);
                    })
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .filter_map(|handle| handle.join().ok().flatten())
            .count();

        assert_eq!(admitted, 1);
        assert!(gate.is_in_flight());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let gate = FetchGate::new();
        let other = gate.clone();

        let _pass = gate.try_enter().expect("gate should be open");
        assert!(other.is_in_flight());
        assert!(other.try_enter().is_none());
    }
}
