use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use crate::breaker::CircuitBreaker;
use crate::config::GuardConfig;

/// State shared between the poll thread and the reactive watcher thread
/// (spec §5): one mutex serializes every mutation of the session file and
/// of the circuit breaker; a cooperative `AtomicBool` is how the signal
/// handler and the loops agree to stop between ticks/records rather than
/// mid-write.
pub struct GuardShared {
    pub inner: Mutex<GuardInner>,
    pub shutdown: AtomicBool,
    /// Set by the reactive thread to ask the poll thread to write a
    /// checkpoint on its next tick; cleared by the poll thread once it has
    /// (spec §5: "the reactive thread requests a checkpoint by toggling a
    /// flag the poll thread observes").
    pub checkpoint_requested: AtomicBool,
}

pub struct GuardInner {
    pub breaker: CircuitBreaker,
    pub last_known_size: u64,
}

impl GuardShared {
    pub fn new(config: &GuardConfig) -> Self {
        GuardShared {
            inner: Mutex::new(GuardInner {
                breaker: CircuitBreaker::new(config.breaker_max_events, std::time::Duration::from_secs(config.breaker_window_secs)),
                last_known_size: 0,
            }),
            shutdown: AtomicBool::new(false),
            checkpoint_requested: AtomicBool::new(false),
        }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn request_checkpoint(&self) {
        self.checkpoint_requested.store(true, Ordering::SeqCst);
    }

    pub fn take_checkpoint_request(&self) -> bool {
        self.checkpoint_requested.swap(false, Ordering::SeqCst)
    }
}

/// Convenience: current wall-clock instant, isolated behind one function so
/// the rest of the guard loop never calls `Instant::now()` directly — kept
/// for readability at call sites, not for mockability (the crate does not
/// abstract over time; see `breaker`'s own tests for how the pure logic is
/// exercised without a live clock).
pub fn now() -> Instant {
    Instant::now()
}
