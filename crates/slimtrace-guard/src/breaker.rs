use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rate-limiter that halts further automatic prunes once too many
/// HARD_FIRED events happen in a short window (spec §4.7 BREAKER_TRIPPED,
/// §9 Open Question: window/count kept configurable, defaulted as
/// specified — 3 events / 5 minutes).
#[derive(Debug)]
pub struct CircuitBreaker {
    max_events: usize,
    window: Duration,
    events: VecDeque<Instant>,
}

impl CircuitBreaker {
    pub fn new(max_events: usize, window: Duration) -> Self {
        CircuitBreaker {
            max_events,
            window,
            events: VecDeque::new(),
        }
    }

    /// Record one HARD_FIRED event at `now`.
    pub fn record_hard_fired(&mut self, now: Instant) {
        self.events.push_back(now);
        self.evict_stale(now);
    }

    /// Whether more than `max_events` HARD_FIRED events have landed within
    /// the trailing window as of `now`. Evicts events that have aged out
    /// before counting, so the breaker self-heals once the window clears.
    pub fn is_tripped(&mut self, now: Instant) -> bool {
        self.evict_stale(now);
        self.events.len() > self.max_events
    }

    /// How many events currently count toward the window, used to pick the
    /// reactive watcher's escalation tier.
    pub fn recovery_count(&mut self, now: Instant) -> u32 {
        self.evict_stale(now);
        self.events.len() as u32
    }

    fn evict_stale(&mut self, now: Instant) {
        while let Some(&front) = self.events.front() {
            if now.saturating_duration_since(front) > self.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }
}
