/// Tunables for one guarded session (spec §4.7). Defaults match the spec's
/// stated defaults exactly; every field is a plain override point for the
/// `guard` CLI flags.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub hard_threshold_bytes: u64,
    pub soft_threshold_bytes: u64,
    pub token_threshold: Option<u64>,
    pub poll_interval_secs: u64,
    /// Strategy-name list for the hard prescription; soft is fixed to
    /// `gentle` per spec (§4.7 "soft prescription (fixed to gentle)").
    pub hard_prescription: &'static str,
    pub reactive_enabled: bool,
    pub reload_enabled: bool,
    /// Circuit-breaker window: more than `breaker_max_events` HARD_FIRED
    /// events within `breaker_window_secs` trips the breaker (spec §9 Open
    /// Question: kept configurable, defaulted as specified).
    pub breaker_max_events: usize,
    pub breaker_window_secs: u64,
}

const MIB: u64 = 1024 * 1024;

impl Default for GuardConfig {
    fn default() -> Self {
        let hard = 50 * MIB;
        GuardConfig {
            hard_threshold_bytes: hard,
            soft_threshold_bytes: (hard as f64 * 0.6) as u64,
            token_threshold: None,
            poll_interval_secs: 30,
            hard_prescription: "standard",
            reactive_enabled: true,
            reload_enabled: true,
            breaker_max_events: 3,
            breaker_window_secs: 300,
        }
    }
}

impl GuardConfig {
    /// Build from CLI-facing megabyte values, deriving the default soft
    /// threshold (60% of hard) when the caller doesn't override it.
    pub fn from_mb(hard_mb: u64, soft_mb: Option<u64>) -> Self {
        let hard = hard_mb * MIB;
        let soft = soft_mb.map(|mb| mb * MIB).unwrap_or((hard as f64 * 0.6) as u64);
        GuardConfig {
            hard_threshold_bytes: hard,
            soft_threshold_bytes: soft,
            ..GuardConfig::default()
        }
    }

    /// A session file well below the soft threshold lets the reactive
    /// watcher's small-file fast path return immediately without taking the
    /// lock (spec §4.7 "small-file fast path").
    pub fn is_well_below_soft(&self, size_bytes: u64) -> bool {
        size_bytes < self.soft_threshold_bytes / 2
    }
}

/// Which band of the two-tier threshold state machine a size/token reading
/// falls into (spec §4.7). `BREAKER_TRIPPED` is a guard-loop-level
/// condition layered on top of `Hard`, not a distinct reading, so it is
/// modeled separately by the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Idle,
    Soft,
    Hard,
}

/// Classify a size/token reading against the configured thresholds
/// (spec §4.7 state machine: IDLE / SOFT_FIRED / HARD_FIRED, "whichever
/// triggers first").
pub fn decide_tier(size_bytes: u64, tokens: u64, config: &GuardConfig) -> Tier {
    let hard_by_size = size_bytes >= config.hard_threshold_bytes;
    let hard_by_tokens = config.token_threshold.is_some_and(|t| tokens >= t);

    if hard_by_size || hard_by_tokens {
        Tier::Hard
    } else if size_bytes >= config.soft_threshold_bytes {
        Tier::Soft
    } else {
        Tier::Idle
    }
}

/// Escalating prescription for successive reactive recoveries within one
/// breaker window: gentle on the first, standard on the second, aggressive
/// on the third and beyond (spec §4.7 reactive watcher).
pub fn escalated_prescription(recovery_count_in_window: u32) -> &'static str {
    match recovery_count_in_window {
        0 => "gentle",
        1 => "standard",
        _ => "aggressive",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_soft_is_sixty_percent_of_hard() {
        let config = GuardConfig::default();
        assert_eq!(config.hard_threshold_bytes, 50 * MIB);
        assert_eq!(config.soft_threshold_bytes, 30 * MIB);
    }

    #[test]
    fn tier_prefers_hard_when_both_cross() {
        let config = GuardConfig::default();
        assert_eq!(decide_tier(60 * MIB, 0, &config), Tier::Hard);
        assert_eq!(decide_tier(35 * MIB, 0, &config), Tier::Soft);
        assert_eq!(decide_tier(1 * MIB, 0, &config), Tier::Idle);
    }

    #[test]
    fn token_threshold_can_fire_hard_independent_of_size() {
        let mut config = GuardConfig::default();
        config.token_threshold = Some(100_000);
        assert_eq!(decide_tier(1 * MIB, 150_000, &config), Tier::Hard);
    }

    #[test]
    fn escalation_ramps_up_tier_by_tier() {
        assert_eq!(escalated_prescription(0), "gentle");
        assert_eq!(escalated_prescription(1), "standard");
        assert_eq!(escalated_prescription(2), "aggressive");
        assert_eq!(escalated_prescription(9), "aggressive");
    }
}
