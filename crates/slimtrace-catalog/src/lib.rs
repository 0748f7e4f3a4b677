//! The thirteen transcript-pruning strategies, their registry, and the
//! canonical gentle/standard/aggressive prescriptions.

mod config;
mod prescription;
mod strategy;
mod strategies;
mod util;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

pub use config::{StrategyConfig, ThinkingMode};
pub use prescription::{prescription_by_name, Prescription, AGGRESSIVE, GENTLE, PRESCRIPTIONS, STANDARD};
pub use strategy::{Strategy, Tier};
pub use strategies::*;

/// Registered once at process start (spec §9: "global registry, initialized
/// once, no runtime mutation"). Populating it is the only place the thirteen
/// strategy structs are named as a group.
static REGISTRY: LazyLock<HashMap<&'static str, Arc<dyn Strategy>>> = LazyLock::new(|| {
    let all: Vec<Arc<dyn Strategy>> = vec![
        Arc::new(ProgressCollapse),
        Arc::new(FileHistoryDedup),
        Arc::new(MetadataStrip),
        Arc::new(ThinkingBlocks),
        Arc::new(ToolOutputTrim),
        Arc::new(StaleReads),
        Arc::new(SystemReminderDedup),
        Arc::new(HttpSpam),
        Arc::new(ErrorRetryCollapse),
        Arc::new(BackgroundPollCollapse),
        Arc::new(DocumentDedup),
        Arc::new(MegaBlockTrim),
        Arc::new(EnvelopeStrip),
    ];
    all.into_iter().map(|s| (s.name(), s)).collect()
});

/// Look up one strategy by its canonical name (the `treat -rx NAME` / `strategy NAME` surface).
pub fn lookup(name: &str) -> Option<Arc<dyn Strategy>> {
    REGISTRY.get(name).cloned()
}

/// Every registered strategy, sorted by name — the `formulary` command's listing order.
pub fn all_strategies() -> Vec<Arc<dyn Strategy>> {
    let mut strategies: Vec<Arc<dyn Strategy>> = REGISTRY.values().cloned().collect();
    strategies.sort_by_key(|s| s.name());
    strategies
}

/// Resolve a prescription's strategy names into registered strategies, in
/// prescription order, skipping any name the registry doesn't know (there
/// should be none; this guards against a typo in a prescription constant
/// rather than panicking at runtime).
pub fn strategies_for_prescription(prescription: &Prescription) -> Vec<Arc<dyn Strategy>> {
    prescription.strategies.iter().filter_map(|name| lookup(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_all_thirteen_strategies() {
        assert_eq!(all_strategies().len(), 13);
    }

    #[test]
    fn every_prescription_name_resolves() {
        for prescription in PRESCRIPTIONS {
            for name in prescription.strategies {
                assert!(lookup(name).is_some(), "{name} not registered");
            }
        }
    }

    #[test]
    fn lookup_is_case_sensitive_and_exact() {
        assert!(lookup("progress-collapse").is_some());
        assert!(lookup("not-a-strategy").is_none());
    }
}
