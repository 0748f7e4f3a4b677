use slimtrace_types::{Record, StrategyResult};

use crate::config::StrategyConfig;

/// Which of the three canonical prescriptions a strategy belongs to.
/// Ordering matters: strategies that drop whole records run before
/// strategies that rewrite blocks in place, and `envelope-strip` runs last
/// of all (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Gentle,
    Standard,
    Aggressive,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Gentle => "gentle",
            Tier::Standard => "standard",
            Tier::Aggressive => "aggressive",
        }
    }
}

/// A pure function from a record sequence to a set of proposed edits.
/// Strategies never mutate `records`; every change they want is expressed as
/// a `StrategyResult` for the applier to fold (spec §4.3, §9).
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn tier(&self) -> Tier;
    fn description(&self) -> &'static str;
    fn expected_savings_label(&self) -> &'static str;
    fn apply(&self, records: &[Record], config: &StrategyConfig) -> StrategyResult;
}
