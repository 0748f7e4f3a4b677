use std::collections::HashMap;

use slimtrace_types::{canonical_bytes, strip_value_keys, Action, Record, RecordKind, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};

const IGNORED_KEYS: &[&str] = &["uuid", "parentUuid", "timestamp"];

/// Drops earlier `file_history_snapshot` records whose payload (ignoring
/// identifiers and timestamps) is identical to a later snapshot, keeping
/// only the last snapshot per distinct payload.
pub struct FileHistoryDedup;

impl Strategy for FileHistoryDedup {
    fn name(&self) -> &'static str {
        "file-history-dedup"
    }

    fn tier(&self) -> Tier {
        Tier::Gentle
    }

    fn description(&self) -> &'static str {
        "Keep only the most recent file-history snapshot per distinct file state."
    }

    fn expected_savings_label(&self) -> &'static str {
        "high in long sessions with repeated re-reads of the same files"
    }

    fn apply(&self, records: &[Record], _config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());

        let mut last_index: HashMap<Vec<u8>, usize> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            if record.kind != RecordKind::FileHistorySnapshot {
                continue;
            }
            let key = canonical_bytes(&strip_value_keys(&record.raw, IGNORED_KEYS));
            last_index.insert(key, i);
        }

        for (i, record) in records.iter().enumerate() {
            if record.kind != RecordKind::FileHistorySnapshot {
                continue;
            }
            let key = canonical_bytes(&strip_value_keys(&record.raw, IGNORED_KEYS));
            if last_index.get(&key) != Some(&i) {
                result.actions.push(Action::Drop(i));
                result.removed_count += 1;
            }
        }

        result
    }
}
