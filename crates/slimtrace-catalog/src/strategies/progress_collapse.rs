use slimtrace_types::{Action, Record, RecordKind, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};
use crate::util::synthetic_text_record;

/// Collapses consecutive `progress_tick` records, which arrive one per
/// poll interval on a long-running tool call and carry no information
/// beyond "still running" until the last one.
pub struct ProgressCollapse;

impl Strategy for ProgressCollapse {
    fn name(&self) -> &'static str {
        "progress-collapse"
    }

    fn tier(&self) -> Tier {
        Tier::Gentle
    }

    fn description(&self) -> &'static str {
        "Collapse runs of consecutive progress-tick records into one summary record."
    }

    fn expected_savings_label(&self) -> &'static str {
        "high on sessions with long-running background tools"
    }

    fn apply(&self, records: &[Record], config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());
        let mut i = 0;
        while i < records.len() {
            if records[i].kind != RecordKind::ProgressTick {
                i += 1;
                continue;
            }
            let start = i;
            let mut end = i;
            while end + 1 < records.len() && records[end + 1].kind == RecordKind::ProgressTick {
                end += 1;
            }
            let run_len = end - start + 1;
            if run_len >= config.progress_min_run {
                let last_text = records[end]
                    .content_blocks
                    .iter()
                    .find_map(|b| b.textual_content())
                    .unwrap_or_default();
                let summary = format!("[{run_len} progress updates collapsed] last: {last_text}");
                let synthetic = synthetic_text_record(
                    records[start].uuid.clone(),
                    records[start].parent_uuid.clone(),
                    RecordKind::ProgressTick,
                    summary,
                );
                result.actions.push(Action::ReplaceRange(start, end, synthetic));
                result.removed_count += run_len - 1;
                result.modified_count += 1;
            }
            i = end + 1;
        }
        result
    }
}
