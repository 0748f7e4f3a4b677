use std::collections::HashSet;

use slimtrace_types::{Action, ContentBlock, Record, RecordKind, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};
use crate::util::synthetic_text_record;

const POLL_TOOL_NAMES: &[&str] = &["BashOutput", "TaskStatus", "GetStatus"];

fn poll_tool_ids(records: &[Record]) -> HashSet<String> {
    let mut ids = HashSet::new();
    for record in records {
        for block in &record.content_blocks {
            if let ContentBlock::ToolUse { id, name, .. } = block {
                if POLL_TOOL_NAMES.contains(&name.as_str()) {
                    ids.insert(id.clone());
                }
            }
        }
    }
    ids
}

fn is_poll_record(record: &Record, ids: &HashSet<String>) -> bool {
    record.content_blocks.iter().any(|b| match b {
        ContentBlock::ToolUse { id, .. } => ids.contains(id),
        ContentBlock::ToolResult { tool_use_id, .. } => ids.contains(tool_use_id),
        _ => false,
    })
}

/// Collapses consecutive background-task poll records (a status-check tool
/// call and its result, repeated until the task finishes) into one summary,
/// as long as no user turn interrupts the run.
pub struct BackgroundPollCollapse;

impl Strategy for BackgroundPollCollapse {
    fn name(&self) -> &'static str {
        "background-poll-collapse"
    }

    fn tier(&self) -> Tier {
        Tier::Aggressive
    }

    fn description(&self) -> &'static str {
        "Collapse consecutive background-task status polls into one summary record."
    }

    fn expected_savings_label(&self) -> &'static str {
        "high on sessions that poll long-running background tasks"
    }

    fn apply(&self, records: &[Record], config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());
        let ids = poll_tool_ids(records);
        if ids.is_empty() {
            return result;
        }

        let mut i = 0;
        while i < records.len() {
            if records[i].kind == RecordKind::User || !is_poll_record(&records[i], &ids) {
                i += 1;
                continue;
            }
            let start = i;
            let mut end = i;
            while end + 1 < records.len()
                && records[end + 1].kind != RecordKind::User
                && is_poll_record(&records[end + 1], &ids)
            {
                end += 1;
            }
            let run_len = end - start + 1;
            if run_len >= config.background_poll_min_run {
                let summary = format!("[{run_len} background poll records collapsed]");
                let synthetic = synthetic_text_record(
                    records[start].uuid.clone(),
                    records[start].parent_uuid.clone(),
                    records[start].kind,
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
