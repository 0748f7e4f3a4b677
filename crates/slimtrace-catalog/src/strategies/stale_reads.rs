use serde_json::Value;

use slimtrace_types::{Action, ContentBlock, Record, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Read,
    Edit,
}

const EDIT_TOOL_NAMES: &[&str] = &["Edit", "Write", "MultiEdit", "NotebookEdit"];

fn op_for_tool(name: &str) -> Option<Op> {
    if name == "Read" {
        Some(Op::Read)
    } else if EDIT_TOOL_NAMES.contains(&name) {
        Some(Op::Edit)
    } else {
        None
    }
}

fn file_path_of(input: &Value) -> Option<String> {
    input
        .get("file_path")
        .or_else(|| input.get("path"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Drops a file read whose content is superseded by an edit to the same
/// path before the file is read again, since the stale read no longer
/// reflects the file on disk.
pub struct StaleReads;

impl Strategy for StaleReads {
    fn name(&self) -> &'static str {
        "stale-reads"
    }

    fn tier(&self) -> Tier {
        Tier::Standard
    }

    fn description(&self) -> &'static str {
        "Drop file reads whose content was superseded by a later edit before the file was read again."
    }

    fn expected_savings_label(&self) -> &'static str {
        "moderate, scales with how often files are re-read between edits"
    }

    fn apply(&self, records: &[Record], _config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());

        let mut events: Vec<(usize, String, Op)> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            for block in &record.content_blocks {
                if let ContentBlock::ToolUse { name, input, .. } = block {
                    if let (Some(op), Some(path)) = (op_for_tool(name), file_path_of(input)) {
                        events.push((i, path, op));
                    }
                }
            }
        }

        for idx in 0..events.len() {
            let (record_index, path, op) = &events[idx];
            if *op != Op::Read {
                continue;
            }
            let next_read_index = events[idx + 1..]
                .iter()
                .find(|(_, p, o)| p == path && *o == Op::Read)
                .map(|(i, _, _)| *i)
                .unwrap_or(usize::MAX);
            let edit_between = events[idx + 1..]
                .iter()
                .any(|(i, p, o)| p == path && *o == Op::Edit && *i < next_read_index);
            if edit_between {
                result.actions.push(Action::Drop(*record_index));
                result.removed_count += 1;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool_use_record(n: usize, name: &str, path: &str) -> Record {
        Record::from_value(
            n,
            json!({
                "uuid": format!("r{n}"),
                "role": "assistant",
                "message": {
                    "role": "assistant",
                    "content": [{"type": "tool_use", "id": format!("t{n}"), "name": name, "input": {"file_path": path}}]
                }
            }),
            None,
        )
    }

    #[test]
    fn drops_read_superseded_by_edit_before_next_read() {
        // read@0 edit@1 read@2 -> drop 0, keep 2.
        let records = vec![
            tool_use_record(10, "Read", "a.rs"),
            tool_use_record(12, "Edit", "a.rs"),
            tool_use_record(20, "Read", "a.rs"),
        ];
        let result = StaleReads.apply(&records, &StrategyConfig::default());
        assert_eq!(result.actions.len(), 1);
        assert!(matches!(result.actions[0], Action::Drop(0)));
    }

    #[test]
    fn keeps_read_with_no_intervening_edit() {
        let records = vec![tool_use_record(10, "Read", "a.rs"), tool_use_record(20, "Read", "b.rs")];
        let result = StaleReads.apply(&records, &StrategyConfig::default());
        assert!(result.is_noop());
    }
}
