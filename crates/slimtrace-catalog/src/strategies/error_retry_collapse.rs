use slimtrace_types::{text_repr, Action, ContentBlock, Record, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};
use crate::util::synthetic_text_record;

fn error_signature(record: &Record) -> Option<String> {
    record.content_blocks.iter().find_map(|b| match b {
        ContentBlock::ToolResult {
            content,
            is_error: true,
            ..
        } => Some(text_repr(content).lines().next().unwrap_or("").to_string()),
        _ => None,
    })
}

/// Collapses a run of consecutive tool-call failures that share the same
/// error message into one record summarizing the attempt count and outcome.
pub struct ErrorRetryCollapse;

impl Strategy for ErrorRetryCollapse {
    fn name(&self) -> &'static str {
        "error-retry-collapse"
    }

    fn tier(&self) -> Tier {
        Tier::Aggressive
    }

    fn description(&self) -> &'static str {
        "Collapse consecutive tool-call failures that repeat the same error into one summary."
    }

    fn expected_savings_label(&self) -> &'static str {
        "moderate, scales with how many retries an agent makes before giving up"
    }

    fn apply(&self, records: &[Record], config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());
        let mut i = 0;
        while i < records.len() {
            let Some(sig) = error_signature(&records[i]) else {
                i += 1;
                continue;
            };
            let start = i;
            let mut end = i;
            while end + 1 < records.len() && error_signature(&records[end + 1]).as_deref() == Some(sig.as_str()) {
                end += 1;
            }
            let run_len = end - start + 1;
            if run_len >= config.error_retry_min_run {
                let summary = format!("[{run_len} failed attempts collapsed, same error] {sig}");
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn error_record(uuid: &str, message: &str) -> Record {
        Record::from_value(
            0,
            json!({
                "uuid": uuid,
                "role": "user",
                "message": {
                    "role": "user",
                    "content": [{"type": "tool_result", "tool_use_id": "t1", "content": message, "is_error": true}]
                }
            }),
            None,
        )
    }

    #[test]
    fn collapses_repeated_identical_errors() {
        let records = vec![
            error_record("a", "connection refused"),
            error_record("b", "connection refused"),
            error_record("c", "connection refused"),
        ];
        let result = ErrorRetryCollapse.apply(&records, &StrategyConfig::default());
        assert_eq!(result.actions.len(), 1);
        assert_eq!(result.removed_count, 2);
    }

    #[test]
    fn different_errors_are_not_collapsed_together() {
        let records = vec![error_record("a", "connection refused"), error_record("b", "timeout")];
        let result = ErrorRetryCollapse.apply(&records, &StrategyConfig::default());
        assert!(result.is_noop());
    }
}
