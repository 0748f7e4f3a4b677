use serde_json::Value;

use slimtrace_types::{text_repr, Action, ContentBlock, Record, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};
use crate::util::with_content_blocks;

/// Trims oversized `tool_result` payloads to a head/tail window, recording
/// the original byte count so the trim is visible in the transcript.
pub struct ToolOutputTrim;

impl Strategy for ToolOutputTrim {
    fn name(&self) -> &'static str {
        "tool-output-trim"
    }

    fn tier(&self) -> Tier {
        Tier::Standard
    }

    fn description(&self) -> &'static str {
        "Trim oversized tool results to a head/tail window, keeping an annotation of the original size."
    }

    fn expected_savings_label(&self) -> &'static str {
        "high when tools emit large logs or file dumps"
    }

    fn apply(&self, records: &[Record], config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());

        for (i, record) in records.iter().enumerate() {
            let mut changed = false;
            let new_blocks: Vec<ContentBlock> = record
                .content_blocks
                .iter()
                .map(|block| match block {
                    ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                        original_bytes: None,
                    } => {
                        let text = text_repr(content);
                        let line_count = text.lines().count();
                        if text.len() > config.tool_output_trim_bytes
                            || line_count > config.tool_output_trim_lines
                        {
                            changed = true;
                            let trimmed = trim_head_tail(
                                &text,
                                config.tool_output_head_lines,
                                config.tool_output_tail_lines,
                            );
                            ContentBlock::ToolResult {
                                tool_use_id: tool_use_id.clone(),
                                content: Value::String(trimmed),
                                is_error: *is_error,
                                original_bytes: Some(text.len() as u64),
                            }
                        } else {
                            block.clone()
                        }
                    }
                    other => other.clone(),
                })
                .collect();

            if changed {
                result.actions.push(Action::Replace(i, with_content_blocks(record, new_blocks)));
                result.modified_count += 1;
            }
        }

        result
    }
}

fn trim_head_tail(text: &str, head: usize, tail: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= head + tail {
        return text.to_string();
    }
    let head_part = lines[..head].join("\n");
    let tail_part = lines[lines.len() - tail..].join("\n");
    let omitted = lines.len() - head - tail;
    format!("{head_part}\n... [{omitted} lines omitted] ...\n{tail_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool_result_record(bytes: usize) -> Record {
        let payload = "x".repeat(bytes);
        Record::from_value(
            0,
            json!({
                "uuid": "a",
                "role": "user",
                "message": {
                    "role": "user",
                    "content": [{"type": "tool_result", "tool_use_id": "t1", "content": payload}]
                }
            }),
            None,
        )
    }

    #[test]
    fn exactly_at_byte_threshold_is_not_trimmed() {
        let records = vec![tool_result_record(8192)];
        let result = ToolOutputTrim.apply(&records, &StrategyConfig::default());
        assert!(result.is_noop());
    }

    #[test]
    fn one_byte_over_threshold_is_trimmed() {
        let records = vec![tool_result_record(8193)];
        let result = ToolOutputTrim.apply(&records, &StrategyConfig::default());
        assert_eq!(result.modified_count, 1);
    }

    #[test]
    fn trim_preserves_head_and_tail() {
        let lines: Vec<String> = (0..200).map(|n| format!("line{n}")).collect();
        let text = lines.join("\n");
        let trimmed = trim_head_tail(&text, 50, 20);
        assert!(trimmed.starts_with("line0"));
        assert!(trimmed.ends_with("line199"));
        assert!(trimmed.contains("lines omitted"));
    }
}
