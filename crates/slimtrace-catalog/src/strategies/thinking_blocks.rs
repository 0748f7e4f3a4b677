use slimtrace_types::{Action, ContentBlock, Record, StrategyResult};

use crate::config::{StrategyConfig, ThinkingMode};
use crate::strategy::{Strategy, Tier};
use crate::util::with_content_blocks;

/// Removes, truncates, or de-signs `thinking` blocks according to the
/// configured `ThinkingMode`. Reasoning traces are rarely needed again once
/// the turn that produced them has completed.
pub struct ThinkingBlocks;

impl Strategy for ThinkingBlocks {
    fn name(&self) -> &'static str {
        "thinking-blocks"
    }

    fn tier(&self) -> Tier {
        Tier::Standard
    }

    fn description(&self) -> &'static str {
        "Remove or truncate extended-thinking blocks once their turn has completed."
    }

    fn expected_savings_label(&self) -> &'static str {
        "high on sessions with extended thinking enabled"
    }

    fn apply(&self, records: &[Record], config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());

        for (i, record) in records.iter().enumerate() {
            if !record.content_blocks.iter().any(ContentBlock::is_thinking) {
                continue;
            }

            let mut changed = false;
            let new_blocks: Vec<ContentBlock> = record
                .content_blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Thinking { thinking, .. } => {
                        changed = true;
                        rewrite_thinking(thinking, config)
                    }
                    other => Some(other.clone()),
                })
                .collect();

            if !changed {
                continue;
            }

            if new_blocks.is_empty() {
                result.actions.push(Action::Drop(i));
                result.removed_count += 1;
            } else {
                result.actions.push(Action::Replace(i, with_content_blocks(record, new_blocks)));
                result.modified_count += 1;
            }
        }

        result
    }
}

fn rewrite_thinking(thinking: &str, config: &StrategyConfig) -> Option<ContentBlock> {
    match config.thinking_mode {
        ThinkingMode::Remove => None,
        ThinkingMode::Truncate => {
            let truncated: String = thinking.chars().take(config.thinking_truncate_chars).collect();
            Some(ContentBlock::Thinking {
                thinking: truncated,
                signature: None,
            })
        }
        ThinkingMode::SignatureOnly => Some(ContentBlock::Thinking {
            thinking: thinking.to_string(),
            signature: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thinking_record(text: &str) -> Record {
        Record::from_value(
            0,
            json!({
                "uuid": "a",
                "role": "assistant",
                "message": {
                    "role": "assistant",
                    "content": [
                        {"type": "thinking", "thinking": text, "signature": "sig"},
                        {"type": "text", "text": "answer"},
                    ]
                }
            }),
            None,
        )
    }

    #[test]
    fn remove_mode_drops_thinking_block_but_keeps_sibling_text() {
        let records = vec![thinking_record("long reasoning")];
        let result = ThinkingBlocks.apply(&records, &StrategyConfig::default());
        let Action::Replace(0, new_record) = &result.actions[0] else {
            panic!("expected Replace");
        };
        assert_eq!(new_record.content_blocks.len(), 1);
        assert!(matches!(new_record.content_blocks[0], ContentBlock::Text { .. }));
    }

    #[test]
    fn truncate_mode_keeps_prefix_and_drops_signature() {
        let mut config = StrategyConfig::default();
        config.thinking_mode = ThinkingMode::Truncate;
        config.thinking_truncate_chars = 4;
        let records = vec![thinking_record("abcdefgh")];
        let result = ThinkingBlocks.apply(&records, &config);
        let Action::Replace(0, new_record) = &result.actions[0] else {
            panic!("expected Replace");
        };
        match &new_record.content_blocks[0] {
            ContentBlock::Thinking { thinking, signature } => {
                assert_eq!(thinking, "abcd");
                assert!(signature.is_none());
            }
            other => panic!("expected Thinking, got {other:?}"),
        }
    }

    #[test]
    fn records_without_thinking_are_untouched() {
        let records = vec![Record::from_value(
            0,
            json!({"uuid": "a", "role": "user", "message": {"role": "user", "content": "hi"}}),
            None,
        )];
        let result = ThinkingBlocks.apply(&records, &StrategyConfig::default());
        assert!(result.is_noop());
    }
}
