use serde_json::Value;

use slimtrace_types::{text_repr, Action, ContentBlock, Record, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};
use crate::util::with_content_blocks;

fn already_trimmed(block: &ContentBlock) -> bool {
    matches!(block, ContentBlock::ToolResult { original_bytes: Some(_), .. })
}

fn trim_lines(text: &str, head: usize, tail: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= head + tail {
        return text.to_string();
    }
    let head_part = lines[..head].join("\n");
    let tail_part = lines[lines.len() - tail..].join("\n");
    let omitted = lines.len() - head - tail;
    format!("{head_part}\n... [{omitted} lines omitted] ...\n{tail_part}")
}

fn trim_block(block: &ContentBlock, config: &StrategyConfig) -> ContentBlock {
    let head = config.mega_block_head_lines;
    let tail = config.mega_block_tail_lines;
    match block {
        ContentBlock::Text { text } => ContentBlock::Text {
            text: trim_lines(text, head, tail),
        },
        ContentBlock::Thinking { thinking, signature } => ContentBlock::Thinking {
            thinking: trim_lines(thinking, head, tail),
            signature: signature.clone(),
        },
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
            ..
        } => {
            let text = text_repr(content);
            ContentBlock::ToolResult {
                tool_use_id: tool_use_id.clone(),
                content: Value::String(trim_lines(&text, head, tail)),
                is_error: *is_error,
                original_bytes: Some(text.len() as u64),
            }
        }
        other => other.clone(),
    }
}

/// Safety net that trims any single content block still over the size
/// ceiling after every earlier strategy has run, regardless of its type.
pub struct MegaBlockTrim;

impl Strategy for MegaBlockTrim {
    fn name(&self) -> &'static str {
        "mega-block-trim"
    }

    fn tier(&self) -> Tier {
        Tier::Aggressive
    }

    fn description(&self) -> &'static str {
        "Trim any remaining oversized content block, whatever its type, as a final size safety net."
    }

    fn expected_savings_label(&self) -> &'static str {
        "low under normal prescriptions, high as a backstop against pathological records"
    }

    fn apply(&self, records: &[Record], config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());

        for (i, record) in records.iter().enumerate() {
            let mut changed = false;
            let new_blocks: Vec<ContentBlock> = record
                .content_blocks
                .iter()
                .map(|block| {
                    if already_trimmed(block) || block.payload_bytes() <= config.mega_block_bytes {
                        block.clone()
                    } else {
                        changed = true;
                        trim_block(block, config)
                    }
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
