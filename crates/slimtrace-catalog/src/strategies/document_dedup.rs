use std::collections::HashMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

use slimtrace_types::{canonical_bytes, Action, ContentBlock, Record, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};
use crate::util::with_content_blocks;

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Keeps the first occurrence of each distinct document attachment and
/// replaces later byte-identical copies with a short stub pointing back to
/// it.
pub struct DocumentDedup;

impl Strategy for DocumentDedup {
    fn name(&self) -> &'static str {
        "document-dedup"
    }

    fn tier(&self) -> Tier {
        Tier::Aggressive
    }

    fn description(&self) -> &'static str {
        "Replace repeated document attachments with a reference to their first occurrence."
    }

    fn expected_savings_label(&self) -> &'static str {
        "high when the same file or spec is attached to multiple turns"
    }

    fn apply(&self, records: &[Record], config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            let mut changed = false;
            let new_blocks: Vec<ContentBlock> = record
                .content_blocks
                .iter()
                .map(|block| match block {
                    ContentBlock::Document { source, title } if block.payload_bytes() >= config.document_min_bytes => {
                        let hash = hex_digest(&canonical_bytes(source));
                        match first_seen.get(&hash) {
                            Some(&first_index) => {
                                changed = true;
                                ContentBlock::Document {
                                    source: Value::String(format!(
                                        "[duplicate document, see record {first_index}]"
                                    )),
                                    title: title.clone(),
                                }
                            }
                            None => {
                                first_seen.insert(hash, i);
                                block.clone()
                            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document_record(uuid: &str, text: &str) -> Record {
        Record::from_value(
            0,
            json!({
                "uuid": uuid,
                "role": "user",
                "message": {
                    "role": "user",
                    "content": [{"type": "document", "source": text, "title": "spec.md"}]
                }
            }),
            None,
        )
    }

    #[test]
    fn replaces_duplicate_with_stub_referencing_first() {
        let body = "x".repeat(2048);
        let records = vec![document_record("a", &body), document_record("b", &body)];
        let result = DocumentDedup.apply(&records, &StrategyConfig::default());
        assert_eq!(result.modified_count, 1);
        let Action::Replace(1, new_record) = &result.actions[0] else {
            panic!("expected Replace at index 1");
        };
        match &new_record.content_blocks[0] {
            ContentBlock::Document { source, .. } => {
                assert!(text_has_stub(source));
            }
            other => panic!("expected Document, got {other:?}"),
        }
    }

    fn text_has_stub(value: &Value) -> bool {
        matches!(value, Value::String(s) if s.contains("duplicate document"))
    }

    #[test]
    fn small_documents_below_threshold_are_untouched() {
        let records = vec![document_record("a", "short"), document_record("b", "short")];
        let result = DocumentDedup.apply(&records, &StrategyConfig::default());
        assert!(result.is_noop());
    }
}
