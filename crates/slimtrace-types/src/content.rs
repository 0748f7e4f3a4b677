use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed content block, the direct analogue of the teacher's
/// `EventPayload`/`AssistantContent` tagged enums.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: bool,
        /// Preserved annotation recording the original byte count when this
        /// block has been trimmed by `tool-output-trim` or `mega-block-trim`
        /// (spec §4.3 items 5, 12).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original_bytes: Option<u64>,
    },
    Document {
        #[serde(default)]
        source: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Image {
        #[serde(default)]
        source: Value,
    },
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    /// Approximate on-the-wire byte length of the textual payload this block
    /// carries, used by both the token estimator and size-based triggers
    /// (tool-output-trim, mega-block-trim, document-dedup).
    pub fn payload_bytes(&self) -> usize {
        match self {
            ContentBlock::Text { text } => text.len(),
            ContentBlock::Thinking { thinking, .. } => thinking.len(),
            ContentBlock::ToolUse { input, .. } => input.to_string().len(),
            ContentBlock::ToolResult { content, .. } => text_repr(content).len(),
            ContentBlock::Document { source, .. } => text_repr(source).len(),
            ContentBlock::Image { .. } => 0,
            ContentBlock::Unknown => 0,
        }
    }

    /// Textual content used for token estimation (spec §4.2): thinking,
    /// text, tool-result, and document payloads count; images don't.
    pub fn textual_content(&self) -> Option<String> {
        match self {
            ContentBlock::Text { text } => Some(text.clone()),
            ContentBlock::Thinking { thinking, .. } => Some(thinking.clone()),
            ContentBlock::ToolResult { content, .. } => Some(text_repr(content)),
            ContentBlock::Document { source, .. } => Some(text_repr(source)),
            ContentBlock::ToolUse { .. } | ContentBlock::Image { .. } | ContentBlock::Unknown => {
                None
            }
        }
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self, ContentBlock::Thinking { .. })
    }

    pub fn is_document(&self) -> bool {
        matches!(self, ContentBlock::Document { .. })
    }
}

/// JSON values that are plain strings render as themselves; everything else
/// falls back to its compact JSON representation for size/text purposes.
pub fn text_repr(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Canonicalize a JSON value for stable hashing/equality comparisons
/// (file-history-dedup, document-dedup): re-serializing through
/// `serde_json::Value` sorts object keys and normalizes whitespace.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_block_round_trips() {
        let block = ContentBlock::Text {
            text: "hello".into(),
        };
        let v = serde_json::to_value(&block).unwrap();
        assert_eq!(v["type"], "text");
        let back: ContentBlock = serde_json::from_value(v).unwrap();
        assert!(matches!(back, ContentBlock::Text { text } if text == "hello"));
    }

    #[test]
    fn canonical_bytes_ignores_key_order() {
        let a = json!({"a": 1, "b": 2});
        let b = json!({"b": 2, "a": 1});
        assert_eq!(canonical_bytes(&a), canonical_bytes(&b));
    }
}
