use serde_json::Value;

use slimtrace_types::{ContentBlock, Record, RecordKind};

/// Rebuild `original`'s `raw` payload with `blocks` serialized back into
/// whichever location the record's content came from (`message.content` or
/// top-level `content`), keeping every other field untouched.
pub fn with_content_blocks(original: &Record, blocks: Vec<ContentBlock>) -> Record {
    let serialized: Vec<Value> = blocks
        .iter()
        .map(|b| serde_json::to_value(b).unwrap_or(Value::Null))
        .collect();

    let mut raw = original.raw.clone();
    let mut wrote = false;
    if let Some(message) = raw.get_mut("message").and_then(Value::as_object_mut) {
        if message.contains_key("content") {
            message.insert("content".to_string(), Value::Array(serialized.clone()));
            wrote = true;
        }
    }
    if !wrote {
        if let Some(obj) = raw.as_object_mut() {
            obj.insert("content".to_string(), Value::Array(serialized));
        }
    }

    Record {
        uuid: original.uuid.clone(),
        parent_uuid: original.parent_uuid.clone(),
        kind: original.kind,
        content_blocks: blocks,
        metadata: original.metadata.clone(),
        raw,
        original_line: None,
        line_no: original.line_no,
    }
}

/// Build a synthetic `Text`-bearing record carrying the same `uuid`/
/// `parent_uuid` as the first record of a collapsed run, per the
/// `ReplaceRange` contract (spec §3).
pub fn synthetic_text_record(
    uuid: String,
    parent_uuid: Option<String>,
    kind: RecordKind,
    text: String,
) -> Record {
    let mut raw = serde_json::Map::new();
    raw.insert("uuid".to_string(), Value::String(uuid.clone()));
    if let Some(parent) = &parent_uuid {
        raw.insert("parentUuid".to_string(), Value::String(parent.clone()));
    }
    raw.insert("type".to_string(), Value::String(kind.as_str().to_string()));
    raw.insert("synthetic".to_string(), Value::Bool(true));
    raw.insert("content".to_string(), Value::String(text.clone()));

    Record {
        uuid,
        parent_uuid,
        kind,
        content_blocks: vec![ContentBlock::Text { text }],
        metadata: None,
        raw: Value::Object(raw),
        original_line: None,
        line_no: 0,
    }
}
