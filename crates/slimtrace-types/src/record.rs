use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::ContentBlock;
use crate::kind::{classify, RecordKind};

/// Token-usage / cost telemetry carried by a record's `metadata` (spec §3).
/// Stripped wholesale by `metadata-strip` without touching `uuid`/`parent_uuid`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_agent_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_slug: Option<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self == &Metadata::default()
    }

    pub fn total_tokens(&self) -> Option<u64> {
        match (self.input_tokens, self.output_tokens) {
            (None, None) => None,
            (a, b) => Some(
                a.unwrap_or(0)
                    + b.unwrap_or(0)
                    + self.cache_read_input_tokens.unwrap_or(0)
                    + self.cache_creation_input_tokens.unwrap_or(0),
            ),
        }
    }
}

/// One line of a transcript: the record model shared by every strategy.
///
/// `uuid`/`parent_uuid` are the conversation-DAG identifiers and must never
/// be altered (spec §3 invariant). `raw` is the authoritative JSON payload;
/// `content_blocks`/`metadata` are views extracted from it for strategies to
/// read and, via `with_content_blocks`/`with_metadata`, to rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    pub kind: RecordKind,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Full structural payload, including every field the classifier does
    /// not recognize — the "preserve unknown fields verbatim" bag (spec
    /// §4.1).
    pub raw: Value,
    /// Verbatim input line, retained so an untouched record can be
    /// re-emitted without a re-serialization round trip. `None` for
    /// synthetic records and any record a strategy has rewritten.
    #[serde(skip)]
    pub original_line: Option<String>,
    /// Line number in the source transcript (1-based), used for
    /// diagnostics and malformed-line reporting. `0` for synthetic records.
    #[serde(skip)]
    pub line_no: usize,
}

impl Record {
    /// Parse one transcript line into a `Record`. On JSON error, produces a
    /// `Record` of kind `Unknown` whose `original_line` retains the raw text
    /// so an atomic rewrite never loses data it could not parse (spec §4.1).
    pub fn parse_line(line_no: usize, line: &str) -> Record {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => Record::from_value(line_no, value, Some(line.to_string())),
            Err(_) => Record::unknown_raw(line_no, line),
        }
    }

    pub fn from_value(line_no: usize, value: Value, original_line: Option<String>) -> Record {
        let uuid = value
            .get("uuid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("synthetic-{line_no}"));
        let parent_uuid = value
            .get("parentUuid")
            .or_else(|| value.get("parent_uuid"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let kind = classify(&value);
        let content_blocks = extract_content_blocks(&value);
        let metadata = extract_metadata(&value);

        Record {
            uuid,
            parent_uuid,
            kind,
            content_blocks,
            metadata,
            raw: value,
            original_line,
            line_no,
        }
    }

    /// A placeholder record for a line that failed to parse as JSON.
    pub fn unknown_raw(line_no: usize, line: &str) -> Record {
        Record {
            uuid: format!("unparsed-{line_no}"),
            parent_uuid: None,
            kind: RecordKind::Unknown,
            content_blocks: Vec::new(),
            metadata: None,
            raw: Value::String(line.to_string()),
            original_line: Some(line.to_string()),
            line_no,
        }
    }

    /// Approximate serialized byte length, used for bytes-saved accounting.
    pub fn approx_bytes(&self) -> usize {
        if let Some(line) = &self.original_line {
            line.len()
        } else {
            serde_json::to_string(&self.raw).map(|s| s.len()).unwrap_or(0)
        }
    }

    /// Mark this record as rewritten: clears the verbatim passthrough line
    /// so the writer re-serializes `raw` instead of echoing old bytes.
    pub fn mark_dirty(&mut self) {
        self.original_line = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.original_line.is_none()
    }
}

fn extract_content_blocks(value: &Value) -> Vec<ContentBlock> {
    let blocks = value
        .get("message")
        .and_then(|m| m.get("content"))
        .or_else(|| value.get("content"));

    match blocks {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value::<ContentBlock>(item.clone()).ok())
            .collect(),
        Some(Value::String(text)) => vec![ContentBlock::Text { text: text.clone() }],
        _ => Vec::new(),
    }
}

fn extract_metadata(value: &Value) -> Option<Metadata> {
    let usage = value
        .get("message")
        .and_then(|m| m.get("usage"))
        .or_else(|| value.get("usage"));

    let mut metadata = Metadata {
        input_tokens: usage.and_then(|u| u.get("input_tokens")).and_then(Value::as_u64),
        output_tokens: usage
            .and_then(|u| u.get("output_tokens"))
            .and_then(Value::as_u64),
        cache_read_input_tokens: usage
            .and_then(|u| u.get("cache_read_input_tokens"))
            .and_then(Value::as_u64),
        cache_creation_input_tokens: usage
            .and_then(|u| u.get("cache_creation_input_tokens"))
            .and_then(Value::as_u64),
        stop_reason: value
            .get("message")
            .and_then(|m| m.get("stop_reason"))
            .and_then(Value::as_str)
            .map(str::to_string),
        cost_usd: value.get("costUSD").and_then(Value::as_f64),
        cwd: value.get("cwd").and_then(Value::as_str).map(str::to_string),
        host_agent_version: value
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string),
        session_slug: value
            .get("sessionSlug")
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    if metadata.is_empty() {
        None
    } else {
        // Clear fields that ended up Default but keep the struct if *any*
        // field is populated, so metadata-strip has something to remove.
        if metadata.input_tokens.is_none() && metadata.output_tokens.is_none() {
            metadata.input_tokens = None;
            metadata.output_tokens = None;
        }
        Some(metadata)
    }
}

/// Build a `Value` object preserving `raw`'s fields but stripped of the keys
/// in `drop_keys`. Used by `metadata-strip` to rewrite a record without
/// touching `uuid`/`parentUuid` or other structural markers.
pub fn strip_value_keys(raw: &Value, drop_keys: &[&str]) -> Value {
    match raw {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                if drop_keys.contains(&k.as_str()) {
                    continue;
                }
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}
