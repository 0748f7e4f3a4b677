use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Derived classification of a transcript record.
///
/// Classification is a pure function of a record's structural fields (role,
/// tool name, embedded sentinel substrings) and must be stable: the same
/// record always classifies to the same kind (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Assistant,
    System,
    ToolUse,
    ToolResult,
    Summary,
    QueueOperation,
    FileHistorySnapshot,
    ProgressTick,
    TaskNotification,
    Unknown,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::User => "user",
            RecordKind::Assistant => "assistant",
            RecordKind::System => "system",
            RecordKind::ToolUse => "tool_use",
            RecordKind::ToolResult => "tool_result",
            RecordKind::Summary => "summary",
            RecordKind::QueueOperation => "queue_operation",
            RecordKind::FileHistorySnapshot => "file_history_snapshot",
            RecordKind::ProgressTick => "progress_tick",
            RecordKind::TaskNotification => "task_notification",
            RecordKind::Unknown => "unknown",
        }
    }

    /// Summary and queue-operation records are never removed by any strategy
    /// (spec §3 invariant), though their metadata may be stripped.
    pub fn is_protected_from_removal(&self) -> bool {
        matches!(self, RecordKind::Summary | RecordKind::QueueOperation)
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Classify a raw JSON record into a [`RecordKind`].
///
/// Mirrors the teacher's tagged-record dispatch (`ClaudeRecord` in
/// `agtrace-providers`): a handful of structural checks, cheapest/most
/// specific first, falling back to `Unknown`.
pub fn classify(value: &Value) -> RecordKind {
    if let Some(t) = str_field(value, "type") {
        match t {
            "summary" => return RecordKind::Summary,
            "queue_operation" => return RecordKind::QueueOperation,
            "file_history_snapshot" => return RecordKind::FileHistorySnapshot,
            "progress" | "progress_tick" => return RecordKind::ProgressTick,
            "task_notification" => return RecordKind::TaskNotification,
            "system" => return RecordKind::System,
            _ => {}
        }
    }

    if let Some(role) = str_field(value, "role").or_else(|| {
        value
            .get("message")
            .and_then(|m| m.get("role"))
            .and_then(Value::as_str)
    }) {
        match role {
            "user" => {
                if is_tool_result_only_user(value) {
                    return RecordKind::ToolResult;
                }
                return RecordKind::User;
            }
            "assistant" => {
                if has_tool_use_block(value) {
                    return RecordKind::ToolUse;
                }
                return RecordKind::Assistant;
            }
            "system" => return RecordKind::System,
            _ => {}
        }
    }

    RecordKind::Unknown
}

fn content_blocks(value: &Value) -> Option<&Vec<Value>> {
    value
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_array)
        .or_else(|| value.get("content").and_then(Value::as_array))
}

fn has_tool_use_block(value: &Value) -> bool {
    content_blocks(value)
        .map(|blocks| {
            blocks
                .iter()
                .any(|b| str_field(b, "type") == Some("tool_use"))
        })
        .unwrap_or(false)
}

fn is_tool_result_only_user(value: &Value) -> bool {
    match content_blocks(value) {
        Some(blocks) if !blocks.is_empty() => blocks
            .iter()
            .all(|b| str_field(b, "type") == Some("tool_result")),
        _ => false,
    }
}
