use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use slimtrace_types::{strip_value_keys, Action, ContentBlock, Record, RecordKind, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};

const ENVELOPE_KEYS: &[&str] = &["cwd", "version", "sessionSlug"];

/// Envelope fields whose value is identical across every record that
/// carries them. Exposed so the applier can build a synthetic header record
/// instead of expressing an insertion through the `Action` algebra, which
/// has no variant for a pure insert (spec §4.3 item 13, §4.4).
pub fn constant_envelope_fields(records: &[Record]) -> BTreeMap<String, String> {
    let mut seen: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in records {
        for key in ENVELOPE_KEYS {
            if let Some(value) = record.raw.get(*key).and_then(Value::as_str) {
                seen.entry((*key).to_string()).or_default().insert(value.to_string());
            }
        }
    }
    seen.into_iter()
        .filter_map(|(key, values)| {
            if values.len() == 1 {
                values.into_iter().next().map(|v| (key, v))
            } else {
                None
            }
        })
        .collect()
}

/// Builds the synthetic header record envelope-strip prepends once its
/// constants have been pulled out of every record. Called directly by the
/// applier, not through a `StrategyResult`, since there is no action for a
/// pure insertion.
pub fn synthesize_header(records: &[Record]) -> Option<Record> {
    let constants = constant_envelope_fields(records);
    if constants.is_empty() {
        return None;
    }
    let first = records.first()?;

    let mut raw = Map::new();
    raw.insert("type".to_string(), Value::String("session_envelope".to_string()));
    let uuid = format!("envelope-{}", first.uuid);
    raw.insert("uuid".to_string(), Value::String(uuid.clone()));
    for (k, v) in &constants {
        raw.insert(k.clone(), Value::String(v.clone()));
    }

    let text = constants
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ");

    Some(Record {
        uuid,
        parent_uuid: None,
        kind: RecordKind::System,
        content_blocks: vec![ContentBlock::Text { text }],
        metadata: None,
        raw: Value::Object(raw),
        original_line: None,
        line_no: 0,
    })
}

/// Strips envelope fields (working directory, host-agent version, session
/// slug) that repeat unchanged on every record, once their constant values
/// have been captured into a synthetic header (see `synthesize_header`).
pub struct EnvelopeStrip;

impl Strategy for EnvelopeStrip {
    fn name(&self) -> &'static str {
        "envelope-strip"
    }

    fn tier(&self) -> Tier {
        Tier::Aggressive
    }

    fn description(&self) -> &'static str {
        "Strip per-record envelope fields that are constant across the whole session into one header."
    }

    fn expected_savings_label(&self) -> &'static str {
        "small per record, proportional to session length"
    }

    fn apply(&self, records: &[Record], _config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());
        let constants = constant_envelope_fields(records);
        if constants.is_empty() {
            return result;
        }
        let keys: Vec<&str> = constants.keys().map(String::as_str).collect();

        for (i, record) in records.iter().enumerate() {
            if !keys.iter().any(|k| record.raw.get(*k).is_some()) {
                continue;
            }
            let mut new_record = record.clone();
            new_record.raw = strip_value_keys(&record.raw, &keys);
            new_record.mark_dirty();
            result.actions.push(Action::Replace(i, new_record));
            result.modified_count += 1;
        }

        result
    }
}
