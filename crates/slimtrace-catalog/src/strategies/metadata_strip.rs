use serde_json::Value;

use slimtrace_types::{strip_value_keys, Action, Metadata, Record, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};

// `cwd`/`version`/`sessionSlug` are envelope fields owned by `envelope-strip`
// (see envelope_strip.rs), which runs much later in the aggressive
// prescription and needs these fields still present in `raw` to synthesize
// its header. metadata-strip only owns telemetry.
const TOP_LEVEL_KEYS: &[&str] = &["costUSD"];

fn strip_metadata(raw: &Value) -> Value {
    let mut value = strip_value_keys(raw, TOP_LEVEL_KEYS);
    if let Some(message) = value.get_mut("message").and_then(Value::as_object_mut) {
        message.remove("usage");
        message.remove("stop_reason");
    }
    value
}

/// Whether a record carries any telemetry field this strategy owns. Checked
/// field-by-field rather than `Record::metadata.is_some()` because
/// `Metadata` also bundles the envelope fields `envelope-strip` owns.
fn has_telemetry(metadata: &Metadata) -> bool {
    metadata.cost_usd.is_some()
        || metadata.stop_reason.is_some()
        || metadata.input_tokens.is_some()
        || metadata.output_tokens.is_some()
        || metadata.cache_read_input_tokens.is_some()
        || metadata.cache_creation_input_tokens.is_some()
}

/// Strips token-usage and cost telemetry from every record, leaving
/// conversational content, identifiers, and envelope fields untouched.
pub struct MetadataStrip;

impl Strategy for MetadataStrip {
    fn name(&self) -> &'static str {
        "metadata-strip"
    }

    fn tier(&self) -> Tier {
        Tier::Gentle
    }

    fn description(&self) -> &'static str {
        "Strip token-usage and cost telemetry that carries no conversational content."
    }

    fn expected_savings_label(&self) -> &'static str {
        "small but consistent across every record"
    }

    fn apply(&self, records: &[Record], _config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());
        for (i, record) in records.iter().enumerate() {
            let Some(metadata) = &record.metadata else {
                continue;
            };
            if !has_telemetry(metadata) {
                continue;
            }

            let mut new_record = record.clone();
            new_record.raw = strip_metadata(&record.raw);
            new_record.mark_dirty();

            let mut remaining = metadata.clone();
            remaining.cost_usd = None;
            remaining.stop_reason = None;
            remaining.input_tokens = None;
            remaining.output_tokens = None;
            remaining.cache_read_input_tokens = None;
            remaining.cache_creation_input_tokens = None;
            new_record.metadata = if remaining.is_empty() { None } else { Some(remaining) };

            result.actions.push(Action::Replace(i, new_record));
            result.modified_count += 1;
        }
        result
    }
}
