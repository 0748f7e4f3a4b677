use std::collections::BTreeMap;

use serde_json::{Map, Value};

use slimtrace_catalog::StrategyConfig;
use slimtrace_engine::AppliedResult;
use slimtrace_types::{ContentBlock, Record, RecordKind, StrategyResult, TeamState};

use crate::checkpoint::format_checkpoint;

const STATE_SUMMARY_SENTINEL: &str = "<!-- slimtrace:team-state-summary -->";

enum Chunk {
    Team(Record),
    Ordinary(Vec<Record>),
}

/// Prune a transcript while leaving every team-coordination record (spawns,
/// task create/update, status notifications) untouched.
///
/// Team records split the transcript into ordinary runs; each run is pruned
/// independently so a strategy can never collapse a progress run that
/// spans a team-coordination boundary, then every run is re-merged with
/// the team records back in their original position (spec §4.6).
pub fn team_protect_apply(
    records: &[Record],
    team_state: &TeamState,
    strategy_names: &[&str],
    config: &StrategyConfig,
) -> AppliedResult {
    let mut merged_records = Vec::new();
    let mut per_strategy: BTreeMap<String, StrategyResult> = BTreeMap::new();
    let mut warnings = Vec::new();

    for chunk in split_into_chunks(records, team_state) {
        match chunk {
            Chunk::Team(record) => merged_records.push(record),
            Chunk::Ordinary(chunk_records) => {
                let applied = slimtrace_engine::run(&chunk_records, strategy_names, config);
                merged_records.extend(applied.records);
                warnings.extend(applied.warnings);
                for result in applied.strategy_results {
                    accumulate(&mut per_strategy, result);
                }
            }
        }
    }

    let merged_records = reinsert_state_summary(merged_records, team_state);

    AppliedResult {
        records: merged_records,
        strategy_results: strategy_names
            .iter()
            .filter_map(|name| per_strategy.remove(*name))
            .collect(),
        warnings,
    }
}

fn split_into_chunks(records: &[Record], team_state: &TeamState) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<Record> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        if team_state.coordination_indices.contains(&i) {
            if !current.is_empty() {
                chunks.push(Chunk::Ordinary(std::mem::take(&mut current)));
            }
            chunks.push(Chunk::Team(record.clone()));
        } else {
            current.push(record.clone());
        }
    }
    if !current.is_empty() {
        chunks.push(Chunk::Ordinary(current));
    }
    chunks
}

fn accumulate(map: &mut BTreeMap<String, StrategyResult>, result: StrategyResult) {
    let entry = map
        .entry(result.strategy_name.clone())
        .or_insert_with(|| StrategyResult::empty(result.strategy_name.clone()));
    entry.removed_count += result.removed_count;
    entry.modified_count += result.modified_count;
    entry.bytes_saved += result.bytes_saved;
    entry.orphaned_count += result.orphaned_count;
    entry.warnings.extend(result.warnings);
}

fn is_sentinel_marked(record: &Record) -> bool {
    record
        .content_blocks
        .iter()
        .any(|block| matches!(block, ContentBlock::Text { text } if text.contains(STATE_SUMMARY_SENTINEL)))
}

/// Reinsert a state-summary pair at the top of the transcript. Any
/// sentinel-marked record(s) from a prior pass are stripped first, so
/// successive `team-protect` runs refresh the summary instead of leaving a
/// stale one behind once a sentinel is already present (spec §4.6
/// "idempotent sentinel-marked reinsertion" — idempotent in count, not in
/// content).
fn reinsert_state_summary(records: Vec<Record>, team_state: &TeamState) -> Vec<Record> {
    if team_state.is_empty() {
        return records;
    }

    let mut records: Vec<Record> = records.into_iter().filter(|record| !is_sentinel_marked(record)).collect();

    let body = format_checkpoint(team_state, "team-protect");
    let text = format!("{STATE_SUMMARY_SENTINEL}\n{body}");
    let anchor_uuid = records.first().map(|r| r.uuid.as_str()).unwrap_or("session");
    let mut pair = synthetic_state_summary(anchor_uuid, text);
    records.splice(0..0, pair.drain(..));
    records
}

/// Builds the synthetic user+assistant pair inserted at the top of the
/// transcript: a user record asking the host agent to rehydrate team state,
/// and an assistant record carrying the rendered summary, mirroring how a
/// real resume exchange reads (spec §4.6 "a synthetic pair (user +
/// assistant)").
fn synthetic_state_summary(anchor_uuid: &str, text: String) -> Vec<Record> {
    let user_uuid = format!("team-state-{anchor_uuid}-prompt");
    let assistant_uuid = format!("team-state-{anchor_uuid}-summary");

    let prompt_text = format!("{STATE_SUMMARY_SENTINEL}\nResume team state.");
    let mut user_raw = Map::new();
    user_raw.insert("uuid".to_string(), Value::String(user_uuid.clone()));
    user_raw.insert("role".to_string(), Value::String("user".to_string()));
    user_raw.insert("synthetic".to_string(), Value::Bool(true));
    user_raw.insert("content".to_string(), Value::String(prompt_text.clone()));

    let user = Record {
        uuid: user_uuid.clone(),
        parent_uuid: None,
        kind: RecordKind::User,
        content_blocks: vec![ContentBlock::Text { text: prompt_text }],
        metadata: None,
        raw: Value::Object(user_raw),
        original_line: None,
        line_no: 0,
    };

    let mut assistant_raw = Map::new();
    assistant_raw.insert("uuid".to_string(), Value::String(assistant_uuid.clone()));
    assistant_raw.insert("parentUuid".to_string(), Value::String(user_uuid.clone()));
    assistant_raw.insert("role".to_string(), Value::String("assistant".to_string()));
    assistant_raw.insert("synthetic".to_string(), Value::Bool(true));
    assistant_raw.insert("content".to_string(), Value::String(text.clone()));

    let assistant = Record {
        uuid: assistant_uuid,
        parent_uuid: Some(user_uuid),
        kind: RecordKind::Assistant,
        content_blocks: vec![ContentBlock::Text { text }],
        metadata: None,
        raw: Value::Object(assistant_raw),
        original_line: None,
        line_no: 0,
    };

    vec![user, assistant]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tick(uuid: &str) -> Record {
        Record::from_value(0, json!({"uuid": uuid, "type": "progress_tick", "content": "tick"}), None)
    }

    fn team_spawn(uuid: &str) -> Record {
        Record::from_value(
            0,
            json!({
                "uuid": uuid,
                "role": "assistant",
                "message": {
                    "role": "assistant",
                    "content": [{"type": "tool_use", "id": "t1", "name": "Task", "input": {"description": "builder"}}]
                }
            }),
            None,
        )
    }

    #[test]
    fn team_records_survive_untouched() {
        let records = vec![tick("a"), tick("b"), team_spawn("c"), tick("d"), tick("e")];
        let mut team_state = TeamState::default();
        team_state.coordination_indices.insert(2);

        let applied = team_protect_apply(&records, &team_state, &["progress-collapse"], &StrategyConfig::default());
        assert!(applied.records.iter().any(|r| r.uuid == "c"));
    }

    #[test]
    fn collapsing_never_crosses_a_team_boundary() {
        // Two progress ticks before the team record, two after: each run of
        // two should collapse independently rather than merging into one.
        let records = vec![tick("a"), tick("b"), team_spawn("c"), tick("d"), tick("e")];
        let mut team_state = TeamState::default();
        team_state.coordination_indices.insert(2);

        let applied = team_protect_apply(&records, &team_state, &["progress-collapse"], &StrategyConfig::default());
        let tick_records: Vec<&Record> = applied
            .records
            .iter()
            .filter(|r| r.kind == RecordKind::ProgressTick)
            .collect();
        assert_eq!(tick_records.len(), 2);
    }

    #[test]
    fn state_summary_reinsertion_is_idempotent_in_count() {
        let records = vec![team_spawn("a")];
        let mut team_state = TeamState::default();
        team_state.team_name = Some("alpha".to_string());
        team_state.coordination_indices.insert(0);

        let first_pass = team_protect_apply(&records, &team_state, &[], &StrategyConfig::default());
        let second_pass =
            team_protect_apply(&first_pass.records, &team_state, &[], &StrategyConfig::default());

        let summary_count = second_pass.records.iter().filter(|r| is_sentinel_marked(r)).count();
        assert_eq!(summary_count, 2, "one synthetic user+assistant pair, not duplicated");
    }

    #[test]
    fn a_stale_summary_is_replaced_rather_than_kept() {
        let records = vec![team_spawn("a")];
        let mut team_state = TeamState::default();
        team_state.team_name = Some("alpha".to_string());
        team_state.coordination_indices.insert(0);

        let first_pass = team_protect_apply(&records, &team_state, &[], &StrategyConfig::default());
        assert!(first_pass
            .records
            .iter()
            .any(|r| r.content_blocks.iter().any(|b| matches!(b, ContentBlock::Text { text } if text.contains("alpha")))));

        team_state.team_name = Some("beta".to_string());
        let second_pass =
            team_protect_apply(&first_pass.records, &team_state, &[], &StrategyConfig::default());

        let summary_count = second_pass.records.iter().filter(|r| is_sentinel_marked(r)).count();
        assert_eq!(summary_count, 2, "stale pair must be removed before inserting the fresh one");

        let has_stale = second_pass
            .records
            .iter()
            .any(|r| r.content_blocks.iter().any(|b| matches!(b, ContentBlock::Text { text } if text.contains("alpha"))));
        assert!(!has_stale, "the refreshed summary must not still mention the old team name");

        let has_fresh = second_pass
            .records
            .iter()
            .any(|r| r.content_blocks.iter().any(|b| matches!(b, ContentBlock::Text { text } if text.contains("beta"))));
        assert!(has_fresh, "the refreshed summary must carry the current team name");
    }
}
