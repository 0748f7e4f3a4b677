use std::collections::HashSet;

use slimtrace_catalog::{envelope_strip, StrategyConfig};
use slimtrace_core::render_records;
use slimtrace_types::{Action, Record, StrategyResult};

/// The outcome of folding one or more strategies' actions into a record
/// sequence: the resulting records, one `StrategyResult` per strategy run
/// (with `bytes_saved` overwritten to the authoritative before/after delta),
/// and any applier-level warnings (unknown strategy names, dropped
/// overlaps, DAG-invariant violations).
#[derive(Debug)]
pub struct AppliedResult {
    pub records: Vec<Record>,
    pub strategy_results: Vec<StrategyResult>,
    pub warnings: Vec<String>,
}

/// Run each named strategy in order against `records`, folding its actions
/// before moving to the next strategy, so later strategies see the effects
/// of earlier ones (spec §4.4).
pub fn run(records: &[Record], strategy_names: &[&str], config: &StrategyConfig) -> AppliedResult {
    let mut current: Vec<Record> = records.to_vec();
    let mut strategy_results = Vec::new();
    let mut warnings = Vec::new();

    for &name in strategy_names {
        let Some(strategy) = slimtrace_catalog::lookup(name) else {
            warnings.push(format!("unknown strategy '{name}' skipped"));
            continue;
        };

        let before_bytes = render_records(&current).len() as i64;
        let mut strategy_result = strategy.apply(&current, config);

        let header = if name == "envelope-strip" {
            envelope_strip::synthesize_header(&current)
        } else {
            None
        };

        let accepted = accept_non_overlapping(&mut strategy_result, name);
        let mut next = fold_actions(&current, accepted);

        if let Some(header_record) = header {
            next.insert(0, header_record);
        }

        let after_bytes = render_records(&next).len() as i64;
        strategy_result.bytes_saved = before_bytes - after_bytes;

        let orphaned = count_newly_orphaned(&current, &next);
        if orphaned > 0 {
            strategy_result.orphaned_count = orphaned;
            strategy_result
                .warnings
                .push(format!("{name} orphaned {orphaned} record(s) whose parent was removed"));
        }
        warnings.extend(check_dag_invariant(&next));

        current = next;
        strategy_results.push(strategy_result);
    }

    AppliedResult {
        records: current,
        strategy_results,
        warnings,
    }
}

/// Sort actions index-descending and drop any that overlap an
/// already-accepted action, recording a warning on the strategy result
/// (spec §4.4: "this is a strategy bug if violated", recovered rather than
/// propagated as a hard error).
fn accept_non_overlapping(strategy_result: &mut StrategyResult, strategy_name: &str) -> Vec<Action> {
    let mut actions = std::mem::take(&mut strategy_result.actions);
    actions.sort_by(|a, b| b.max_index().cmp(&a.max_index()));

    let mut accepted: Vec<Action> = Vec::new();
    for action in actions {
        if accepted.iter().any(|a| a.overlaps(&action)) {
            strategy_result.warnings.push(format!(
                "{strategy_name} produced an action overlapping an earlier one at index {}; later action dropped",
                action.min_index()
            ));
            continue;
        }
        accepted.push(action);
    }
    accepted
}

/// Fold already-sorted (index-descending), non-overlapping actions into
/// `records`. Folding back-to-front keeps earlier indices valid as later
/// ones are removed or collapsed.
fn fold_actions(records: &[Record], actions: Vec<Action>) -> Vec<Record> {
    let mut next = records.to_vec();
    for action in actions {
        match action {
            Action::Drop(i) => {
                next.remove(i);
            }
            Action::Replace(i, record) => {
                next[i] = record;
            }
            Action::ReplaceRange(first, last, record) => {
                next.splice(first..=last, std::iter::once(record));
            }
        }
    }
    next
}

/// Count records whose `parent_uuid` pointed at a record that existed
/// before this fold but was dropped or collapsed by it (spec §4.4 DAG
/// invariant: "`parent_uuid` resolves to a surviving `uuid` or is unchanged
/// from input" — orphaning is recorded as a diagnostic, not an error,
/// since a strategy is allowed to remove a parent a later record still
/// names).
fn count_newly_orphaned(before: &[Record], after: &[Record]) -> usize {
    let before_uuids: HashSet<&str> = before.iter().map(|r| r.uuid.as_str()).collect();
    let after_uuids: HashSet<&str> = after.iter().map(|r| r.uuid.as_str()).collect();

    after
        .iter()
        .filter(|r| match &r.parent_uuid {
            Some(parent) => !after_uuids.contains(parent.as_str()) && before_uuids.contains(parent.as_str()),
            None => false,
        })
        .count()
}

/// Every kept record's `uuid` must be unique; a duplicate means some
/// strategy's rewrite collided with an existing identifier.
fn check_dag_invariant(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    for record in records {
        if !seen.insert(record.uuid.clone()) {
            warnings.push(format!("duplicate uuid '{}' after applier fold", record.uuid));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tick(uuid: &str, parent: &str) -> Record {
        Record::from_value(
            0,
            json!({"uuid": uuid, "parentUuid": parent, "type": "progress_tick", "content": "tick"}),
            None,
        )
    }

    #[test]
    fn run_with_no_strategies_is_a_noop() {
        let records = vec![tick("a", "root")];
        let applied = run(&records, &[], &StrategyConfig::default());
        assert_eq!(applied.records.len(), 1);
        assert!(applied.strategy_results.is_empty());
    }

    #[test]
    fn unknown_strategy_name_produces_a_warning_and_is_skipped() {
        let records = vec![tick("a", "root")];
        let applied = run(&records, &["not-a-real-strategy"], &StrategyConfig::default());
        assert_eq!(applied.records.len(), 1);
        assert!(applied.warnings.iter().any(|w| w.contains("not-a-real-strategy")));
    }

    #[test]
    fn progress_collapse_reduces_record_count_and_reports_bytes_saved() {
        let records = vec![tick("a", "root"), tick("b", "a"), tick("c", "b")];
        let applied = run(&records, &["progress-collapse"], &StrategyConfig::default());
        assert_eq!(applied.records.len(), 1);
        assert_eq!(applied.strategy_results.len(), 1);
        assert!(applied.strategy_results[0].bytes_saved > 0);
    }

    #[test]
    fn dropping_a_record_orphans_a_child_that_named_it_as_parent() {
        let snapshot = |n: usize, uuid: &str| {
            Record::from_value(
                n,
                json!({"uuid": uuid, "type": "file_history_snapshot", "path": "a.rs", "content": "same"}),
                None,
            )
        };
        let records = vec![
            snapshot(0, "s0"),
            Record::from_value(
                1,
                json!({"uuid": "c1", "parentUuid": "s0", "role": "user", "message": {"role": "user", "content": [{"type": "text", "text": "hi"}]}}),
                None,
            ),
            snapshot(2, "s1"),
        ];
        let applied = run(&records, &["file-history-dedup"], &StrategyConfig::default());

        // s0 is dropped as the earlier duplicate; s1 and the child survive.
        assert_eq!(applied.records.len(), 2);
        assert_eq!(applied.strategy_results[0].orphaned_count, 1);
        assert!(applied.strategy_results[0].warnings.iter().any(|w| w.contains("orphaned")));
    }

    #[test]
    fn chained_strategies_each_see_prior_edits() {
        let records = vec![tick("a", "root"), tick("b", "a"), tick("c", "b")];
        let applied = run(
            &records,
            &["progress-collapse", "metadata-strip"],
            &StrategyConfig::default(),
        );
        assert_eq!(applied.strategy_results.len(), 2);
        assert_eq!(applied.records.len(), 1);
    }
}
