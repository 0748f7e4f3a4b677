//! End-to-end scenarios from spec §8, run through the full applier against
//! a named prescription rather than a single strategy in isolation.

use serde_json::json;
use slimtrace_catalog::{StrategyConfig, AGGRESSIVE, GENTLE, STANDARD};
use slimtrace_types::Record;

fn progress_tick(n: usize, uuid: &str, parent: &str) -> Record {
    Record::from_value(
        n,
        json!({"uuid": uuid, "parentUuid": parent, "type": "progress_tick", "content": format!("tick {n}")}),
        None,
    )
}

fn user_turn(n: usize, uuid: &str, parent: &str, text: &str) -> Record {
    Record::from_value(
        n,
        json!({
            "uuid": uuid,
            "parentUuid": parent,
            "role": "user",
            "message": {"role": "user", "content": [{"type": "text", "text": text}]},
        }),
        None,
    )
}

/// Scenario 1: 10,000 records, 6,000 of which are one contiguous
/// `progress_tick` run. Running `gentle` collapses the run to a single
/// synthetic record carrying the run length and the first tick's identity.
#[test]
fn scenario_1_large_progress_tick_run_collapses_to_one_record() {
    let mut records = Vec::with_capacity(10_000);
    let mut parent = "root".to_string();

    // 2,000 ordinary turns before the run.
    for i in 0..2_000 {
        let uuid = format!("u{i}");
        records.push(user_turn(i, &uuid, &parent, &format!("turn {i}")));
        parent = uuid;
    }

    // One contiguous run of 6,000 progress ticks.
    let first_tick_uuid = "tick-0".to_string();
    let first_tick_parent = parent.clone();
    for i in 0..6_000 {
        let uuid = format!("tick-{i}");
        records.push(progress_tick(2_000 + i, &uuid, &parent));
        parent = uuid;
    }

    // 2,000 more ordinary turns after the run.
    for i in 0..2_000 {
        let uuid = format!("v{i}");
        records.push(user_turn(8_000 + i, &uuid, &parent, &format!("turn {i}")));
        parent = uuid;
    }

    assert_eq!(records.len(), 10_000);

    let applied = slimtrace_engine::run(&records, GENTLE, &StrategyConfig::default());

    // 4,000 ordinary turns survive untouched, plus one synthetic tick record
    // replacing the 6,000-tick run.
    assert_eq!(applied.records.len(), 4_001);

    let synthetic = applied
        .records
        .iter()
        .find(|r| r.uuid == first_tick_uuid)
        .expect("synthetic record keeps the first tick's identity");
    assert_eq!(synthetic.parent_uuid.as_deref(), Some(first_tick_parent.as_str()));

    let text = synthetic
        .content_blocks
        .iter()
        .find_map(|b| b.textual_content())
        .unwrap_or_default();
    assert!(text.contains("6000"), "expected the collapsed count in {text:?}");
}

fn file_snapshot(n: usize, uuid: &str, path: &str, content: &str) -> Record {
    Record::from_value(
        n,
        json!({"uuid": uuid, "type": "file_history_snapshot", "path": path, "content": content}),
        None,
    )
}

/// Scenario 2: a file re-read back and forth between two files (A B A B …
/// A) leaves only the last snapshot of each distinct file state.
#[test]
fn scenario_2_alternating_file_history_snapshots_keep_only_the_last_of_each() {
    let mut records = Vec::new();
    for i in 0..50 {
        if i % 2 == 0 {
            records.push(file_snapshot(i, &format!("a{i}"), "a.rs", "contents-a"));
        } else {
            records.push(file_snapshot(i, &format!("b{i}"), "b.rs", "contents-b"));
        }
    }

    let applied = slimtrace_engine::run(&records, GENTLE, &StrategyConfig::default());

    assert_eq!(applied.records.len(), 2, "only the last A and the last B should survive");
    let last_a = records.iter().rev().find(|r| r.raw["path"] == "a.rs").unwrap();
    let last_b = records.iter().rev().find(|r| r.raw["path"] == "b.rs").unwrap();
    let surviving_uuids: Vec<&str> = applied.records.iter().map(|r| r.uuid.as_str()).collect();
    assert!(surviving_uuids.contains(&last_a.uuid.as_str()));
    assert!(surviving_uuids.contains(&last_b.uuid.as_str()));
}

fn document_turn(n: usize, uuid: &str, body: &str, title: &str) -> Record {
    Record::from_value(
        n,
        json!({
            "uuid": uuid,
            "role": "user",
            "message": {
                "role": "user",
                "content": [{"type": "document", "source": body, "title": title}],
            },
        }),
        None,
    )
}

/// Scenario 3: the same large attachment is sent three times. `aggressive`
/// keeps only the first full copy and replaces the later two with a stub
/// referencing it, saving roughly 2x the attachment's size.
#[test]
fn scenario_3_repeated_large_document_is_deduplicated_with_index_stub() {
    let body = "spec content ".repeat(50_000); // well over document_min_bytes
    let records = vec![
        document_turn(0, "doc-0", &body, "spec.md"),
        user_turn(1, "mid-1", "doc-0", "ack"),
        document_turn(2, "doc-2", &body, "spec.md"),
        user_turn(3, "mid-3", "doc-2", "ack"),
        document_turn(4, "doc-4", &body, "spec.md"),
    ];

    let before_bytes: usize = records.iter().map(|r| r.approx_bytes()).sum();
    let applied = slimtrace_engine::run(&records, AGGRESSIVE, &StrategyConfig::default());
    let after_bytes: usize = applied.records.iter().map(|r| r.approx_bytes()).sum();

    assert_eq!(applied.records.len(), 5, "document-dedup replaces content, it does not drop records");
    assert!(
        before_bytes.saturating_sub(after_bytes) > body.len(),
        "expected savings roughly on the order of one duplicate attachment"
    );

    for idx in [2usize, 4] {
        let record = applied.records.iter().find(|r| r.raw["uuid"] == records[idx].uuid).unwrap();
        let stub = record.content_blocks.iter().find_map(|b| b.textual_content()).unwrap_or_default();
        assert!(stub.contains("duplicate document"), "expected a stub in {stub:?}");
        assert!(stub.contains("0"), "expected the stub at index {idx} to reference record 0, got {stub:?}");
    }
}

fn tool_use(n: usize, uuid: &str, parent: &str, name: &str, path: &str) -> Record {
    Record::from_value(
        n,
        json!({
            "uuid": uuid,
            "parentUuid": parent,
            "role": "assistant",
            "message": {
                "role": "assistant",
                "content": [{"type": "tool_use", "id": format!("t{n}"), "name": name, "input": {"file_path": path}}],
            },
        }),
        None,
    )
}

/// Scenario 4: read a.rs, edit a.rs, read a.rs again. `standard` drops the
/// earlier read (superseded by the edit) and keeps the later one.
#[test]
fn scenario_4_read_before_edit_drops_the_earlier_stale_read() {
    let records = vec![
        tool_use(0, "r0", "root", "Read", "a.rs"),
        tool_use(1, "e1", "r0", "Edit", "a.rs"),
        tool_use(2, "r2", "e1", "Read", "a.rs"),
    ];

    let applied = slimtrace_engine::run(&records, STANDARD, &StrategyConfig::default());

    let surviving_uuids: Vec<&str> = applied.records.iter().map(|r| r.uuid.as_str()).collect();
    assert!(!surviving_uuids.contains(&"r0"), "the stale first read should be dropped");
    assert!(surviving_uuids.contains(&"e1"));
    assert!(surviving_uuids.contains(&"r2"));
}
