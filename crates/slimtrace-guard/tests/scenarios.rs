//! End-to-end scenario from spec §8: the circuit breaker must stop an
//! endlessly hard-looping session from being pruned on every single tick.

use slimtrace_guard::{poll_tick, GuardConfig, GuardShared, Tier};
use slimtrace_types::Record;
use std::io::Write;

fn write_session(path: &std::path::Path, n: usize) {
    let mut file = std::fs::File::create(path).unwrap();
    for i in 0..n {
        let record = Record::from_value(
            i,
            serde_json::json!({"uuid": format!("t{i}"), "type": "progress_tick", "content": "tick"}),
            None,
        );
        writeln!(file, "{}", serde_json::to_string(&record.raw).unwrap()).unwrap();
    }
}

/// Scenario 6: a session that stays over the hard threshold on every
/// reading (e.g. it regrows immediately after each prune) fires HARD three
/// times in quick succession and then trips the breaker; the fourth
/// reading is refused rather than pruned again, and a checkpoint is still
/// written on every tick.
#[test]
fn scenario_6_repeated_hard_readings_trip_the_breaker_and_stop_pruning() {
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.jsonl");
    let checkpoint_path = dir.path().join("checkpoint.txt");

    let mut config = GuardConfig::default();
    config.hard_threshold_bytes = 1; // every reading is HARD
    config.reload_enabled = false;

    let shared = GuardShared::new(&config);

    let mut outcomes = Vec::new();
    for _ in 0..5 {
        write_session(&session_path, 50);
        let outcome = poll_tick(&shared, &session_path, None, &checkpoint_path, "s1", &config).unwrap();
        assert!(checkpoint_path.exists(), "checkpoint must be written on every tick");
        outcomes.push(outcome);
    }

    assert!(outcomes[..4].iter().all(|o| o.tier == Tier::Hard && !o.breaker_tripped));

    let tripped = outcomes.last().unwrap();
    assert!(tripped.breaker_tripped, "the breaker should refuse the reading once too many HARD events land in one window");
    assert!(tripped.prescription_applied.is_none(), "a breaker-tripped reading must not prune");
}
