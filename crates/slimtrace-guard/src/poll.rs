use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use slimtrace_team::write_checkpoint;

use crate::config::{decide_tier, GuardConfig, Tier};
use crate::cycle::{run_cycle, CycleOutcome};
use crate::error::Result;
use crate::reload::maybe_reload;
use crate::shared::{now, GuardShared};

/// One poll-thread tick: take the lock, decide whether this reading is
/// allowed to prune (the breaker gates HARD readings), run the cycle, and
/// update breaker bookkeeping (spec §4.7 IDLE/SOFT_FIRED/HARD_FIRED).
#[allow(clippy::too_many_arguments)]
pub fn poll_tick(
    shared: &GuardShared,
    session_path: &Path,
    team_config_path: Option<&Path>,
    checkpoint_path: &Path,
    session_label: &str,
    config: &GuardConfig,
) -> Result<CycleOutcome> {
    let mut inner = shared.inner.lock().unwrap();
    let instant = now();

    let size_probe = std::fs::metadata(session_path).map(|m| m.len()).unwrap_or(0);
    let tentative_tier = decide_tier(size_probe, 0, config);
    let hard_allowed = tentative_tier != Tier::Hard || !inner.breaker.is_tripped(instant);

    let outcome = run_cycle(session_path, team_config_path, checkpoint_path, session_label, config, hard_allowed, None)?;

    if outcome.tier == Tier::Hard && !outcome.breaker_tripped {
        inner.breaker.record_hard_fired(instant);
        if config.reload_enabled && !outcome.still_over_hard_after_prune {
            maybe_reload(session_path);
        }
    }

    inner.last_known_size = outcome.size_after;
    Ok(outcome)
}

/// Run the poll loop until `shared.shutdown` is set, sleeping
/// `config.poll_interval_secs` between ticks. Writes one final checkpoint
/// before returning so a signal-driven shutdown never loses the last
/// known team state (spec §4.7 "Termination").
#[allow(clippy::too_many_arguments)]
pub fn run_poll_loop(
    shared: Arc<GuardShared>,
    session_path: PathBuf,
    team_config_path: Option<PathBuf>,
    checkpoint_path: PathBuf,
    session_label: String,
    config: GuardConfig,
) {
    while !shared.is_shutting_down() {
        if let Err(err) = poll_tick(
            &shared,
            &session_path,
            team_config_path.as_deref(),
            &checkpoint_path,
            &session_label,
            &config,
        ) {
            eprintln!("slimtrace guard: poll cycle failed: {err}");
        }
        shared.take_checkpoint_request();

        let mut slept = Duration::ZERO;
        let step = Duration::from_millis(200);
        let total = Duration::from_secs(config.poll_interval_secs);
        while slept < total && !shared.is_shutting_down() {
            std::thread::sleep(step.min(total - slept));
            slept += step;
        }
    }

    write_final_checkpoint(&session_path, team_config_path.as_deref(), &checkpoint_path, &session_label);
}

fn write_final_checkpoint(session_path: &Path, team_config_path: Option<&Path>, checkpoint_path: &Path, session_label: &str) {
    if let Ok(records) = slimtrace_core::read_records(session_path) {
        if let Ok(team_state) = slimtrace_team::extract_team_state(&records, team_config_path) {
            let _ = write_checkpoint(checkpoint_path, &team_state, session_label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slimtrace_types::Record;
    use std::io::Write;

    fn write_session(path: &Path, n: usize) {
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

    #[test]
    fn poll_tick_idle_does_not_trip_the_breaker() {
        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.jsonl");
        let checkpoint_path = dir.path().join("checkpoint.txt");
        write_session(&session_path, 3);

        let config = GuardConfig::default();
        let shared = GuardShared::new(&config);
        let outcome = poll_tick(&shared, &session_path, None, &checkpoint_path, "s1", &config).unwrap();
        assert_eq!(outcome.tier, Tier::Idle);
        assert!(!shared.inner.lock().unwrap().breaker.is_tripped(now()));
    }

    #[test]
    fn repeated_hard_ticks_eventually_trip_the_breaker() {
        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.jsonl");
        let checkpoint_path = dir.path().join("checkpoint.txt");
        write_session(&session_path, 200);

        let mut config = GuardConfig::default();
        config.hard_threshold_bytes = 1;
        config.reload_enabled = false;
        let shared = GuardShared::new(&config);

        let mut tripped_once = false;
        for _ in 0..5 {
            write_session(&session_path, 200);
            let outcome = poll_tick(&shared, &session_path, None, &checkpoint_path, "s1", &config).unwrap();
            if outcome.breaker_tripped {
                tripped_once = true;
            }
        }
        assert!(tripped_once);
    }
}
