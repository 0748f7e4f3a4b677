use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::{escalated_prescription, GuardConfig, Tier};
use crate::cycle::run_cycle;
use crate::error::Result;
use crate::reload::maybe_reload;
use crate::shared::{now, GuardShared};

/// The reactive watcher thread (spec §4.7): observes the session file via
/// native change notification, preferring it over the poll thread's coarser
/// cadence, and reacts within one tick to a size jump that crosses the hard
/// threshold between polls. Grounded in the teacher's
/// `agtrace-runtime::runtime::watcher` / `supervisor` PollWatcher +
/// mpsc-channel pattern, with the poll interval set to the 200ms fallback
/// spec.md names.
pub struct ReactiveWatcher {
    _watcher: RecommendedWatcher,
    _handle: JoinHandle<()>,
    rx: Receiver<ReactiveEvent>,
}

#[derive(Debug)]
pub enum ReactiveEvent {
    Pruned { bytes_saved: i64, still_over_hard: bool },
    FsEventObserved,
    Error(String),
}

#[allow(clippy::too_many_arguments)]
impl ReactiveWatcher {
    pub fn start(
        shared: Arc<GuardShared>,
        session_path: PathBuf,
        team_config_path: Option<PathBuf>,
        checkpoint_path: PathBuf,
        session_label: String,
        config: GuardConfig,
    ) -> Result<ReactiveWatcher> {
        let (tx, rx) = channel();
        let watch_dir = session_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

        let tx_fs = tx.clone();
        let notify_config = notify::Config::default().with_poll_interval(Duration::from_millis(200));
        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        let _ = tx_fs.send(ReactiveEvent::FsEventObserved);
                    }
                }
            },
            notify_config,
        )?;
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        let handle = std::thread::Builder::new()
            .name("slimtrace-reactive-watcher".to_string())
            .spawn(move || {
                reactive_loop(shared, session_path, team_config_path, checkpoint_path, session_label, config, tx);
            })
            .map_err(std::io::Error::from)?;

        Ok(ReactiveWatcher {
            _watcher: watcher,
            _handle: handle,
            rx,
        })
    }

    pub fn receiver(&self) -> &Receiver<ReactiveEvent> {
        &self.rx
    }
}

#[allow(clippy::too_many_arguments)]
fn reactive_loop(
    shared: Arc<GuardShared>,
    session_path: PathBuf,
    team_config_path: Option<PathBuf>,
    checkpoint_path: PathBuf,
    session_label: String,
    config: GuardConfig,
    tx: std::sync::mpsc::Sender<ReactiveEvent>,
) {
    let mut last_seen_size = std::fs::metadata(&session_path).map(|m| m.len()).unwrap_or(0);

    while !shared.is_shutting_down() {
        std::thread::sleep(Duration::from_millis(200));
        if shared.is_shutting_down() {
            break;
        }

        let event = reactive_tick(
            &shared,
            &session_path,
            team_config_path.as_deref(),
            &checkpoint_path,
            &session_label,
            &config,
            &mut last_seen_size,
        );
        if let Some(event) = event {
            let _ = tx.send(event);
        }
    }
}

/// One reactive-watcher evaluation: compare the current size against
/// `last_seen_size`, and if the jump crosses the hard threshold, run an
/// escalated HARD_FIRED cycle (spec §4.7). Returns `None` for every
/// no-op tick (small-file fast path, no crossing, or breaker already
/// tripped) so the caller only has to react to something actually
/// happening.
#[allow(clippy::too_many_arguments)]
pub fn reactive_tick(
    shared: &GuardShared,
    session_path: &Path,
    team_config_path: Option<&Path>,
    checkpoint_path: &Path,
    session_label: &str,
    config: &GuardConfig,
    last_seen_size: &mut u64,
) -> Option<ReactiveEvent> {
    let current_size = std::fs::metadata(session_path).map(|m| m.len()).unwrap_or(*last_seen_size);

    if config.is_well_below_soft(current_size) {
        *last_seen_size = current_size;
        return None;
    }

    let crossed = crossed_hard_threshold(*last_seen_size, current_size, config);
    *last_seen_size = current_size;
    if !crossed {
        return None;
    }

    let mut inner = shared.inner.lock().unwrap();
    let instant = now();
    if inner.breaker.is_tripped(instant) {
        return None;
    }
    let recovery_count = inner.breaker.recovery_count(instant);
    let prescription = escalated_prescription(recovery_count);

    match run_cycle(session_path, team_config_path, checkpoint_path, session_label, config, true, Some(prescription)) {
        Ok(outcome) if outcome.tier == Tier::Hard => {
            inner.breaker.record_hard_fired(instant);
            *last_seen_size = outcome.size_after;
            drop(inner);

            if config.reload_enabled && !outcome.still_over_hard_after_prune {
                maybe_reload(session_path);
            }
            Some(ReactiveEvent::Pruned {
                bytes_saved: outcome.size_before as i64 - outcome.size_after as i64,
                still_over_hard: outcome.still_over_hard_after_prune,
            })
        }
        Ok(_) => None,
        Err(err) => Some(ReactiveEvent::Error(err.to_string())),
    }
}

/// Whether the size reading jumped across the hard threshold between the
/// last observation and this one (spec §4.7: "a size jump that crosses the
/// hard threshold between polls").
pub fn crossed_hard_threshold(previous: u64, current: u64, config: &GuardConfig) -> bool {
    previous < config.hard_threshold_bytes && current >= config.hard_threshold_bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_a_jump_across_the_hard_threshold() {
        let mut config = GuardConfig::default();
        config.hard_threshold_bytes = 50;
        assert!(crossed_hard_threshold(10, 60, &config));
        assert!(!crossed_hard_threshold(60, 70, &config));
        assert!(!crossed_hard_threshold(10, 20, &config));
    }

    #[test]
    fn small_file_fast_path_skips_well_below_soft() {
        let config = GuardConfig::default();
        assert!(config.is_well_below_soft(1));
        assert!(!config.is_well_below_soft(config.hard_threshold_bytes));
    }

    #[test]
    fn a_size_jump_across_hard_triggers_one_escalated_prune() {
        use slimtrace_types::Record;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.jsonl");
        let checkpoint_path = dir.path().join("checkpoint.txt");

        // Start small (simulating the 10 MiB baseline in spec scenario 5).
        let mut file = std::fs::File::create(&session_path).unwrap();
        for i in 0..5 {
            let record = Record::from_value(
                i,
                serde_json::json!({"uuid": format!("t{i}"), "type": "progress_tick", "content": "tick"}),
                None,
            );
            writeln!(file, "{}", serde_json::to_string(&record.raw).unwrap()).unwrap();
        }
        drop(file);
        let mut last_seen_size = std::fs::metadata(&session_path).unwrap().len();

        let mut config = GuardConfig::default();
        config.soft_threshold_bytes = 30;
        config.hard_threshold_bytes = 50;
        let shared = GuardShared::new(&config);

        // Writer appends a large run of progress ticks in one jump, well
        // past the hard threshold.
        let mut file = std::fs::OpenOptions::new().append(true).open(&session_path).unwrap();
        for i in 5..2000 {
            let record = Record::from_value(
                i,
                serde_json::json!({"uuid": format!("t{i}"), "type": "progress_tick", "content": "tick"}),
                None,
            );
            writeln!(file, "{}", serde_json::to_string(&record.raw).unwrap()).unwrap();
        }
        drop(file);

        let event = reactive_tick(
            &shared,
            &session_path,
            None,
            &checkpoint_path,
            "s1",
            &config,
            &mut last_seen_size,
        );

        assert!(matches!(event, Some(ReactiveEvent::Pruned { .. })));
        assert!(checkpoint_path.exists());
        let line_count_after = std::fs::read_to_string(&session_path).unwrap().lines().count();
        assert!(line_count_after < 10, "expected the progress-tick run to collapse, got {line_count_after} lines");
    }
}
