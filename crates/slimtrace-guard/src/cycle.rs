use std::path::{Path, PathBuf};

use slimtrace_catalog::{prescription_by_name, StrategyConfig};
use slimtrace_core::backup::{atomic_write, backup_before_write};
use slimtrace_core::token::estimate_total_tokens;
use slimtrace_core::{read_records, render_records};
use slimtrace_team::{extract_team_state, team_protect_apply, write_checkpoint};
use slimtrace_types::{Record, TeamState};

use crate::config::{decide_tier, GuardConfig, Tier};
use crate::error::Result;

/// What one guard cycle actually did to a session, for logging and for the
/// end-to-end scenario tests in §8.
#[derive(Debug)]
pub struct CycleOutcome {
    pub tier: Tier,
    pub size_before: u64,
    pub size_after: u64,
    pub tokens_before: u64,
    pub prescription_applied: Option<&'static str>,
    pub backup_path: Option<PathBuf>,
    pub checkpoint_path: PathBuf,
    pub breaker_tripped: bool,
    pub team_state: TeamState,
    /// Set when a post-prune estimate would still exceed the hard
    /// threshold — the reactive watcher skips reload and leaves this note
    /// in the checkpoint instead (spec §4.7).
    pub still_over_hard_after_prune: bool,
}

/// Read the session file, extract team state, always write a fresh
/// checkpoint, then prune if the reading crosses soft or hard (spec §4.7
/// IDLE / SOFT_FIRED / HARD_FIRED branches, minus the breaker — the caller
/// decides whether a HARD reading is allowed to prune).
#[allow(clippy::too_many_arguments)]
pub fn run_cycle(
    session_path: &Path,
    team_config_path: Option<&Path>,
    checkpoint_path: &Path,
    session_label: &str,
    config: &GuardConfig,
    hard_allowed: bool,
    prescription_override: Option<&'static str>,
) -> Result<CycleOutcome> {
    let records = read_records(session_path)?;
    let size_before = std::fs::metadata(session_path).map(|m| m.len()).unwrap_or(0);
    let tokens_before = estimate_total_tokens(&records);

    let team_state = extract_team_state(&records, team_config_path)?;
    write_checkpoint(checkpoint_path, &team_state, session_label)?;

    let tier = decide_tier(size_before, tokens_before, config);

    let prescription_name = match tier {
        Tier::Idle => None,
        Tier::Soft => Some("gentle"),
        Tier::Hard if hard_allowed => Some(prescription_override.unwrap_or(config.hard_prescription)),
        Tier::Hard => None,
    };

    let Some(prescription_name) = prescription_name else {
        return Ok(CycleOutcome {
            tier,
            size_before,
            size_after: size_before,
            tokens_before,
            prescription_applied: None,
            backup_path: None,
            checkpoint_path: checkpoint_path.to_path_buf(),
            breaker_tripped: tier == Tier::Hard && !hard_allowed,
            team_state,
            still_over_hard_after_prune: false,
        });
    };

    let prescription = prescription_by_name(prescription_name)
        .unwrap_or_else(|| prescription_by_name(config.hard_prescription).expect("hard prescription is always valid"));

    let applied = team_protect_apply(&records, &team_state, prescription.strategies, &StrategyConfig::default());

    let backup_path = backup_before_write(session_path)?;
    let rendered = render_records(&applied.records);
    atomic_write(session_path, &rendered)?;

    let size_after = rendered.len() as u64;
    let tokens_after = estimate_total_tokens(&applied.records);
    let hard_by_size_after = size_after >= config.hard_threshold_bytes;
    let hard_by_tokens_after = config.token_threshold.is_some_and(|t| tokens_after >= t);
    let still_over_hard_after_prune = tier == Tier::Hard && (hard_by_size_after || hard_by_tokens_after);

    Ok(CycleOutcome {
        tier,
        size_before,
        size_after,
        tokens_before,
        prescription_applied: Some(prescription.name),
        backup_path: Some(backup_path),
        checkpoint_path: checkpoint_path.to_path_buf(),
        breaker_tripped: false,
        team_state,
        still_over_hard_after_prune,
    })
}
