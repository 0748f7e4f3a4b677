use slimtrace_catalog::{prescription_by_name, StrategyConfig, ThinkingMode};
use slimtrace_core::backup::{atomic_write, backup_before_write};
use slimtrace_core::render_records;

use crate::context::ExecutionContext;
use crate::error::CliError;
use crate::output;
use crate::session_resolve;

/// `slimtrace treat <session> [-rx NAME] [--execute] [--thinking-mode MODE]`:
/// run a named prescription over one session, respecting team-coordination
/// records, and either print the dry-run result or write it back.
pub fn handle(
    _ctx: &ExecutionContext,
    session: &str,
    prescription_name: &str,
    execute: bool,
    thinking_mode: Option<ThinkingMode>,
) -> anyhow::Result<()> {
    let path = session_resolve::resolve(session, None).map_err(anyhow::Error::from)?;
    let prescription = prescription_by_name(prescription_name)
        .ok_or_else(|| CliError::bad_argument(format!("unknown prescription '{prescription_name}'")))?;

    let mut config = StrategyConfig::default();
    if let Some(mode) = thinking_mode {
        config.thinking_mode = mode;
    }

    let records = slimtrace_core::read_records(&path).map_err(|e| CliError::bad_argument(e.to_string()))?;
    let team_state = slimtrace_team::extract_team_state(&records, None).map_err(|e| CliError::bad_argument(e.to_string()))?;

    let before_bytes = render_records(&records).len();
    let applied = slimtrace_team::team_protect_apply(&records, &team_state, prescription.strategies, &config);
    let after_bytes = render_records(&applied.records).len();

    output::heading(&format!(
        "{prescription_name}: {} -> {} records, {} -> {} bytes",
        records.len(),
        applied.records.len(),
        before_bytes,
        after_bytes
    ));
    for result in &applied.strategy_results {
        println!(
            "  {:<24} -{:>5} removed  ~{:>5} modified  {:>8} bytes saved",
            result.strategy_name, result.removed_count, result.modified_count, result.bytes_saved
        );
        for warning in &result.warnings {
            output::warn(&format!("    {warning}"));
        }
    }
    for warning in &applied.warnings {
        output::warn(&warning);
    }

    if !execute {
        output::dim("dry run: pass --execute to write this back to the session file");
        return Ok(());
    }

    let backup_path = backup_before_write(&path).map_err(|e| CliError::bad_argument(e.to_string()))?;
    atomic_write(&path, &render_records(&applied.records)).map_err(|e| CliError::bad_argument(e.to_string()))?;
    output::ok(&format!("written; backup at {}", backup_path.display()));

    Ok(())
}
