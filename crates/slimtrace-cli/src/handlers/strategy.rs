use slimtrace_catalog::{lookup, StrategyConfig, ThinkingMode};
use slimtrace_core::backup::{atomic_write, backup_before_write};
use slimtrace_core::render_records;
use slimtrace_types::Action;

use crate::context::ExecutionContext;
use crate::error::CliError;
use crate::output;
use crate::session_resolve;

/// `slimtrace strategy <name> <session> [-v] [--execute] [--thinking-mode MODE]`:
/// run exactly one registered strategy over a session, bypassing
/// team-protect — this is the diagnostic single-rule surface, not the
/// everyday `treat` path.
pub fn handle(
    _ctx: &ExecutionContext,
    name: &str,
    session: &str,
    verbose: bool,
    execute: bool,
    thinking_mode: Option<ThinkingMode>,
) -> anyhow::Result<()> {
    let strategy = lookup(name).ok_or_else(|| CliError::bad_argument(format!("unknown strategy '{name}'")))?;
    let path = session_resolve::resolve(session, None).map_err(anyhow::Error::from)?;

    let mut config = StrategyConfig::default();
    if let Some(mode) = thinking_mode {
        config.thinking_mode = mode;
    }

    let records = slimtrace_core::read_records(&path).map_err(|e| CliError::bad_argument(e.to_string()))?;
    let before_bytes = render_records(&records).len();
    let result = strategy.apply(&records, &config);

    output::heading(&format!(
        "{name}: -{} removed  ~{} modified  {} bytes saved",
        result.removed_count, result.modified_count, result.bytes_saved
    ));

    if verbose {
        for action in &result.actions {
            match action {
                Action::Drop(i) => println!("  drop      record {i}"),
                Action::Replace(i, new) => println!("  replace   record {i} -> uuid {}", new.uuid),
                Action::ReplaceRange(first, last, new) => {
                    println!("  collapse  records {first}..={last} -> uuid {}", new.uuid)
                }
            }
        }
    }
    for warning in &result.warnings {
        output::warn(&warning);
    }

    if !execute {
        output::dim("dry run: pass --execute to write this back to the session file");
        return Ok(());
    }

    // Re-run through the applier rather than folding `result` by hand, so a
    // single-strategy `--execute` gets the same overlap/DAG-invariant
    // handling the `treat`/`guard` paths get (spec §4.4).
    let applied = slimtrace_engine::run(&records, &[name], &config);
    let after_bytes = render_records(&applied.records).len();
    output::dim(&format!("{before_bytes} -> {after_bytes} bytes"));

    let backup_path = backup_before_write(&path).map_err(|e| CliError::bad_argument(e.to_string()))?;
    atomic_write(&path, &render_records(&applied.records)).map_err(|e| CliError::bad_argument(e.to_string()))?;
    output::ok(&format!("written; backup at {}", backup_path.display()));

    Ok(())
}
