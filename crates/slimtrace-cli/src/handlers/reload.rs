use slimtrace_guard::{describe_outcome, run_cycle, GuardConfig};

use crate::context::{project_for_session, ExecutionContext};
use crate::error::CliError;
use crate::output;
use crate::session_resolve;

/// `slimtrace reload [-rx NAME]`: force an immediate prune-and-resume cycle
/// on the session bound to the current working directory, outside of a
/// running `guard` loop. This is the same cycle the guard's HARD_FIRED
/// branch runs, with the hard threshold forced to zero so it always fires
/// (spec §4.7, §6 `reload`).
pub fn handle(ctx: &ExecutionContext, prescription_name: &'static str) -> anyhow::Result<()> {
    let path = session_resolve::resolve("current", None).map_err(anyhow::Error::from)?;
    let project = project_for_session(&path);
    let checkpoint_path = ctx.checkpoint_path(&project);
    let session_label = session_resolve::session_label(&path);

    let mut config = GuardConfig::default();
    config.hard_threshold_bytes = 0;

    let outcome = run_cycle(&path, None, &checkpoint_path, &session_label, &config, true, Some(prescription_name))
        .map_err(|e| CliError::bad_argument(e.to_string()))?;

    output::heading(&describe_outcome(&outcome));
    if let Some(backup) = &outcome.backup_path {
        output::dim(&format!("backup at {}", backup.display()));
    }

    slimtrace_guard::reload::maybe_reload(&path);
    Ok(())
}
