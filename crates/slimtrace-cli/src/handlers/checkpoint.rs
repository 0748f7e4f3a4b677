use crate::context::{project_for_session, ExecutionContext};
use crate::error::CliError;
use crate::output;
use crate::session_resolve;

/// `slimtrace checkpoint [--show]`: locate the checkpoint for the session
/// bound to the current working directory and either name its path or
/// print its contents.
pub fn handle(ctx: &ExecutionContext, show: bool) -> anyhow::Result<()> {
    let path = session_resolve::resolve("current", None).map_err(anyhow::Error::from)?;
    let project = project_for_session(&path);
    let checkpoint_path = ctx.checkpoint_path(&project);

    if !checkpoint_path.is_file() {
        output::warn(&format!("no checkpoint written yet at {}", checkpoint_path.display()));
        return Ok(());
    }

    if !show {
        output::heading(&checkpoint_path.display().to_string());
        return Ok(());
    }

    let text = slimtrace_team::read_checkpoint(&checkpoint_path).map_err(|e| CliError::bad_argument(e.to_string()))?;
    print!("{text}");
    Ok(())
}
