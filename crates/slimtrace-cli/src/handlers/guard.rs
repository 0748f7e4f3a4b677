use slimtrace_guard::{Error as GuardError, GuardConfig};

use crate::context::{project_for_session, ExecutionContext};
use crate::error::CliError;
use crate::output;
use crate::session_resolve;

/// `slimtrace guard [session] [--threshold MB] [--soft-threshold MB]
/// [--threshold-tokens N] [--interval SECONDS] [-rx NAME] [--no-reload]
/// [--no-reactive] [--daemon]`: run the long-lived guard loop against one
/// session until SIGINT/SIGTERM (spec §4.7).
#[allow(clippy::too_many_arguments)]
pub fn handle(
    ctx: &ExecutionContext,
    session: Option<&str>,
    threshold_mb: u64,
    soft_threshold_mb: Option<u64>,
    threshold_tokens: Option<u64>,
    interval_secs: u64,
    prescription_name: &'static str,
    no_reload: bool,
    no_reactive: bool,
    daemon: bool,
) -> anyhow::Result<()> {
    let session_arg = session.unwrap_or("current");
    let path = session_resolve::resolve(session_arg, None).map_err(anyhow::Error::from)?;
    let project = project_for_session(&path);
    let checkpoint_path = ctx.checkpoint_path(&project);
    let session_label = session_resolve::session_label(&path);

    let mut config = GuardConfig::from_mb(threshold_mb, soft_threshold_mb);
    config.token_threshold = threshold_tokens;
    config.poll_interval_secs = interval_secs;
    config.hard_prescription = prescription_name;
    config.reload_enabled = !no_reload;
    config.reactive_enabled = !no_reactive;

    if daemon {
        output::dim("--daemon: best-effort detach, still runs in this process (no fork available here)");
    }

    output::heading(&format!(
        "guarding {session_label}: hard={}MiB soft={}MiB interval={}s prescription={}",
        config.hard_threshold_bytes / (1024 * 1024),
        config.soft_threshold_bytes / (1024 * 1024),
        config.poll_interval_secs,
        prescription_name,
    ));

    let result = slimtrace_guard::start(&session_label, path, None, checkpoint_path, session_label.clone(), config);

    match result {
        Ok(_handle) => Ok(()),
        Err(GuardError::LockHeld(pid)) => Err(CliError::guard_refused(format!(
            "guard already running for this session (pid {pid})"
        ))
        .into()),
        Err(err) => Err(CliError::bad_argument(err.to_string()).into()),
    }
}
