use crate::context::ExecutionContext;
use crate::output;
use crate::session_resolve;

/// `slimtrace list [--project NAME]`: every transcript found under the
/// default log root (optionally scoped to one project directory), newest
/// first, with size on disk.
pub fn handle(_ctx: &ExecutionContext, project: Option<&str>) -> anyhow::Result<()> {
    let sessions = session_resolve::list_sessions(project);

    if sessions.is_empty() {
        output::warn("no sessions found");
        return Ok(());
    }

    output::heading(&format!("{} session(s)", sessions.len()));
    for session in sessions {
        println!("  {:<40} {:>10} bytes  {}", session.label, session.size_bytes, session.path.display());
    }

    Ok(())
}
