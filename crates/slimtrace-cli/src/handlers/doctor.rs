use crate::context::ExecutionContext;
use crate::output;

/// `slimtrace doctor [--fix]`: structural health checks only (spec §1 names
/// the doctor subcommand an external collaborator; this intentionally stays
/// a thin existence/writability sweep rather than growing into the core).
pub fn handle(ctx: &ExecutionContext, fix: bool) -> anyhow::Result<()> {
    output::heading("slimtrace doctor");
    let mut problems = 0;

    if ctx.data_dir.is_dir() {
        output::ok(&format!("data directory present: {}", ctx.data_dir.display()));
    } else if fix {
        std::fs::create_dir_all(&ctx.data_dir)?;
        output::ok(&format!("created data directory: {}", ctx.data_dir.display()));
    } else {
        problems += 1;
        output::warn(&format!("data directory missing: {} (rerun with --fix)", ctx.data_dir.display()));
    }

    let probe = ctx.data_dir.join(".doctor-write-probe");
    match std::fs::write(&probe, b"ok") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            output::ok("data directory is writable");
        }
        Err(err) => {
            problems += 1;
            output::warn(&format!("data directory is not writable: {err}"));
        }
    }

    if problems == 0 {
        output::ok("no problems found");
    } else {
        output::warn(&format!("{problems} problem(s) found"));
    }
    Ok(())
}
