use crate::context::ExecutionContext;
use crate::error::CliError;
use crate::output;
use crate::session_resolve;

/// `slimtrace diagnose <session>`: full read-only diagnosis of one session.
pub fn handle(_ctx: &ExecutionContext, session: &str) -> anyhow::Result<()> {
    let path = session_resolve::resolve(session, None).map_err(anyhow::Error::from)?;
    let records = slimtrace_core::read_records(&path).map_err(|e| CliError::bad_argument(e.to_string()))?;
    let diagnosis = slimtrace_engine::diagnose(&records);
    output::print_diagnosis(&diagnosis);
    Ok(())
}
