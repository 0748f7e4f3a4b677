use crate::context::ExecutionContext;
use crate::error::CliError;
use crate::output;
use crate::session_resolve;

/// `slimtrace current [-d|--diagnose]`: resolve the session bound to the
/// working directory and either name it or run a full diagnosis over it.
pub fn handle(_ctx: &ExecutionContext, diagnose: bool) -> anyhow::Result<()> {
    let path = session_resolve::resolve("current", None).map_err(anyhow::Error::from)?;

    if !diagnose {
        output::heading(&session_resolve::session_label(&path));
        println!("{}", path.display());
        return Ok(());
    }

    let records = slimtrace_core::read_records(&path).map_err(|e| CliError::bad_argument(e.to_string()))?;
    let diagnosis = slimtrace_engine::diagnose(&records);
    output::print_diagnosis(&diagnosis);
    Ok(())
}
