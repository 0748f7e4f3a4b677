//! The CLI's own error type, whose only job is to carry an exit code
//! through `anyhow::Error` so `main` can pick the right one (spec §6: exit
//! codes 0 success/no-op, 1 generic failure, 2 bad argument, 3 session not
//! found, 4 guard refused). Every other error in the workspace (core,
//! catalog, engine, team, guard) is wrapped in `anyhow` at this boundary,
//! matching the teacher's own `agtrace-cli` pattern of a thin top-level
//! `anyhow::Result<()>` over hand-rolled crate errors.

use std::fmt;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn bad_argument(message: impl Into<String>) -> Self {
        CliError { code: 2, message: message.into() }
    }

    pub fn session_not_found(session: &str) -> Self {
        CliError { code: 3, message: format!("session not found: {session}") }
    }

    pub fn guard_refused(message: impl Into<String>) -> Self {
        CliError { code: 4, message: message.into() }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Exit code for any error reaching `main`: a `CliError` carries its own
/// code, anything else is the generic failure code.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map(|e| e.code).unwrap_or(1)
}
