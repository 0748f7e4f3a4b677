//! Per-invocation context every handler needs: the resolved data directory,
//! the optional file config layered under it, and the project name a
//! resolved session belongs to (used to scope its checkpoint directory).
//! Grounded in the teacher's `agtrace-cli::context::ExecutionContext`,
//! simplified to what slimtrace actually needs: there is no workspace
//! index to lazily open here, just a couple of filesystem paths.

use std::path::{Path, PathBuf};

use crate::config::{self, FileConfig};

pub struct ExecutionContext {
    pub data_dir: PathBuf,
    pub file_config: FileConfig,
}

impl ExecutionContext {
    pub fn resolve(explicit_data_dir: Option<&str>) -> anyhow::Result<Self> {
        let data_dir = slimtrace_core::path::resolve_data_dir(explicit_data_dir)?;
        let file_config = config::load(&data_dir)?;
        Ok(ExecutionContext { data_dir, file_config })
    }

    pub fn checkpoint_path(&self, project: &str) -> PathBuf {
        slimtrace_core::path::checkpoint_file_path(&self.data_dir, project)
    }
}

/// The project a session belongs to, for checkpoint scoping: the name of
/// the directory directly containing its transcript file, falling back to
/// `"default"` for a session path with no meaningful parent (e.g. one
/// passed as a bare filename in the current directory).
pub fn project_for_session(session_path: &Path) -> String {
    session_path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("default")
        .to_string()
}
