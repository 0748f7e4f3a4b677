use std::path::PathBuf;

use crate::error::{Error, Result};

/// Resolve the slimtrace data directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. `SLIMTRACE_PATH` environment variable
/// 3. System data directory (recommended default)
/// 4. `~/.slimtrace` (fallback)
pub fn resolve_data_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("SLIMTRACE_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("slimtrace"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".slimtrace"));
    }

    Err(Error::Config(
        "could not determine data directory: no HOME or system data directory found".to_string(),
    ))
}

/// Per-project checkpoint directory: `<data_dir>/projects/<project>/`.
pub fn project_checkpoint_dir(data_dir: &std::path::Path, project: &str) -> PathBuf {
    data_dir.join("projects").join(project)
}

/// Path of the checkpoint file within a project's checkpoint directory.
pub fn checkpoint_file_path(data_dir: &std::path::Path, project: &str) -> PathBuf {
    project_checkpoint_dir(data_dir, project).join("checkpoint.txt")
}

/// Path of a guard's PID lock file under the process-wide temp directory.
pub fn guard_lock_path(session_id: &str) -> PathBuf {
    std::env::temp_dir().join(format!("slimtrace-guard-{session_id}.pid"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let resolved = resolve_data_dir(Some("/tmp/explicit")).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/explicit"));
    }

    #[test]
    fn checkpoint_path_is_scoped_to_project() {
        let data_dir = PathBuf::from("/tmp/data");
        let path = checkpoint_file_path(&data_dir, "myproj");
        assert_eq!(path, PathBuf::from("/tmp/data/projects/myproj/checkpoint.txt"));
    }
}
