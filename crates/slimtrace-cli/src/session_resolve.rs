//! Resolve the `<session>` argument every treat/diagnose/strategy/guard
//! subcommand takes into a concrete transcript path (spec §6: "a thin
//! best-effort scan of $SLIMTRACE_SESSION env var and --project scoped
//! directories"; the session-discovery mechanism itself is named in the
//! spec's Non-goals as an external collaborator, so this stays deliberately
//! small rather than growing into a full multi-provider registry).
//!
//! A session argument is accepted as, in order:
//! - a path to an existing file, used directly;
//! - the literal `current`, resolved from `$SLIMTRACE_SESSION` or the
//!   most-recently-modified transcript under the default log root;
//! - a full UUID or a unique prefix of one, matched against the stem of
//!   every `*.jsonl` file found under the default log root.

use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Default root `slimtrace` scans for transcripts, matching the teacher's
/// own "Claude Code" provider entry (its other providers — Codex, Gemini —
/// have no equivalent record vocabulary in this transcript-pruning spec, so
/// only this one root is worth hardcoding here).
fn default_log_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude").join("projects"))
}

fn all_transcripts(root: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "jsonl"))
        .map(|entry| entry.into_path())
        .collect()
}

fn most_recently_modified(paths: &[PathBuf]) -> Option<PathBuf> {
    paths
        .iter()
        .filter_map(|p| std::fs::metadata(p).ok().and_then(|m| m.modified().ok()).map(|t| (p, t)))
        .max_by_key(|(_, t)| *t)
        .map(|(p, _)| p.clone())
}

/// Resolve `session` (as typed on the command line) to a transcript path.
pub fn resolve(session: &str, project: Option<&str>) -> Result<PathBuf, CliError> {
    let as_path = Path::new(session);
    if as_path.is_file() {
        return Ok(as_path.to_path_buf());
    }

    let Some(root) = default_log_root() else {
        return Err(CliError::session_not_found(session));
    };
    let scoped_root = match project {
        Some(name) => root.join(name),
        None => root,
    };

    if session == "current" {
        return resolve_current(&scoped_root);
    }

    let candidates = all_transcripts(&scoped_root);
    let matches: Vec<&PathBuf> = candidates
        .iter()
        .filter(|p| p.file_stem().and_then(|s| s.to_str()).is_some_and(|stem| stem.starts_with(session)))
        .collect();

    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(CliError::session_not_found(session)),
        _ => Err(CliError::bad_argument(format!(
            "'{session}' matches {} sessions; pass a longer prefix or a full id",
            matches.len()
        ))),
    }
}

fn resolve_current(scoped_root: &Path) -> Result<PathBuf, CliError> {
    if let Ok(explicit) = std::env::var("SLIMTRACE_SESSION") {
        let path = Path::new(&explicit);
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        let candidates = all_transcripts(scoped_root);
        if let Some(found) = candidates
            .iter()
            .find(|p| p.file_stem().and_then(|s| s.to_str()) == Some(explicit.as_str()))
        {
            return Ok(found.clone());
        }
    }

    let candidates = all_transcripts(scoped_root);
    most_recently_modified(&candidates).ok_or_else(|| CliError::session_not_found("current"))
}

pub struct SessionInfo {
    pub label: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Every transcript under the default log root, optionally scoped to one
/// project directory, newest-modified first (spec §6 `list`).
pub fn list_sessions(project: Option<&str>) -> Vec<SessionInfo> {
    let Some(root) = default_log_root() else {
        return Vec::new();
    };
    let scoped_root = match project {
        Some(name) => root.join(name),
        None => root,
    };

    let mut sessions: Vec<(PathBuf, std::time::SystemTime)> = all_transcripts(&scoped_root)
        .into_iter()
        .filter_map(|p| {
            let modified = std::fs::metadata(&p).ok()?.modified().ok()?;
            Some((p, modified))
        })
        .collect();
    sessions.sort_by(|a, b| b.1.cmp(&a.1));

    sessions
        .into_iter()
        .map(|(path, _)| {
            let size_bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            SessionInfo { label: session_label(&path), path, size_bytes }
        })
        .collect()
}

/// Derive a short human label for a resolved session path (used in
/// checkpoints and guard log lines): the file stem, or the whole path if it
/// has none.
pub fn session_label(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or_else(|| "session").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_existing_file_path_is_used_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mine.jsonl");
        std::fs::write(&path, "").unwrap();
        let resolved = resolve(path.to_str().unwrap(), None).unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    fn session_label_uses_the_file_stem() {
        let path = Path::new("/tmp/foo/abcd-1234.jsonl");
        assert_eq!(session_label(path), "abcd-1234");
    }
}
