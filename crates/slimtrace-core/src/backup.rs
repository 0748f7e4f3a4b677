use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;

/// Copy `path` to a timestamped sibling `<path>.<unix_ts>.bak` before any
/// destructive write (spec §4.8). Backups are never pruned by the core.
pub fn backup_before_write(path: &Path) -> Result<PathBuf> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let backup_path = sibling_with_suffix(path, &format!(".{ts}.bak"));
    std::fs::copy(path, &backup_path)?;
    Ok(backup_path)
}

/// Write `contents` to a temp file in `path`'s directory, fsync it, then
/// atomically rename over `path`. On rename failure the temp file is left
/// in place and the original is untouched (spec §4.8).
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = sibling_with_suffix(path, ".slimtrace.tmp");

    {
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(contents)?;
        tmp_file.sync_all()?;
    }

    match std::fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            eprintln!(
                "slimtrace: atomic rename failed, rewritten content left at {} ({})",
                tmp_path.display(),
                err
            );
            let _ = dir; // directory already implied by tmp_path's location
            Err(err.into())
        }
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn backup_is_byte_identical_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        std::fs::write(&path, b"hello world").unwrap();

        let backup = backup_before_write(&path).unwrap();
        let mut contents = Vec::new();
        File::open(&backup).unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"hello world");
    }

    #[test]
    fn atomic_write_replaces_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        std::fs::write(&path, b"old").unwrap();

        atomic_write(&path, b"new").unwrap();
        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents, b"new");
    }
}
