use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A PID lock file under the process-wide temp directory, one per guarded
/// session, so a second `guard` invocation on the same session refuses to
/// start (spec §4.7, §5, §6 exit code 4).
pub struct GuardLock {
    path: PathBuf,
}

impl GuardLock {
    /// Acquire the lock for `session_id`. Fails with `Error::LockHeld` if an
    /// existing lock file names a process that is still alive; a stale lock
    /// file (process gone) is reclaimed silently.
    pub fn acquire(session_id: &str) -> Result<GuardLock> {
        let path = slimtrace_core::path::guard_lock_path(session_id);
        if let Some(existing_pid) = read_pid(&path) {
            if process_is_alive(existing_pid) {
                return Err(Error::LockHeld(existing_pid));
            }
        }
        std::fs::write(&path, std::process::id().to_string())?;
        Ok(GuardLock { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for GuardLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn process_is_alive(pid: u32) -> bool {
    // Signal 0 performs no action but still validates the pid exists and is
    // reachable (same check a `kill -0` does from a shell).
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn process_is_alive(_pid: u32) -> bool {
    // Best effort off Unix: assume stale, since slimtrace targets Unix
    // coding-agent hosts (spec §1 scope).
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquiring_twice_for_the_same_live_process_is_refused() {
        let session_id = format!("guard-lock-test-{}", std::process::id());
        let _first = GuardLock::acquire(&session_id).unwrap();
        let second = GuardLock::acquire(&session_id);
        assert!(matches!(second, Err(Error::LockHeld(_))));
    }

    #[test]
    fn dropping_the_lock_releases_it_for_reacquisition() {
        let session_id = format!("guard-lock-test-drop-{}", std::process::id());
        {
            let _lock = GuardLock::acquire(&session_id).unwrap();
        }
        let reacquired = GuardLock::acquire(&session_id);
        assert!(reacquired.is_ok());
    }

    #[test]
    fn stale_lock_naming_a_dead_pid_is_reclaimed() {
        let session_id = format!("guard-lock-test-stale-{}", std::process::id());
        let path = slimtrace_core::path::guard_lock_path(&session_id);
        // PID 1 is init/launchd and will never match a freshly-forked test
        // process; pick an implausible-but-plausible-looking dead pid
        // instead by writing one well past any real process on this host
        // and relying on ESRCH from kill(2).
        std::fs::write(&path, "999999").unwrap();
        let lock = GuardLock::acquire(&session_id);
        assert!(lock.is_ok());
    }
}
