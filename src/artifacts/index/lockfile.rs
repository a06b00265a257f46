//! Advisory lock file for the staging index
//!
//! Every read-modify-write cycle on the index happens while holding a lock
//! file adjacent to it (`index.lock`). Acquisition retries a bounded number
//! of times with exponential back-off; a lock whose file has not changed for
//! longer than the stale threshold is assumed abandoned by a dead process
//! and stolen.
//!
//! The guard releases on drop, so every exit path (including failures)
//! removes the lock file.

use crate::errors::RepoError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry attempts before giving up with `LockTimeout`
const MAX_ATTEMPTS: u32 = 5;

/// First back-off interval; doubles on each failed attempt
const BASE_BACKOFF: Duration = Duration::from_millis(15);

/// Age after which a lock is considered abandoned and may be stolen
const STALE_AFTER: Duration = Duration::from_secs(10);

/// Held lock on the index. Dropping it releases the lock.
#[derive(Debug)]
pub struct Lockfile {
    path: PathBuf,
}

impl Lockfile {
    /// Acquire the lock protecting `target` (the index file itself).
    pub fn acquire(target: &Path) -> anyhow::Result<Self> {
        Self::acquire_with_stale_threshold(target, STALE_AFTER)
    }

    /// Acquisition with an explicit stale threshold.
    pub fn acquire_with_stale_threshold(
        target: &Path,
        stale_after: Duration,
    ) -> anyhow::Result<Self> {
        let path = Self::lock_path(target);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        for attempt in 0..MAX_ATTEMPTS {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    use std::io::Write;
                    let _ = writeln!(file, "{}", std::process::id());
                    debug!(path = %path.display(), "acquired index lock");
                    return Ok(Lockfile { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Self::is_stale(&path, stale_after) {
                        warn!(path = %path.display(), "stealing stale index lock");
                        // A concurrent stealer may have removed it already.
                        match std::fs::remove_file(&path) {
                            Ok(()) => continue,
                            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                            Err(e) => return Err(RepoError::IoError(e.to_string()).into()),
                        }
                    }

                    std::thread::sleep(BASE_BACKOFF * 2u32.pow(attempt));
                }
                Err(e) => return Err(RepoError::IoError(e.to_string()).into()),
            }
        }

        Err(RepoError::LockTimeout.into())
    }

    /// Path of the lock file guarding `target`.
    pub fn lock_path(target: &Path) -> PathBuf {
        let mut name = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        name.push_str(".lock");
        target.with_file_name(name)
    }

    fn is_stale(path: &Path, stale_after: Duration) -> bool {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .map(|age| age > stale_after)
            .unwrap_or(false)
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %e, "failed to release index lock");
        }
    }
}
