use crate::error::{PkgsyncError, Result};
use crate::project_identity;
use crate::ui;
use crate::utils::paths::lock_guard_path;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const LOCK_TIMEOUT_SECONDS: u64 = 300;

/// Exclusive advisory lock on `<lockfile>.lock`, released on drop
pub struct LockGuard {
    _file: std::fs::File,
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub(crate) fn acquire_lock_for(lockfile: &Path) -> Result<LockGuard> {
    let lock_path = lock_guard_path(lockfile);
    if let Some(dir) = lock_path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|e| PkgsyncError::IoError {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    if lock_path.exists() {
        let age_secs = fs::metadata(&lock_path)
            .ok()
            .and_then(|metadata| metadata.modified().ok())
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .map_or(0, |age| age.as_secs());

        let existing_file = OpenOptions::new().write(true).open(&lock_path)?;

        match existing_file.try_lock_exclusive() {
            Ok(()) => {
                if age_secs > LOCK_TIMEOUT_SECONDS {
                    ui::warning("Removing stale lock file (not actively locked)");
                }
                let _ = fs::remove_file(&lock_path);
            }
            Err(_) => {
                let age_hint = if age_secs > LOCK_TIMEOUT_SECONDS {
                    format!(
                        "\nLock appears older than {} seconds but is still actively locked.",
                        LOCK_TIMEOUT_SECONDS
                    )
                } else {
                    String::new()
                };
                return Err(PkgsyncError::LockError(format!(
                    "Another {} process is currently running.\n\
                     Lock file: {}{}\n\
                     Wait for it to complete, or delete the lock file if you're sure no other process is running.",
                    project_identity::BINARY_NAME,
                    lock_path.display(),
                    age_hint
                )));
            }
        }
    }

    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&lock_path)
        .map_err(|e| PkgsyncError::IoError {
            path: lock_path.clone(),
            source: e,
        })?;

    lock_file
        .try_lock_exclusive()
        .map_err(|e| PkgsyncError::LockError(format!("Failed to lock {}: {}", lock_path.display(), e)))?;

    let _ = writeln!(&lock_file, "{}", std::process::id());

    Ok(LockGuard {
        _file: lock_file,
        path: lock_path,
    })
}
