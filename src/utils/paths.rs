use crate::error::{PkgsyncError, Result};
use crate::project_identity;
use directories::{ProjectDirs, UserDirs};
use std::path::{Path, PathBuf};

pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let user_dirs = UserDirs::new()
        .ok_or_else(|| PkgsyncError::PathError("Could not determine user home directory".to_string()))?;
    let home = user_dirs.home_dir();

    if path_str == "~" {
        return Ok(home.to_path_buf());
    }

    let stripped = path_str
        .strip_prefix("~/")
        .ok_or_else(|| PkgsyncError::PathError(format!("Invalid path format: {}", path_str)))?;

    Ok(home.join(stripped))
}

pub fn config_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", project_identity::CONFIG_DIR_NAME, project_identity::CONFIG_DIR_NAME)
        .ok_or_else(|| PkgsyncError::PathError("Could not determine config directory".to_string()))?;
    Ok(proj.config_dir().to_path_buf())
}

/// `$PKGSYNC_CONFIG` when set, otherwise `<config_dir>/packages.json`
pub fn config_file() -> Result<PathBuf> {
    resolve_override(
        std::env::var_os(project_identity::env_key("CONFIG")),
        project_identity::CONFIG_FILE_BASENAME,
    )
}

/// `$PKGSYNC_LOCKFILE` when set, otherwise `<config_dir>/packages.lock.json`
pub fn lockfile() -> Result<PathBuf> {
    resolve_override(
        std::env::var_os(project_identity::env_key("LOCKFILE")),
        project_identity::LOCKFILE_BASENAME,
    )
}

fn resolve_override(value: Option<std::ffi::OsString>, basename: &str) -> Result<PathBuf> {
    match value {
        Some(value) if !value.is_empty() => expand_home(Path::new(&value)),
        _ => Ok(config_dir()?.join(basename)),
    }
}

/// Advisory lock file guarding writes to `path`
pub fn lock_guard_path(path: &Path) -> PathBuf {
    let mut guard = path.as_os_str().to_owned();
    guard.push(".lock");
    PathBuf::from(guard)
}
