use crate::error::{PkgsyncError, Result};
use crate::ui;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Replace `path` with `content` via a synced temp file and a rename.
///
/// Readers see either the old or the new file, never a partial write.
pub(crate) fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => {
            return Err(PkgsyncError::PathError(format!(
                "Invalid path (no parent directory): {}",
                path.display()
            )));
        }
    };

    fs::create_dir_all(dir).map_err(|e| PkgsyncError::IoError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| PkgsyncError::PathError(format!("Invalid file path: {}", path.display())))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let mut tmp_file = fs::File::create(&tmp_path).map_err(|e| PkgsyncError::IoError {
        path: tmp_path.clone(),
        source: e,
    })?;
    tmp_file.write_all(content.as_bytes())?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| PkgsyncError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Ok(dir_file) = fs::File::open(dir)
        && let Err(e) = dir_file.sync_all()
    {
        ui::verbose(&format!("Failed to sync directory {}: {}", dir.display(), e));
    }

    Ok(())
}
