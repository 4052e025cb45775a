mod locking;
mod persist;

use crate::error::{PkgsyncError, Result};
use crate::state::types::{LockDocument, Lockfile, LockfileV1};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub use locking::LockGuard;
pub(crate) use persist::write_atomically;

/// Reads and writes the lockfile at a fixed path
#[derive(Debug, Clone)]
pub struct LockStore {
    path: PathBuf,
}

impl LockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The lockfile as stored, or `None` when there is none yet.
    ///
    /// Both schema versions are accepted.
    pub fn load(&self) -> Result<Option<LockDocument>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PkgsyncError::IoError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        parse_lock_document(&content)
            .map(Some)
            .map_err(|e| PkgsyncError::SerializationError(format!("{}: {}", self.path.display(), e)))
    }

    /// Exclusive writer lock; held for the duration of a read-merge-write cycle
    pub fn lock(&self) -> Result<LockGuard> {
        locking::acquire_lock_for(&self.path)
    }

    /// Persist in the current schema
    pub fn save(&self, lockfile: &Lockfile) -> Result<()> {
        let mut content = serde_json::to_string_pretty(lockfile)
            .map_err(|e| PkgsyncError::SerializationError(format!("Lockfile serialization: {}", e)))?;
        content.push('\n');
        write_atomically(&self.path, &content)
    }
}

pub fn parse_lock_document(content: &str) -> Result<LockDocument> {
    let value: Value = serde_json::from_str(content)?;
    match value.get("version").and_then(Value::as_u64) {
        Some(1) | None => Ok(LockDocument::V1(serde_json::from_value::<LockfileV1>(value)?)),
        Some(2) => Ok(LockDocument::V2(serde_json::from_value::<Lockfile>(value)?)),
        Some(other) => Err(PkgsyncError::SerializationError(format!(
            "Unsupported lockfile version {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests;
