use crate::config::migration::{into_latest, parse_document};
use crate::config::types::{ConfigDocument, DeclaredConfig};
use crate::error::{PkgsyncError, Result};
use crate::state::io::write_atomically;
use crate::ui;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Outcome of [`migrate_file`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    Migrated { from: u32 },
    AlreadyCurrent,
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PkgsyncError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => PkgsyncError::IoError {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Write a config in the current schema
pub fn save_config(path: &Path, config: &DeclaredConfig) -> Result<()> {
    let mut content = serde_json::to_string_pretty(config)
        .map_err(|e| PkgsyncError::SerializationError(format!("Config serialization: {}", e)))?;
    content.push('\n');
    write_atomically(path, &content)
}

/// Load the declared config, migrating and persisting legacy files once
pub fn load_config(path: &Path) -> Result<DeclaredConfig> {
    let content = read_config(path)?;
    let document = parse_document(&content)
        .map_err(|e| PkgsyncError::ConfigError(format!("{}: {}", path.display(), e)))?;

    let legacy = matches!(document, ConfigDocument::V1(_));
    let config = into_latest(document);

    if legacy {
        save_config(path, &config)?;
        ui::info(&format!(
            "Migrated {} to config version {}",
            path.display(),
            config.version
        ));
    }

    Ok(config)
}

/// Rewrite a config file in the current schema if it is not already
pub fn migrate_file(path: &Path) -> Result<MigrationOutcome> {
    let content = read_config(path)?;
    let document = parse_document(&content)
        .map_err(|e| PkgsyncError::ConfigError(format!("{}: {}", path.display(), e)))?;

    match document {
        ConfigDocument::V2(_) => Ok(MigrationOutcome::AlreadyCurrent),
        legacy => {
            let from = legacy.version();
            save_config(path, &into_latest(legacy))?;
            Ok(MigrationOutcome::Migrated { from })
        }
    }
}
