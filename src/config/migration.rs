//! Config schema migrations.
//!
//! Each step is a pure function from one version to the next; loading runs
//! them in order until the document is at the current version.

use crate::config::types::{
    CURRENT_CONFIG_VERSION, ConfigDocument, DeclaredConfig, DeclaredConfigV1, GlobalSection,
    MacosSection,
};
use crate::error::{PkgsyncError, Result};
use serde_json::Value;

/// V1 was macOS-only: every top-level list becomes part of the `macos` section
pub fn migrate_v1(v1: &DeclaredConfigV1) -> DeclaredConfig {
    DeclaredConfig {
        version: CURRENT_CONFIG_VERSION,
        config: v1.config,
        global: GlobalSection::default(),
        macos: Some(MacosSection {
            taps: v1.taps.clone(),
            formulas: v1.packages.clone(),
            casks: v1.casks.clone(),
            mas: v1.mas.clone(),
            cargo: Vec::new(),
        }),
        linux: None,
        arch: None,
        debian: None,
        fedora: None,
    }
}

/// Identify the schema of raw config JSON.
///
/// A missing `version` field means V1.
pub fn parse_document(content: &str) -> Result<ConfigDocument> {
    let value: Value = serde_json::from_str(content)?;
    let version = match value.get("version") {
        None | Some(Value::Null) => 1,
        Some(v) => v.as_u64().ok_or_else(|| {
            PkgsyncError::ConfigError(format!("'version' must be a number, found {}", v))
        })?,
    };

    match version {
        1 => Ok(ConfigDocument::V1(serde_json::from_value(value)?)),
        2 => Ok(ConfigDocument::V2(serde_json::from_value(value)?)),
        other => Err(PkgsyncError::ConfigError(format!(
            "Unsupported config version {} (this build reads up to {})",
            other, CURRENT_CONFIG_VERSION
        ))),
    }
}

/// Run every migration step needed to reach the current schema
pub fn into_latest(document: ConfigDocument) -> DeclaredConfig {
    match document {
        ConfigDocument::V1(v1) => migrate_v1(&v1),
        ConfigDocument::V2(v2) => v2,
    }
}
