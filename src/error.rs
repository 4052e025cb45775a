use crate::core::types::ManagerKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PkgsyncError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("Config file not found at: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("System command '{command}' failed: {reason}")]
    SystemCommandFailed { command: String, reason: String },

    /// Output from a package manager did not have the expected shape
    #[error("Could not parse {manager} output: {detail}")]
    Unparseable { manager: ManagerKind, detail: String },

    /// No usable native package manager on this host
    #[error("No usable package manager found: {0}")]
    NoPrerequisite(String),

    #[error("Operation interrupted by user")]
    Interrupted,

    /// Lock acquisition failed (another process holds the lockfile)
    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    /// Path resolution or validation error
    #[error("Path error: {0}")]
    PathError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PkgsyncError>;
