//! Input sanitization utilities for security
//!
//! Package names and repository references come from a user-edited config
//! file and end up as process arguments (often under sudo). Anything outside
//! a conservative character set is rejected before it reaches a command.

use crate::error::{PkgsyncError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Safe characters for package names across different package managers
/// Allows: alphanumeric, dash, underscore, dot, plus, at sign, slash (for taps and scopes)
static SAFE_PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9@._+/-]+$").expect("Invalid regex pattern"));

/// Repository references additionally use a scheme prefix (`ppa:`, `copr:`)
static SAFE_REPOSITORY_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9@._+/:-]+$").expect("Invalid regex pattern"));

const MAX_NAME_LEN: usize = 256;

fn validate_with(value: &str, pattern: &Regex, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(PkgsyncError::ConfigError(format!("{} cannot be empty", what)));
    }

    if value.len() > MAX_NAME_LEN {
        return Err(PkgsyncError::ConfigError(format!(
            "{} too long (max {} chars): {}...",
            what,
            MAX_NAME_LEN,
            value.chars().take(50).collect::<String>()
        )));
    }

    if value.starts_with('-') {
        return Err(PkgsyncError::ConfigError(format!(
            "{} cannot start with '-': {}",
            what, value
        )));
    }

    if !pattern.is_match(value) {
        return Err(PkgsyncError::ConfigError(format!(
            "{} contains invalid characters: {}",
            what, value
        )));
    }

    // Prevent path traversal
    if value.contains("..") {
        return Err(PkgsyncError::ConfigError(format!(
            "{} cannot contain path traversal: {}",
            what, value
        )));
    }

    Ok(())
}

/// Validate a package name is safe to pass to a package manager
pub fn validate_package_name(name: &str) -> Result<()> {
    validate_with(name, &SAFE_PACKAGE_NAME, "Package name")
}

/// Validate a list of package names
pub fn validate_package_names(names: &[String]) -> Result<()> {
    for name in names {
        validate_package_name(name)?;
    }
    Ok(())
}

/// Validate a tap / PPA / COPR / remote reference
pub fn validate_repository_ref(reference: &str) -> Result<()> {
    validate_with(reference, &SAFE_REPOSITORY_REF, "Repository reference")
}
