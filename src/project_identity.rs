//! Central project identity contract.
//!
//! This module is the single source of truth for runtime identity values.

pub const DISPLAY_NAME: &str = "pkgsync";
pub const BINARY_NAME: &str = "pkgsync";
pub const CONFIG_DIR_NAME: &str = "pkgsync";
pub const ENV_PREFIX: &str = "PKGSYNC";
pub const CONFIG_FILE_BASENAME: &str = "packages.json";
pub const LOCKFILE_BASENAME: &str = "packages.lock.json";

pub fn env_key(suffix: &str) -> String {
    format!("{}_{}", ENV_PREFIX, suffix)
}
