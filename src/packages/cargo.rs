//! Cargo package manager
//!
//! Installs and manages Rust binaries with `cargo install`. Outdated
//! detection needs the `cargo-update` subcommand; without it nothing is
//! reported as outdated.

use crate::core::events::Reporter;
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::Result;
use crate::packages::command::{self, args_with, precheck};
use crate::packages::traits::PackageManager;

const CARGO: &str = "cargo";
const INSTALL_UPDATE: &str = "cargo-install-update";

pub struct CargoManager;

impl CargoManager {
    pub fn new() -> Self {
        Self
    }

    fn cargo(&self, args: Vec<String>, out: &Reporter) -> bool {
        command::run(self.kind(), CARGO, &args, false, out)
    }

    fn has_install_update(&self) -> bool {
        which::which(INSTALL_UPDATE).is_ok()
    }
}

impl Default for CargoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for CargoManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Cargo
    }

    fn is_available(&self) -> bool {
        which::which(CARGO).is_ok()
    }

    fn install(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.cargo(args_with(&["install"], names), out)
    }

    fn uninstall(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.cargo(args_with(&["uninstall"], names), out)
    }

    fn upgrade(&self, names: Option<&[String]>, out: &Reporter) -> bool {
        match names {
            Some(names) if !names.is_empty() => {
                if let Some(early) = precheck(self.kind(), names, out) {
                    return early;
                }
                if self.has_install_update() {
                    self.cargo(args_with(&["install-update"], names), out)
                } else {
                    // `cargo install` replaces an older build of the same crate
                    self.cargo(args_with(&["install"], names), out)
                }
            }
            _ => {
                if self.has_install_update() {
                    self.cargo(args_with(&["install-update", "-a"], &[]), out)
                } else {
                    out.warning("[cargo] install cargo-update to upgrade all crates");
                    false
                }
            }
        }
    }

    fn list_installed(&self) -> Result<Vec<PackageInfo>> {
        Ok(command::query(self.kind(), CARGO, &["install", "--list"])
            .map(|stdout| parse_install_list(&stdout))
            .unwrap_or_default())
    }

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>> {
        if !self.has_install_update() {
            return Ok(Vec::new());
        }
        Ok(command::query(self.kind(), CARGO, &["install-update", "--list"])
            .map(|stdout| parse_install_update_list(&stdout))
            .unwrap_or_default())
    }
}

/// Parse `cargo install --list`:
///
/// ```text
/// ripgrep v14.1.0:
///     rg
/// ```
pub(crate) fn parse_install_list(stdout: &str) -> Vec<PackageInfo> {
    stdout
        .lines()
        .filter(|line| !line.starts_with(char::is_whitespace))
        .filter_map(|line| {
            let line = line.trim().strip_suffix(':')?;
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let version = parts.next().unwrap_or("unknown");
            Some(PackageInfo::new(name, version.strip_prefix('v').unwrap_or(version)))
        })
        .collect()
}

/// Parse the table printed by `cargo install-update --list`:
///
/// ```text
/// Package      Installed  Latest   Needs update
/// ripgrep      v14.0.0    v14.1.0  Yes
/// ```
pub(crate) fn parse_install_update_list(stdout: &str) -> Vec<UpgradeInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [name, current, latest, "Yes"] => Some(UpgradeInfo::new(
                    *name,
                    current.strip_prefix('v').unwrap_or(current),
                    latest.strip_prefix('v').unwrap_or(latest),
                )),
                _ => None,
            }
        })
        .collect()
}
