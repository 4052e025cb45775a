//! Mac App Store via the `mas` CLI
//!
//! Packages are identified by their numeric App Store id.

use crate::core::events::Reporter;
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::Result;
use crate::packages::command::{self, args_with, precheck};
use crate::packages::traits::PackageManager;
use regex::Regex;
use std::sync::LazyLock;

const MAS: &str = "mas";

/// `497799835  Xcode  (15.0)` or `497799835 Xcode (15.0 -> 15.1)`
static MAS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s+(.+?)\s+\(([^)]*)\)\s*$").expect("Invalid regex pattern")
});

pub struct MasManager;

impl MasManager {
    pub fn new() -> Self {
        Self
    }

    fn ids_only(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(bad) = names.iter().find(|id| !id.chars().all(|c| c.is_ascii_digit())) {
            out.warning(&format!("[mas] '{}' is not a numeric App Store id", bad));
            return false;
        }
        true
    }
}

impl Default for MasManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for MasManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Mas
    }

    fn is_available(&self) -> bool {
        which::which(MAS).is_ok()
    }

    fn install(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        if !self.ids_only(names, out) {
            return false;
        }
        command::run(self.kind(), MAS, &args_with(&["install"], names), false, out)
    }

    fn uninstall(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        if !self.ids_only(names, out) {
            return false;
        }
        // Removing from /Applications needs root
        command::run(self.kind(), MAS, &args_with(&["uninstall"], names), true, out)
    }

    fn upgrade(&self, names: Option<&[String]>, out: &Reporter) -> bool {
        let names = names.unwrap_or_default();
        if !names.is_empty() && !self.ids_only(names, out) {
            return false;
        }
        command::run(self.kind(), MAS, &args_with(&["upgrade"], names), false, out)
    }

    fn list_installed(&self) -> Result<Vec<PackageInfo>> {
        Ok(command::query(self.kind(), MAS, &["list"])
            .map(|stdout| parse_mas_list(&stdout))
            .unwrap_or_default())
    }

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>> {
        Ok(command::query(self.kind(), MAS, &["outdated"])
            .map(|stdout| parse_mas_outdated(&stdout))
            .unwrap_or_default())
    }
}

pub(crate) fn parse_mas_list(stdout: &str) -> Vec<PackageInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let caps = MAS_LINE.captures(line)?;
            Some(PackageInfo::new(&caps[1], caps[3].trim()))
        })
        .collect()
}

pub(crate) fn parse_mas_outdated(stdout: &str) -> Vec<UpgradeInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let caps = MAS_LINE.captures(line)?;
            let (current, new) = caps[3].split_once("->")?;
            Some(UpgradeInfo::new(&caps[1], current.trim(), new.trim()))
        })
        .collect()
}
