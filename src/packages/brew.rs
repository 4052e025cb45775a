//! Homebrew package manager
//!
//! One type serves both halves of Homebrew: formulas and casks are exposed as
//! two independent managers sharing the `brew` binary.

use crate::core::events::Reporter;
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::{PkgsyncError, Result};
use crate::packages::command::{self, args_with, precheck};
use crate::packages::traits::PackageManager;
use crate::utils::sanitize;
use serde::Deserialize;
use std::collections::HashMap;

const BREW: &str = "brew";

pub struct BrewManager {
    cask: bool,
    program: String,
}

impl BrewManager {
    pub fn formulas() -> Self {
        Self {
            cask: false,
            program: BREW.to_string(),
        }
    }

    pub fn casks() -> Self {
        Self {
            cask: true,
            program: BREW.to_string(),
        }
    }

    /// Drive a specific `brew` executable instead of the one on PATH
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn type_flag(&self) -> &'static str {
        if self.cask { "--cask" } else { "--formula" }
    }
}

impl PackageManager for BrewManager {
    fn kind(&self) -> ManagerKind {
        if self.cask {
            ManagerKind::HomebrewCask
        } else {
            ManagerKind::Homebrew
        }
    }

    fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    fn update(&self, out: &Reporter) -> bool {
        // Formulas and casks share one index; refreshing it once is enough
        if self.cask {
            return true;
        }
        command::run(self.kind(), &self.program, &["update".to_string()], false, out)
    }

    fn install(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        let args = args_with(&["install", self.type_flag()], names);
        command::run(self.kind(), &self.program, &args, false, out)
    }

    fn uninstall(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        let args = args_with(&["uninstall", self.type_flag()], names);
        command::run(self.kind(), &self.program, &args, false, out)
    }

    fn upgrade(&self, names: Option<&[String]>, out: &Reporter) -> bool {
        let names = names.unwrap_or_default();
        if !names.is_empty()
            && let Some(early) = precheck(self.kind(), names, out)
        {
            return early;
        }
        let args = args_with(&["upgrade", self.type_flag()], names);
        command::run(self.kind(), &self.program, &args, false, out)
    }

    fn list_installed(&self) -> Result<Vec<PackageInfo>> {
        let Some(stdout) = command::query(self.kind(), &self.program, &["list", "--versions", self.type_flag()])
        else {
            return Ok(Vec::new());
        };
        Ok(parse_list_versions(&stdout))
    }

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>> {
        let Some(stdout) =
            command::query(self.kind(), &self.program, &["outdated", self.type_flag(), "--json=v2"])
        else {
            return Ok(Vec::new());
        };
        parse_outdated_json(&stdout, self.cask)
    }

    fn list_leaves(&self) -> Option<Result<Vec<String>>> {
        // Casks have no dependency graph of their own
        if self.cask {
            return None;
        }
        let leaves = command::query(self.kind(), &self.program, &["leaves", "--installed-on-request"])
            .map(|stdout| parse_lines(&stdout))
            .unwrap_or_default();
        Some(Ok(leaves))
    }

    fn cleanup(&self, out: &Reporter) -> bool {
        // `brew cleanup` already covers cask downloads
        if self.cask {
            return true;
        }
        let autoremoved = command::run(self.kind(), &self.program, &["autoremove".to_string()], false, out);
        let cleaned = command::run(self.kind(), &self.program, &["cleanup".to_string()], false, out);
        autoremoved && cleaned
    }

    fn supports_repositories(&self) -> bool {
        !self.cask
    }

    fn list_repositories(&self) -> Result<Vec<String>> {
        if self.cask {
            return Ok(Vec::new());
        }
        Ok(command::query(self.kind(), &self.program, &["tap"])
            .map(|stdout| parse_lines(&stdout))
            .unwrap_or_default())
    }

    fn add_repository(&self, reference: &str, out: &Reporter) -> bool {
        if self.cask {
            return false;
        }
        if let Err(e) = sanitize::validate_repository_ref(reference) {
            out.warning(&e.to_string());
            return false;
        }
        command::run(
            self.kind(),
            &self.program,
            &["tap".to_string(), reference.to_string()],
            false,
            out,
        )
    }

    fn dependents(&self, name: &str) -> Result<Vec<String>> {
        if self.cask || sanitize::validate_package_name(name).is_err() {
            return Ok(Vec::new());
        }
        command::require(self.kind(), &self.program, &["uses", "--installed", name])
            .map(|stdout| parse_lines(&stdout))
    }

    fn package_origins(&self) -> Result<HashMap<String, String>> {
        if self.cask {
            return Ok(HashMap::new());
        }
        let Some(stdout) =
            command::query(self.kind(), &self.program, &["info", "--json=v2", "--installed"])
        else {
            return Ok(HashMap::new());
        };
        parse_info_taps(&stdout)
    }
}

fn parse_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Parse `brew list --versions`:
/// `name 1.2.3 1.2.4` (several kegs may be listed; the last one wins)
pub(crate) fn parse_list_versions(stdout: &str) -> Vec<PackageInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let version = parts.last().unwrap_or("unknown");
            Some(PackageInfo::new(name, version))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct OutdatedReport {
    #[serde(default)]
    formulae: Vec<OutdatedEntry>,
    #[serde(default)]
    casks: Vec<OutdatedEntry>,
}

#[derive(Debug, Deserialize)]
struct OutdatedEntry {
    name: String,
    installed_versions: InstalledVersions,
    current_version: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstalledVersions {
    Many(Vec<String>),
    One(String),
}

impl InstalledVersions {
    fn latest(&self) -> String {
        match self {
            Self::Many(versions) => versions.last().cloned().unwrap_or_default(),
            Self::One(version) => version.clone(),
        }
    }
}

/// Parse `brew outdated --json=v2`
pub(crate) fn parse_outdated_json(stdout: &str, cask: bool) -> Result<Vec<UpgradeInfo>> {
    let kind = if cask {
        ManagerKind::HomebrewCask
    } else {
        ManagerKind::Homebrew
    };

    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }

    let report: OutdatedReport =
        serde_json::from_str(stdout).map_err(|e| PkgsyncError::Unparseable {
            manager: kind,
            detail: e.to_string(),
        })?;

    let entries = if cask { report.casks } else { report.formulae };
    Ok(entries
        .into_iter()
        .map(|entry| {
            UpgradeInfo::new(
                entry.name,
                entry.installed_versions.latest(),
                entry.current_version,
            )
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct InfoReport {
    #[serde(default)]
    formulae: Vec<InfoFormula>,
}

#[derive(Debug, Deserialize)]
struct InfoFormula {
    name: String,
    #[serde(default)]
    tap: Option<String>,
}

/// Parse `brew info --json=v2 --installed` into name -> tap
pub(crate) fn parse_info_taps(stdout: &str) -> Result<HashMap<String, String>> {
    let report: InfoReport =
        serde_json::from_str(stdout).map_err(|e| PkgsyncError::Unparseable {
            manager: ManagerKind::Homebrew,
            detail: e.to_string(),
        })?;

    Ok(report
        .formulae
        .into_iter()
        .filter_map(|formula| formula.tap.map(|tap| (formula.name, tap)))
        .collect())
}
