//! Pacman (Arch Linux repositories)
//!
//! Only native packages are reported here; foreign (AUR) packages belong to
//! the AUR backend so the two sets never overlap.

use crate::core::events::Reporter;
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::Result;
use crate::packages::command::{self, args_with, precheck};
use crate::packages::traits::PackageManager;
use crate::utils::sanitize;

const PACMAN: &str = "pacman";

pub struct PacmanManager;

impl PacmanManager {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PacmanManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for PacmanManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Pacman
    }

    fn is_available(&self) -> bool {
        which::which(PACMAN).is_ok()
    }

    fn update(&self, out: &Reporter) -> bool {
        command::run(self.kind(), PACMAN, &["-Sy".to_string()], true, out)
    }

    fn install(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        let args = args_with(&["-S", "--needed", "--noconfirm"], names);
        command::run(self.kind(), PACMAN, &args, true, out)
    }

    fn uninstall(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        let args = args_with(&["-Rns", "--noconfirm"], names);
        command::run(self.kind(), PACMAN, &args, true, out)
    }

    fn upgrade(&self, names: Option<&[String]>, out: &Reporter) -> bool {
        match names {
            Some(names) if !names.is_empty() => {
                if let Some(early) = precheck(self.kind(), names, out) {
                    return early;
                }
                let args = args_with(&["-S", "--noconfirm"], names);
                command::run(self.kind(), PACMAN, &args, true, out)
            }
            _ => command::run(
                self.kind(),
                PACMAN,
                &["-Su".to_string(), "--noconfirm".to_string()],
                true,
                out,
            ),
        }
    }

    fn list_installed(&self) -> Result<Vec<PackageInfo>> {
        Ok(command::query(self.kind(), PACMAN, &["-Qn"])
            .map(|stdout| parse_query(&stdout))
            .unwrap_or_default())
    }

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>> {
        let outdated = command::query(self.kind(), PACMAN, &["-Qu"])
            .map(|stdout| parse_query_upgrades(&stdout))
            .unwrap_or_default();

        // -Qu also reports foreign packages that happen to share a repo name
        let native: Vec<String> = self.list_installed()?.into_iter().map(|p| p.name).collect();
        Ok(outdated
            .into_iter()
            .filter(|info| native.contains(&info.name))
            .collect())
    }

    fn list_leaves(&self) -> Option<Result<Vec<String>>> {
        Some(Ok(command::query(self.kind(), PACMAN, &["-Qqen"])
            .map(|stdout| parse_names(&stdout))
            .unwrap_or_default()))
    }

    fn cleanup(&self, out: &Reporter) -> bool {
        let orphans = command::query(self.kind(), PACMAN, &["-Qdtq"])
            .map(|stdout| parse_names(&stdout))
            .unwrap_or_default();

        let removed = orphans.is_empty() || self.uninstall(&orphans, out);
        let cleaned = command::run(
            self.kind(),
            PACMAN,
            &["-Sc".to_string(), "--noconfirm".to_string()],
            true,
            out,
        );
        removed && cleaned
    }

    fn dependents(&self, name: &str) -> Result<Vec<String>> {
        if sanitize::validate_package_name(name).is_err() {
            return Ok(Vec::new());
        }
        command::require(self.kind(), PACMAN, &["-Qi", name]).map(|stdout| parse_required_by(&stdout))
    }
}

/// Parse `pacman -Q` style output: `name version`
pub(crate) fn parse_query(stdout: &str) -> Vec<PackageInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let version = parts.next().unwrap_or("unknown");
            Some(PackageInfo::new(name, version))
        })
        .collect()
}

/// Parse `pacman -Qu` style output: `name old -> new [ignored]`
pub(crate) fn parse_query_upgrades(stdout: &str) -> Vec<UpgradeInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [name, current, "->", new, ..] => Some(UpgradeInfo::new(*name, *current, *new)),
                _ => None,
            }
        })
        .collect()
}

pub(crate) fn parse_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Extract the "Required By" field of `pacman -Qi`
pub(crate) fn parse_required_by(stdout: &str) -> Vec<String> {
    for line in stdout.lines() {
        let line = line.trim();
        if line.starts_with("Required By") {
            // Format: "Required By  : pkg1 pkg2" or "Required By  : None"
            if let Some((_, deps)) = line.split_once(':') {
                let deps = deps.trim();
                if deps.is_empty() || deps == "None" {
                    return Vec::new();
                }
                return deps.split_whitespace().map(String::from).collect();
            }
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query() {
        assert_eq!(
            parse_query("git 2.44.0-1\nhtop 3.3.0-2\n\n"),
            vec![
                PackageInfo::new("git", "2.44.0-1"),
                PackageInfo::new("htop", "3.3.0-2"),
            ]
        );
    }

    #[test]
    fn parses_upgrades_and_ignores_noise() {
        let out = "git 2.44.0-1 -> 2.45.0-1\nlinux 6.8.1 -> 6.8.2 [ignored]\n:: warning\n";
        assert_eq!(
            parse_query_upgrades(out),
            vec![
                UpgradeInfo::new("git", "2.44.0-1", "2.45.0-1"),
                UpgradeInfo::new("linux", "6.8.1", "6.8.2"),
            ]
        );
    }

    #[test]
    fn parses_required_by() {
        let info = "Name            : zlib\nRequired By     : curl  openssl\nOptional For    : None\n";
        assert_eq!(parse_required_by(info), vec!["curl", "openssl"]);
        assert!(parse_required_by("Required By     : None\n").is_empty());
        assert!(parse_required_by("garbage").is_empty());
    }
}
