//! DNF (Fedora, RHEL and derivatives)

use crate::core::events::Reporter;
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::Result;
use crate::packages::command::{self, args_with, precheck};
use crate::packages::traits::PackageManager;
use crate::utils::sanitize;
use std::collections::HashMap;

const DNF: &str = "dnf";

/// Prefix used in config for COPR repositories (`copr:owner/project`)
pub const COPR_PREFIX: &str = "copr:";

/// `dnf check-update` exits 100 when updates are available
const CHECK_UPDATE_PENDING: i32 = 100;

pub struct DnfManager;

impl DnfManager {
    pub fn new() -> Self {
        Self
    }

    fn dnf(&self, args: Vec<String>, out: &Reporter) -> bool {
        command::run(self.kind(), DNF, &args, true, out)
    }
}

impl Default for DnfManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for DnfManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Dnf
    }

    fn is_available(&self) -> bool {
        which::which(DNF).is_ok()
    }

    fn update(&self, out: &Reporter) -> bool {
        self.dnf(vec!["makecache".to_string()], out)
    }

    fn install(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.dnf(args_with(&["install", "-y"], names), out)
    }

    fn uninstall(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.dnf(args_with(&["remove", "-y"], names), out)
    }

    fn upgrade(&self, names: Option<&[String]>, out: &Reporter) -> bool {
        let names = names.unwrap_or_default();
        if !names.is_empty()
            && let Some(early) = precheck(self.kind(), names, out)
        {
            return early;
        }
        self.dnf(args_with(&["upgrade", "-y"], names), out)
    }

    fn list_installed(&self) -> Result<Vec<PackageInfo>> {
        Ok(command::query(
            self.kind(),
            "rpm",
            &["-qa", "--queryformat", "%{NAME}\t%{VERSION}-%{RELEASE}\n"],
        )
        .map(|stdout| parse_rpm_query(&stdout))
        .unwrap_or_default())
    }

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>> {
        let Some(stdout) = command::query_with_codes(
            self.kind(),
            DNF,
            &["check-update", "-q"],
            &[CHECK_UPDATE_PENDING],
        ) else {
            return Ok(Vec::new());
        };

        let installed: HashMap<String, String> = self
            .list_installed()?
            .into_iter()
            .map(|p| (p.name, p.version))
            .collect();
        Ok(parse_check_update(&stdout, &installed))
    }

    fn list_leaves(&self) -> Option<Result<Vec<String>>> {
        Some(Ok(command::query(
            self.kind(),
            DNF,
            &["repoquery", "--userinstalled", "--qf", "%{name}\n"],
        )
        .map(|stdout| {
            let mut names: Vec<String> = stdout
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();
            names.dedup();
            names
        })
        .unwrap_or_default()))
    }

    fn cleanup(&self, out: &Reporter) -> bool {
        let removed = self.dnf(args_with(&["autoremove", "-y"], &[]), out);
        let cleaned = self.dnf(args_with(&["clean", "all"], &[]), out);
        removed && cleaned
    }

    fn supports_repositories(&self) -> bool {
        true
    }

    fn list_repositories(&self) -> Result<Vec<String>> {
        Ok(command::query(self.kind(), DNF, &["copr", "list"])
            .map(|stdout| parse_copr_list(&stdout))
            .unwrap_or_default())
    }

    fn add_repository(&self, reference: &str, out: &Reporter) -> bool {
        if let Err(e) = sanitize::validate_repository_ref(reference) {
            out.warning(&e.to_string());
            return false;
        }
        let project = reference.strip_prefix(COPR_PREFIX).unwrap_or(reference);
        self.dnf(args_with(&["copr", "enable", "-y"], &[project.to_string()]), out)
    }
}

/// Parse `rpm -qa --queryformat '%{NAME}\t%{VERSION}-%{RELEASE}\n'`
pub(crate) fn parse_rpm_query(stdout: &str) -> Vec<PackageInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let (name, version) = line.split_once('\t')?;
            let name = name.trim();
            (!name.is_empty()).then(|| PackageInfo::new(name, version.trim()))
        })
        .collect()
}

/// Parse `dnf check-update -q`: `name.arch  new-version  repo`.
///
/// The current version is looked up in the installed listing.
pub(crate) fn parse_check_update(
    stdout: &str,
    installed: &HashMap<String, String>,
) -> Vec<UpgradeInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let [name_arch, new_version, _repo] = parts.as_slice() else {
                return None;
            };
            let name = name_arch
                .rsplit_once('.')
                .map_or(*name_arch, |(name, _arch)| name);
            let current = installed.get(name).map_or("unknown", String::as_str);
            Some(UpgradeInfo::new(name, current, *new_version))
        })
        .collect()
}

/// Parse `dnf copr list` (`copr.fedorainfracloud.org/owner/project`) into `copr:owner/project`
pub(crate) fn parse_copr_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("(disabled)"))
        .filter_map(|line| {
            let mut segments = line.split('/');
            let _host = segments.next()?;
            let owner = segments.next()?;
            let project = segments.next()?;
            Some(format!("{}{}/{}", COPR_PREFIX, owner, project))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpm_query() {
        assert_eq!(
            parse_rpm_query("git\t2.44.0-1.fc40\nvim-enhanced\t9.1.0-1.fc40\n"),
            vec![
                PackageInfo::new("git", "2.44.0-1.fc40"),
                PackageInfo::new("vim-enhanced", "9.1.0-1.fc40"),
            ]
        );
    }

    #[test]
    fn check_update_uses_installed_versions() {
        let installed = HashMap::from([("git".to_string(), "2.44.0-1.fc40".to_string())]);
        let out = "\ngit.x86_64   2.45.0-1.fc40   updates\nObsoleting Packages\n";
        assert_eq!(
            parse_check_update(out, &installed),
            vec![UpgradeInfo::new("git", "2.44.0-1.fc40", "2.45.0-1.fc40")]
        );
    }

    #[test]
    fn copr_list() {
        let out = "copr.fedorainfracloud.org/atim/lazygit\ncopr.fedorainfracloud.org/old/thing (disabled)\n";
        assert_eq!(parse_copr_list(out), vec!["copr:atim/lazygit"]);
    }
}
