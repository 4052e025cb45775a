//! APT (Debian, Ubuntu and derivatives)

use crate::core::events::Reporter;
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::Result;
use crate::packages::command::{self, args_with, precheck};
use crate::packages::traits::PackageManager;
use crate::utils::sanitize;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const APT_GET: &str = "apt-get";

/// `deb http://ppa.launchpadcontent.net/neovim-ppa/stable/ubuntu jammy main`
static PPA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ppa\.launchpad(?:content)?\.net/([^/\s]+)/([^/\s]+)").expect("Invalid regex pattern")
});

pub struct AptManager {
    sources_dir: PathBuf,
}

impl AptManager {
    pub fn new() -> Self {
        Self {
            sources_dir: PathBuf::from("/etc/apt/sources.list.d"),
        }
    }

    fn apt_get(&self, args: Vec<String>, out: &Reporter) -> bool {
        command::run(self.kind(), APT_GET, &args, true, out)
    }
}

impl Default for AptManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for AptManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Apt
    }

    fn is_available(&self) -> bool {
        which::which(APT_GET).is_ok()
    }

    fn update(&self, out: &Reporter) -> bool {
        self.apt_get(vec!["update".to_string()], out)
    }

    fn install(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.apt_get(args_with(&["install", "-y"], names), out)
    }

    fn uninstall(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.apt_get(args_with(&["remove", "-y"], names), out)
    }

    fn upgrade(&self, names: Option<&[String]>, out: &Reporter) -> bool {
        match names {
            Some(names) if !names.is_empty() => {
                if let Some(early) = precheck(self.kind(), names, out) {
                    return early;
                }
                self.apt_get(args_with(&["install", "--only-upgrade", "-y"], names), out)
            }
            _ => self.apt_get(args_with(&["upgrade", "-y"], &[]), out),
        }
    }

    fn list_installed(&self) -> Result<Vec<PackageInfo>> {
        Ok(command::query(
            self.kind(),
            "dpkg-query",
            &["-W", "-f=${db:Status-Abbrev}\t${Package}\t${Version}\n"],
        )
        .map(|stdout| parse_dpkg_query(&stdout))
        .unwrap_or_default())
    }

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>> {
        Ok(command::query(self.kind(), "apt", &["list", "--upgradable"])
            .map(|stdout| parse_upgradable(&stdout))
            .unwrap_or_default())
    }

    fn list_leaves(&self) -> Option<Result<Vec<String>>> {
        Some(Ok(command::query(self.kind(), "apt-mark", &["showmanual"])
            .map(|stdout| {
                stdout
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()))
    }

    fn cleanup(&self, out: &Reporter) -> bool {
        let removed = self.apt_get(args_with(&["autoremove", "-y"], &[]), out);
        let cleaned = self.apt_get(vec!["clean".to_string()], out);
        removed && cleaned
    }

    fn supports_repositories(&self) -> bool {
        true
    }

    fn list_repositories(&self) -> Result<Vec<String>> {
        Ok(read_ppas(&self.sources_dir))
    }

    fn add_repository(&self, reference: &str, out: &Reporter) -> bool {
        if let Err(e) = sanitize::validate_repository_ref(reference) {
            out.warning(&e.to_string());
            return false;
        }
        command::run(
            self.kind(),
            "add-apt-repository",
            &["-y".to_string(), reference.to_string()],
            true,
            out,
        )
    }
}

/// Parse `dpkg-query -W -f='${db:Status-Abbrev}\t${Package}\t${Version}\n'`,
/// keeping only fully installed packages (`ii`).
pub(crate) fn parse_dpkg_query(stdout: &str) -> Vec<PackageInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let status = fields.next()?.trim();
            let name = fields.next()?.trim();
            let version = fields.next().unwrap_or("unknown").trim();
            (status == "ii" && !name.is_empty()).then(|| PackageInfo::new(name, version))
        })
        .collect()
}

/// Parse `apt list --upgradable`:
/// `git/jammy-updates 1:2.34.1-1ubuntu1.11 amd64 [upgradable from: 1:2.34.1-1ubuntu1.10]`
pub(crate) fn parse_upgradable(stdout: &str) -> Vec<UpgradeInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let (name, rest) = line.split_once('/')?;
            let new_version = rest.split_whitespace().nth(1)?;
            let (_, from) = rest.split_once("[upgradable from:")?;
            let current = from.trim().trim_end_matches(']').trim();
            Some(UpgradeInfo::new(name, current, new_version))
        })
        .collect()
}

/// PPAs referenced by files in `sources.list.d`, as `ppa:owner/name`
pub(crate) fn read_ppas(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut ppas: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| std::fs::read_to_string(entry.path()).ok())
        .flat_map(|content| parse_ppa_sources(&content))
        .collect();
    ppas.sort();
    ppas.dedup();
    ppas
}

pub(crate) fn parse_ppa_sources(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| {
            PPA_URL
                .captures_iter(line)
                .map(|caps| format!("ppa:{}/{}", &caps[1], &caps[2]))
                .collect::<Vec<_>>()
        })
        .collect()
}
