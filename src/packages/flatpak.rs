//! Flatpak applications (system installation, Flathub by default)

use crate::core::events::Reporter;
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::Result;
use crate::packages::command::{self, args_with, precheck};
use crate::packages::traits::PackageManager;
use crate::utils::sanitize;
use std::collections::HashMap;

const FLATPAK: &str = "flatpak";
/// Remote every declared application is installed from
pub const DEFAULT_REMOTE: &str = "flathub";
const FLATHUB_REPO: &str = "https://dl.flathub.org/repo/flathub.flatpakrepo";

pub struct FlatpakManager;

impl FlatpakManager {
    pub fn new() -> Self {
        Self
    }

    fn flatpak(&self, args: Vec<String>, out: &Reporter) -> bool {
        command::run(self.kind(), FLATPAK, &args, false, out)
    }
}

impl Default for FlatpakManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for FlatpakManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Flatpak
    }

    fn is_available(&self) -> bool {
        which::which(FLATPAK).is_ok()
    }

    fn update(&self, out: &Reporter) -> bool {
        self.flatpak(vec!["update".to_string(), "--appstream".to_string()], out)
    }

    fn install(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.flatpak(
            args_with(&["install", "-y", "--noninteractive", DEFAULT_REMOTE], names),
            out,
        )
    }

    fn uninstall(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.flatpak(args_with(&["uninstall", "-y", "--noninteractive"], names), out)
    }

    fn upgrade(&self, names: Option<&[String]>, out: &Reporter) -> bool {
        let names = names.unwrap_or_default();
        if !names.is_empty()
            && let Some(early) = precheck(self.kind(), names, out)
        {
            return early;
        }
        self.flatpak(args_with(&["update", "-y", "--noninteractive"], names), out)
    }

    fn list_installed(&self) -> Result<Vec<PackageInfo>> {
        Ok(command::query(
            self.kind(),
            FLATPAK,
            &["list", "--app", "--columns=application,version,origin"],
        )
        .map(|stdout| parse_columns(&stdout).into_iter().map(|row| row.info).collect())
        .unwrap_or_default())
    }

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>> {
        let Some(stdout) = command::query(
            self.kind(),
            FLATPAK,
            &["remote-ls", "--updates", "--app", "--columns=application,version"],
        ) else {
            return Ok(Vec::new());
        };

        let installed: HashMap<String, String> = self
            .list_installed()?
            .into_iter()
            .map(|p| (p.name, p.version))
            .collect();

        Ok(parse_columns(&stdout)
            .into_iter()
            .map(|row| {
                let current = installed
                    .get(&row.info.name)
                    .map_or("unknown", String::as_str);
                UpgradeInfo::new(&row.info.name, current, &row.info.version)
            })
            .collect())
    }

    fn cleanup(&self, out: &Reporter) -> bool {
        self.flatpak(args_with(&["uninstall", "--unused", "-y"], &[]), out)
    }

    fn supports_repositories(&self) -> bool {
        true
    }

    fn list_repositories(&self) -> Result<Vec<String>> {
        Ok(command::query(self.kind(), FLATPAK, &["remotes", "--columns=name"])
            .map(|stdout| {
                stdout
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Only Flathub has a well-known URL; other remotes need one in `name=url` form
    fn add_repository(&self, reference: &str, out: &Reporter) -> bool {
        let (name, url) = match reference.split_once('=') {
            Some((name, url)) => (name, url),
            None if reference == DEFAULT_REMOTE => (DEFAULT_REMOTE, FLATHUB_REPO),
            None => {
                out.warning(&format!(
                    "[flatpak] remote '{}' needs a URL (name=url)",
                    reference
                ));
                return false;
            }
        };
        if let Err(e) = sanitize::validate_repository_ref(name) {
            out.warning(&e.to_string());
            return false;
        }
        self.flatpak(
            args_with(
                &["remote-add", "--if-not-exists"],
                &[name.to_string(), url.to_string()],
            ),
            out,
        )
    }

    fn package_origins(&self) -> Result<HashMap<String, String>> {
        Ok(command::query(
            self.kind(),
            FLATPAK,
            &["list", "--app", "--columns=application,version,origin"],
        )
        .map(|stdout| {
            parse_columns(&stdout)
                .into_iter()
                .filter_map(|row| row.origin.map(|origin| (row.info.name, origin)))
                .collect()
        })
        .unwrap_or_default())
    }
}

pub(crate) struct FlatpakRow {
    pub info: PackageInfo,
    pub origin: Option<String>,
}

/// Parse tab separated `--columns=application,version[,origin]` output.
///
/// Apps without a version string are reported as `unknown`.
pub(crate) fn parse_columns(stdout: &str) -> Vec<FlatpakRow> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t').map(str::trim);
            let name = fields.next().filter(|name| !name.is_empty())?;
            let version = fields
                .next()
                .filter(|version| !version.is_empty())
                .unwrap_or("unknown");
            let origin = fields
                .next()
                .filter(|origin| !origin.is_empty())
                .map(String::from);
            Some(FlatpakRow {
                info: PackageInfo::new(name, version),
                origin,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_with_origin() {
        let rows = parse_columns("org.mozilla.firefox\t128.0\tflathub\ncom.example.NoVer\t\tfedora\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].info, PackageInfo::new("org.mozilla.firefox", "128.0"));
        assert_eq!(rows[0].origin.as_deref(), Some("flathub"));
        assert_eq!(rows[1].info, PackageInfo::new("com.example.NoVer", "unknown"));
        assert_eq!(rows[1].origin.as_deref(), Some("fedora"));
    }

    #[test]
    fn columns_without_origin() {
        let rows = parse_columns("org.gimp.GIMP\t2.10.38\n\n");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].origin.is_none());
    }

    #[test]
    fn unknown_remote_without_url_is_rejected() {
        let (reporter, _events, _answers) = Reporter::channel();
        assert!(!FlatpakManager::new().add_repository("kde-nightly", &reporter));
    }
}
