use crate::core::events::Reporter;
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::Result;
use crate::packages::command::{self, args_with, precheck};
use crate::packages::pacman::{parse_names, parse_query, parse_query_upgrades};
use crate::packages::traits::PackageManager;
use crate::utils::distro::AurHelper;

/// AUR packages through a pacman-compatible helper (yay, paru, trizen).
///
/// The helper escalates privileges itself, so commands run unprivileged.
pub struct AurManager {
    helper: Option<AurHelper>,
}

impl AurManager {
    pub fn new(helper: Option<AurHelper>) -> Self {
        Self { helper }
    }

    fn run_helper(&self, args: &[String], out: &Reporter) -> bool {
        match self.helper {
            Some(helper) => command::run(self.kind(), helper.binary(), args, false, out),
            None => {
                out.warning("No AUR helper detected");
                false
            }
        }
    }
}

impl PackageManager for AurManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Aur
    }

    fn is_available(&self) -> bool {
        self.helper
            .is_some_and(|helper| which::which(helper.binary()).is_ok())
    }

    fn update(&self, out: &Reporter) -> bool {
        self.run_helper(&["-Sy".to_string()], out)
    }

    fn install(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.run_helper(&args_with(&["-S", "--needed", "--noconfirm"], names), out)
    }

    fn uninstall(&self, names: &[String], out: &Reporter) -> bool {
        if let Some(early) = precheck(self.kind(), names, out) {
            return early;
        }
        self.run_helper(&args_with(&["-Rns", "--noconfirm"], names), out)
    }

    fn upgrade(&self, names: Option<&[String]>, out: &Reporter) -> bool {
        match names {
            Some(names) if !names.is_empty() => {
                if let Some(early) = precheck(self.kind(), names, out) {
                    return early;
                }
                self.run_helper(&args_with(&["-S", "--noconfirm"], names), out)
            }
            // -a restricts the sysupgrade to AUR packages
            _ => self.run_helper(&args_with(&["-Sua", "--noconfirm"], &[]), out),
        }
    }

    fn list_installed(&self) -> Result<Vec<PackageInfo>> {
        // pacman -Qm: foreign packages, i.e. everything not from a sync repo
        Ok(command::query(self.kind(), "pacman", &["-Qm"])
            .map(|stdout| parse_query(&stdout))
            .unwrap_or_default())
    }

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>> {
        let Some(helper) = self.helper else {
            return Ok(Vec::new());
        };
        // Helpers exit 1 when nothing is outdated
        Ok(
            command::query_with_codes(self.kind(), helper.binary(), &["-Qua"], &[1])
                .map(|stdout| parse_query_upgrades(&stdout))
                .unwrap_or_default(),
        )
    }

    fn list_leaves(&self) -> Option<Result<Vec<String>>> {
        Some(Ok(command::query(self.kind(), "pacman", &["-Qqem"])
            .map(|stdout| parse_names(&stdout))
            .unwrap_or_default()))
    }

    fn cleanup(&self, out: &Reporter) -> bool {
        self.run_helper(&args_with(&["-Sc", "--noconfirm"], &[]), out)
    }

    fn dependents(&self, name: &str) -> Result<Vec<String>> {
        crate::packages::pacman::PacmanManager::new().dependents(name)
    }
}
