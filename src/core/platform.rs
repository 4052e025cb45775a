//! Platform detection
//!
//! Probes, in order: OS, Linux distro family (from `/etc/os-release`), the AUR
//! helper on Arch, and which backend executables exist. The result is cached
//! for the lifetime of the detector and only cleared explicitly.

use crate::core::types::ManagerKind;
use crate::error::{PkgsyncError, Result};
use crate::utils::distro::{AurHelper, DistroType, Os};
use serde::Serialize;
use std::sync::{Arc, Mutex};

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Host facts the detector depends on
pub trait HostProbe: Send + Sync {
    fn os(&self) -> Option<Os>;
    fn os_release(&self) -> Option<String>;
    fn has_executable(&self, name: &str) -> bool;
}

/// Probe backed by the real host
pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn os(&self) -> Option<Os> {
        Os::from_consts(std::env::consts::OS)
    }

    fn os_release(&self) -> Option<String> {
        std::fs::read_to_string(OS_RELEASE_PATH).ok()
    }

    fn has_executable(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    pub os: Os,
    pub distro: Option<DistroType>,
    pub aur_helper: Option<AurHelper>,
    /// Backend types whose tooling is present, in candidate order
    pub available_backends: Vec<ManagerKind>,
}

impl PlatformInfo {
    pub fn has_backend(&self, kind: ManagerKind) -> bool {
        self.available_backends.contains(&kind)
    }

    pub fn is_macos(&self) -> bool {
        self.os == Os::Darwin
    }

    /// Fail when no usable native package manager exists.
    ///
    /// macOS needs Homebrew; Linux needs one of pacman, apt or dnf.
    pub fn ensure_prerequisites(&self) -> Result<()> {
        match self.os {
            Os::Darwin if !self.has_backend(ManagerKind::Homebrew) => Err(
                PkgsyncError::NoPrerequisite("Homebrew is required on macOS".to_string()),
            ),
            Os::Linux
                if !self
                    .available_backends
                    .iter()
                    .any(ManagerKind::is_system_native) =>
            {
                Err(PkgsyncError::NoPrerequisite(
                    "none of pacman, apt or dnf is installed".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Candidate backend types for an OS/distro pair, in preference order
pub fn candidate_backends(os: Os, distro: Option<DistroType>) -> Vec<ManagerKind> {
    match os {
        Os::Darwin => vec![ManagerKind::Homebrew, ManagerKind::Mas, ManagerKind::Cargo],
        Os::Linux => {
            let mut kinds = match distro.unwrap_or(DistroType::Unknown) {
                DistroType::Arch => vec![ManagerKind::Pacman, ManagerKind::Aur],
                DistroType::Debian | DistroType::Ubuntu => vec![ManagerKind::Apt],
                DistroType::Fedora | DistroType::Rhel => vec![ManagerKind::Dnf],
                DistroType::Opensuse | DistroType::Unknown => {
                    vec![ManagerKind::Pacman, ManagerKind::Apt, ManagerKind::Dnf]
                }
            };
            kinds.push(ManagerKind::Flatpak);
            kinds.push(ManagerKind::Cargo);
            kinds
        }
    }
}

fn backend_binary(kind: ManagerKind) -> Option<&'static str> {
    match kind {
        ManagerKind::Homebrew | ManagerKind::HomebrewCask => Some("brew"),
        ManagerKind::Mas => Some("mas"),
        ManagerKind::Pacman => Some("pacman"),
        ManagerKind::Apt => Some("apt-get"),
        ManagerKind::Dnf => Some("dnf"),
        ManagerKind::Flatpak => Some("flatpak"),
        ManagerKind::Cargo => Some("cargo"),
        // Depends on the detected helper
        ManagerKind::Aur => None,
    }
}

pub struct PlatformDetector {
    probe: Box<dyn HostProbe>,
    cache: Mutex<Option<Arc<PlatformInfo>>>,
}

impl PlatformDetector {
    pub fn new(probe: Box<dyn HostProbe>) -> Self {
        Self {
            probe,
            cache: Mutex::new(None),
        }
    }

    pub fn system() -> Self {
        Self::new(Box::new(SystemProbe))
    }

    /// Detect (or return the cached) platform info
    pub fn detect(&self) -> Result<Arc<PlatformInfo>> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|e| PkgsyncError::LockError(format!("platform cache poisoned: {}", e)))?;

        if let Some(info) = cache.as_ref() {
            return Ok(Arc::clone(info));
        }

        let info = Arc::new(self.probe_platform()?);
        *cache = Some(Arc::clone(&info));
        Ok(info)
    }

    /// Forget the cached result
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }

    fn probe_platform(&self) -> Result<PlatformInfo> {
        let os = self.probe.os().ok_or_else(|| {
            PkgsyncError::NoPrerequisite(format!(
                "unsupported operating system: {}",
                std::env::consts::OS
            ))
        })?;

        let distro = match os {
            Os::Linux => Some(
                self.probe
                    .os_release()
                    .map(|content| DistroType::from_os_release(&content))
                    .unwrap_or(DistroType::Unknown),
            ),
            Os::Darwin => None,
        };

        let aur_helper = match distro {
            Some(d) if d.supports_aur() => AurHelper::PREFERENCE
                .into_iter()
                .find(|helper| self.probe.has_executable(helper.binary())),
            _ => None,
        };

        let available_backends = candidate_backends(os, distro)
            .into_iter()
            .filter(|kind| match backend_binary(*kind) {
                Some(binary) => self.probe.has_executable(binary),
                None => aur_helper.is_some(),
            })
            .collect();

        Ok(PlatformInfo {
            os,
            distro,
            aur_helper,
            available_backends,
        })
    }
}
