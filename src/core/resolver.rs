//! Package set resolution
//!
//! Turns the declared config plus the detected platform into the package
//! sets that apply on this host, one per manager. Pure: no backend is
//! queried here.

use crate::config::types::DeclaredConfig;
use crate::core::platform::PlatformInfo;
use crate::core::types::{ManagerKind, PackageSet};
use crate::packages::dnf::COPR_PREFIX;
use crate::packages::flatpak::DEFAULT_REMOTE;
use crate::utils::distro::{DistroType, Os};
use std::collections::HashSet;

/// Native managers tried, in order, when the distro is not recognised
const FALLBACK_NATIVE: [ManagerKind; 3] = [ManagerKind::Pacman, ManagerKind::Apt, ManagerKind::Dnf];

pub fn resolve(config: &DeclaredConfig, platform: &PlatformInfo) -> Vec<PackageSet> {
    let sets = match platform.os {
        Os::Darwin => resolve_macos(config, platform),
        Os::Linux => resolve_linux(config, platform),
    };
    sets.into_iter().filter(|set| !set.is_empty()).collect()
}

fn resolve_macos(config: &DeclaredConfig, platform: &PlatformInfo) -> Vec<PackageSet> {
    let macos = config.macos.clone().unwrap_or_default();
    let mut sets = vec![
        PackageSet::new(
            ManagerKind::Homebrew,
            merged(&[&config.global.packages, &macos.formulas]),
        )
        .with_repositories(merged(&[&macos.taps])),
        PackageSet::new(ManagerKind::HomebrewCask, merged(&[&macos.casks])),
    ];

    if platform.has_backend(ManagerKind::Mas) {
        let ids: Vec<String> = macos.mas.values().map(|id| id.to_string()).collect();
        sets.push(PackageSet::new(ManagerKind::Mas, merged(&[&ids])));
    }

    if platform.has_backend(ManagerKind::Cargo) {
        sets.push(PackageSet::new(
            ManagerKind::Cargo,
            merged(&[&config.global.cargo, &macos.cargo]),
        ));
    }

    sets
}

fn resolve_linux(config: &DeclaredConfig, platform: &PlatformInfo) -> Vec<PackageSet> {
    let linux = config.linux.clone().unwrap_or_default();
    let global = &config.global.packages;
    let mut sets = Vec::new();

    match platform.distro.unwrap_or(DistroType::Unknown) {
        DistroType::Arch => {
            let arch = config.arch.clone().unwrap_or_default();
            sets.push(PackageSet::new(
                ManagerKind::Pacman,
                merged(&[global, &linux.packages, &arch.packages]),
            ));
            sets.push(PackageSet::new(ManagerKind::Aur, merged(&[&arch.aur])));
        }
        DistroType::Debian | DistroType::Ubuntu => {
            let debian = config.debian.clone().unwrap_or_default();
            sets.push(
                PackageSet::new(
                    ManagerKind::Apt,
                    merged(&[global, &linux.packages, &debian.packages]),
                )
                .with_repositories(merged(&[&debian.ppas])),
            );
        }
        DistroType::Fedora | DistroType::Rhel => {
            let fedora = config.fedora.clone().unwrap_or_default();
            let coprs: Vec<String> = fedora.copr.iter().map(|r| copr_ref(r)).collect();
            sets.push(
                PackageSet::new(
                    ManagerKind::Dnf,
                    merged(&[global, &linux.packages, &fedora.packages]),
                )
                .with_repositories(merged(&[&coprs])),
            );
        }
        DistroType::Opensuse | DistroType::Unknown => {
            // Distro-specific sections do not apply when the distro is unknown
            if let Some(kind) = FALLBACK_NATIVE
                .into_iter()
                .find(|kind| platform.has_backend(*kind))
            {
                sets.push(PackageSet::new(kind, merged(&[global, &linux.packages])));
            }
        }
    }

    if platform.has_backend(ManagerKind::Flatpak) {
        let apps = merged(&[&linux.flatpak]);
        // Applications install from flathub, so it must be configured first
        let remotes = if apps.is_empty() {
            Vec::new()
        } else {
            vec![DEFAULT_REMOTE.to_string()]
        };
        sets.push(PackageSet::new(ManagerKind::Flatpak, apps).with_repositories(remotes));
    }

    if platform.has_backend(ManagerKind::Cargo) {
        sets.push(PackageSet::new(
            ManagerKind::Cargo,
            merged(&[&config.global.cargo, &linux.cargo]),
        ));
    }

    sets
}

fn copr_ref(reference: &str) -> String {
    let reference = reference.trim();
    if reference.starts_with(COPR_PREFIX) {
        reference.to_string()
    } else {
        format!("{}{}", COPR_PREFIX, reference)
    }
}

/// Concatenate lists in order, dropping blanks and repeated names
fn merged(lists: &[&Vec<String>]) -> Vec<String> {
    let mut seen = HashSet::new();
    lists
        .iter()
        .flat_map(|list| list.iter())
        .map(|name| name.trim())
        .filter(|name| !name.is_empty() && seen.insert(name.to_string()))
        .map(String::from)
        .collect()
}
