use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Supported backends.
// To add a new package manager, add a variant here and update:
// - ManagerKind::tag() / display_name()
// - ManagerKind::from_str()
// - ManagerRegistry::register_defaults()
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ManagerKind {
    #[serde(rename = "homebrew")]
    Homebrew, // Homebrew formulas (macOS)
    #[serde(rename = "homebrew-cask")]
    HomebrewCask, // Homebrew casks, surfaced next to formulas
    #[serde(rename = "mas")]
    Mas, // Mac App Store via `mas`
    #[serde(rename = "pacman")]
    Pacman,
    #[serde(rename = "aur")]
    Aur, // AUR helper layered over pacman
    #[serde(rename = "apt")]
    Apt,
    #[serde(rename = "dnf")]
    Dnf,
    #[serde(rename = "flatpak")]
    Flatpak,
    #[serde(rename = "cargo")]
    Cargo,
}

impl ManagerKind {
    pub const ALL: [ManagerKind; 9] = [
        ManagerKind::Homebrew,
        ManagerKind::HomebrewCask,
        ManagerKind::Mas,
        ManagerKind::Pacman,
        ManagerKind::Aur,
        ManagerKind::Apt,
        ManagerKind::Dnf,
        ManagerKind::Flatpak,
        ManagerKind::Cargo,
    ];

    /// Stable identifier used in lockfile keys
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Homebrew => "homebrew",
            Self::HomebrewCask => "homebrew-cask",
            Self::Mas => "mas",
            Self::Pacman => "pacman",
            Self::Aur => "aur",
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Flatpak => "flatpak",
            Self::Cargo => "cargo",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Homebrew => "Homebrew",
            Self::HomebrewCask => "Homebrew Casks",
            Self::Mas => "Mac App Store",
            Self::Pacman => "Pacman",
            Self::Aur => "AUR",
            Self::Apt => "APT",
            Self::Dnf => "DNF",
            Self::Flatpak => "Flatpak",
            Self::Cargo => "Cargo",
        }
    }

    /// Short label used when listing orphaned packages
    pub fn package_type(&self) -> &'static str {
        match self {
            Self::Homebrew => "formula",
            Self::HomebrewCask => "cask",
            other => other.tag(),
        }
    }

    /// Distro-native system managers (the ones a Linux host must have one of)
    pub fn is_system_native(&self) -> bool {
        matches!(self, Self::Pacman | Self::Apt | Self::Dnf)
    }

    pub fn lock_key(&self, name: &str) -> String {
        format!("{}:{}", self.tag(), name)
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for ManagerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ManagerKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| format!("Unknown package manager: {}", s))
    }
}

/// A package currently installed under some manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// A package with a pending update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeInfo {
    pub name: String,
    pub current_version: String,
    pub new_version: String,
}

impl UpgradeInfo {
    pub fn new(
        name: impl Into<String>,
        current_version: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current_version: current_version.into(),
            new_version: new_version.into(),
        }
    }
}

/// Packages (and repositories) that apply to one manager on this host.
/// Recomputed on every run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSet {
    pub manager: ManagerKind,
    pub packages: Vec<String>,
    pub repositories: Vec<String>,
}

impl PackageSet {
    pub fn new(manager: ManagerKind, packages: Vec<String>) -> Self {
        Self {
            manager,
            packages,
            repositories: Vec::new(),
        }
    }

    pub fn with_repositories(mut self, repositories: Vec<String>) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.repositories.is_empty()
    }
}

/// A package name qualified by the manager that owns it
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageRef {
    pub manager: ManagerKind,
    pub name: String,
}

impl PackageRef {
    pub fn new(manager: ManagerKind, name: impl Into<String>) -> Self {
        Self {
            manager,
            name: name.into(),
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.manager, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_str() {
        for kind in ManagerKind::ALL {
            assert_eq!(kind.tag().parse::<ManagerKind>(), Ok(kind));
        }
        assert!("zypper".parse::<ManagerKind>().is_err());
    }

    #[test]
    fn serde_uses_tags() {
        let json = serde_json::to_string(&ManagerKind::HomebrewCask).unwrap();
        assert_eq!(json, "\"homebrew-cask\"");
        let kind: ManagerKind = serde_json::from_str("\"aur\"").unwrap();
        assert_eq!(kind, ManagerKind::Aur);
    }

    #[test]
    fn lock_keys_do_not_collide_across_managers() {
        assert_ne!(
            ManagerKind::Homebrew.lock_key("git"),
            ManagerKind::Pacman.lock_key("git")
        );
        assert_eq!(ManagerKind::Homebrew.lock_key("git"), "homebrew:git");
    }

    #[test]
    fn empty_set_detection() {
        assert!(PackageSet::new(ManagerKind::Apt, Vec::new()).is_empty());
        let with_repo = PackageSet::new(ManagerKind::Apt, Vec::new())
            .with_repositories(vec!["ppa:neovim-ppa/stable".into()]);
        assert!(!with_repo.is_empty());
    }
}
