use serde::{Deserialize, Serialize};
use std::fmt;

/// Host operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Darwin,
    Linux,
}

impl Os {
    /// Map `std::env::consts::OS` to a supported OS
    pub fn from_consts(os: &str) -> Option<Self> {
        match os {
            "macos" => Some(Os::Darwin),
            "linux" => Some(Os::Linux),
            _ => None,
        }
    }
}

/// Linux distribution family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistroType {
    Arch,     // Arch Linux and derivatives (EndeavourOS, Manjaro, etc.)
    Debian,   // Debian and derivatives (Raspbian, etc.)
    Ubuntu,   // Ubuntu and derivatives (Mint, Pop!_OS, etc.)
    Fedora,   // Fedora
    Rhel,     // RHEL, CentOS, Rocky, Alma
    Opensuse, // Leap and Tumbleweed
    Unknown,  // Unable to determine
}

impl DistroType {
    /// Detect the distro family from the contents of /etc/os-release.
    ///
    /// `ID` is checked first, then each `ID_LIKE` entry in order.
    pub fn from_os_release(content: &str) -> Self {
        let mut id = String::new();
        let mut id_like = String::new();

        for line in content.lines() {
            let line = line.trim();
            if let Some(val) = line.strip_prefix("ID=") {
                id = val.trim_matches('"').trim_matches('\'').to_lowercase();
            } else if let Some(val) = line.strip_prefix("ID_LIKE=") {
                id_like = val.trim_matches('"').trim_matches('\'').to_lowercase();
            }
        }

        if let Some(distro) = Self::from_id(&id) {
            return distro;
        }

        id_like
            .split_whitespace()
            .find_map(Self::from_id)
            .unwrap_or(DistroType::Unknown)
    }

    fn from_id(id: &str) -> Option<Self> {
        let distro = match id {
            "arch" | "archarm" | "manjaro" | "endeavouros" | "garuda" | "artix" | "cachyos"
            | "instantos" => DistroType::Arch,
            "debian" | "raspbian" | "kali" => DistroType::Debian,
            "ubuntu" | "pop" | "linuxmint" | "elementary" | "zorin" | "neon" => DistroType::Ubuntu,
            "fedora" | "nobara" => DistroType::Fedora,
            "rhel" | "centos" | "rocky" | "almalinux" | "ol" => DistroType::Rhel,
            "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" | "suse" | "sles" => {
                DistroType::Opensuse
            }
            _ => return None,
        };
        Some(distro)
    }

    /// Check if the current distro supports AUR
    pub fn supports_aur(&self) -> bool {
        matches!(self, DistroType::Arch)
    }
}

impl fmt::Display for DistroType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Arch => "arch",
            Self::Debian => "debian",
            Self::Ubuntu => "ubuntu",
            Self::Fedora => "fedora",
            Self::Rhel => "rhel",
            Self::Opensuse => "opensuse",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// AUR helpers, in detection preference order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AurHelper {
    Yay,
    Paru,
    Trizen,
}

impl AurHelper {
    pub const PREFERENCE: [AurHelper; 3] = [AurHelper::Yay, AurHelper::Paru, AurHelper::Trizen];

    pub fn binary(&self) -> &'static str {
        match self {
            Self::Yay => "yay",
            Self::Paru => "paru",
            Self::Trizen => "trizen",
        }
    }
}
