use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Schema version written by this build
pub const CURRENT_CONFIG_VERSION: u32 = 2;

/// Behaviour switches shared by both schema versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Remove undeclared packages during sync
    #[serde(default)]
    pub purge: bool,

    /// Confirm each removal instead of removing unconditionally
    #[serde(default = "default_true")]
    pub purge_interactive: bool,

    /// Refresh manager indexes before syncing
    #[serde(default)]
    pub auto_update: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            purge: false,
            purge_interactive: true,
            auto_update: false,
        }
    }
}

/// Mac App Store id, written either as a JSON number or a string
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MasId {
    Number(u64),
    Text(String),
}

impl fmt::Display for MasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{}", id),
            Self::Text(id) => write!(f, "{}", id.trim()),
        }
    }
}

/// Declared packages, schema version 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredConfig {
    pub version: u32,

    #[serde(default)]
    pub config: Settings,

    #[serde(default)]
    pub global: GlobalSection,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macos: Option<MacosSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<LinuxSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<ArchSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debian: Option<DebianSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fedora: Option<FedoraSection>,
}

impl Default for DeclaredConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            config: Settings::default(),
            global: GlobalSection::default(),
            macos: None,
            linux: None,
            arch: None,
            debian: None,
            fedora: None,
        }
    }
}

/// Packages that apply on every platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSection {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cargo: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacosSection {
    #[serde(default)]
    pub taps: Vec<String>,
    #[serde(default)]
    pub formulas: Vec<String>,
    #[serde(default)]
    pub casks: Vec<String>,
    /// App name -> App Store id
    #[serde(default)]
    pub mas: BTreeMap<String, MasId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cargo: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxSection {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flatpak: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cargo: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchSection {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aur: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebianSection {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ppas: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FedoraSection {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copr: Vec<String>,
}

/// Legacy single-platform (macOS) schema without a `version` field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredConfigV1 {
    #[serde(default)]
    pub config: Settings,
    #[serde(default)]
    pub taps: Vec<String>,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub casks: Vec<String>,
    #[serde(default)]
    pub mas: BTreeMap<String, MasId>,
}

/// A config file as found on disk, before migration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigDocument {
    V1(DeclaredConfigV1),
    V2(DeclaredConfig),
}

impl ConfigDocument {
    pub fn version(&self) -> u32 {
        match self {
            Self::V1(_) => 1,
            Self::V2(doc) => doc.version,
        }
    }
}

#[cfg(test)]
mod tests;
