use crate::core::matcher;
use crate::core::types::ManagerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written by this build
pub const CURRENT_LOCK_VERSION: u32 = 2;

/// Lock keys look like `homebrew:git`, so equal names under different
/// managers never collide.
pub type LockKey = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEntry {
    pub version: String,
    pub installed_at: DateTime<Utc>,
    pub manager: ManagerKind,

    /// Homebrew tap the formula came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap: Option<String>,

    /// Remote (flatpak) the package came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl LockEntry {
    pub fn new(manager: ManagerKind, version: impl Into<String>, installed_at: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            installed_at,
            manager,
            tap: None,
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lockfile {
    pub version: u32,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub packages: BTreeMap<LockKey, LockEntry>,
}

impl Lockfile {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            version: CURRENT_LOCK_VERSION,
            last_updated: now,
            packages: BTreeMap::new(),
        }
    }
}

/// Split a lock key back into manager and package name
pub fn split_lock_key(key: &str) -> Option<(ManagerKind, &str)> {
    let (tag, name) = key.split_once(':')?;
    Some((tag.parse().ok()?, name))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaEntryV1 {
    pub version: String,
    #[serde(default)]
    pub tap: Option<String>,
    pub installed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaskEntryV1 {
    pub version: String,
    pub installed_at: DateTime<Utc>,
}

/// Legacy Homebrew-only lockfile with separate formula and cask maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockfileV1 {
    pub version: u32,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub formulas: BTreeMap<String, FormulaEntryV1>,
    #[serde(default)]
    pub casks: BTreeMap<String, CaskEntryV1>,
}

impl LockfileV1 {
    /// Entry recorded for a bare package name in the matching V1 map
    pub fn find(&self, manager: ManagerKind, name: &str) -> Option<(String, DateTime<Utc>)> {
        fn lookup<'a, T>(map: &'a BTreeMap<String, T>, name: &str) -> Option<&'a T> {
            map.get(name).or_else(|| {
                map.iter()
                    .find(|(recorded, _)| matcher::names_match(recorded, name))
                    .map(|(_, entry)| entry)
            })
        }

        match manager {
            ManagerKind::Homebrew => lookup(&self.formulas, name)
                .map(|entry| (entry.version.clone(), entry.installed_at)),
            ManagerKind::HomebrewCask => lookup(&self.casks, name)
                .map(|entry| (entry.version.clone(), entry.installed_at)),
            _ => None,
        }
    }

    /// Unified view used for display and change detection
    pub fn to_current(&self) -> Lockfile {
        let mut packages = BTreeMap::new();
        for (name, entry) in &self.formulas {
            packages.insert(
                ManagerKind::Homebrew.lock_key(name),
                LockEntry {
                    tap: entry.tap.clone(),
                    ..LockEntry::new(ManagerKind::Homebrew, entry.version.clone(), entry.installed_at)
                },
            );
        }
        for (name, entry) in &self.casks {
            packages.insert(
                ManagerKind::HomebrewCask.lock_key(name),
                LockEntry::new(ManagerKind::HomebrewCask, entry.version.clone(), entry.installed_at),
            );
        }
        Lockfile {
            version: CURRENT_LOCK_VERSION,
            last_updated: self.last_updated,
            packages,
        }
    }
}

/// A lockfile as found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockDocument {
    V1(LockfileV1),
    V2(Lockfile),
}

impl LockDocument {
    pub fn version(&self) -> u32 {
        match self {
            Self::V1(_) => 1,
            Self::V2(lock) => lock.version,
        }
    }

    /// Current-schema view of the document
    pub fn to_current(&self) -> Lockfile {
        match self {
            Self::V1(v1) => v1.to_current(),
            Self::V2(v2) => v2.clone(),
        }
    }
}
