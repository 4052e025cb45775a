//! Drift between the installed snapshot and the persisted lockfile

use crate::core::types::ManagerKind;
use crate::state::types::{LockEntry, LockKey, Lockfile, split_lock_key};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedPackage {
    pub manager: ManagerKind,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradedPackage {
    pub manager: ManagerKind,
    pub name: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageChanges {
    pub added: Vec<ChangedPackage>,
    pub removed: Vec<ChangedPackage>,
    pub upgraded: Vec<UpgradedPackage>,
}

impl PackageChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.upgraded.is_empty()
    }
}

fn changed(key: &str, entry: &LockEntry) -> ChangedPackage {
    let name = split_lock_key(key).map_or(key, |(_, name)| name);
    ChangedPackage {
        manager: entry.manager,
        name: name.to_string(),
        version: entry.version.clone(),
    }
}

/// Compare the current snapshot with the lock.
///
/// Without a lock everything installed counts as added.
pub fn detect_changes(
    current: &BTreeMap<LockKey, LockEntry>,
    lock: Option<&Lockfile>,
) -> PackageChanges {
    let empty = BTreeMap::new();
    let locked = lock.map_or(&empty, |lock| &lock.packages);
    let mut changes = PackageChanges::default();

    for (key, entry) in current {
        match locked.get(key) {
            None => changes.added.push(changed(key, entry)),
            Some(old) if old.version != entry.version => {
                let ChangedPackage { manager, name, .. } = changed(key, entry);
                changes.upgraded.push(UpgradedPackage {
                    manager,
                    name,
                    from: old.version.clone(),
                    to: entry.version.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for (key, entry) in locked {
        if !current.contains_key(key) {
            changes.removed.push(changed(key, entry));
        }
    }

    changes
}
