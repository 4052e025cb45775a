//! Merge a fresh installed snapshot into the previous lockfile.
//!
//! An entry keeps its previous `installedAt` when its version did not
//! change; anything new or changed takes the fresh timestamp.

use crate::state::types::{CURRENT_LOCK_VERSION, LockDocument, LockEntry, LockKey, Lockfile};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub fn merge(
    previous: Option<&LockDocument>,
    fresh: BTreeMap<LockKey, LockEntry>,
    now: DateTime<Utc>,
) -> Lockfile {
    let packages = fresh
        .into_iter()
        .map(|(key, mut entry)| {
            if let Some(installed_at) = previous_install_time(previous, &key, &entry) {
                entry.installed_at = installed_at;
            }
            (key, entry)
        })
        .collect();

    Lockfile {
        version: CURRENT_LOCK_VERSION,
        last_updated: now,
        packages,
    }
}

/// Previous timestamp for `entry`, only when the version is unchanged
fn previous_install_time(
    previous: Option<&LockDocument>,
    key: &str,
    entry: &LockEntry,
) -> Option<DateTime<Utc>> {
    let (version, installed_at) = match previous? {
        LockDocument::V2(lock) => lock
            .packages
            .get(key)
            .map(|old| (old.version.clone(), old.installed_at))?,
        LockDocument::V1(v1) => {
            let (_, name) = key.split_once(':')?;
            v1.find(entry.manager, name)?
        }
    };
    (version == entry.version).then_some(installed_at)
}
