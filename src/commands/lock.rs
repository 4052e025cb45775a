//! Lockfile refresh and drift detection

use crate::commands::or_empty;
use crate::context::AppContext;
use crate::core::events::Reporter;
use crate::core::types::{ManagerKind, PackageInfo};
use crate::error::Result;
use crate::packages::PackageManager;
use crate::state::changes::{PackageChanges, detect_changes};
use crate::state::merge::merge;
use crate::state::types::{LockEntry, LockKey, Lockfile};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

struct ManagerSnapshot {
    kind: ManagerKind,
    installed: Result<Vec<PackageInfo>>,
    origins: Result<HashMap<String, String>>,
}

/// Installed packages of every manager, keyed `<tag>:<name>`.
///
/// Managers are queried in parallel; results are reported in manager order.
pub fn installed_snapshot(
    managers: &[Arc<dyn PackageManager>],
    now: DateTime<Utc>,
    out: &Reporter,
) -> BTreeMap<LockKey, LockEntry> {
    let snapshots: Vec<ManagerSnapshot> = managers
        .par_iter()
        .map(|manager| ManagerSnapshot {
            kind: manager.kind(),
            installed: manager.list_installed(),
            origins: manager.package_origins(),
        })
        .collect();

    let mut entries = BTreeMap::new();
    for snapshot in snapshots {
        let kind = snapshot.kind;
        let installed = or_empty(snapshot.installed, kind, "installed packages", out);
        let origins = match snapshot.origins {
            Ok(origins) => origins,
            Err(e) => {
                out.warning(&format!("[{}] package origins unavailable: {}", kind, e));
                HashMap::new()
            }
        };

        for package in installed {
            let origin = origins.get(&package.name).cloned();
            let mut entry = LockEntry::new(kind, package.version, now);
            match kind {
                ManagerKind::Homebrew => entry.tap = origin,
                _ => entry.source = origin,
            }
            entries.insert(kind.lock_key(&package.name), entry);
        }
    }
    entries
}

/// Re-snapshot every available manager and merge into the stored lockfile
pub fn update_lockfile(ctx: &AppContext, out: &Reporter) -> Result<Lockfile> {
    let managers = ctx.available_managers()?;
    let store = ctx.lock_store();
    let _guard = store.lock()?;

    let previous = match store.load() {
        Ok(previous) => previous,
        Err(e) => {
            out.warning(&format!("Ignoring unreadable lockfile: {}", e));
            None
        }
    };

    let now = Utc::now();
    let fresh = installed_snapshot(&managers, now, out);
    let merged = merge(previous.as_ref(), fresh, now);
    store.save(&merged)?;
    Ok(merged)
}

/// Update the lockfile after an engine run. A failure is reported and returned
/// as text so the run's own report survives it.
pub fn record_after_run(ctx: &AppContext, out: &Reporter) -> Option<String> {
    match update_lockfile(ctx, out) {
        Ok(_) => None,
        Err(e) => {
            let message = format!("Lockfile not updated: {}", e);
            out.warning(&message);
            Some(message)
        }
    }
}

/// What changed on the host since the lockfile was last written
pub fn get_changed_packages(ctx: &AppContext, out: &Reporter) -> Result<PackageChanges> {
    let managers = ctx.available_managers()?;
    let lock = ctx.lock_store().load()?.map(|doc| doc.to_current());
    let current = installed_snapshot(&managers, Utc::now(), out);
    Ok(detect_changes(&current, lock.as_ref()))
}
