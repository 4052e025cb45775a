//! Orphan detection and purge
//!
//! An orphan is an installed leaf of a resolved manager that the config does
//! not declare. Packages other installed packages still depend on, Apple's
//! own App Store apps and critical Linux system packages are never offered
//! for removal.

use crate::commands::{find_manager, lock, or_empty, plural};
use crate::config::types::DeclaredConfig;
use crate::constants::{CRITICAL_LINUX_PACKAGES, PROTECTED_MAS_APPS};
use crate::context::AppContext;
use crate::core::events::{Answer, Reporter};
use crate::core::matcher::DeclaredNames;
use crate::core::resolver;
use crate::core::types::{ManagerKind, PackageSet};
use crate::error::Result;
use crate::packages::PackageManager;
use crate::ui;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedPackage {
    pub name: String,
    /// `formula`, `cask`, or the manager tag
    #[serde(rename = "type")]
    pub package_type: String,
    pub manager: ManagerKind,
}

impl OrphanedPackage {
    fn new(manager: ManagerKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            package_type: manager.package_type().to_string(),
            manager,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "reason", content = "detail")]
pub enum KeepReason {
    /// Installed packages that still need it
    HasDependents(Vec<String>),
    ProtectedApp,
    CriticalSystemPackage,
    /// The dependents query failed, so removal is not safe to offer
    DependentsUnknown(String),
}

/// Undeclared leaf that was deliberately left alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeptPackage {
    pub name: String,
    pub manager: ManagerKind,
    pub reason: KeepReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanDetectionResult {
    pub orphans: Vec<OrphanedPackage>,
    pub kept: Vec<KeptPackage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub removed: Vec<OrphanedPackage>,
    pub declined: Vec<OrphanedPackage>,
    pub failed: Vec<OrphanedPackage>,
    pub kept: Vec<KeptPackage>,
}

/// Orphans of every resolved set whose manager is available
pub fn find_orphans(
    sets: &[PackageSet],
    managers: &[Arc<dyn PackageManager>],
    out: &Reporter,
) -> OrphanDetectionResult {
    let mut result = OrphanDetectionResult::default();

    for set in sets {
        let Some(manager) = find_manager(managers, set.manager) else {
            continue;
        };
        let declared = DeclaredNames::new(&set.packages);

        for name in installed_leaves(manager.as_ref(), out) {
            if declared.contains(&name) {
                continue;
            }
            match keep_reason(manager.as_ref(), &name) {
                Some(reason) => {
                    ui::verbose(&format!("Keeping {} ({:?})", name, reason));
                    result.kept.push(KeptPackage {
                        name,
                        manager: set.manager,
                        reason,
                    });
                }
                None => result.orphans.push(OrphanedPackage::new(set.manager, &name)),
            }
        }
    }

    result
}

/// Leaves when the manager knows them, otherwise everything installed
fn installed_leaves(manager: &dyn PackageManager, out: &Reporter) -> Vec<String> {
    let kind = manager.kind();
    match manager.list_leaves() {
        Some(leaves) => or_empty(leaves, kind, "leaves", out),
        None => or_empty(manager.list_installed(), kind, "installed packages", out)
            .into_iter()
            .map(|package| package.name)
            .collect(),
    }
}

fn keep_reason(manager: &dyn PackageManager, name: &str) -> Option<KeepReason> {
    let kind = manager.kind();
    if kind == ManagerKind::Mas && PROTECTED_MAS_APPS.contains(&name) {
        return Some(KeepReason::ProtectedApp);
    }
    if kind.is_system_native() && CRITICAL_LINUX_PACKAGES.contains(&name) {
        return Some(KeepReason::CriticalSystemPackage);
    }
    match manager.dependents(name) {
        Ok(dependents) if dependents.is_empty() => None,
        Ok(dependents) => Some(KeepReason::HasDependents(dependents)),
        Err(e) => Some(KeepReason::DependentsUnknown(e.to_string())),
    }
}

pub fn detect_orphans(
    ctx: &AppContext,
    config: &DeclaredConfig,
    out: &Reporter,
) -> Result<OrphanDetectionResult> {
    let platform = ctx.checked_platform()?;
    let managers = ctx.available_managers()?;
    let sets = resolver::resolve(config, &platform);
    Ok(find_orphans(&sets, &managers, out))
}

/// Detect and remove orphans, then refresh the lockfile if anything went away
pub fn purge(
    ctx: &AppContext,
    config: &DeclaredConfig,
    interactive: bool,
    out: &Reporter,
) -> Result<PurgeReport> {
    let platform = ctx.checked_platform()?;
    let managers = ctx.available_managers()?;
    let sets = resolver::resolve(config, &platform);

    let report = purge_sets(&sets, &managers, interactive, out);
    if !report.removed.is_empty() {
        lock::update_lockfile(ctx, out)?;
    }
    Ok(report)
}

/// Remove orphans of the given sets, then run each manager's cleanup once.
///
/// Interactive mode asks per package; `Quit` declines everything left.
/// Automatic mode removes each manager's orphans in one batch.
pub(crate) fn purge_sets(
    sets: &[PackageSet],
    managers: &[Arc<dyn PackageManager>],
    interactive: bool,
    out: &Reporter,
) -> PurgeReport {
    let detection = find_orphans(sets, managers, out);
    let mut report = PurgeReport {
        kept: detection.kept,
        ..PurgeReport::default()
    };

    if detection.orphans.is_empty() {
        out.info("No orphaned packages");
    } else {
        out.info(&format!(
            "Found {}",
            plural(detection.orphans.len(), "orphaned package")
        ));
    }

    let mut quit = false;
    for set in sets {
        let Some(manager) = find_manager(managers, set.manager) else {
            continue;
        };
        let orphans: Vec<OrphanedPackage> = detection
            .orphans
            .iter()
            .filter(|o| o.manager == set.manager)
            .cloned()
            .collect();
        if orphans.is_empty() {
            continue;
        }

        if quit || ui::is_interrupted() {
            report.declined.extend(orphans);
            continue;
        }

        if interactive {
            for orphan in orphans {
                if quit {
                    report.declined.push(orphan);
                    continue;
                }
                let question = format!("Remove {} {}?", orphan.package_type, orphan.name);
                match out.confirm(&question, true) {
                    Answer::Yes => remove(manager.as_ref(), vec![orphan], &mut report, out),
                    Answer::No => report.declined.push(orphan),
                    Answer::Quit => {
                        quit = true;
                        report.declined.push(orphan);
                    }
                }
            }
        } else {
            remove(manager.as_ref(), orphans, &mut report, out);
        }
    }

    let mut cleaned: Vec<ManagerKind> = Vec::new();
    for set in sets {
        if cleaned.contains(&set.manager) {
            continue;
        }
        cleaned.push(set.manager);
        if let Some(manager) = find_manager(managers, set.manager)
            && !manager.cleanup(out)
        {
            out.warning(&format!("{} cleanup failed", manager.display_name()));
        }
    }

    if !report.removed.is_empty() {
        out.success(&format!("Removed {}", plural(report.removed.len(), "package")));
    }
    report
}

fn remove(
    manager: &dyn PackageManager,
    orphans: Vec<OrphanedPackage>,
    report: &mut PurgeReport,
    out: &Reporter,
) {
    let names: Vec<String> = orphans.iter().map(|o| o.name.clone()).collect();
    out.info(&format!("Removing {}: {}", manager.display_name(), names.join(", ")));
    if manager.uninstall(&names, out) {
        report.removed.extend(orphans);
    } else {
        out.warning(&format!("{} could not remove {}", manager.display_name(), names.join(", ")));
        report.failed.extend(orphans);
    }
}
