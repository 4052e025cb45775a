//! Upgrade with verification
//!
//! A manager's bulk upgrade does not say which packages it actually moved,
//! so each manager goes through:
//! 1. refresh the index and snapshot `list_outdated` as the attempted set
//! 2. bulk upgrade
//! 3. re-snapshot; whatever is gone succeeded
//! 4. retry each leftover on its own and re-check it
//!
//! Every attempted package ends up either succeeded or failed.

use crate::commands::{lock, or_empty, plural};
use crate::context::AppContext;
use crate::core::events::{Answer, Reporter};
use crate::core::types::{ManagerKind, PackageRef, UpgradeInfo};
use crate::error::Result;
use crate::packages::PackageManager;
use crate::ui;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeResult {
    pub attempted: Vec<PackageRef>,
    pub succeeded: Vec<PackageRef>,
    pub failed: Vec<PackageRef>,
    /// Only non-empty when the run was interrupted mid-retry
    pub still_outdated: Vec<PackageRef>,
    pub lockfile_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveUpgradeSummary {
    pub upgraded: Vec<PackageRef>,
    pub failed: Vec<PackageRef>,
    pub skipped: Vec<PackageRef>,
    /// Managers where the user quit before the end of the list
    pub aborted_managers: Vec<ManagerKind>,
    pub lockfile_error: Option<String>,
}

/// Upgrade everything outdated on every available manager.
///
/// With `verify` off, only the bulk upgrade runs and its exit status decides
/// the outcome of every attempted package.
pub fn upgrade_all(ctx: &AppContext, verify: bool, out: &Reporter) -> Result<UpgradeResult> {
    ctx.checked_platform()?;
    let managers = ctx.available_managers()?;
    let mut result = UpgradeResult::default();

    for manager in &managers {
        if ui::is_interrupted() {
            out.warning("Interrupted; skipping remaining managers");
            break;
        }
        upgrade_manager(manager.as_ref(), verify, &mut result, out);
    }

    result.lockfile_error = finish(ctx, &managers, out);

    if result.failed.is_empty() {
        out.success(&format!("Upgraded {}", plural(result.succeeded.len(), "package")));
    } else {
        out.warning(&format!(
            "Upgraded {}, {} failed",
            plural(result.succeeded.len(), "package"),
            result.failed.len()
        ));
    }
    Ok(result)
}

fn upgrade_manager(
    manager: &dyn PackageManager,
    verify: bool,
    result: &mut UpgradeResult,
    out: &Reporter,
) {
    let kind = manager.kind();
    let name = manager.display_name();

    refresh(manager, out);
    let attempted = or_empty(manager.list_outdated(), kind, "outdated packages", out);
    if attempted.is_empty() {
        ui::verbose(&format!("{}: everything up to date", name));
        return;
    }

    out.info(&format!(
        "Upgrading {} with {}",
        plural(attempted.len(), "package"),
        name
    ));
    let refs: Vec<PackageRef> = attempted
        .iter()
        .map(|info| PackageRef::new(kind, info.name.as_str()))
        .collect();
    result.attempted.extend(refs.iter().cloned());

    let bulk_ok = manager.upgrade(None, out);
    if !verify {
        settle_all(refs, bulk_ok, result);
        return;
    }

    let remaining = match manager.list_outdated() {
        Ok(remaining) => remaining,
        Err(e) => {
            out.warning(&format!(
                "{}; cannot verify {} upgrade, trusting its exit status",
                e, name
            ));
            settle_all(refs, bulk_ok, result);
            return;
        }
    };

    let mut leftovers = Vec::new();
    for package in refs {
        if is_listed(&remaining, &package.name) {
            leftovers.push(package);
        } else {
            result.succeeded.push(package);
        }
    }
    if leftovers.is_empty() {
        return;
    }

    out.warning(&format!(
        "{} still outdated after bulk upgrade; retrying individually",
        plural(leftovers.len(), "package")
    ));
    let mut leftovers = leftovers.into_iter();
    while let Some(package) = leftovers.next() {
        if ui::is_interrupted() {
            result.still_outdated.push(package);
            result.still_outdated.extend(leftovers.by_ref());
            break;
        }
        if retry(manager, &package.name, out) {
            result.succeeded.push(package);
        } else {
            out.warning(&format!("{} could not be upgraded", package));
            result.failed.push(package);
        }
    }
}

/// Upgrade a single package and check whether it is still outdated
fn retry(manager: &dyn PackageManager, name: &str, out: &Reporter) -> bool {
    let upgraded = manager.upgrade(Some(&[name.to_string()]), out);
    match manager.list_outdated() {
        Ok(outdated) => !is_listed(&outdated, name),
        Err(e) => {
            out.warning(&format!("{}; trusting exit status for {}", e, name));
            upgraded
        }
    }
}

fn settle_all(refs: Vec<PackageRef>, ok: bool, result: &mut UpgradeResult) {
    if ok {
        result.succeeded.extend(refs);
    } else {
        result.failed.extend(refs);
    }
}

fn is_listed(outdated: &[UpgradeInfo], name: &str) -> bool {
    outdated.iter().any(|info| info.name == name)
}

fn refresh(manager: &dyn PackageManager, out: &Reporter) {
    out.info(&format!("Updating {}", manager.display_name()));
    if !manager.update(out) {
        out.warning(&format!("{} index refresh failed", manager.display_name()));
    }
}

/// Cleanup every manager once, then record what is now installed
fn finish(ctx: &AppContext, managers: &[Arc<dyn PackageManager>], out: &Reporter) -> Option<String> {
    for manager in managers {
        if !manager.cleanup(out) {
            out.warning(&format!("{} cleanup failed", manager.display_name()));
        }
    }
    lock::record_after_run(ctx, out)
}

/// Ask before each upgrade. `Quit` skips the rest of that manager's list.
pub fn upgrade_interactive(ctx: &AppContext, out: &Reporter) -> Result<InteractiveUpgradeSummary> {
    ctx.checked_platform()?;
    let managers = ctx.available_managers()?;
    let mut summary = InteractiveUpgradeSummary::default();

    for manager in &managers {
        if ui::is_interrupted() {
            out.warning("Interrupted; skipping remaining managers");
            break;
        }
        let kind = manager.kind();
        refresh(manager.as_ref(), out);
        let outdated = or_empty(manager.list_outdated(), kind, "outdated packages", out);

        let mut pending = outdated.into_iter();
        while let Some(info) = pending.next() {
            let package = PackageRef::new(kind, info.name.as_str());
            let question = format!(
                "Upgrade {} {} -> {}?",
                info.name, info.current_version, info.new_version
            );
            match out.confirm(&question, true) {
                Answer::Yes => {
                    if manager.upgrade(Some(&[info.name.clone()]), out) {
                        summary.upgraded.push(package);
                    } else {
                        out.warning(&format!("{} could not be upgraded", package));
                        summary.failed.push(package);
                    }
                }
                Answer::No => summary.skipped.push(package),
                Answer::Quit => {
                    summary.skipped.push(package);
                    summary
                        .skipped
                        .extend(pending.by_ref().map(|rest| PackageRef::new(kind, rest.name)));
                    summary.aborted_managers.push(kind);
                    break;
                }
            }
        }
    }

    summary.lockfile_error = finish(ctx, &managers, out);
    out.success(&format!(
        "Upgraded {}, skipped {}",
        plural(summary.upgraded.len(), "package"),
        summary.skipped.len()
    ));
    Ok(summary)
}

#[cfg(test)]
mod tests;
