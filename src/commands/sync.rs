//! Install what is declared but missing, optionally purge what is not declared

use crate::commands::orphans::{self, PurgeReport};
use crate::commands::{find_manager, lock, or_empty, plural};
use crate::config::types::DeclaredConfig;
use crate::context::AppContext;
use crate::core::events::Reporter;
use crate::core::resolver;
use crate::core::types::{ManagerKind, PackageRef, PackageSet};
use crate::error::{PkgsyncError, Result};
use crate::packages::PackageManager;
use crate::ui;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Repositories added as `<tag>:<reference>`
    pub repositories_added: Vec<PackageRef>,
    pub repositories_failed: Vec<PackageRef>,
    pub installed: Vec<PackageRef>,
    pub failed: Vec<PackageRef>,
    /// Declared managers that are not usable on this host
    pub unavailable: Vec<ManagerKind>,
    pub purge: Option<PurgeReport>,
    /// Set when the packages were handled but the lockfile could not be written
    pub lockfile_error: Option<String>,
}

impl SyncReport {
    pub fn install_count(&self) -> usize {
        self.installed.len()
    }
}

pub fn sync(ctx: &AppContext, config: &DeclaredConfig, out: &Reporter) -> Result<SyncReport> {
    let platform = ctx.checked_platform()?;
    let managers = ctx.available_managers()?;
    let sets = resolver::resolve(config, &platform);

    let mut report = SyncReport::default();
    let mut work: Vec<(&PackageSet, &Arc<dyn PackageManager>)> = Vec::new();
    for set in &sets {
        match find_manager(&managers, set.manager) {
            Some(manager) => work.push((set, manager)),
            None => {
                out.warning(&format!(
                    "{} is not available; skipping {}",
                    set.manager.display_name(),
                    plural(set.packages.len(), "package")
                ));
                report.unavailable.push(set.manager);
            }
        }
    }

    if config.config.auto_update {
        for (_, manager) in &work {
            out.info(&format!("Updating {}", manager.display_name()));
            if !manager.update(out) {
                out.warning(&format!("{} index refresh failed", manager.display_name()));
            }
        }
    }

    for (set, manager) in &work {
        if ui::is_interrupted() {
            out.warning("Interrupted; no further packages will be installed");
            break;
        }
        add_missing_repositories(set, manager.as_ref(), &mut report, out);
        install_missing(set, manager.as_ref(), &mut report, out);
    }

    if config.config.purge && !ui::is_interrupted() {
        report.purge = Some(orphans::purge_sets(
            &sets,
            &managers,
            config.config.purge_interactive,
            out,
        ));
    }

    report.lockfile_error = lock::record_after_run(ctx, out);

    if report.failed.is_empty() {
        out.success(&format!(
            "Sync complete ({} installed)",
            report.install_count()
        ));
    } else {
        out.warning(&format!(
            "Sync finished with {}",
            plural(report.failed.len(), "failed package")
        ));
    }

    Ok(report)
}

/// Add declared repositories before installing, one at a time
fn add_missing_repositories(
    set: &PackageSet,
    manager: &dyn PackageManager,
    report: &mut SyncReport,
    out: &Reporter,
) {
    if set.repositories.is_empty() {
        return;
    }
    if !manager.supports_repositories() {
        out.warning(&format!(
            "{} does not support adding repositories; ignoring {}",
            manager.display_name(),
            set.repositories.join(", ")
        ));
        return;
    }

    let existing = or_empty(manager.list_repositories(), set.manager, "repositories", out);
    for reference in &set.repositories {
        if existing.iter().any(|r| r.eq_ignore_ascii_case(reference)) {
            continue;
        }
        out.info(&format!("Adding {} repository {}", manager.display_name(), reference));
        let repo = PackageRef::new(set.manager, reference.as_str());
        if manager.add_repository(reference, out) {
            report.repositories_added.push(repo);
        } else {
            out.warning(&format!("Could not add repository {}", reference));
            report.repositories_failed.push(repo);
        }
    }
}

fn install_missing(
    set: &PackageSet,
    manager: &dyn PackageManager,
    report: &mut SyncReport,
    out: &Reporter,
) {
    if set.packages.is_empty() {
        return;
    }

    let status = match manager.is_installed(&set.packages) {
        Ok(status) => status,
        Err(e @ PkgsyncError::Unparseable { .. }) => {
            out.warning(&format!("{}; skipping {}", e, manager.display_name()));
            return;
        }
        Err(e) => {
            out.warning(&format!("[{}] {}", set.manager, e));
            return;
        }
    };

    let mut missing: Vec<String> = Vec::new();
    for name in &set.packages {
        if !status.get(name).copied().unwrap_or(false) && !missing.contains(name) {
            missing.push(name.clone());
        }
    }

    if missing.is_empty() {
        ui::verbose(&format!(
            "{}: all {} installed",
            manager.display_name(),
            plural(set.packages.len(), "package")
        ));
        return;
    }

    out.info(&format!(
        "Installing {} with {}: {}",
        plural(missing.len(), "package"),
        manager.display_name(),
        missing.join(", ")
    ));

    let refs = missing.iter().map(|name| PackageRef::new(set.manager, name.as_str()));
    if manager.install(&missing, out) {
        report.installed.extend(refs);
    } else {
        out.warning(&format!("{} install did not succeed", manager.display_name()));
        report.failed.extend(refs);
    }
}
