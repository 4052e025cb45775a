//! Command dispatcher
//!
//! Routes CLI commands to the engines and renders their reports.

use crate::cli::args::{Cli, Command, ConfigCommand, GlobalFlags, LockCommand};
use crate::commands::{self, lock, orphans, sync, upgrade};
use crate::config::{self, DeclaredConfig, MigrationOutcome};
use crate::context::AppContext;
use crate::core::events::Reporter;
use crate::core::types::PackageRef;
use crate::error::{PkgsyncError, Result};
use crate::state::{LockDocument, LockStore};
use crate::ui as output;
use crate::utils::paths;
use std::path::{Path, PathBuf};

/// Dispatch the parsed CLI command to the appropriate handler
pub fn dispatch(args: &Cli) -> Result<()> {
    let out = Reporter::console();

    match &args.command {
        Command::Sync => handle_sync(&args.global, &out),
        Command::Upgrade {
            interactive,
            no_verify,
        } => handle_upgrade(&args.global, *interactive, !*no_verify, &out),
        Command::Orphans { purge, yes } => handle_orphans(&args.global, *purge, !*yes, &out),
        Command::Lock { command } => handle_lock(&args.global, *command, &out),
        Command::Config {
            command: ConfigCommand::Migrate { path },
        } => {
            let path = match path {
                Some(path) => paths::expand_home(path)?,
                None => config_path(&args.global)?,
            };
            handle_migrate(&path)
        }
    }
}

fn config_path(global: &GlobalFlags) -> Result<PathBuf> {
    match &global.config {
        Some(path) => paths::expand_home(path),
        None => paths::config_file(),
    }
}

fn lockfile_path(global: &GlobalFlags) -> Result<PathBuf> {
    match &global.lockfile {
        Some(path) => paths::expand_home(path),
        None => paths::lockfile(),
    }
}

fn context(global: &GlobalFlags) -> Result<AppContext> {
    Ok(AppContext::system(lockfile_path(global)?))
}

fn load(global: &GlobalFlags) -> Result<DeclaredConfig> {
    let path = config_path(global)?;
    output::verbose(&format!("Using config {}", path.display()));
    config::load_config(&path)
}

fn handle_sync(global: &GlobalFlags, out: &Reporter) -> Result<()> {
    let config = load(global)?;
    let ctx = context(global)?;
    let report = sync::sync(&ctx, &config, out)?;

    if let Some(purge) = &report.purge
        && !purge.failed.is_empty()
    {
        print_refs(
            "Could not remove",
            purge
                .failed
                .iter()
                .map(|o| PackageRef::new(o.manager, o.name.as_str())),
        );
    }
    if !report.repositories_failed.is_empty() {
        print_refs("Repositories not added", report.repositories_failed.iter().cloned());
    }
    if report.failed.is_empty() {
        return lockfile_outcome(report.lockfile_error);
    }
    print_refs("Failed to install", report.failed.iter().cloned());
    Err(PkgsyncError::Other(format!(
        "{} could not be installed",
        commands::plural(report.failed.len(), "package")
    )))
}

fn handle_upgrade(global: &GlobalFlags, interactive: bool, verify: bool, out: &Reporter) -> Result<()> {
    let ctx = context(global)?;

    if interactive {
        let summary = upgrade::upgrade_interactive(&ctx, out)?;
        if !summary.failed.is_empty() {
            print_refs("Failed to upgrade", summary.failed.iter().cloned());
        }
        return lockfile_outcome(summary.lockfile_error);
    }

    let result = upgrade::upgrade_all(&ctx, verify, out)?;
    if !result.still_outdated.is_empty() {
        print_refs("Not checked", result.still_outdated.iter().cloned());
    }
    if result.failed.is_empty() {
        return lockfile_outcome(result.lockfile_error);
    }
    print_refs("Failed to upgrade", result.failed.iter().cloned());
    Err(PkgsyncError::Other(format!(
        "{} could not be upgraded",
        commands::plural(result.failed.len(), "package")
    )))
}

fn handle_orphans(global: &GlobalFlags, purge: bool, interactive: bool, out: &Reporter) -> Result<()> {
    let config = load(global)?;
    let ctx = context(global)?;

    if purge {
        let report = orphans::purge(&ctx, &config, interactive, out)?;
        if !report.declined.is_empty() {
            output::info(&format!("Kept {} on request", commands::plural(report.declined.len(), "package")));
        }
        if report.failed.is_empty() {
            return Ok(());
        }
        return Err(PkgsyncError::Other(format!(
            "{} could not be removed",
            commands::plural(report.failed.len(), "package")
        )));
    }

    let result = orphans::detect_orphans(&ctx, &config, out)?;
    if result.orphans.is_empty() {
        output::success("No orphaned packages");
    } else {
        output::header("Orphaned packages");
        for orphan in &result.orphans {
            output::indent(&format!("{} ({})", orphan.name, orphan.package_type), 1);
        }
    }
    if !result.kept.is_empty() && output::is_verbose() {
        output::header("Kept");
        for kept in &result.kept {
            output::indent(&format!("{}:{} {:?}", kept.manager, kept.name, kept.reason), 1);
        }
    }
    Ok(())
}

fn handle_lock(global: &GlobalFlags, command: LockCommand, out: &Reporter) -> Result<()> {
    match command {
        LockCommand::Update => {
            let ctx = context(global)?;
            let lock = lock::update_lockfile(&ctx, out)?;
            output::success(&format!(
                "Recorded {} in {}",
                commands::plural(lock.packages.len(), "package"),
                ctx.lock_store().path().display()
            ));
            Ok(())
        }
        LockCommand::Diff => {
            let ctx = context(global)?;
            let changes = lock::get_changed_packages(&ctx, out)?;
            if changes.is_empty() {
                output::success("No changes since the lockfile was written");
                return Ok(());
            }
            if !changes.added.is_empty() {
                output::header("Added");
                for package in &changes.added {
                    output::indent(&format!("{}:{} {}", package.manager, package.name, package.version), 1);
                }
            }
            if !changes.removed.is_empty() {
                output::header("Removed");
                for package in &changes.removed {
                    output::indent(&format!("{}:{} {}", package.manager, package.name, package.version), 1);
                }
            }
            if !changes.upgraded.is_empty() {
                output::header("Upgraded");
                for package in &changes.upgraded {
                    output::indent(
                        &format!("{}:{} {} -> {}", package.manager, package.name, package.from, package.to),
                        1,
                    );
                }
            }
            Ok(())
        }
        LockCommand::Show => show_lockfile(&lockfile_path(global)?),
    }
}

fn show_lockfile(path: &Path) -> Result<()> {
    let store = LockStore::new(path);
    let Some(document) = store.load()? else {
        output::info(&format!("No lockfile at {}", path.display()));
        return Ok(());
    };

    let lock = document.to_current();
    output::keyval("Lockfile", &path.display().to_string());
    match document {
        LockDocument::V1(_) => output::keyval("Schema", "1 (legacy, rewritten on next update)"),
        LockDocument::V2(_) => output::keyval("Schema", &lock.version.to_string()),
    }
    output::keyval("Last updated", &lock.last_updated.to_rfc3339());
    output::keyval("Packages", &lock.packages.len().to_string());

    for (key, entry) in &lock.packages {
        let origin = entry.tap.as_deref().or(entry.source.as_deref());
        match origin {
            Some(origin) => output::indent(&format!("{} {} ({})", key, entry.version, origin), 1),
            None => output::indent(&format!("{} {}", key, entry.version), 1),
        }
    }
    Ok(())
}

fn handle_migrate(path: &Path) -> Result<()> {
    match config::migrate_file(path)? {
        MigrationOutcome::Migrated { from } => output::success(&format!(
            "Migrated {} from version {} to {}",
            path.display(),
            from,
            config::types::CURRENT_CONFIG_VERSION
        )),
        MigrationOutcome::AlreadyCurrent => output::info(&format!(
            "{} is already at version {}",
            path.display(),
            config::types::CURRENT_CONFIG_VERSION
        )),
    }
    Ok(())
}

/// The packages were handled; a lockfile that could not be written still fails the exit status
fn lockfile_outcome(error: Option<String>) -> Result<()> {
    match error {
        Some(message) => Err(PkgsyncError::LockError(message)),
        None => Ok(()),
    }
}

fn print_refs(title: &str, refs: impl Iterator<Item = PackageRef>) {
    output::header(title);
    for package in refs {
        output::indent(&package.to_string(), 1);
    }
}
