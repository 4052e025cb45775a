use crate::core::events::Reporter;
use crate::core::matcher;
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::Result;
use std::collections::HashMap;

/// Uniform capability contract every backend implements.
///
/// Mutating operations return `false` when the underlying command did not
/// succeed; they never panic or error. Queries return `Ok(empty)` when the
/// command fails and `Err(Unparseable)` when its output cannot be read.
pub trait PackageManager: Send + Sync {
    fn kind(&self) -> ManagerKind;

    fn display_name(&self) -> &'static str {
        self.kind().display_name()
    }

    fn is_available(&self) -> bool;

    /// Refresh the manager's index. No-op where the manager has no index.
    fn update(&self, _out: &Reporter) -> bool {
        true
    }

    /// Installing an empty list succeeds without running anything
    fn install(&self, names: &[String], out: &Reporter) -> bool;

    /// Uninstalling an empty list succeeds without running anything
    fn uninstall(&self, names: &[String], out: &Reporter) -> bool;

    /// Upgrade `names`, or everything outdated when `None`
    fn upgrade(&self, names: Option<&[String]>, out: &Reporter) -> bool;

    fn list_installed(&self) -> Result<Vec<PackageInfo>>;

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>>;

    /// Explicitly installed packages, excluding dependencies.
    /// `None` when the manager has no such concept.
    fn list_leaves(&self) -> Option<Result<Vec<String>>> {
        None
    }

    /// Remove caches and orphaned dependencies
    fn cleanup(&self, _out: &Reporter) -> bool {
        true
    }

    /// Whether taps/PPAs/COPRs/remotes can be added
    fn supports_repositories(&self) -> bool {
        false
    }

    /// Repositories already configured, in the same notation `add_repository` accepts
    fn list_repositories(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn add_repository(&self, _reference: &str, _out: &Reporter) -> bool {
        false
    }

    /// Installed packages that depend on `name`
    fn dependents(&self, _name: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Where each installed package came from (tap, remote), keyed by name
    fn package_origins(&self) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }

    /// Batch membership query answered from a single installed listing.
    ///
    /// Names match on either their full or short form.
    fn is_installed(&self, names: &[String]) -> Result<HashMap<String, bool>> {
        let installed = self.list_installed()?;
        let installed_names: Vec<&str> = installed.iter().map(|p| p.name.as_str()).collect();

        Ok(names
            .iter()
            .map(|name| {
                let present = installed_names
                    .iter()
                    .any(|installed| matcher::names_match(name, installed));
                (name.clone(), present)
            })
            .collect())
    }
}
