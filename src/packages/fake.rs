//! Scripted in-memory backend and host used by engine tests

use crate::core::events::Reporter;
use crate::core::platform::{HostProbe, PlatformInfo};
use crate::core::types::{ManagerKind, PackageInfo, UpgradeInfo};
use crate::error::{PkgsyncError, Result};
use crate::packages::traits::PackageManager;
use crate::utils::distro::{DistroType, Os};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct FakeState {
    installed: Vec<PackageInfo>,
    leaves: Option<Vec<String>>,
    outdated: Vec<UpgradeInfo>,
    repositories: Vec<String>,
    dependents: HashMap<String, Vec<String>>,
    origins: HashMap<String, String>,
    upgrade_log: Vec<Option<Vec<String>>>,
    install_log: Vec<Vec<String>>,
    uninstall_log: Vec<Vec<String>>,
    added_repositories: Vec<String>,
}

/// Behaves like a package manager whose database lives in memory.
///
/// Upgrades clear entries from the outdated list unless the package was
/// told to resist the bulk upgrade or the individual retry.
pub struct FakeManager {
    kind: ManagerKind,
    available: bool,
    state: Mutex<FakeState>,
    resist_bulk: HashSet<String>,
    resist_retry: HashSet<String>,
    fail_installs: bool,
    unparseable_outdated: bool,
    install_calls: AtomicUsize,
    uninstall_calls: AtomicUsize,
    update_calls: AtomicUsize,
    cleanup_calls: AtomicUsize,
    list_installed_calls: AtomicUsize,
}

impl FakeManager {
    pub fn new(kind: ManagerKind) -> Self {
        Self {
            kind,
            available: true,
            state: Mutex::new(FakeState::default()),
            resist_bulk: HashSet::new(),
            resist_retry: HashSet::new(),
            fail_installs: false,
            unparseable_outdated: false,
            install_calls: AtomicUsize::new(0),
            uninstall_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            cleanup_calls: AtomicUsize::new(0),
            list_installed_calls: AtomicUsize::new(0),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state poisoned")
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn with_installed(self, packages: &[(&str, &str)]) -> Self {
        self.state().installed = packages
            .iter()
            .map(|(name, version)| PackageInfo::new(*name, *version))
            .collect();
        self
    }

    pub fn with_leaves(self, leaves: &[&str]) -> Self {
        self.state().leaves = Some(leaves.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_outdated(self, outdated: &[(&str, &str, &str)]) -> Self {
        self.state().outdated = outdated
            .iter()
            .map(|(name, current, new)| UpgradeInfo::new(*name, *current, *new))
            .collect();
        self
    }

    pub fn with_repositories(self, repositories: &[&str]) -> Self {
        self.state().repositories = repositories.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_dependents(self, name: &str, dependents: &[&str]) -> Self {
        self.state().dependents.insert(
            name.to_string(),
            dependents.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_origin(self, name: &str, origin: &str) -> Self {
        self.state()
            .origins
            .insert(name.to_string(), origin.to_string());
        self
    }

    /// Stays outdated after a bulk upgrade
    pub fn resisting_bulk(mut self, names: &[&str]) -> Self {
        self.resist_bulk.extend(names.iter().map(|s| s.to_string()));
        self
    }

    /// Stays outdated after an individual upgrade too
    pub fn resisting_retry(mut self, names: &[&str]) -> Self {
        self.resist_retry.extend(names.iter().map(|s| s.to_string()));
        self
    }

    pub fn failing_installs(mut self) -> Self {
        self.fail_installs = true;
        self
    }

    pub fn unparseable_outdated(mut self) -> Self {
        self.unparseable_outdated = true;
        self
    }

    /// Simulate a version change on the host
    pub fn set_version(&self, name: &str, version: &str) {
        let mut state = self.state();
        match state.installed.iter_mut().find(|p| p.name == name) {
            Some(package) => package.version = version.to_string(),
            None => state.installed.push(PackageInfo::new(name, version)),
        }
    }

    pub fn remove_installed(&self, name: &str) {
        self.state().installed.retain(|p| p.name != name);
    }

    pub fn install_calls(&self) -> usize {
        self.install_calls.load(Ordering::SeqCst)
    }

    pub fn uninstall_calls(&self) -> usize {
        self.uninstall_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn cleanup_calls(&self) -> usize {
        self.cleanup_calls.load(Ordering::SeqCst)
    }

    pub fn list_installed_calls(&self) -> usize {
        self.list_installed_calls.load(Ordering::SeqCst)
    }

    pub fn installed_batches(&self) -> Vec<Vec<String>> {
        self.state().install_log.clone()
    }

    pub fn uninstalled_batches(&self) -> Vec<Vec<String>> {
        self.state().uninstall_log.clone()
    }

    pub fn upgrade_log(&self) -> Vec<Option<Vec<String>>> {
        self.state().upgrade_log.clone()
    }

    pub fn added_repositories(&self) -> Vec<String> {
        self.state().added_repositories.clone()
    }

    pub fn installed_names(&self) -> Vec<String> {
        self.state().installed.iter().map(|p| p.name.clone()).collect()
    }
}

impl PackageManager for FakeManager {
    fn kind(&self) -> ManagerKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn update(&self, _out: &Reporter) -> bool {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn install(&self, names: &[String], _out: &Reporter) -> bool {
        if names.is_empty() {
            return true;
        }
        self.install_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        state.install_log.push(names.to_vec());
        if self.fail_installs {
            return false;
        }
        for name in names {
            if !state.installed.iter().any(|p| &p.name == name) {
                state.installed.push(PackageInfo::new(name.as_str(), "1.0"));
            }
        }
        true
    }

    fn uninstall(&self, names: &[String], _out: &Reporter) -> bool {
        if names.is_empty() {
            return true;
        }
        self.uninstall_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        state.uninstall_log.push(names.to_vec());
        state.installed.retain(|p| !names.contains(&p.name));
        if let Some(leaves) = state.leaves.as_mut() {
            leaves.retain(|leaf| !names.contains(leaf));
        }
        true
    }

    fn upgrade(&self, names: Option<&[String]>, _out: &Reporter) -> bool {
        let mut state = self.state();
        state.upgrade_log.push(names.map(<[String]>::to_vec));

        let outdated = std::mem::take(&mut state.outdated);
        let mut remaining = Vec::new();
        for info in outdated {
            let targeted = names.is_none_or(|names| names.contains(&info.name));
            let resisted = match names {
                None => self.resist_bulk.contains(&info.name),
                Some(_) => self.resist_retry.contains(&info.name),
            };
            if targeted && !resisted {
                if let Some(package) = state.installed.iter_mut().find(|p| p.name == info.name) {
                    package.version = info.new_version.clone();
                }
            } else {
                remaining.push(info);
            }
        }
        let all_done = remaining.is_empty();
        state.outdated = remaining;
        names.is_some() || all_done
    }

    fn list_installed(&self) -> Result<Vec<PackageInfo>> {
        self.list_installed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state().installed.clone())
    }

    fn list_outdated(&self) -> Result<Vec<UpgradeInfo>> {
        if self.unparseable_outdated {
            return Err(PkgsyncError::Unparseable {
                manager: self.kind,
                detail: "expected value at line 1 column 1".to_string(),
            });
        }
        Ok(self.state().outdated.clone())
    }

    fn list_leaves(&self) -> Option<Result<Vec<String>>> {
        self.state().leaves.clone().map(Ok)
    }

    fn cleanup(&self, _out: &Reporter) -> bool {
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn supports_repositories(&self) -> bool {
        true
    }

    fn list_repositories(&self) -> Result<Vec<String>> {
        Ok(self.state().repositories.clone())
    }

    fn add_repository(&self, reference: &str, _out: &Reporter) -> bool {
        let mut state = self.state();
        state.added_repositories.push(reference.to_string());
        state.repositories.push(reference.to_string());
        true
    }

    fn dependents(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.state().dependents.get(name).cloned().unwrap_or_default())
    }

    fn package_origins(&self) -> Result<HashMap<String, String>> {
        Ok(self.state().origins.clone())
    }
}

/// Host probe with a fixed OS, os-release and set of executables
pub struct FakeHost {
    os: Os,
    os_release: Option<String>,
    executables: Vec<String>,
}

impl FakeHost {
    pub fn macos(executables: &[&str]) -> Self {
        Self {
            os: Os::Darwin,
            os_release: None,
            executables: executables.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn linux(os_release_id: &str, executables: &[&str]) -> Self {
        Self {
            os: Os::Linux,
            os_release: Some(format!("ID={}\n", os_release_id)),
            executables: executables.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl HostProbe for FakeHost {
    fn os(&self) -> Option<Os> {
        Some(self.os)
    }

    fn os_release(&self) -> Option<String> {
        self.os_release.clone()
    }

    fn has_executable(&self, name: &str) -> bool {
        self.executables.iter().any(|e| e == name)
    }
}

pub fn macos_platform(backends: &[ManagerKind]) -> PlatformInfo {
    PlatformInfo {
        os: Os::Darwin,
        distro: None,
        aur_helper: None,
        available_backends: backends.to_vec(),
    }
}

pub fn linux_platform(distro: DistroType, backends: &[ManagerKind]) -> PlatformInfo {
    PlatformInfo {
        os: Os::Linux,
        distro: Some(distro),
        aur_helper: None,
        available_backends: backends.to_vec(),
    }
}

/// Write an executable shell script standing in for a package manager binary
#[cfg(unix)]
pub fn scripted_program(dir: &std::path::Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod script");
    path.to_string_lossy().into_owned()
}
