//! # Package Manager Registry
//!
//! Builds one instance per backend type on first use and keeps it for the
//! lifetime of the registry.
//!
//! ## Adding a New Backend
//!
//! 1. Create `src/packages/<backend>.rs` with a Manager struct
//! 2. Implement the `PackageManager` trait
//! 3. Add a `ManagerKind::<Name>` variant to `core/types.rs`
//! 4. Register it in `ManagerRegistry::register_defaults()`
//! 5. Add it to `candidate_backends()` for the platforms it runs on

use crate::core::platform::{PlatformInfo, candidate_backends};
use crate::core::types::ManagerKind;
use crate::packages::PackageManager;
use crate::packages::{apt, aur, brew, cargo, dnf, flatpak, mas, pacman};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Factory function for creating package manager instances
pub type ManagerFactory = Box<dyn Fn(&PlatformInfo) -> Arc<dyn PackageManager> + Send + Sync>;

pub struct ManagerRegistry {
    factories: HashMap<ManagerKind, ManagerFactory>,
    instances: Mutex<HashMap<ManagerKind, Arc<dyn PackageManager>>>,
}

impl ManagerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Register a backend with its factory function, replacing any previous one
    pub fn register<F>(&mut self, kind: ManagerKind, factory: F)
    where
        F: Fn(&PlatformInfo) -> Arc<dyn PackageManager> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
        if let Ok(mut instances) = self.instances.lock() {
            instances.remove(&kind);
        }
    }

    /// Register all built-in backends
    pub fn register_defaults(&mut self) {
        self.register(ManagerKind::Homebrew, |_| {
            Arc::new(brew::BrewManager::formulas())
        });
        self.register(ManagerKind::HomebrewCask, |_| {
            Arc::new(brew::BrewManager::casks())
        });
        self.register(ManagerKind::Mas, |_| Arc::new(mas::MasManager::new()));
        self.register(ManagerKind::Pacman, |_| {
            Arc::new(pacman::PacmanManager::new())
        });
        // The helper is whatever the platform detector found first
        self.register(ManagerKind::Aur, |platform| {
            Arc::new(aur::AurManager::new(platform.aur_helper))
        });
        self.register(ManagerKind::Apt, |_| Arc::new(apt::AptManager::new()));
        self.register(ManagerKind::Dnf, |_| Arc::new(dnf::DnfManager::new()));
        self.register(ManagerKind::Flatpak, |_| {
            Arc::new(flatpak::FlatpakManager::new())
        });
        self.register(ManagerKind::Cargo, |_| Arc::new(cargo::CargoManager::new()));
    }

    pub fn has_backend(&self, kind: ManagerKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// The memoized instance for `kind`, built on first request
    pub fn get(&self, kind: ManagerKind, platform: &PlatformInfo) -> Option<Arc<dyn PackageManager>> {
        let factory = self.factories.get(&kind)?;

        // A poisoned map only loses memoization; build a fresh instance
        let Ok(mut instances) = self.instances.lock() else {
            return Some(factory(platform));
        };

        let manager = instances
            .entry(kind)
            .or_insert_with(|| factory(platform));
        Some(Arc::clone(manager))
    }

    /// Every backend usable on this host, in candidate order.
    ///
    /// Homebrew casks are listed right after Homebrew whenever Homebrew
    /// itself is available.
    pub fn available_managers(&self, platform: &PlatformInfo) -> Vec<Arc<dyn PackageManager>> {
        let mut kinds: Vec<ManagerKind> = Vec::new();
        for kind in candidate_backends(platform.os, platform.distro) {
            kinds.push(kind);
            if kind == ManagerKind::Homebrew {
                kinds.push(ManagerKind::HomebrewCask);
            }
        }

        let mut seen = Vec::new();
        let mut managers = Vec::new();
        for kind in kinds {
            if seen.contains(&kind) {
                continue;
            }
            seen.push(kind);

            if let Some(manager) = self.get(kind, platform)
                && manager.is_available()
            {
                managers.push(manager);
            }
        }

        // Casks ride on Homebrew's availability
        if !managers.iter().any(|m| m.kind() == ManagerKind::Homebrew) {
            managers.retain(|m| m.kind() != ManagerKind::HomebrewCask);
        }

        managers
    }

    /// Drop all memoized instances
    pub fn clear(&self) {
        if let Ok(mut instances) = self.instances.lock() {
            instances.clear();
        }
    }
}

impl Default for ManagerRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }
}

#[cfg(test)]
mod tests;
