//! Per-process services shared by every command.
//!
//! Platform detection and the manager registry are lazily populated caches.
//! They live here instead of in globals so tests can build a context with
//! a fake host and fake managers, and [`AppContext::reset`] clears both.

use crate::core::platform::{PlatformDetector, PlatformInfo};
use crate::error::Result;
use crate::packages::{ManagerRegistry, PackageManager};
use crate::state::LockStore;
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppContext {
    detector: PlatformDetector,
    registry: ManagerRegistry,
    lock_store: LockStore,
}

impl AppContext {
    pub fn new(detector: PlatformDetector, registry: ManagerRegistry, lock_store: LockStore) -> Self {
        Self {
            detector,
            registry,
            lock_store,
        }
    }

    /// Real host, built-in backends
    pub fn system(lockfile: impl Into<PathBuf>) -> Self {
        Self::new(
            PlatformDetector::system(),
            ManagerRegistry::default(),
            LockStore::new(lockfile),
        )
    }

    pub fn platform(&self) -> Result<Arc<PlatformInfo>> {
        self.detector.detect()
    }

    /// Platform info, failing when no usable native package manager exists
    pub fn checked_platform(&self) -> Result<Arc<PlatformInfo>> {
        let platform = self.detector.detect()?;
        platform.ensure_prerequisites()?;
        Ok(platform)
    }

    pub fn registry(&self) -> &ManagerRegistry {
        &self.registry
    }

    pub fn lock_store(&self) -> &LockStore {
        &self.lock_store
    }

    pub fn available_managers(&self) -> Result<Vec<Arc<dyn PackageManager>>> {
        let platform = self.detector.detect()?;
        Ok(self.registry.available_managers(&platform))
    }

    /// Forget detected platform info and memoized managers
    pub fn reset(&self) {
        self.detector.clear_cache();
        self.registry.clear();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::fake_context;
    use crate::core::types::ManagerKind;
    use crate::packages::fake::{FakeHost, FakeManager};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn reset_clears_platform_and_instances() {
        let dir = tempdir().expect("tempdir");
        let apt = Arc::new(FakeManager::new(ManagerKind::Apt));
        let ctx = fake_context(
            FakeHost::linux("debian", &["apt-get"]),
            &[apt],
            &dir.path().join("lock.json"),
        );

        let first = ctx.platform().unwrap();
        let managers = ctx.available_managers().unwrap();
        assert_eq!(managers.len(), 1);

        ctx.reset();
        let second = ctx.platform().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn checked_platform_rejects_host_without_native_manager() {
        let dir = tempdir().expect("tempdir");
        let ctx = fake_context(
            FakeHost::linux("debian", &["flatpak"]),
            &[],
            &dir.path().join("lock.json"),
        );
        assert!(matches!(
            ctx.checked_platform(),
            Err(crate::error::PkgsyncError::NoPrerequisite(_))
        ));
    }
}
