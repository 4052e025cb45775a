use super::*;
use crate::core::events::Reporter;
use crate::packages::fake::{FakeManager, linux_platform, macos_platform};
use crate::utils::distro::DistroType;

fn register_fake(registry: &mut ManagerRegistry, fake: FakeManager) -> Arc<FakeManager> {
    let fake = Arc::new(fake);
    let kind = fake.kind();
    let handle = Arc::clone(&fake);
    registry.register(kind, move |_| Arc::clone(&handle) as Arc<dyn PackageManager>);
    fake
}

fn kinds(managers: &[Arc<dyn PackageManager>]) -> Vec<ManagerKind> {
    managers.iter().map(|m| m.kind()).collect()
}

#[test]
fn defaults_cover_every_kind() {
    let registry = ManagerRegistry::default();
    for kind in ManagerKind::ALL {
        assert!(registry.has_backend(kind), "missing {}", kind);
    }
}

#[test]
fn instances_are_memoized_until_cleared() {
    let registry = ManagerRegistry::default();
    let platform = linux_platform(DistroType::Fedora, &[ManagerKind::Dnf]);

    let first = registry.get(ManagerKind::Dnf, &platform).unwrap();
    let second = registry.get(ManagerKind::Dnf, &platform).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    registry.clear();
    let third = registry.get(ManagerKind::Dnf, &platform).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
}

#[test]
fn unregistered_kind_is_none() {
    let registry = ManagerRegistry::new();
    let platform = linux_platform(DistroType::Arch, &[]);
    assert!(registry.get(ManagerKind::Pacman, &platform).is_none());
}

#[test]
fn homebrew_surfaces_casks_in_order() {
    let mut registry = ManagerRegistry::new();
    register_fake(&mut registry, FakeManager::new(ManagerKind::Homebrew));
    register_fake(&mut registry, FakeManager::new(ManagerKind::HomebrewCask));
    register_fake(&mut registry, FakeManager::new(ManagerKind::Mas).unavailable());
    register_fake(&mut registry, FakeManager::new(ManagerKind::Cargo));

    let platform = macos_platform(&[ManagerKind::Homebrew, ManagerKind::Cargo]);
    assert_eq!(
        kinds(&registry.available_managers(&platform)),
        vec![
            ManagerKind::Homebrew,
            ManagerKind::HomebrewCask,
            ManagerKind::Cargo
        ]
    );
}

#[test]
fn casks_hidden_without_homebrew() {
    let mut registry = ManagerRegistry::new();
    register_fake(&mut registry, FakeManager::new(ManagerKind::Homebrew).unavailable());
    register_fake(&mut registry, FakeManager::new(ManagerKind::HomebrewCask));

    let platform = macos_platform(&[]);
    assert!(registry.available_managers(&platform).is_empty());
}

#[test]
fn linux_candidates_filtered_by_availability() {
    let mut registry = ManagerRegistry::new();
    register_fake(&mut registry, FakeManager::new(ManagerKind::Pacman));
    register_fake(&mut registry, FakeManager::new(ManagerKind::Aur).unavailable());
    register_fake(&mut registry, FakeManager::new(ManagerKind::Apt));
    register_fake(&mut registry, FakeManager::new(ManagerKind::Flatpak));

    let platform = linux_platform(DistroType::Arch, &[]);
    // apt is not a candidate on Arch even though it reports available
    assert_eq!(
        kinds(&registry.available_managers(&platform)),
        vec![ManagerKind::Pacman, ManagerKind::Flatpak]
    );
}

#[test]
fn re_registering_replaces_memoized_instance() {
    let mut registry = ManagerRegistry::new();
    let platform = linux_platform(DistroType::Debian, &[]);
    register_fake(&mut registry, FakeManager::new(ManagerKind::Apt));
    let first = registry.get(ManagerKind::Apt, &platform).unwrap();

    register_fake(&mut registry, FakeManager::new(ManagerKind::Apt));
    let second = registry.get(ManagerKind::Apt, &platform).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn every_backend_treats_empty_lists_as_done() {
    let backends: Vec<Arc<dyn PackageManager>> = vec![
        Arc::new(brew::BrewManager::formulas()),
        Arc::new(brew::BrewManager::casks()),
        Arc::new(mas::MasManager::new()),
        Arc::new(pacman::PacmanManager::new()),
        Arc::new(aur::AurManager::new(None)),
        Arc::new(apt::AptManager::new()),
        Arc::new(dnf::DnfManager::new()),
        Arc::new(flatpak::FlatpakManager::new()),
        Arc::new(cargo::CargoManager::new()),
    ];
    let (reporter, events, _answers) = Reporter::channel();

    for backend in &backends {
        assert!(backend.install(&[], &reporter), "{} install", backend.kind());
        assert!(backend.uninstall(&[], &reporter), "{} uninstall", backend.kind());
    }
    assert!(events.try_recv().is_err());
}
