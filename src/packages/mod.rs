//! # Package Manager Implementations
//!
//! One module per backend. Each translates the [`PackageManager`] contract
//! into the commands of a specific tool and parses that tool's output.
//!
//! - **Homebrew** (`brew.rs`): formulas and casks as two independent managers
//! - **Mac App Store** (`mas.rs`): numeric app ids via `mas`
//! - **Pacman** (`pacman.rs`) and **AUR** (`aur.rs`): Arch repositories and helpers
//! - **APT** (`apt.rs`): Debian/Ubuntu, PPAs from `sources.list.d`
//! - **DNF** (`dnf.rs`): Fedora/RHEL, COPR repositories
//! - **Flatpak** (`flatpak.rs`): applications and remotes
//! - **Cargo** (`cargo.rs`): `cargo install` binaries
//!
//! Process spawning, streaming and argument validation live in `command.rs`.
//! The [`ManagerRegistry`] builds one instance per backend on first use.

pub mod apt;
pub mod aur;
pub mod brew;
pub mod cargo;
pub(crate) mod command;
pub mod dnf;
pub mod flatpak;
pub mod mas;
pub mod pacman;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod fake;

pub use registry::ManagerRegistry;
pub use traits::PackageManager;
