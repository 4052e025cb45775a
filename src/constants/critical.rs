/// Critical Linux system packages protected from orphan removal
///
/// These packages are never removed by a purge even if not declared. Names
/// cover the Arch, Debian and Fedora spellings where they differ.
///
/// Only packages critical to system operation are included.
/// User-choice packages (AUR helpers like paru, yay) are NOT included.
pub const LINUX: &[&str] = &[
    // Kernels & base
    "linux",
    "linux-lts",
    "linux-zen",
    "linux-hardened",
    "linux-firmware",
    "linux-image-generic",
    "kernel",
    "kernel-core",
    // Microcode
    "amd-ucode",
    "intel-ucode",
    "intel-microcode",
    "amd64-microcode",
    // Boot loaders
    "grub",
    "grub2",
    "grub-efi-amd64",
    "systemd-boot",
    "efibootmgr",
    "shim",
    // System essentials
    "base",
    "base-devel",
    "base-files",
    // System daemons
    "systemd",
    "systemd-libs",
    "systemd-sysvcompat",
    "networkmanager",
    "network-manager",
    "NetworkManager",
    "wpa_supplicant",
    // Core libraries
    "glibc",
    "libc6",
    "gcc-libs",
    "zlib",
    "openssl",
    // Shells & auth
    "bash",
    "zsh",
    "sudo",
    "pam",
    "shadow",
    "passwd",
    // Package tooling
    "pacman",
    "apt",
    "dpkg",
    "dnf",
    "rpm",
    // System utilities
    "util-linux",
    "coreutils",
    // Filesystems
    "btrfs-progs",
    "e2fsprogs",
    "dosfstools",
];

/// Apple-shipped App Store apps never removed by a purge
pub const MAS: &[&str] = &[
    "409183694", // Keynote
    "409203825", // Numbers
    "409201541", // Pages
    "408981434", // iMovie
    "682658836", // GarageBand
    "497799835", // Xcode
    "899247664", // TestFlight
];
