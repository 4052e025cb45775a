pub mod critical;

pub use critical::LINUX as CRITICAL_LINUX_PACKAGES;
pub use critical::MAS as PROTECTED_MAS_APPS;
