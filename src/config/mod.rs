pub mod loader;
pub mod migration;
pub mod types;

pub use loader::{MigrationOutcome, load_config, migrate_file, save_config};
pub use types::DeclaredConfig;
