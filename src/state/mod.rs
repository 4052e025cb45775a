pub mod changes;
pub mod io;
pub mod merge;
pub mod types;

pub use io::LockStore;
pub use types::{LockDocument, LockEntry, Lockfile};
