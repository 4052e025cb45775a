//! Entry points driven by the CLI (or any other front end through a
//! channel [`Reporter`](crate::core::events::Reporter)).
//!
//! - [`sync`]: install what is missing, optionally purge orphans
//! - [`upgrade`]: bulk upgrade with verification, or interactive
//! - [`orphans`]: detect and remove undeclared packages
//! - [`lock`]: lockfile refresh and drift detection

pub mod lock;
pub mod orphans;
pub mod sync;
pub mod upgrade;

use crate::core::events::Reporter;
use crate::core::types::ManagerKind;
use crate::error::{PkgsyncError, Result};
use crate::packages::PackageManager;
use std::sync::Arc;

/// Degrade a failed query to an empty result, reporting why
pub(crate) fn or_empty<T>(
    result: Result<Vec<T>>,
    manager: ManagerKind,
    what: &str,
    out: &Reporter,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(PkgsyncError::Unparseable { manager, detail }) => {
            out.warning(&format!(
                "Could not parse {} output while reading {}; treating it as empty ({})",
                manager, what, detail
            ));
            Vec::new()
        }
        Err(e) => {
            out.warning(&format!("[{}] {} failed: {}", manager, what, e));
            Vec::new()
        }
    }
}

pub(crate) fn find_manager(
    managers: &[Arc<dyn PackageManager>],
    kind: ManagerKind,
) -> Option<&Arc<dyn PackageManager>> {
    managers.iter().find(|m| m.kind() == kind)
}

pub(crate) fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}
