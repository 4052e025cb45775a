//! Package Name Matching
//!
//! Several ecosystems allow tap- or scope-qualified names:
//! - `org/tap/tool` (Homebrew taps)
//! - `owner/project/pkg` style references
//!
//! The installed listing may report either form (`brew list` prints the short
//! name, `brew leaves` prints the qualified one), so declared and installed
//! names are compared on both the full name and its trailing short name.

use std::collections::HashSet;

/// Trailing component of a qualified name (`org/tap/tool` -> `tool`)
pub fn short_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Declared package names indexed by full and short form
#[derive(Debug, Default, Clone)]
pub struct DeclaredNames {
    names: HashSet<String>,
}

impl DeclaredNames {
    pub fn new<I, S>(declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = HashSet::new();
        for name in declared {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            names.insert(name.to_string());
            names.insert(short_name(name).to_string());
        }
        Self { names }
    }

    /// True when `installed` matches a declared name by full or short form
    pub fn contains(&self, installed: &str) -> bool {
        self.names.contains(installed) || self.names.contains(short_name(installed))
    }
}

/// Whether two names refer to the same package under the full/short rule
pub fn names_match(declared: &str, installed: &str) -> bool {
    declared == installed
        || short_name(declared) == installed
        || declared == short_name(installed)
        || short_name(declared) == short_name(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_tap_prefix() {
        assert_eq!(short_name("org/tap/tool"), "tool");
        assert_eq!(short_name("tool"), "tool");
        assert_eq!(short_name("com.spotify.Client"), "com.spotify.Client");
    }

    #[test]
    fn declared_full_name_matches_short_installed() {
        let declared = DeclaredNames::new(["org/tap/tool"]);
        assert!(declared.contains("tool"));
        assert!(declared.contains("org/tap/tool"));
        assert!(!declared.contains("other"));
    }

    #[test]
    fn declared_short_name_matches_qualified_installed() {
        let declared = DeclaredNames::new(["tool"]);
        assert!(declared.contains("org/tap/tool"));
    }

    #[test]
    fn blank_entries_are_ignored() {
        let declared = DeclaredNames::new(["", "  "]);
        assert!(!declared.contains(""));
    }

    #[test]
    fn names_match_is_symmetric_on_short_forms() {
        assert!(names_match("org/tap/tool", "tool"));
        assert!(names_match("tool", "org/tap/tool"));
        assert!(names_match("git", "git"));
        assert!(!names_match("git", "gitui"));
    }
}
