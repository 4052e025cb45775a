use super::*;
use crate::core::types::ManagerKind;
use crate::state::types::LockEntry;
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use tempfile::tempdir;

fn sample() -> Lockfile {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Lockfile {
        version: 2,
        last_updated: at,
        packages: BTreeMap::from([
            (
                "homebrew:git".to_string(),
                LockEntry {
                    tap: Some("homebrew/core".to_string()),
                    ..LockEntry::new(ManagerKind::Homebrew, "2.40", at)
                },
            ),
            (
                "flatpak:org.gimp.GIMP".to_string(),
                LockEntry {
                    source: Some("flathub".to_string()),
                    ..LockEntry::new(ManagerKind::Flatpak, "2.10", at)
                },
            ),
        ]),
    }
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempdir().expect("tempdir");
    let store = LockStore::new(dir.path().join("packages.lock.json"));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn save_then_load() {
    let dir = tempdir().expect("tempdir");
    let store = LockStore::new(dir.path().join("nested/packages.lock.json"));
    store.save(&sample()).unwrap();

    assert_eq!(store.load().unwrap(), Some(LockDocument::V2(sample())));
    // No temp file is left behind
    let leftovers: Vec<_> = fs::read_dir(dir.path().join("nested"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn serialized_output_is_sorted() {
    let dir = tempdir().expect("tempdir");
    let store = LockStore::new(dir.path().join("packages.lock.json"));
    store.save(&sample()).unwrap();

    let content = fs::read_to_string(store.path()).unwrap();
    let flatpak = content.find("flatpak:org.gimp.GIMP").unwrap();
    let homebrew = content.find("homebrew:git").unwrap();
    assert!(flatpak < homebrew);
    assert!(content.contains("\"lastUpdated\""));
    assert!(content.contains("\"installedAt\""));
}

#[test]
fn legacy_lockfile_is_readable() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("packages.lock.json");
    fs::write(
        &path,
        r#"{"version": 1, "lastUpdated": "2024-01-01T00:00:00Z",
            "formulas": {"git": {"version": "2.40", "tap": "homebrew/core", "installedAt": "2024-01-01T00:00:00Z"}},
            "casks": {}}"#,
    )
    .unwrap();

    let document = LockStore::new(&path).load().unwrap().unwrap();
    assert_eq!(document.version(), 1);
    assert_eq!(document.to_current().packages["homebrew:git"].version, "2.40");
}

#[test]
fn corrupt_lockfile_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("packages.lock.json");
    fs::write(&path, "{ nope").unwrap();
    assert!(LockStore::new(&path).load().is_err());

    fs::write(&path, r#"{"version": 9, "lastUpdated": "2024-01-01T00:00:00Z"}"#).unwrap();
    assert!(LockStore::new(&path).load().is_err());
}

#[test]
fn lock_contention_returns_error() {
    let dir = tempdir().expect("tempdir");
    let store = LockStore::new(dir.path().join("packages.lock.json"));

    let guard = store.lock().expect("first lock");
    match store.lock() {
        Ok(_) => panic!("second lock should fail"),
        Err(err) => assert!(err.to_string().contains("currently running")),
    }

    drop(guard);
    assert!(store.lock().is_ok());
}
