use super::*;
use crate::context::testing::fake_context;
use crate::core::events::EngineEvent;
use crate::packages::fake::{FakeHost, FakeManager};
use std::path::Path;
use tempfile::tempdir;

fn apt_context(dir: &Path, apt: &Arc<FakeManager>) -> AppContext {
    fake_context(
        FakeHost::linux("ubuntu", &["apt-get"]),
        &[Arc::clone(apt)],
        &dir.join("packages.lock.json"),
    )
}

fn refs(names: &[&str]) -> Vec<PackageRef> {
    names
        .iter()
        .map(|name| PackageRef::new(ManagerKind::Apt, *name))
        .collect()
}

fn installed_and_outdated(fake: FakeManager, names: &[&str]) -> FakeManager {
    let installed: Vec<(&str, &str)> = names.iter().map(|n| (*n, "1.0")).collect();
    let outdated: Vec<(&str, &str, &str)> = names.iter().map(|n| (*n, "1.0", "2.0")).collect();
    fake.with_installed(&installed).with_outdated(&outdated)
}

#[test]
fn leftover_from_bulk_upgrade_succeeds_on_retry() {
    let dir = tempdir().expect("tempdir");
    let apt = Arc::new(
        installed_and_outdated(FakeManager::new(ManagerKind::Apt), &["foo", "bar"]).resisting_bulk(&["bar"]),
    );
    let ctx = apt_context(dir.path(), &apt);
    let (reporter, _events, _answers) = Reporter::channel();

    let result = upgrade_all(&ctx, true, &reporter).unwrap();

    assert_eq!(result.attempted, refs(&["foo", "bar"]));
    assert_eq!(result.succeeded, refs(&["foo", "bar"]));
    assert!(result.failed.is_empty());
    assert!(result.still_outdated.is_empty());
    assert_eq!(
        apt.upgrade_log(),
        vec![None, Some(vec!["bar".to_string()])]
    );
}

#[test]
fn attempted_is_partitioned_into_succeeded_and_failed() {
    let dir = tempdir().expect("tempdir");
    let apt = Arc::new(
        installed_and_outdated(FakeManager::new(ManagerKind::Apt), &["foo", "bar", "baz"])
            .resisting_bulk(&["bar", "baz"])
            .resisting_retry(&["baz"]),
    );
    let ctx = apt_context(dir.path(), &apt);
    let (reporter, _events, _answers) = Reporter::channel();

    let result = upgrade_all(&ctx, true, &reporter).unwrap();

    assert_eq!(result.succeeded, refs(&["foo", "bar"]));
    assert_eq!(result.failed, refs(&["baz"]));
    assert!(result.still_outdated.is_empty());
    let mut settled = [result.succeeded.clone(), result.failed.clone()].concat();
    settled.sort();
    let mut attempted = result.attempted.clone();
    attempted.sort();
    assert_eq!(settled, attempted);
}

#[test]
fn upgrade_refreshes_cleans_up_and_writes_lockfile() {
    let dir = tempdir().expect("tempdir");
    let apt = Arc::new(installed_and_outdated(FakeManager::new(ManagerKind::Apt), &["foo"]));
    let ctx = apt_context(dir.path(), &apt);
    let (reporter, _events, _answers) = Reporter::channel();

    upgrade_all(&ctx, true, &reporter).unwrap();

    assert_eq!(apt.update_calls(), 1);
    assert_eq!(apt.cleanup_calls(), 1);
    let lock = ctx.lock_store().load().unwrap().unwrap().to_current();
    assert_eq!(lock.packages["apt:foo"].version, "2.0");
}

#[test]
fn nothing_outdated_skips_upgrade() {
    let dir = tempdir().expect("tempdir");
    let apt = Arc::new(FakeManager::new(ManagerKind::Apt).with_installed(&[("foo", "1.0")]));
    let ctx = apt_context(dir.path(), &apt);
    let (reporter, _events, _answers) = Reporter::channel();

    let result = upgrade_all(&ctx, true, &reporter).unwrap();

    assert_eq!(result, UpgradeResult::default());
    assert!(apt.upgrade_log().is_empty());
}

#[test]
fn without_verification_bulk_status_decides() {
    let dir = tempdir().expect("tempdir");
    let apt = Arc::new(
        installed_and_outdated(FakeManager::new(ManagerKind::Apt), &["foo", "bar"]).resisting_bulk(&["bar"]),
    );
    let ctx = apt_context(dir.path(), &apt);
    let (reporter, _events, _answers) = Reporter::channel();

    let result = upgrade_all(&ctx, false, &reporter).unwrap();

    // The bulk run reported failure and nothing was re-checked
    assert_eq!(result.failed, refs(&["foo", "bar"]));
    assert!(result.succeeded.is_empty());
    assert_eq!(apt.upgrade_log(), vec![None]);
}

#[test]
fn unparseable_outdated_listing_is_warned_and_skipped() {
    let dir = tempdir().expect("tempdir");
    let apt = Arc::new(FakeManager::new(ManagerKind::Apt).unparseable_outdated());
    let ctx = apt_context(dir.path(), &apt);
    let (reporter, events, _answers) = Reporter::channel();

    let result = upgrade_all(&ctx, true, &reporter).unwrap();

    assert!(result.attempted.is_empty());
    assert!(apt.upgrade_log().is_empty());
    assert!(
        events
            .try_iter()
            .any(|e| matches!(e, EngineEvent::Warning(msg) if msg.contains("Could not parse")))
    );
}

#[test]
fn interactive_quit_skips_rest_of_manager() {
    let dir = tempdir().expect("tempdir");
    let apt = Arc::new(installed_and_outdated(
        FakeManager::new(ManagerKind::Apt),
        &["foo", "bar", "baz", "qux"],
    ));
    let ctx = apt_context(dir.path(), &apt);
    let (reporter, _events, answers) = Reporter::channel();
    answers.send(Answer::Yes).unwrap();
    answers.send(Answer::No).unwrap();
    answers.send(Answer::Quit).unwrap();

    let summary = upgrade_interactive(&ctx, &reporter).unwrap();

    assert_eq!(summary.upgraded, refs(&["foo"]));
    assert_eq!(summary.skipped, refs(&["bar", "baz", "qux"]));
    assert_eq!(summary.aborted_managers, vec![ManagerKind::Apt]);
    assert_eq!(apt.upgrade_log(), vec![Some(vec!["foo".to_string()])]);
    assert_eq!(apt.cleanup_calls(), 1);
}

#[test]
fn interactive_with_closed_answers_upgrades_nothing() {
    let dir = tempdir().expect("tempdir");
    let apt = Arc::new(installed_and_outdated(FakeManager::new(ManagerKind::Apt), &["foo", "bar"]));
    let ctx = apt_context(dir.path(), &apt);
    let (reporter, _events, answers) = Reporter::channel();
    drop(answers);

    let summary = upgrade_interactive(&ctx, &reporter).unwrap();

    assert!(summary.upgraded.is_empty());
    assert_eq!(summary.skipped, refs(&["foo", "bar"]));
    assert!(apt.upgrade_log().is_empty());
}

#[test]
fn unwritable_lockfile_keeps_upgrade_results() {
    let dir = tempdir().expect("tempdir");
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let apt = Arc::new(installed_and_outdated(FakeManager::new(ManagerKind::Apt), &["foo"]));
    let ctx = apt_context(&blocker, &apt);
    let (reporter, events, answers) = Reporter::channel();

    let result = upgrade_all(&ctx, true, &reporter).unwrap();
    assert_eq!(result.succeeded, refs(&["foo"]));
    assert!(result.lockfile_error.is_some());
    assert!(
        events
            .try_iter()
            .any(|e| matches!(e, EngineEvent::Warning(msg) if msg.starts_with("Lockfile not updated")))
    );

    drop(answers);
    let summary = upgrade_interactive(&ctx, &reporter).unwrap();
    assert!(summary.lockfile_error.is_some());
}
