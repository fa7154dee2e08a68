use crate::StatusStore;
use crate::tests::session::FakeProbe;

use std::{fs, path::PathBuf};

use tempfile::TempDir;

/// WHAT: Missing marker files read back as not recording
/// WHY: A fresh profile must not look like an active session
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_files_when_loading_then_inactive() {
    // Given: An empty profile directory
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());

    // When: Loading the state
    let (active, output_path) = store.load(&FakeProbe::default());

    // Then: Not recording, no output path
    assert!(!active);
    assert_eq!(output_path, None);
}

/// WHAT: A saved active state round-trips through load
/// WHY: The store is the only truth surviving between invocations
#[test]
#[allow(clippy::unwrap_used)]
fn given_active_save_when_loading_then_state_round_trips() {
    // Given: An active recording saved with path and live pid
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    let output = temp.path().join("recording_x.mp4");
    store.save(true, Some(&output), Some(4242));

    // When: Loading with a probe that sees the pid alive
    let probe = FakeProbe::default().with_running(4242);
    let (active, output_path) = store.load(&probe);

    // Then: Active with the same output path
    assert!(active);
    assert_eq!(output_path, Some(output));
    assert_eq!(store.tracked_pid(), Some(4242));
}

/// WHAT: A pid file alone with a live pid reads as active
/// WHY: A crash between the two marker writes must still be recoverable
#[test]
#[allow(clippy::unwrap_used)]
fn given_pid_file_only_with_live_pid_when_loading_then_active() {
    // Given: Only the pid marker exists (status file write never happened)
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    fs::write(store.pid_path(), "4242").unwrap();

    // When: Loading with the pid alive
    let probe = FakeProbe::default().with_running(4242);
    let (active, output_path) = store.load(&probe);

    // Then: Liveness overrides the missing flag
    assert!(active);
    assert_eq!(output_path, None);
}

/// WHAT: A pid file alone with a dead pid reads as inactive
/// WHY: Stale markers from a crashed encoder must not block new starts
#[test]
#[allow(clippy::unwrap_used)]
fn given_pid_file_only_with_dead_pid_when_loading_then_inactive() {
    // Given: Only the pid marker exists and the pid is gone
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    fs::write(store.pid_path(), "4242").unwrap();

    // When: Loading with no live processes
    let (active, _) = store.load(&FakeProbe::default());

    // Then: Not recording
    assert!(!active);
}

/// WHAT: A corrupt pid file degrades to inactive instead of erroring
/// WHY: Load must never fail; broken state means "not recording"
#[test]
#[allow(clippy::unwrap_used)]
fn given_corrupt_pid_file_when_loading_then_degrades_to_inactive() {
    // Given: A pid marker with unparseable contents
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    fs::write(store.pid_path(), "not-a-pid").unwrap();

    // When: Loading
    let (active, output_path) = store.load(&FakeProbe::default());

    // Then: Degrades to the inactive default
    assert!(!active);
    assert_eq!(output_path, None);
    assert_eq!(store.tracked_pid(), None);
}

/// WHAT: The status flag still counts when the tracked pid is dead
/// WHY: Stop must see the session as active to clear it and return the path
#[test]
#[allow(clippy::unwrap_used)]
fn given_active_flag_with_dead_pid_when_loading_then_flag_wins() {
    // Given: Active flag and path on disk, pid no longer alive
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    let output = temp.path().join("recording_x.webm");
    store.save(true, Some(&output), Some(4242));

    // When: Loading with no live processes
    let (active, output_path) = store.load(&FakeProbe::default());

    // Then: The OR'd flag keeps the session active
    assert!(active);
    assert_eq!(output_path, Some(output));
}

/// WHAT: Saving without a pid removes the pid marker
/// WHY: Clearing to inactive must leave no stale process record behind
#[test]
#[allow(clippy::unwrap_used)]
fn given_save_without_pid_when_pid_file_present_then_marker_removed() {
    // Given: An active save that wrote the pid marker
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    store.save(true, Some(&PathBuf::from("/tmp/x.mp4")), Some(17));
    assert!(store.pid_path().exists());

    // When: Clearing to inactive
    store.save(false, None, None);

    // Then: Pid marker is gone and load reports idle
    assert!(!store.pid_path().exists());
    assert_eq!(store.tracked_pid(), None);
    let (active, _) = store.load(&FakeProbe::default());
    assert!(!active);
}
