use crate::{
    CaptureSettings, EncoderLauncher, EncoderLocator, RecorderError, SessionController,
    SessionState, StatusStore, StopSignal, ToggleOutcome, UnixProcessProbe,
};
use crate::tests::session::FakeProbe;

use std::{fs, path::PathBuf, time::Duration};

use tempfile::TempDir;

fn empty_locator() -> EncoderLocator {
    EncoderLocator {
        companion_bin: None,
        path_program: None,
        fallbacks: Vec::new(),
    }
}

#[allow(clippy::unwrap_used)]
fn stub_launcher(temp: &TempDir) -> EncoderLauncher {
    let bin = temp.path().join("ffmpeg");
    fs::write(&bin, b"fake").unwrap();
    EncoderLauncher::new(CaptureSettings::default(), temp.path().join("encoder.log")).with_locator(
        EncoderLocator {
            companion_bin: Some(bin),
            path_program: None,
            fallbacks: Vec::new(),
        },
    )
}

/// Fake encoder that creates its output file (last argument), then keeps
/// running until signalled, the way the real capture process does.
#[allow(clippy::unwrap_used)]
fn recording_stub_launcher(temp: &TempDir) -> EncoderLauncher {
    use std::os::unix::fs::PermissionsExt;

    let bin = temp.path().join("ffmpeg");
    fs::write(
        &bin,
        "#!/bin/sh\nfor arg; do out=\"$arg\"; done\ntouch \"$out\"\nexec sleep 30\n",
    )
    .unwrap();
    let mut perms = fs::metadata(&bin).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&bin, perms).unwrap();

    EncoderLauncher::new(CaptureSettings::default(), temp.path().join("encoder.log")).with_locator(
        EncoderLocator {
            companion_bin: Some(bin),
            path_program: None,
            fallbacks: Vec::new(),
        },
    )
}

/// WHAT: Stop with no active recording reports NothingToStop
/// WHY: The caller needs a distinct outcome for a no-op stop
#[test]
#[allow(clippy::unwrap_used)]
fn given_idle_store_when_stopping_then_nothing_to_stop() {
    // Given: An empty profile
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    let probe = FakeProbe::default();
    let launcher = stub_launcher(&temp);
    let controller = SessionController::new(&store, &probe, &launcher, temp.path().join("rec"));

    // When: Stopping
    let result = controller.stop();

    // Then: NothingToStop
    assert!(matches!(result, Err(RecorderError::NothingToStop { .. })));
}

/// WHAT: A second start while the encoder is live is refused
/// WHY: At most one recording may ever be active
#[test]
#[allow(clippy::unwrap_used)]
fn given_live_tracked_encoder_when_starting_then_already_recording() {
    // Given: A store tracking a live pid
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    store.save(true, Some(&PathBuf::from("/tmp/a.mp4")), Some(77));
    let probe = FakeProbe::default().with_running(77);
    let launcher = stub_launcher(&temp);
    let controller = SessionController::new(&store, &probe, &launcher, temp.path().join("rec"));

    // When: Starting again
    let result = controller.start();

    // Then: Refused without touching the tracked session
    assert!(matches!(
        result,
        Err(RecorderError::AlreadyRecording { pid: 77, .. })
    ));
    assert_eq!(store.tracked_pid(), Some(77));
}

/// WHAT: Stopping an already-dead encoder clears state and returns the path
/// WHY: The last-known file must stay actionable after an encoder crash
#[test]
#[allow(clippy::unwrap_used)]
fn given_dead_tracked_encoder_when_stopping_then_cleared_and_path_returned() {
    // Given: An active session whose pid is gone
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    let output = temp.path().join("recording_x.mp4");
    store.save(true, Some(&output), Some(88));
    let probe = FakeProbe::default();
    let launcher = stub_launcher(&temp);
    let controller = SessionController::new(&store, &probe, &launcher, temp.path().join("rec"));

    // When: Stopping
    let stopped = controller.stop().unwrap();

    // Then: No signals were sent, the store is idle, and the path came back
    assert_eq!(stopped, Some(output));
    assert!(probe.signals().is_empty());
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(store.tracked_pid(), None);
}

/// WHAT: A responsive encoder is never force-killed
/// WHY: The interrupt path lets the encoder finalize its container
#[test]
#[allow(clippy::unwrap_used)]
fn given_responsive_encoder_when_stopping_then_no_forced_kill() {
    // Given: A live encoder that exits on interrupt
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    store.save(true, Some(&PathBuf::from("/tmp/a.mp4")), Some(99));
    let probe = FakeProbe::default().with_running(99).dies_on_interrupt(true);
    let launcher = stub_launcher(&temp);
    let controller = SessionController::new(&store, &probe, &launcher, temp.path().join("rec"));

    // When: Stopping
    controller.stop().unwrap();

    // Then: Exactly one interrupt, no kill
    assert_eq!(probe.signals(), vec![(99, StopSignal::Interrupt)]);
}

/// WHAT: An unresponsive encoder gets exactly one forced kill after the window
/// WHY: Graceful shutdown is bounded; escalation happens once
#[test]
#[allow(clippy::unwrap_used)]
fn given_unresponsive_encoder_when_stopping_then_single_forced_kill() {
    // Given: A live encoder that ignores the interrupt
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    store.save(true, Some(&PathBuf::from("/tmp/a.mp4")), Some(99));
    let probe = FakeProbe::default().with_running(99);
    let launcher = stub_launcher(&temp);
    let controller = SessionController::new(&store, &probe, &launcher, temp.path().join("rec"));

    // When: Stopping (polls the full 2s window first)
    controller.stop().unwrap();

    // Then: Interrupt followed by exactly one kill, store cleared
    assert_eq!(
        probe.signals(),
        vec![(99, StopSignal::Interrupt), (99, StopSignal::Kill)]
    );
    assert_eq!(store.tracked_pid(), None);
}

/// WHAT: Start without any encoder installed fails cleanly
/// WHY: A missing dependency must not leave active-looking state behind
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_encoder_installed_when_starting_then_not_found_and_store_inactive() {
    // Given: A launcher with nowhere to find a binary
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    let probe = FakeProbe::default();
    let launcher = EncoderLauncher::new(CaptureSettings::default(), temp.path().join("enc.log"))
        .with_locator(empty_locator());
    let controller = SessionController::new(&store, &probe, &launcher, temp.path().join("rec"));

    // When: Starting
    let result = controller.start();

    // Then: EncoderNotFound and the store stays inactive
    assert!(matches!(result, Err(RecorderError::EncoderNotFound { .. })));
    let (active, _) = store.load(&probe);
    assert!(!active);
}

/// WHAT: A full toggle cycle returns the store to its pre-start state
/// WHY: Start then stop must leave no residue beyond the recorded file
#[test]
#[allow(clippy::unwrap_used, clippy::panic)]
fn given_recording_stub_when_toggling_twice_then_store_round_trips_to_inactive() {
    // Given: A fake encoder that creates its output and waits for a signal
    let temp = TempDir::new().unwrap();
    let store = StatusStore::new(temp.path());
    let probe = UnixProcessProbe;
    let launcher = recording_stub_launcher(&temp);
    let save_dir = temp.path().join("rec");
    let controller = SessionController::new(&store, &probe, &launcher, save_dir.clone());

    // When: Toggling to start
    let started = controller.toggle().unwrap();
    assert!(matches!(started, ToggleOutcome::Started { .. }));
    assert!(matches!(controller.state(), SessionState::Recording { .. }));

    // Give the stub time to create its output file.
    std::thread::sleep(Duration::from_millis(300));

    // And: Toggling again to stop
    let stopped = controller.toggle().unwrap();

    // Then: The finished file exists and the store is exactly inactive again
    match stopped {
        ToggleOutcome::Stopped { finished: Some(path) } => {
            assert!(path.exists());
            assert!(path.starts_with(&save_dir));
        }
        other => panic!("expected a finished recording, got {other:?}"),
    }
    let (active, output_path) = store.load(&probe);
    assert!(!active);
    assert_eq!(output_path, None);
    assert!(!store.pid_path().exists());
}
