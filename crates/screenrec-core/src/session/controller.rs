//! Start/stop/toggle orchestration for the recording session.
//!
//! The state machine has two states, `Idle` and `Recording`, and the
//! durable truth lives in [`StatusStore`]; this controller only ever
//! reads, transitions, and clears it. Stopping is graceful first:
//! interrupt the encoder so it can finalize the container, poll for exit,
//! and escalate to a forced kill only when it stays unresponsive.

use crate::{
    RecorderError, CoreResult,
    session::{EncoderLauncher, ProcessProbe, StatusStore, StopSignal},
};

use std::{panic::Location, path::PathBuf, time::Duration};

use chrono::Local;
use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Interval between liveness polls during graceful stop.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Polls before escalating to a forced kill (2s total).
const STOP_POLL_ATTEMPTS: u32 = 10;

/// Current recording session state, re-derived from the store on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No recording active.
    Idle,
    /// A recording is active.
    Recording {
        /// Output path recorded at start, when known.
        output_path: Option<PathBuf>,
    },
}

/// Result of a [`SessionController::toggle`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A new recording was started.
    Started {
        /// Process id of the spawned encoder.
        pid: u32,
    },
    /// The active recording was stopped.
    Stopped {
        /// The finished file, present only when it exists on disk.
        finished: Option<PathBuf>,
    },
}

/// Orchestrates session transitions over a store, a probe, and a launcher.
pub struct SessionController<'a, P: ProcessProbe> {
    store: &'a StatusStore,
    probe: &'a P,
    launcher: &'a EncoderLauncher,
    save_dir: PathBuf,
}

impl<'a, P: ProcessProbe> SessionController<'a, P> {
    /// Controller writing recordings into `save_dir`.
    pub fn new(
        store: &'a StatusStore,
        probe: &'a P,
        launcher: &'a EncoderLauncher,
        save_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            probe,
            launcher,
            save_dir: save_dir.into(),
        }
    }

    /// Current state per the store, reconciled against the process table.
    pub fn state(&self) -> SessionState {
        let (active, output_path) = self.store.load(self.probe);
        if active {
            SessionState::Recording { output_path }
        } else {
            SessionState::Idle
        }
    }

    /// Start a new recording. The output file is timestamped under the
    /// configured save directory; the launcher corrects its extension.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&self) -> CoreResult<u32> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let output_base = self.save_dir.join(format!("recording_{stamp}.webm"));
        self.launcher.launch(self.store, self.probe, &output_base)
    }

    /// Stop the active recording and return its last known output path.
    ///
    /// The path is returned even when the encoder had already died on its
    /// own, so callers can still act on whatever file it left behind. The
    /// store is cleared to inactive no matter how shutdown proceeds.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&self) -> CoreResult<Option<PathBuf>> {
        let (active, output_path) = self.store.load(self.probe);
        if !active {
            return Err(RecorderError::NothingToStop {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(pid) = self.store.tracked_pid() {
            if self.probe.is_running(pid) {
                info!(pid, "Stopping recording");
                self.graceful_stop(pid);
            } else {
                info!(pid, "Tracked encoder already exited");
            }
        }

        self.store.save(false, None, None);

        Ok(output_path)
    }

    /// The single entry point behind the default user action: stop when
    /// recording (returning the finished file for the post-stop menu),
    /// start otherwise.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn toggle(&self) -> CoreResult<ToggleOutcome> {
        match self.state() {
            SessionState::Recording { .. } => {
                let finished = self.stop()?.filter(|path| path.exists());
                Ok(ToggleOutcome::Stopped { finished })
            }
            SessionState::Idle => {
                let pid = self.start()?;
                Ok(ToggleOutcome::Started { pid })
            }
        }
    }

    /// Interrupt, poll for exit up to the 2s window, then force-kill once.
    fn graceful_stop(&self, pid: u32) {
        if let Err(e) = self.probe.send_signal(pid, StopSignal::Interrupt) {
            warn!(pid, error = %e, "Failed to deliver interrupt signal");
        }
        for _ in 0..STOP_POLL_ATTEMPTS {
            if !self.probe.is_running(pid) {
                return;
            }
            std::thread::sleep(STOP_POLL_INTERVAL);
        }
        warn!(pid, "Encoder unresponsive after interrupt, force-killing");
        if let Err(e) = self.probe.send_signal(pid, StopSignal::Kill) {
            warn!(pid, error = %e, "Failed to deliver kill signal");
        }
    }
}
