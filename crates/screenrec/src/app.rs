//! Per-invocation orchestration.
//!
//! Every user action runs through [`App::run`], which is the error
//! boundary: whatever goes wrong below it becomes a user-facing message
//! plus a logged diagnostic, and the invocation reports a clean
//! success/failure outcome to its caller.

use crate::{
    Action, AppError, AppResult, MediaPlayer, Presenter, Profile, ProgressIndicator, config::Config,
    logs,
};

use std::path::{Path, PathBuf};

use screenrec_core::{
    CancellableTransfer, EncoderLauncher, RecorderError, SessionController, ShareFlow,
    ShareOutcome, StatusStore, ToggleOutcome, UnixProcessProbe,
};
use tracing::{error, info, instrument, warn};

/// Main application state for one invocation.
pub struct App<'a> {
    config: Config,
    profile: Profile,
    presenter: &'a dyn Presenter,
}

impl<'a> App<'a> {
    /// Application over a loaded configuration and resolved profile.
    pub fn new(config: Config, profile: Profile, presenter: &'a dyn Presenter) -> Self {
        Self {
            config,
            profile,
            presenter,
        }
    }

    /// Run one action to completion. Never propagates an error; returns
    /// whether the action succeeded.
    #[instrument(skip(self))]
    pub fn run(&self, action: Action) -> bool {
        let result = match action {
            Action::Toggle => self.toggle(),
            Action::Start => self.start(),
            Action::Stop => self.stop(),
            Action::About => self.about(),
            Action::ExportLogs => self.export_logs(),
            Action::OpenLogs => logs::open_location(&self.profile),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = ?e, "Action failed");
                self.presenter.alert(&user_message(&e));
                false
            }
        }
    }

    fn launcher(&self) -> EncoderLauncher {
        let settings = self
            .config
            .capture
            .capture_settings(self.config.behaviour.debug_log);
        EncoderLauncher::new(settings, self.profile.encoder_log())
    }

    fn save_dir(&self) -> PathBuf {
        self.config
            .capture
            .save_path
            .clone()
            .unwrap_or_else(|| self.profile.recordings_dir())
    }

    #[instrument(skip(self))]
    fn toggle(&self) -> AppResult<()> {
        let store = StatusStore::new(self.profile.data_dir());
        let probe = UnixProcessProbe;
        let launcher = self.launcher();
        let controller = SessionController::new(&store, &probe, &launcher, self.save_dir());

        match controller.toggle()? {
            ToggleOutcome::Started { pid } => {
                info!(pid, "Recording started");
                self.presenter.notify("Recording started");
            }
            ToggleOutcome::Stopped { finished } => {
                self.presenter.notify("Recording stopped");
                if let Some(path) = finished {
                    self.post_stop_menu(&path);
                }
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn start(&self) -> AppResult<()> {
        let store = StatusStore::new(self.profile.data_dir());
        let probe = UnixProcessProbe;
        let launcher = self.launcher();
        let controller = SessionController::new(&store, &probe, &launcher, self.save_dir());

        let pid = controller.start()?;
        info!(pid, "Recording started");
        self.presenter.notify("Recording started");
        Ok(())
    }

    #[instrument(skip(self))]
    fn stop(&self) -> AppResult<()> {
        let store = StatusStore::new(self.profile.data_dir());
        let probe = UnixProcessProbe;
        let launcher = self.launcher();
        let controller = SessionController::new(&store, &probe, &launcher, self.save_dir());

        match controller.stop() {
            Ok(_) => {
                self.presenter.notify("Recording stopped");
                Ok(())
            }
            Err(RecorderError::NothingToStop { .. }) => {
                self.presenter.notify("No active recording");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Offer the share/play/dismiss choice for a finished recording.
    ///
    /// Failures here are reported but never fail the action; the recording
    /// itself already stopped successfully.
    #[instrument(skip(self, path))]
    fn post_stop_menu(&self, path: &Path) {
        let share_enabled = self.config.share.enable_share;
        let options: Vec<&str> = if share_enabled {
            vec!["Share", "Play", "Dismiss"]
        } else {
            vec!["Play", "Dismiss"]
        };

        let selection = self.presenter.select("Recording finished", &options);
        let result = match selection {
            Some(0) if share_enabled => self.share(path),
            Some(index) if (share_enabled && index == 1) || (!share_enabled && index == 0) => {
                self.play(path)
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            error!(error = ?e, "Post-stop action failed");
            self.presenter.alert(&user_message(&e));
        }
    }

    #[instrument(skip(self, path))]
    fn share(&self, path: &Path) -> AppResult<()> {
        let runner = CancellableTransfer;
        let flow = ShareFlow::new(&runner, self.config.share.share_settings(), self.profile.qr_image());
        let indicator = ProgressIndicator::new();

        match flow.upload(path, &indicator) {
            Ok(ShareOutcome::Disabled) => {
                self.presenter.alert("Sharing is disabled in the settings.");
                Ok(())
            }
            Ok(ShareOutcome::Uploaded { url, qr_image }) => {
                match qr_image {
                    Some(image) => {
                        self.presenter.show_qr(&url, &image);
                        // The QR image is scratch; drop it once shown.
                        if let Err(e) = std::fs::remove_file(&image) {
                            warn!(path = ?image, error = %e, "Failed to remove QR image");
                        }
                    }
                    None => self.presenter.show_text("Share link", &url),
                }
                Ok(())
            }
            Err(RecorderError::TransferCancelled { .. }) => {
                self.presenter.notify("Upload cancelled");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, path))]
    fn play(&self, path: &Path) -> AppResult<()> {
        let player = MediaPlayer::new(self.config.behaviour.player_endpoint.as_deref());
        player.play(path)
    }

    fn about(&self) -> AppResult<()> {
        self.presenter.alert(&format!(
            "Screenrec {}\nFramebuffer screen recorder",
            env!("CARGO_PKG_VERSION")
        ));
        Ok(())
    }

    #[instrument(skip(self))]
    fn export_logs(&self) -> AppResult<()> {
        let store = StatusStore::new(self.profile.data_dir());
        let config_path = Config::config_path().ok();
        let bundle = logs::export_bundle(&self.profile, &store, config_path.as_deref())?;
        self.presenter
            .alert(&format!("Log bundle created:\n{}", bundle.display()));
        Ok(())
    }
}

/// Translate an error into the message the user sees at the boundary.
fn user_message(error: &AppError) -> String {
    match error {
        AppError::Recorder { source, .. } => match source {
            RecorderError::AlreadyRecording { .. } => {
                "A recording is already active. Stop it first.".to_string()
            }
            RecorderError::EncoderNotFound { .. } => {
                "FFmpeg was not found. Install the FFmpeg tools package.".to_string()
            }
            RecorderError::SaveDirCreateFailed { source, .. } => {
                format!("Could not create the save directory: {source}")
            }
            RecorderError::CommandBuildFailed { .. } => {
                "Could not build the encoder command.".to_string()
            }
            RecorderError::SpawnFailed { source, .. } => {
                format!("Failed to start the recording: {source}")
            }
            RecorderError::NothingToStop { .. } => "No active recording".to_string(),
            RecorderError::TransferFailed {
                exit_code,
                stdout_snippet,
                stderr_snippet,
                ..
            } => format!(
                "Failed to upload the video.\nrc={exit_code}\nout[:120]={stdout_snippet}\nerr[:120]={stderr_snippet}"
            ),
            RecorderError::TransferCancelled { .. } => "Upload cancelled".to_string(),
            RecorderError::QrFetchFailed { .. } => "Could not generate a QR code.".to_string(),
            RecorderError::IoError { source, .. } => format!("Unexpected IO error: {source}"),
        },
        AppError::ConfigError { reason, .. } => format!("Configuration problem: {reason}"),
        AppError::ArchiveError { reason, .. } => format!("Could not create the log bundle: {reason}"),
        AppError::PlaybackFailed { reason, .. } => format!("Could not play the file: {reason}"),
        AppError::IoError { source, .. } => format!("Unexpected IO error: {source}"),
    }
}
