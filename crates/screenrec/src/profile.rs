//! Profile directory layout: where the state markers, logs, and the QR
//! scratch image live between invocations.

use crate::{AppError, AppResult};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;

/// File name of the application log written by the tracing appender.
pub(crate) const APP_LOG_FILE: &str = "screenrec.log";
/// File name of the append-only encoder output log.
pub(crate) const ENCODER_LOG_FILE: &str = "encoder.log";
/// File name of the QR scratch image.
pub(crate) const QR_IMAGE_FILE: &str = "qr.png";

/// Private per-user profile directory.
pub struct Profile {
    data_dir: PathBuf,
}

impl Profile {
    /// Resolve and create the profile data directory.
    #[track_caller]
    pub fn resolve() -> AppResult<Self> {
        let proj_dirs = ProjectDirs::from("com", "screenrec", "ScreenRec").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get profile directory".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir)?;

        Ok(Self { data_dir })
    }

    /// Profile rooted at an explicit directory.
    #[cfg(test)]
    pub(crate) fn for_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The profile data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The application log file.
    pub fn app_log(&self) -> PathBuf {
        self.data_dir.join(APP_LOG_FILE)
    }

    /// The append-only encoder output log.
    pub fn encoder_log(&self) -> PathBuf {
        self.data_dir.join(ENCODER_LOG_FILE)
    }

    /// Scratch location for a fetched QR image.
    pub fn qr_image(&self) -> PathBuf {
        self.data_dir.join(QR_IMAGE_FILE)
    }

    /// Default directory for finished recordings.
    pub fn recordings_dir(&self) -> PathBuf {
        self.data_dir.join("recordings")
    }
}
