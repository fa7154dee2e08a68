use error_location::ErrorLocation;
use thiserror::Error;

/// Recording session and transfer errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// A recording is already active; at most one encoder runs at a time.
    #[error("A recording is already active (pid {pid}) {location}")]
    AlreadyRecording {
        /// Process id of the live encoder.
        pid: u32,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No usable encoder binary was found on this system.
    #[error("Encoder binary not found {location}")]
    EncoderNotFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recording output directory could not be created.
    #[error("Failed to create save directory {path:?}: {source} {location}")]
    SaveDirCreateFailed {
        /// Directory that could not be created.
        path: std::path::PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder invocation could not be assembled.
    #[error("Failed to build encoder command: {reason} {location}")]
    CommandBuildFailed {
        /// Description of what went wrong.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder process could not be spawned.
    #[error("Failed to start encoder: {source} {location}")]
    SpawnFailed {
        /// Underlying IO error from the spawn attempt.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stop was requested but no recording is active.
    #[error("No active recording to stop {location}")]
    NothingToStop {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A network transfer subprocess finished unsuccessfully.
    #[error("Transfer failed (rc={exit_code}) {location}")]
    TransferFailed {
        /// Exit code reported by the transfer subprocess.
        exit_code: i32,
        /// First 120 characters of captured stdout.
        stdout_snippet: String,
        /// First 120 characters of captured stderr.
        stderr_snippet: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The user cancelled a transfer in progress.
    #[error("Transfer cancelled by user {location}")]
    TransferCancelled {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No QR provider produced an image. Soft failure; callers degrade
    /// to showing the raw link.
    #[error("QR image fetch failed {location}")]
    QrFetchFailed {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for RecorderError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        RecorderError::IoError {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
