//! Screenrec Core Library
//!
//! Recording session lifecycle for an external framebuffer encoder:
//! durable on-disk status tracking, process liveness probing,
//! graceful-then-forced shutdown, and cancellable subprocess transfers
//! for sharing finished recordings.
//!
//! Every user action runs as a fresh short-lived invocation; the only
//! state that survives between invocations lives in [`StatusStore`]'s
//! marker files and is reconciled against the OS process table on load.
//!
//! # Example
//!
//! ```no_run
//! use screenrec_core::{
//!     CaptureSettings, CoreResult, EncoderLauncher, SessionController, StatusStore,
//!     ToggleOutcome, UnixProcessProbe,
//! };
//!
//! use std::path::PathBuf;
//!
//! fn main() -> CoreResult<()> {
//!     let profile = PathBuf::from("/storage/.config/screenrec");
//!     let store = StatusStore::new(&profile);
//!     let probe = UnixProcessProbe;
//!     let launcher = EncoderLauncher::new(CaptureSettings::default(), profile.join("encoder.log"));
//!     let controller = SessionController::new(&store, &probe, &launcher, profile.join("recordings"));
//!
//!     match controller.toggle()? {
//!         ToggleOutcome::Started { pid } => println!("recording as pid {pid}"),
//!         ToggleOutcome::Stopped { finished } => println!("finished: {finished:?}"),
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod session;
mod transfer;

pub use {
    error::{RecorderError, Result as CoreResult},
    session::{
        CaptureSettings, EncoderInvocation, EncoderKind, EncoderLauncher, EncoderLocator,
        Framerate, ProcessProbe, Quality, Resolution, SessionController, SessionState,
        StatusStore, StopSignal, ToggleOutcome, UnixProcessProbe,
    },
    transfer::{
        CancellableTransfer, ShareFlow, ShareOutcome, ShareSettings, TransferJob,
        TransferMonitor, TransferResult, TransferRunner, UploadBackend, INTERRUPTED_EXIT_CODE,
    },
};

#[cfg(test)]
mod tests;
