mod controller;
mod encoder;
mod options;
mod process;
mod status_store;

pub use {
    controller::{SessionController, SessionState, ToggleOutcome},
    encoder::{EncoderInvocation, EncoderLauncher, EncoderLocator},
    options::{CaptureSettings, EncoderKind, Framerate, Quality, Resolution},
    process::{ProcessProbe, StopSignal, UnixProcessProbe},
    status_store::StatusStore,
};
