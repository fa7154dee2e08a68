//! Capture option sets accepted by the encoder launcher.
//!
//! Each option is a closed enum mapped onto the fixed values the encoder
//! command line understands; free-form strings never reach the invocation.

/// Capture resolution of the scaled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 1280x720.
    Hd720,
    /// 1920x1080.
    FullHd1080,
    /// 3840x2160.
    Uhd2160,
}

impl Resolution {
    /// Output dimensions as `(width, height)`.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Hd720 => (1280, 720),
            Self::FullHd1080 => (1920, 1080),
            Self::Uhd2160 => (3840, 2160),
        }
    }
}

/// Capture framerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framerate {
    /// 10 frames per second.
    Fps10,
    /// 15 frames per second.
    Fps15,
    /// 20 frames per second.
    Fps20,
    /// 25 frames per second.
    Fps25,
    /// 30 frames per second.
    Fps30,
}

impl Framerate {
    /// Frames per second as an integer.
    pub fn fps(self) -> u32 {
        match self {
            Self::Fps10 => 10,
            Self::Fps15 => 15,
            Self::Fps20 => 20,
            Self::Fps25 => 25,
            Self::Fps30 => 30,
        }
    }
}

/// Encoding quality, expressed as a CRF-like value (lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// CRF 50.
    Low,
    /// CRF 40.
    Medium,
    /// CRF 30.
    High,
}

impl Quality {
    /// Constant-rate-factor value passed to the encoder.
    pub fn crf(self) -> u32 {
        match self {
            Self::Low => 50,
            Self::Medium => 40,
            Self::High => 30,
        }
    }
}

/// Codec backend. Exactly three are supported; each carries its own fixed
/// flag set and container extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderKind {
    /// Software VP9 (`libvpx-vp9`), WebM container.
    Vp9,
    /// Software H.264 (`libx264`), MP4 container.
    X264,
    /// Hardware H.264 via V4L2 (`h264_v4l2m2m`), MP4 container.
    V4l2m2m,
}

impl EncoderKind {
    /// Container extension matching the codec family.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Vp9 => "webm",
            Self::X264 | Self::V4l2m2m => "mp4",
        }
    }
}

/// Settings consumed by [`crate::EncoderLauncher`], derived fresh from the
/// configuration on every start.
#[derive(Debug, Clone, Copy)]
pub struct CaptureSettings {
    /// Output resolution.
    pub resolution: Resolution,
    /// Capture framerate.
    pub framerate: Framerate,
    /// Encoding quality.
    pub quality: Quality,
    /// Codec backend.
    pub encoder: EncoderKind,
    /// Elevate the encoder's own log verbosity.
    pub debug_log: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::FullHd1080,
            framerate: Framerate::Fps25,
            quality: Quality::Medium,
            encoder: EncoderKind::X264,
            debug_log: false,
        }
    }
}
