use std::path::PathBuf;

use screenrec_core::{CaptureSettings, EncoderKind, Framerate, Quality, Resolution};
use serde::{Deserialize, Serialize};

/// Capture configuration: what the encoder records and where it lands.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Output resolution of the scaled capture.
    #[serde(default)]
    pub resolution: ResolutionSetting,
    /// Capture framerate.
    #[serde(default)]
    pub framerate: FramerateSetting,
    /// Encoding quality.
    #[serde(default)]
    pub quality: QualitySetting,
    /// Codec backend.
    #[serde(default)]
    pub encoder: EncoderSetting,
    /// Directory for finished recordings (None = profile default).
    #[serde(default)]
    pub save_path: Option<PathBuf>,
}

impl CaptureConfig {
    /// Map onto the core capture settings for a launch.
    pub fn capture_settings(&self, debug_log: bool) -> CaptureSettings {
        CaptureSettings {
            resolution: self.resolution.into(),
            framerate: self.framerate.into(),
            quality: self.quality.into(),
            encoder: self.encoder.into(),
            debug_log,
        }
    }
}

/// Output resolution choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolutionSetting {
    /// 1280x720.
    #[serde(rename = "720p")]
    Hd720,
    /// 1920x1080.
    #[default]
    #[serde(rename = "1080p")]
    FullHd1080,
    /// 3840x2160.
    #[serde(rename = "2160p")]
    Uhd2160,
}

impl From<ResolutionSetting> for Resolution {
    fn from(setting: ResolutionSetting) -> Self {
        match setting {
            ResolutionSetting::Hd720 => Resolution::Hd720,
            ResolutionSetting::FullHd1080 => Resolution::FullHd1080,
            ResolutionSetting::Uhd2160 => Resolution::Uhd2160,
        }
    }
}

/// Capture framerate choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FramerateSetting {
    /// 10 fps.
    #[serde(rename = "10")]
    Fps10,
    /// 15 fps.
    #[serde(rename = "15")]
    Fps15,
    /// 20 fps.
    #[serde(rename = "20")]
    Fps20,
    /// 25 fps.
    #[default]
    #[serde(rename = "25")]
    Fps25,
    /// 30 fps.
    #[serde(rename = "30")]
    Fps30,
}

impl From<FramerateSetting> for Framerate {
    fn from(setting: FramerateSetting) -> Self {
        match setting {
            FramerateSetting::Fps10 => Framerate::Fps10,
            FramerateSetting::Fps15 => Framerate::Fps15,
            FramerateSetting::Fps20 => Framerate::Fps20,
            FramerateSetting::Fps25 => Framerate::Fps25,
            FramerateSetting::Fps30 => Framerate::Fps30,
        }
    }
}

/// Encoding quality choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualitySetting {
    /// CRF 50.
    Low,
    /// CRF 40.
    #[default]
    Medium,
    /// CRF 30.
    High,
}

impl From<QualitySetting> for Quality {
    fn from(setting: QualitySetting) -> Self {
        match setting {
            QualitySetting::Low => Quality::Low,
            QualitySetting::Medium => Quality::Medium,
            QualitySetting::High => Quality::High,
        }
    }
}

/// Codec backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderSetting {
    /// Software VP9, WebM container.
    Vp9,
    /// Software H.264, MP4 container.
    #[default]
    X264,
    /// Hardware H.264 via V4L2, MP4 container.
    V4l2m2m,
}

impl From<EncoderSetting> for EncoderKind {
    fn from(setting: EncoderSetting) -> Self {
        match setting {
            EncoderSetting::Vp9 => EncoderKind::Vp9,
            EncoderSetting::X264 => EncoderKind::X264,
            EncoderSetting::V4l2m2m => EncoderKind::V4l2m2m,
        }
    }
}
