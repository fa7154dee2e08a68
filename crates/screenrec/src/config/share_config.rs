use crate::config::default_enable_share;

use screenrec_core::{ShareSettings, UploadBackend};
use serde::{Deserialize, Serialize};

/// Sharing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Whether the share option is offered after a recording stops.
    #[serde(default = "default_enable_share")]
    pub enable_share: bool,
    /// Upload target.
    #[serde(default)]
    pub upload_backend: BackendSetting,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            enable_share: default_enable_share(),
            upload_backend: BackendSetting::default(),
        }
    }
}

impl ShareConfig {
    /// Map onto the core share settings.
    pub fn share_settings(&self) -> ShareSettings {
        ShareSettings {
            enabled: self.enable_share,
            backend: self.upload_backend.into(),
        }
    }
}

/// Upload backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSetting {
    /// 72-hour retention host.
    #[default]
    Litterbox,
    /// Permanent storage host.
    Catbox,
}

impl From<BackendSetting> for UploadBackend {
    fn from(setting: BackendSetting) -> Self {
        match setting {
            BackendSetting::Litterbox => UploadBackend::Litterbox,
            BackendSetting::Catbox => UploadBackend::Catbox,
        }
    }
}
