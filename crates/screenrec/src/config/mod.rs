mod behaviour_config;
mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod share_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, capture_config::CaptureConfig, config::Config,
    share_config::ShareConfig,
};
#[cfg(test)]
pub(crate) use {
    capture_config::{EncoderSetting, FramerateSetting, QualitySetting, ResolutionSetting},
    share_config::BackendSetting,
};

pub(crate) const DEFAULT_ENABLE_SHARE: bool = true;

pub(crate) fn default_enable_share() -> bool {
    DEFAULT_ENABLE_SHARE
}
