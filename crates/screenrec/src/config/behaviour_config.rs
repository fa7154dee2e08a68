use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Elevate logging to debug, both for the app and the encoder.
    #[serde(default)]
    pub debug_log: bool,
    /// JSON-RPC endpoint of a media center to hand playback to when the
    /// system opener fails (None = plain open-by-URL fallback).
    #[serde(default)]
    pub player_endpoint: Option<String>,
}
