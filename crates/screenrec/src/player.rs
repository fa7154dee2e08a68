//! Playback of a finished recording.
//!
//! Primary path is the system opener. When that fails, the file is retried
//! as a `file://` URL, either through a media center's JSON-RPC `Player.Open`
//! endpoint when one is configured, or through the opener again.

use crate::{AppError, AppResult};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    process::Command,
};

use error_location::ErrorLocation;
use serde_json::json;
use tracing::{info, instrument, warn};

/// Hands a finished recording to whatever can play it.
pub struct MediaPlayer<'a> {
    jsonrpc_endpoint: Option<&'a str>,
}

impl<'a> MediaPlayer<'a> {
    /// Player with an optional media-center JSON-RPC endpoint for the
    /// open-by-URL fallback.
    pub fn new(jsonrpc_endpoint: Option<&'a str>) -> Self {
        Self { jsonrpc_endpoint }
    }

    /// Play `path`. A directory falls back to its newest file.
    #[track_caller]
    #[instrument(skip(self, path))]
    pub fn play(&self, path: &Path) -> AppResult<()> {
        if !path.exists() {
            return Err(AppError::PlaybackFailed {
                reason: format!("path does not exist: {}", path.display()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let target = if path.is_dir() {
            let newest = newest_file_in(path)?;
            info!(dir = ?path, file = ?newest, "Directory given; playing latest file");
            newest
        } else {
            path.to_path_buf()
        };

        if open::that(&target).is_ok() {
            info!(path = ?target, "Playback handed to system opener");
            return Ok(());
        }

        // Opener rejected the path; retry as a URL.
        let url = as_file_url(&target);
        warn!(url = %url, "System opener failed, falling back to open-by-URL");
        match self.jsonrpc_endpoint {
            Some(endpoint) => self.jsonrpc_open(endpoint, &url),
            None => open::that(&url).map_err(|e| AppError::PlaybackFailed {
                reason: format!("opener rejected {url}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    #[track_caller]
    fn jsonrpc_open(&self, endpoint: &str, url: &str) -> AppResult<()> {
        let payload = player_open_payload(url);
        let output = Command::new("curl")
            .args([
                "-4",
                "-sS",
                "--http1.1",
                "--connect-timeout",
                "6",
                "--max-time",
                "10",
                "-H",
                "Content-Type: application/json",
                "-d",
                &payload.to_string(),
                endpoint,
            ])
            .output()?;

        if output.status.success() {
            info!(endpoint, "Playback handed to JSON-RPC player");
            Ok(())
        } else {
            Err(AppError::PlaybackFailed {
                reason: format!(
                    "JSON-RPC player refused: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }
}

/// Newest regular file in `dir` by modification time.
#[track_caller]
pub(crate) fn newest_file_in(dir: &Path) -> AppResult<PathBuf> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().is_none_or(|(when, _)| modified > *when) {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, path)| path).ok_or_else(|| AppError::PlaybackFailed {
        reason: format!("directory is empty: {}", dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Render a local path as a `file://` URL; already-URL and relative inputs
/// pass through unchanged.
pub(crate) fn as_file_url(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text.starts_with("file://") || !path.is_absolute() {
        text.into_owned()
    } else {
        format!("file://{text}")
    }
}

/// JSON-RPC `Player.Open` request body for `url`.
pub(crate) fn player_open_payload(url: &str) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "Player.Open",
        "params": { "item": { "file": url } }
    })
}
