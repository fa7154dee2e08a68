//! Durable recording state shared across short-lived invocations.
//!
//! Two small marker files in the profile directory are the only source of
//! truth for "is a recording running": a pid file (plain integer text) and
//! a status file (line 1: `"1"`/`"0"`, optional line 2: output path). The
//! two records are written independently so a crash between writes still
//! yields a recoverable state: on load the stored pid is probed against
//! the process table, and liveness wins over whatever the flag says.

use crate::session::ProcessProbe;

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, warn};

/// File name of the process-id marker.
pub(crate) const PID_FILE_NAME: &str = "recording.pid";
/// File name of the status marker.
pub(crate) const STATUS_FILE_NAME: &str = "recording_status.txt";

/// On-disk record of the current recording session.
pub struct StatusStore {
    status_path: PathBuf,
    pid_path: PathBuf,
}

impl StatusStore {
    /// Create a store rooted in `profile_dir`. The directory itself is
    /// created lazily by the first `save`.
    pub fn new(profile_dir: &Path) -> Self {
        Self {
            status_path: profile_dir.join(STATUS_FILE_NAME),
            pid_path: profile_dir.join(PID_FILE_NAME),
        }
    }

    /// Path of the status marker file (for diagnostics bundling).
    pub fn status_path(&self) -> &Path {
        &self.status_path
    }

    /// Path of the pid marker file (for diagnostics bundling).
    pub fn pid_path(&self) -> &Path {
        &self.pid_path
    }

    /// Persist the recording state.
    ///
    /// The status file and the pid file are written independently; a
    /// failure of either is logged and swallowed so the action that
    /// triggered the save can still report its own outcome.
    #[instrument(skip(self, output_path))]
    pub fn save(&self, active: bool, output_path: Option<&Path>, pid: Option<u32>) {
        let mut contents = String::from(if active { "1" } else { "0" });
        if let Some(path) = output_path {
            contents.push('\n');
            contents.push_str(&path.to_string_lossy());
        }
        if let Some(parent) = self.status_path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!(dir = ?parent, error = %e, "Failed to create profile directory");
        }
        if let Err(e) = fs::write(&self.status_path, contents) {
            warn!(path = ?self.status_path, error = %e, "Failed to write status file");
        }

        match pid {
            Some(pid) => {
                if let Err(e) = fs::write(&self.pid_path, pid.to_string()) {
                    warn!(path = ?self.pid_path, error = %e, "Failed to write pid file");
                }
            }
            None => self.clear_pid(),
        }
    }

    /// Read back the recording state, reconciled against the process table.
    ///
    /// The pid file is consulted first: a live pid means active regardless
    /// of the stored flag, covering the crash window where the status file
    /// write never happened or went stale. Missing files mean "not
    /// recording"; any read or parse problem degrades to `(false, None)`.
    #[instrument(skip(self, probe))]
    pub fn load<P: ProcessProbe>(&self, probe: &P) -> (bool, Option<PathBuf>) {
        let mut active = match self.tracked_pid() {
            Some(pid) => probe.is_running(pid),
            None => false,
        };

        let mut output_path = None;
        match fs::read_to_string(&self.status_path) {
            Ok(contents) => {
                let mut lines = contents.lines();
                active |= lines.next().map(str::trim) == Some("1");
                if let Some(path) = lines.next() {
                    let path = path.trim();
                    if !path.is_empty() {
                        output_path = Some(PathBuf::from(path));
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = ?self.status_path, error = %e, "Failed to read status file");
            }
        }

        debug!(active, output_path = ?output_path, "Status loaded");
        (active, output_path)
    }

    /// The process id recorded by the last `save`, if any.
    pub fn tracked_pid(&self) -> Option<u32> {
        match fs::read_to_string(&self.pid_path) {
            Ok(contents) => contents.trim().parse().ok(),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = ?self.pid_path, error = %e, "Failed to read pid file");
                }
                None
            }
        }
    }

    /// Remove the pid marker if present.
    pub(crate) fn clear_pid(&self) {
        if let Err(e) = fs::remove_file(&self.pid_path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = ?self.pid_path, error = %e, "Failed to remove pid file");
        }
    }
}
