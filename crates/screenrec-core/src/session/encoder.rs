//! Encoder binary discovery, command construction, and detached launch.
//!
//! The capture pipeline is delegated entirely to an external ffmpeg
//! process reading the framebuffer device. This module finds a usable
//! binary, assembles the fixed-shape invocation for the selected codec
//! backend, and spawns it detached so it survives the short-lived
//! invocation that started it.

use crate::{
    RecorderError, CoreResult,
    session::{CaptureSettings, EncoderKind, ProcessProbe, StatusStore},
};

use std::{
    env, fs,
    panic::Location,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Fixed capture source.
const FRAMEBUFFER_DEVICE: &str = "/dev/fb0";

/// Bundled binary shipped by the companion tools package.
const COMPANION_FFMPEG: &str = "/storage/.kodi/addons/tools.ffmpeg-tools/bin/ffmpeg";

/// How long a candidate binary gets to answer a version query.
const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const VERSION_PROBE_POLL: Duration = Duration::from_millis(50);

/// Search order for the encoder binary.
///
/// The companion binary is trusted on existence alone; `$PATH` hits are
/// trusted as well; the absolute fallbacks are validated with a bounded
/// version query because they may be stale leftovers.
pub struct EncoderLocator {
    /// Bundled companion binary, returned when present.
    pub companion_bin: Option<PathBuf>,
    /// Program name resolved against `$PATH`.
    pub path_program: Option<String>,
    /// Platform-specific absolute fallbacks, validated before use.
    pub fallbacks: Vec<PathBuf>,
}

impl Default for EncoderLocator {
    fn default() -> Self {
        Self {
            companion_bin: Some(PathBuf::from(COMPANION_FFMPEG)),
            path_program: Some("ffmpeg".to_string()),
            fallbacks: vec![PathBuf::from("/usr/bin/ffmpeg"), PathBuf::from("ffmpeg")],
        }
    }
}

impl EncoderLocator {
    /// First usable encoder binary per the search order, or `None`.
    #[instrument(skip(self))]
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(bin) = &self.companion_bin
            && bin.is_file()
        {
            debug!(path = ?bin, "Using companion encoder binary");
            return Some(bin.clone());
        }

        if let Some(program) = &self.path_program
            && let Some(hit) = search_path(program)
        {
            debug!(path = ?hit, "Encoder found on search path");
            return Some(hit);
        }

        for candidate in &self.fallbacks {
            if validate_candidate(candidate) {
                debug!(path = ?candidate, "Fallback encoder candidate validated");
                return Some(candidate.clone());
            }
        }

        None
    }
}

fn search_path(program: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Run `<candidate> -version` and require a clean exit within the probe
/// timeout. A hung or missing binary is rejected.
fn validate_candidate(candidate: &Path) -> bool {
    let spawned = Command::new(candidate)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    let Ok(mut child) = spawned else {
        return false;
    };

    let deadline = Instant::now() + VERSION_PROBE_TIMEOUT;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return status.success(),
            Ok(None) => {}
            Err(_) => break,
        }
        if Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(VERSION_PROBE_POLL);
    }
    let _ = child.kill();
    let _ = child.wait();
    false
}

/// A fully assembled encoder invocation. Derived fresh on every start,
/// never persisted.
#[derive(Debug, Clone)]
pub struct EncoderInvocation {
    /// Encoder binary to execute.
    pub program: PathBuf,
    /// Complete argument list, output path last.
    pub args: Vec<String>,
    /// Output path with the extension forced to match the codec family.
    pub output_path: PathBuf,
}

/// Locates the encoder, builds its invocation, and launches it detached.
pub struct EncoderLauncher {
    settings: CaptureSettings,
    encoder_log: PathBuf,
    locator: EncoderLocator,
}

impl EncoderLauncher {
    /// Launcher with the default binary search order.
    ///
    /// The encoder's stdout/stderr are appended to `encoder_log`.
    pub fn new(settings: CaptureSettings, encoder_log: PathBuf) -> Self {
        Self {
            settings,
            encoder_log,
            locator: EncoderLocator::default(),
        }
    }

    /// Replace the binary search order (tests, embedded deployments).
    pub fn with_locator(mut self, locator: EncoderLocator) -> Self {
        self.locator = locator;
        self
    }

    /// First usable encoder binary, or `None`.
    pub fn locate(&self) -> Option<PathBuf> {
        self.locator.locate()
    }

    /// Assemble the capture invocation for `output_base`.
    ///
    /// The returned output path has its extension corrected to the chosen
    /// codec family (`.webm` for VP9, `.mp4` for the H.264 backends).
    /// Returns `None` when no encoder binary is found.
    #[instrument(skip(self, output_base))]
    pub fn build_command(&self, output_base: &Path) -> Option<EncoderInvocation> {
        let program = self.locate()?;
        let output_path = force_extension(output_base, self.settings.encoder);

        let (width, height) = self.settings.resolution.dimensions();
        let fps = self.settings.framerate.fps().to_string();
        let scale_filter = format!("scale={width}:{height}:flags=bicubic,format=yuv420p");

        let mut args: Vec<String> = Vec::new();
        if self.settings.debug_log {
            args.extend(["-loglevel", "info", "-stats"].map(String::from));
        } else {
            args.extend(["-loglevel", "warning"].map(String::from));
        }
        args.extend(["-fflags", "+genpts", "-f", "fbdev", "-framerate"].map(String::from));
        args.push(fps);
        args.extend(["-i", FRAMEBUFFER_DEVICE, "-vf"].map(String::from));
        args.push(scale_filter);
        args.push("-y".to_string());

        match self.settings.encoder {
            EncoderKind::X264 => {
                args.extend(
                    ["-c:v", "libx264", "-preset", "ultrafast", "-tune", "zerolatency", "-crf", "28"]
                        .map(String::from),
                );
            }
            EncoderKind::V4l2m2m => {
                args.extend(["-c:v", "h264_v4l2m2m", "-b:v", "4M"].map(String::from));
            }
            EncoderKind::Vp9 => {
                args.extend(["-c:v", "libvpx-vp9", "-crf"].map(String::from));
                args.push(self.settings.quality.crf().to_string());
                args.extend(
                    ["-b:v", "0", "-deadline", "realtime", "-cpu-used", "5"].map(String::from),
                );
            }
        }

        args.push(output_path.to_string_lossy().into_owned());

        Some(EncoderInvocation {
            program,
            args,
            output_path,
        })
    }

    /// Start a recording to `output_base`.
    ///
    /// Refuses when the store tracks a live encoder or no binary is found.
    /// The process is spawned in its own process group so it survives this
    /// invocation, its output appended to the encoder log. On success the
    /// store records `(true, final_path, pid)`; a spawn failure clears the
    /// store back to inactive.
    #[track_caller]
    #[instrument(skip(self, store, probe, output_base))]
    pub fn launch<P: ProcessProbe>(
        &self,
        store: &StatusStore,
        probe: &P,
        output_base: &Path,
    ) -> CoreResult<u32> {
        if let Some(pid) = store.tracked_pid() {
            if probe.is_running(pid) {
                return Err(RecorderError::AlreadyRecording {
                    pid,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            // Stale marker from a dead encoder; discard it.
            store.clear_pid();
        }

        if self.locate().is_none() {
            return Err(RecorderError::EncoderNotFound {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(parent) = output_base.parent() {
            fs::create_dir_all(parent).map_err(|source| RecorderError::SaveDirCreateFailed {
                path: parent.to_path_buf(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        let invocation =
            self.build_command(output_base)
                .ok_or_else(|| RecorderError::CommandBuildFailed {
                    reason: "encoder binary disappeared during command construction".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        info!(
            program = ?invocation.program,
            args = ?invocation.args,
            "Encoder command assembled"
        );

        let pid = match self.spawn_detached(&invocation) {
            Ok(pid) => pid,
            Err(source) => {
                store.save(false, None, None);
                return Err(RecorderError::SpawnFailed {
                    source,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        store.save(true, Some(&invocation.output_path), Some(pid));

        info!(pid, output = ?invocation.output_path, "Encoder started");

        Ok(pid)
    }

    fn spawn_detached(&self, invocation: &EncoderInvocation) -> std::io::Result<u32> {
        use std::os::unix::process::CommandExt;

        let log_file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.encoder_log)?;

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file.try_clone()?))
            .stderr(Stdio::from(log_file));
        // Own process group: the encoder must outlive this invocation and
        // ignore terminal signals aimed at it.
        command.process_group(0);

        let child = command.spawn()?;
        Ok(child.id())
    }
}

fn force_extension(output_base: &Path, encoder: EncoderKind) -> PathBuf {
    let wanted = encoder.extension();
    let current = output_base.extension().and_then(|ext| ext.to_str());
    if current == Some(wanted) {
        output_base.to_path_buf()
    } else {
        warn!(
            path = ?output_base,
            extension = wanted,
            "Adjusting output extension to match codec"
        );
        output_base.with_extension(wanted)
    }
}
