//! Cancellable, progress-reporting wrapper for blocking network subprocesses.
//!
//! A transfer cannot be interrupted from within its own thread, so the
//! subprocess is polled at a fixed short interval instead of waited on:
//! each tick publishes a progress estimate and samples an external cancel
//! flag. The same primitive serves the upload and the QR fetch.

use crate::{RecorderError, CoreResult};

use std::{
    io::{Read, Seek, SeekFrom},
    panic::Location,
    process::{Child, Command, Stdio},
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Poll interval while the subprocess runs.
const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Grace period between terminate and force-kill on cancellation, and the
/// slack granted past the job budget before the runner gives up waiting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Exit code reported when the subprocess was interrupted rather than
/// finishing on its own (terminated by SIGTERM).
pub const INTERRUPTED_EXIT_CODE: i32 = -15;

/// One cancellable subprocess run. Ephemeral; described fresh per call.
#[derive(Debug, Clone)]
pub struct TransferJob {
    /// Program to execute.
    pub program: String,
    /// Argument list.
    pub args: Vec<String>,
    /// Title shown on the progress indicator.
    pub title: String,
    /// Message shown on the progress indicator.
    pub message: String,
    /// Expected upper bound on the transfer duration; drives the progress
    /// estimate and the runner's hard deadline.
    pub max_duration: Duration,
}

/// Captured outcome of a transfer subprocess.
#[derive(Debug, Clone)]
pub struct TransferResult {
    /// Exit code, or [`INTERRUPTED_EXIT_CODE`] when interrupted.
    pub exit_code: i32,
    /// Trimmed captured stdout.
    pub stdout: String,
    /// Trimmed captured stderr.
    pub stderr: String,
    /// Whether the user cancelled the transfer.
    pub cancelled: bool,
}

/// Cancellation flag and progress sink, driven by a user-visible
/// progress indicator.
pub trait TransferMonitor {
    /// A transfer is starting; show the indicator.
    fn begin(&self, title: &str, message: &str);
    /// Publish a progress estimate (0-100).
    fn update(&self, percent: u8);
    /// Whether the user asked to cancel. Sampled once per poll tick.
    fn is_cancelled(&self) -> bool;
    /// The transfer ended; dismiss the indicator.
    fn finish(&self);
}

/// Seam over [`CancellableTransfer`] so flows built on top of it can be
/// exercised with scripted results.
pub trait TransferRunner {
    /// Run `job` to completion, cancellation, or deadline.
    fn run(&self, job: &TransferJob, monitor: &dyn TransferMonitor) -> CoreResult<TransferResult>;
}

/// Polling subprocess runner. See the module docs for the model.
pub struct CancellableTransfer;

impl TransferRunner for CancellableTransfer {
    #[instrument(skip(self, job, monitor), fields(program = %job.program))]
    fn run(&self, job: &TransferJob, monitor: &dyn TransferMonitor) -> CoreResult<TransferResult> {
        monitor.begin(&job.title, &job.message);
        let result = run_to_completion(job, monitor);
        monitor.finish();
        result
    }
}

fn run_to_completion(job: &TransferJob, monitor: &dyn TransferMonitor) -> CoreResult<TransferResult> {
    // Capture through unnamed temp files rather than pipes: the invocation
    // stays single-threaded and a chatty subprocess cannot deadlock it.
    let mut out_file = tempfile::tempfile()?;
    let mut err_file = tempfile::tempfile()?;

    let mut child = Command::new(&job.program)
        .args(&job.args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(out_file.try_clone()?))
        .stderr(Stdio::from(err_file.try_clone()?))
        .spawn()
        .map_err(|source| RecorderError::SpawnFailed {
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

    let started = Instant::now();
    let deadline = started + job.max_duration + SHUTDOWN_GRACE;
    let mut cancelled = false;
    let mut timed_out = false;

    let exit_code = loop {
        match child.try_wait() {
            Ok(Some(status)) => break exit_code_of(status),
            Ok(None) => {}
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        }

        monitor.update(progress_percent(started.elapsed(), job.max_duration));

        if monitor.is_cancelled() {
            info!("Transfer cancelled by user");
            cancelled = true;
            terminate(&mut child);
            break INTERRUPTED_EXIT_CODE;
        }

        if Instant::now() >= deadline {
            warn!(budget_secs = job.max_duration.as_secs(), "Transfer deadline exceeded");
            timed_out = true;
            terminate(&mut child);
            break INTERRUPTED_EXIT_CODE;
        }

        std::thread::sleep(POLL_INTERVAL);
    };

    let stdout = read_back(&mut out_file);
    let mut stderr = read_back(&mut err_file);
    if cancelled {
        if !stderr.is_empty() {
            stderr.push('\n');
        }
        stderr.push_str("Cancelled by user.");
    } else if timed_out {
        if !stderr.is_empty() {
            stderr.push('\n');
        }
        stderr.push_str("Transfer deadline exceeded.");
    }

    debug!(exit_code, cancelled, "Transfer finished");

    Ok(TransferResult {
        exit_code,
        stdout,
        stderr,
        cancelled,
    })
}

fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match status.code() {
        Some(code) => code,
        // Killed by a signal; report it the negative-exit-code way.
        None => status.signal().map(|sig| -sig).unwrap_or(INTERRUPTED_EXIT_CODE),
    }
}

/// Monotone estimate: starts at 5, approaches 99 as the budget elapses.
fn progress_percent(elapsed: Duration, budget: Duration) -> u8 {
    let budget_secs = budget.as_secs_f64().max(1.0);
    let scaled = (elapsed.as_secs_f64() / budget_secs * 90.0) as u64;
    (5 + scaled).min(99) as u8
}

/// Terminate, wait briefly for a clean exit, force-kill if still alive.
fn terminate(child: &mut Child) {
    // SAFETY: SIGTERM to a child we spawned and still hold a handle to.
    let _ = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGTERM) };
    let deadline = Instant::now() + SHUTDOWN_GRACE;
    while Instant::now() < deadline {
        if matches!(child.try_wait(), Ok(Some(_))) {
            return;
        }
        std::thread::sleep(SHUTDOWN_POLL);
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn read_back(file: &mut std::fs::File) -> String {
    let mut contents = String::new();
    if let Err(e) = file.seek(SeekFrom::Start(0)) {
        warn!(error = %e, "Failed to rewind capture file");
        return contents;
    }
    if let Err(e) = file.read_to_string(&mut contents) {
        warn!(error = %e, "Failed to read capture file");
    }
    contents.trim().to_string()
}
