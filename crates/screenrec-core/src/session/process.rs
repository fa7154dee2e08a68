//! Process liveness probing and signal delivery.
//!
//! The trait seam exists so session logic can be exercised against a fake
//! process table in tests; production code uses [`UnixProcessProbe`].

use std::io;

/// Signals used during graceful-then-forced shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// Cooperative stop (SIGINT); lets the encoder finalize its output.
    Interrupt,
    /// Forced kill (SIGKILL); escalation when the encoder is unresponsive.
    Kill,
}

/// Liveness checks and signal delivery for a tracked process id.
pub trait ProcessProbe {
    /// Whether `pid` still exists in the OS process table.
    ///
    /// Only a definitive "no such process" answer counts as dead. A
    /// permission error means the pid exists under another owner and is
    /// reported as running; the bias avoids double-starting a recording
    /// against a pid we merely cannot signal.
    fn is_running(&self, pid: u32) -> bool;

    /// Deliver `signal` to `pid`.
    fn send_signal(&self, pid: u32, signal: StopSignal) -> io::Result<()>;
}

/// [`ProcessProbe`] backed by `kill(2)`.
pub struct UnixProcessProbe;

impl ProcessProbe for UnixProcessProbe {
    fn is_running(&self, pid: u32) -> bool {
        // SAFETY: signal 0 performs existence and permission checks only;
        // no signal is delivered.
        let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
        if rc == 0 {
            return true;
        }
        io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
    }

    fn send_signal(&self, pid: u32, signal: StopSignal) -> io::Result<()> {
        let signum = match signal {
            StopSignal::Interrupt => libc::SIGINT,
            StopSignal::Kill => libc::SIGKILL,
        };
        // SAFETY: delivering a standard signal to a pid we recorded ourselves.
        let rc = unsafe { libc::kill(pid as libc::pid_t, signum) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}
