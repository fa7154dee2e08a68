//! User-facing feedback: notifications, dialogs, and the cancellable
//! progress indicator handed to transfers.
//!
//! The trait is the contract the session and share flows talk to; the
//! desktop implementation is deliberately thin. Every surface degrades to
//! the console so a headless invocation still reports its outcome.

use std::{
    io::{BufRead, Write},
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use notify_rust::Notification;
use screenrec_core::TransferMonitor;
use tracing::{debug, warn};

const APP_NAME: &str = "Screenrec";

/// Presentation collaborator consumed by the action handlers.
pub trait Presenter {
    /// Transient notification.
    fn notify(&self, message: &str);
    /// Prominent message the user should acknowledge.
    fn alert(&self, message: &str);
    /// Offer a menu; returns the chosen option index, or `None` for dismiss.
    fn select(&self, title: &str, options: &[&str]) -> Option<usize>;
    /// Show a QR image for a link, with the raw link as context.
    fn show_qr(&self, url: &str, image_path: &Path);
    /// Show a titled text block (fallback when no QR image is available).
    fn show_text(&self, title: &str, body: &str);
}

/// Desktop presenter: system notifications plus console fallbacks.
#[derive(Default)]
pub struct DesktopPresenter;

impl DesktopPresenter {
    /// Create the presenter.
    pub fn new() -> Self {
        Self
    }

    fn send_notification(&self, body: &str, critical: bool) {
        let mut notification = Notification::new();
        notification.summary(APP_NAME).body(body);
        if critical {
            notification.urgency(notify_rust::Urgency::Critical);
        }
        if let Err(e) = notification.show() {
            debug!(error = %e, "Notification delivery failed");
        }
    }
}

impl Presenter for DesktopPresenter {
    fn notify(&self, message: &str) {
        println!("{message}");
        self.send_notification(message, false);
    }

    fn alert(&self, message: &str) {
        eprintln!("{message}");
        self.send_notification(message, true);
    }

    fn select(&self, title: &str, options: &[&str]) -> Option<usize> {
        println!("{title}");
        for (index, option) in options.iter().enumerate() {
            println!("  {}) {option}", index + 1);
        }
        print!("> ");
        if std::io::stdout().flush().is_err() {
            return None;
        }

        let mut line = String::new();
        let stdin = std::io::stdin();
        if stdin.lock().read_line(&mut line).is_err() {
            return None;
        }
        let choice: usize = line.trim().parse().ok()?;
        (1..=options.len()).contains(&choice).then(|| choice - 1)
    }

    fn show_qr(&self, url: &str, image_path: &Path) {
        println!("{url}");
        self.send_notification(&format!("Scan the QR code to open {url}"), false);
        if let Err(e) = open::that(image_path) {
            warn!(path = ?image_path, error = %e, "Failed to open QR image");
        }
    }

    fn show_text(&self, title: &str, body: &str) {
        println!("{title}:\n{body}");
        self.send_notification(body, false);
    }
}

/// Progress indicator for a transfer, doubling as the external
/// cancellation signal.
///
/// The cancel flag is shared; whatever drives the user-visible indicator
/// (a dialog cancel button, a signal handler) flips it and the transfer
/// observes it at its next poll tick.
pub struct ProgressIndicator {
    cancel_flag: Arc<AtomicBool>,
}

impl ProgressIndicator {
    /// Indicator with an unset cancel flag.
    pub fn new() -> Self {
        Self {
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle the indicator's driver uses to request cancellation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_flag)
    }
}

impl Default for ProgressIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferMonitor for ProgressIndicator {
    fn begin(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }

    fn update(&self, percent: u8) {
        eprint!("\r{percent:3}%");
        let _ = std::io::stderr().flush();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    fn finish(&self) {
        eprintln!();
    }
}
