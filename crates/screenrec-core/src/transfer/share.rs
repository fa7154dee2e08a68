//! Upload a finished recording and fetch a QR image for the link.
//!
//! The network boundary is a command-line HTTP client pinned to IPv4 and
//! HTTP/1.1 with fixed connect/overall timeouts, run through the
//! cancellable transfer primitive. Two upload backends and three QR
//! providers are supported; all endpoints are fixed.

use crate::{
    RecorderError, CoreResult,
    transfer::{TransferJob, TransferMonitor, TransferRunner},
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

const CURL_PROGRAM: &str = "curl";
const CONNECT_TIMEOUT_SECS: u64 = 6;
const UPLOAD_BUDGET: Duration = Duration::from_secs(45);
const QR_FETCH_BUDGET: Duration = Duration::from_secs(10);

/// Truncation applied to diagnostic snippets carried in failures.
const SNIPPET_LEN: usize = 120;

const LITTERBOX_ENDPOINT: &str = "https://litterbox.catbox.moe/resources/internals/api.php";
const CATBOX_ENDPOINT: &str = "https://catbox.moe/user/api.php";

/// QR image providers, tried in this order. Each takes the percent-encoded
/// target URL appended to the template.
const QR_PROVIDERS: [&str; 3] = [
    "https://api.qrserver.com/v1/create-qr-code/?size=300x300&data=",
    "https://quickchart.io/qr?size=300&text=",
    "https://chart.googleapis.com/chart?cht=qr&chs=300x300&chl=",
];

/// Remote file-hosting target for the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadBackend {
    /// 72-hour retention host.
    Litterbox,
    /// Permanent storage host.
    Catbox,
}

impl UploadBackend {
    /// Human-readable label for progress messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Litterbox => "Litterbox (72h)",
            Self::Catbox => "Catbox",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Self::Litterbox => LITTERBOX_ENDPOINT,
            Self::Catbox => CATBOX_ENDPOINT,
        }
    }
}

/// Sharing configuration consumed by [`ShareFlow`].
#[derive(Debug, Clone, Copy)]
pub struct ShareSettings {
    /// Whether sharing is enabled at all.
    pub enabled: bool,
    /// Upload target.
    pub backend: UploadBackend,
}

/// Outcome of a share attempt that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Sharing is disabled by configuration; nothing was attempted.
    Disabled,
    /// The file was uploaded and is reachable at `url`.
    Uploaded {
        /// Public link to the uploaded file.
        url: String,
        /// Locally cached QR image for the link, when a provider delivered
        /// one. `None` degrades to showing the raw link.
        qr_image: Option<PathBuf>,
    },
}

/// Uploads a recording to the configured backend, then fetches a QR image
/// for the resulting link.
pub struct ShareFlow<'a, R: TransferRunner> {
    runner: &'a R,
    settings: ShareSettings,
    qr_image_path: PathBuf,
}

impl<'a, R: TransferRunner> ShareFlow<'a, R> {
    /// Flow writing the fetched QR image to `qr_image_path`.
    pub fn new(runner: &'a R, settings: ShareSettings, qr_image_path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            settings,
            qr_image_path: qr_image_path.into(),
        }
    }

    /// Upload `file_path` and, on success, attempt the QR fetch.
    ///
    /// Success requires exit code 0 and a response starting with `http`;
    /// anything else fails with truncated stdout/stderr diagnostics. A QR
    /// fetch failure is soft and leaves `qr_image` empty.
    #[track_caller]
    #[instrument(skip(self, monitor, file_path))]
    pub fn upload(
        &self,
        file_path: &Path,
        monitor: &dyn TransferMonitor,
    ) -> CoreResult<ShareOutcome> {
        if !self.settings.enabled {
            debug!("Sharing disabled by configuration");
            return Ok(ShareOutcome::Disabled);
        }

        let backend = self.settings.backend;
        let job = upload_job(file_path, backend);
        let result = self.runner.run(&job, monitor)?;

        if result.cancelled {
            return Err(RecorderError::TransferCancelled {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if result.exit_code != 0 || !result.stdout.starts_with("http") {
            return Err(RecorderError::TransferFailed {
                exit_code: result.exit_code,
                stdout_snippet: snippet(&result.stdout),
                stderr_snippet: snippet(&result.stderr),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let url = result.stdout;
        info!(backend = backend.label(), url = %url, "Upload complete");

        let qr_image = match self.fetch_qr(&url, monitor) {
            Ok(path) => Some(path),
            Err(RecorderError::QrFetchFailed { .. }) => {
                warn!("All QR providers failed; falling back to raw link");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(ShareOutcome::Uploaded { url, qr_image })
    }

    /// Fetch a QR image for `url`, trying providers in fixed order and
    /// stopping at the first that delivers a non-empty file.
    ///
    /// A user cancellation during any attempt aborts the whole fetch; no
    /// further providers are tried.
    #[track_caller]
    #[instrument(skip(self, monitor, url))]
    pub fn fetch_qr(&self, url: &str, monitor: &dyn TransferMonitor) -> CoreResult<PathBuf> {
        let encoded = urlencoding::encode(url);

        for provider in QR_PROVIDERS {
            let api = format!("{provider}{encoded}");
            let job = qr_job(&api, &self.qr_image_path);
            let result = self.runner.run(&job, monitor)?;

            if result.cancelled {
                debug!("QR fetch cancelled; skipping remaining providers");
                break;
            }
            if result.exit_code == 0 && file_is_nonempty(&self.qr_image_path) {
                info!(provider, "QR image fetched");
                return Ok(self.qr_image_path.clone());
            }
            debug!(provider, exit_code = result.exit_code, "QR provider failed");
        }

        Err(RecorderError::QrFetchFailed {
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Fixed client flags shared by every transfer: IPv4 only, HTTP/1.1, and
/// bounded connect/overall timeouts.
fn curl_base_args(budget: Duration) -> Vec<String> {
    vec![
        "-4".to_string(),
        "-sS".to_string(),
        "--http1.1".to_string(),
        "--connect-timeout".to_string(),
        CONNECT_TIMEOUT_SECS.to_string(),
        "--max-time".to_string(),
        budget.as_secs().to_string(),
    ]
}

fn upload_job(file_path: &Path, backend: UploadBackend) -> TransferJob {
    let mut args = curl_base_args(UPLOAD_BUDGET);
    args.extend(["-F", "reqtype=fileupload"].map(String::from));
    if backend == UploadBackend::Litterbox {
        args.extend(["-F", "time=72h"].map(String::from));
    }
    args.push("-F".to_string());
    args.push(format!("fileToUpload=@{}", file_path.display()));
    args.push(backend.endpoint().to_string());

    TransferJob {
        program: CURL_PROGRAM.to_string(),
        args,
        title: "Share recording".to_string(),
        message: format!("Uploading via {} ...", backend.label()),
        max_duration: UPLOAD_BUDGET,
    }
}

fn qr_job(api_url: &str, image_path: &Path) -> TransferJob {
    let mut args = curl_base_args(QR_FETCH_BUDGET);
    args.push("-L".to_string());
    args.push("-o".to_string());
    args.push(image_path.to_string_lossy().into_owned());
    args.push(api_url.to_string());

    TransferJob {
        program: CURL_PROGRAM.to_string(),
        args,
        title: "Share recording".to_string(),
        message: "Generating QR code ...".to_string(),
        max_duration: QR_FETCH_BUDGET,
    }
}

fn file_is_nonempty(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.len() > 0).unwrap_or(false)
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}
