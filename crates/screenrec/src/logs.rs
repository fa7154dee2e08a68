//! Support bundle: logs, state markers, and the settings reference zipped
//! into one archive the user can attach to a report.

use crate::{AppError, AppResult, Profile};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use chrono::Local;
use error_location::ErrorLocation;
use screenrec_core::StatusStore;
use tracing::{info, instrument};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Archive name of the bundled settings file.
const SETTINGS_REFERENCE_NAME: &str = "settings_reference.toml";

/// Create a timestamped zip with the logs and small context for support.
#[track_caller]
#[instrument(skip(profile, store, config_path))]
pub fn export_bundle(
    profile: &Profile,
    store: &StatusStore,
    config_path: Option<&Path>,
) -> AppResult<PathBuf> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let bundle_path = profile.data_dir().join(format!("logs_{stamp}.zip"));

    let file = fs::File::create(&bundle_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let sources = [
        profile.app_log(),
        profile.encoder_log(),
        store.status_path().to_path_buf(),
        store.pid_path().to_path_buf(),
    ];
    for path in &sources {
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        append_file(&mut zip, path, &name, options)?;
    }

    if let Some(config) = config_path
        && config.is_file()
    {
        append_file(&mut zip, config, SETTINGS_REFERENCE_NAME, options)?;
    }

    zip.finish().map_err(|e| AppError::ArchiveError {
        reason: format!("failed to finalize bundle: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!(bundle = ?bundle_path, "Log bundle created");

    Ok(bundle_path)
}

#[track_caller]
fn append_file(
    zip: &mut ZipWriter<fs::File>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> AppResult<()> {
    zip.start_file(name, options).map_err(|e| AppError::ArchiveError {
        reason: format!("failed to add {name}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;
    let mut source = fs::File::open(path)?;
    std::io::copy(&mut source, zip)?;
    Ok(())
}

/// Open the profile directory in the system file browser.
#[track_caller]
pub fn open_location(profile: &Profile) -> AppResult<()> {
    open::that(profile.data_dir()).map_err(AppError::from)
}
