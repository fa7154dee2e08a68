//! Screenrec: framebuffer screen-recording session manager.
//!
//! Each user action runs as a fresh short-lived invocation; recording
//! state lives in on-disk markers managed by screenrec-core and survives
//! across processes.

mod action;
mod app;
mod config;
mod error;
mod logs;
mod player;
mod presenter;
mod profile;
#[cfg(test)]
mod tests;

pub(crate) use {
    action::Action,
    app::App,
    error::{AppError, Result as AppResult},
    player::MediaPlayer,
    presenter::{DesktopPresenter, Presenter, ProgressIndicator},
    profile::Profile,
};

use crate::config::Config;

use tracing::info;
use uuid::Uuid;

/// Application entry point.
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let action = Action::parse(args.get(1).map(String::as_str));

    let profile = match Profile::resolve() {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("screenrec: {e}");
            std::process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("screenrec: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&profile, config.behaviour.debug_log);

    // Fresh process per action; the invocation id correlates log lines
    // across the session's separate start/stop/share invocations.
    let invocation_id = Uuid::new_v4();
    let span = tracing::info_span!("invocation", id = %invocation_id, action = action.as_str());
    let _guard = span.enter();

    let presenter = DesktopPresenter::new();
    let app = App::new(config, profile, &presenter);
    let succeeded = app.run(action);

    info!(succeeded, "Invocation finished");
    std::process::exit(if succeeded { 0 } else { 1 });
}

fn init_tracing(profile: &Profile, debug_log: bool) {
    let filter = if debug_log {
        "screenrec=debug,screenrec_core=debug"
    } else {
        "screenrec=info,screenrec_core=info"
    };

    let appender = tracing_appender::rolling::never(profile.data_dir(), crate::profile::APP_LOG_FILE);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(appender)
        .with_ansi(false)
        .init();
}
