use tracing::warn;

/// User-facing actions. A closed set selected by the first CLI argument;
/// anything unrecognized falls back to the default toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start or stop depending on the current state (default action).
    Toggle,
    /// Start a recording.
    Start,
    /// Stop the active recording.
    Stop,
    /// Show version and project information.
    About,
    /// Bundle logs and state markers into a zip for support.
    ExportLogs,
    /// Open the logs location in the system file browser.
    OpenLogs,
}

impl Action {
    /// Parse an action from the first CLI argument.
    pub fn parse(arg: Option<&str>) -> Self {
        match arg {
            None => Self::Toggle,
            Some("toggle") => Self::Toggle,
            Some("start") => Self::Start,
            Some("stop") => Self::Stop,
            Some("about") => Self::About,
            Some("export-logs") => Self::ExportLogs,
            Some("open-logs") => Self::OpenLogs,
            Some(other) => {
                warn!(action = other, "Unknown action, using default");
                Self::Toggle
            }
        }
    }

    /// Stable name for logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::About => "about",
            Self::ExportLogs => "export-logs",
            Self::OpenLogs => "open-logs",
        }
    }
}
