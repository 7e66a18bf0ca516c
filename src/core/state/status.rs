// ─── Launcher Status ───
// Single source of truth for what the launcher is doing and what the user sees.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::core::error::LauncherError;
use crate::core::version::Version;

/// Lifecycle state of the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LauncherStatus {
    /// Installed build matches the authority; the button plays.
    Ready,
    /// Last check or install failed; the button retries.
    Failed,
    /// First install in progress.
    DownloadingGame,
    /// Replacing an installed build.
    DownloadingUpdate,
}

impl LauncherStatus {
    /// Text of the launch/retry button.
    pub fn label(self) -> &'static str {
        match self {
            LauncherStatus::Ready => "Play",
            LauncherStatus::Failed => "Update Failed - Retry",
            LauncherStatus::DownloadingGame => "Downloading Game...",
            LauncherStatus::DownloadingUpdate => "Downloading Update...",
        }
    }

    /// Ready and Failed are the only states the button reacts to.
    pub fn is_terminal(self) -> bool {
        matches!(self, LauncherStatus::Ready | LauncherStatus::Failed)
    }
}

impl std::fmt::Display for LauncherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Output surface of the launcher window.
pub trait LauncherView: Send + Sync {
    fn status_changed(&self, status: LauncherStatus, label: &str);
    fn version_changed(&self, text: &str);
    fn show_error(&self, message: &str);
}

/// Owns the current status and both labels.
///
/// Status and label only change together, through [`StatusController::set_status`].
pub struct StatusController {
    current: Option<LauncherStatus>,
    label: String,
    version_text: String,
    view: Arc<dyn LauncherView>,
    watch_tx: watch::Sender<Option<LauncherStatus>>,
}

impl StatusController {
    pub fn new(view: Arc<dyn LauncherView>) -> Self {
        let (watch_tx, _) = watch::channel(None);
        Self {
            current: None,
            label: String::new(),
            version_text: String::new(),
            view,
            watch_tx,
        }
    }

    pub fn status(&self) -> Option<LauncherStatus> {
        self.current
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn version_text(&self) -> &str {
        &self.version_text
    }

    pub fn set_status(&mut self, status: LauncherStatus) {
        self.current = Some(status);
        self.label = status.label().to_string();
        info!("Status -> {:?}", status);
        self.view.status_changed(status, &self.label);
        self.watch_tx.send_replace(Some(status));
    }

    pub fn set_version(&mut self, version: &Version) {
        self.version_text = version.display_text();
        self.view.version_changed(&self.version_text);
    }

    /// Move to `Failed` and surface `err` to the user.
    pub fn fail(&mut self, err: &LauncherError) {
        error!("Launcher operation failed: {}", err);
        self.set_status(LauncherStatus::Failed);
        self.view.show_error(&err.to_string());
    }

    /// Observe status changes without polling.
    pub fn subscribe(&self) -> watch::Receiver<Option<LauncherStatus>> {
        self.watch_tx.subscribe()
    }
}
