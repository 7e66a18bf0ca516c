use std::sync::Arc;

use tokio::sync::{watch, Mutex, OwnedMutexGuard};

use super::paths::LauncherPaths;
use super::status::{LauncherStatus, LauncherView, StatusController};
use crate::core::downloader::UpdateSource;
use crate::core::error::LauncherError;
use crate::core::version::Version;

/// Held for the whole of a check and, when one is started, the install that
/// follows it. Checks and installs never overlap.
pub type FlowGuard = OwnedMutexGuard<()>;

/// State shared by the checker, the installer and the launch gate.
pub struct AppState {
    paths: LauncherPaths,
    source: Arc<dyn UpdateSource>,
    status: Mutex<StatusController>,
    install_flow: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        paths: LauncherPaths,
        source: Arc<dyn UpdateSource>,
        view: Arc<dyn LauncherView>,
    ) -> Arc<Self> {
        Arc::new(Self {
            paths,
            source,
            status: Mutex::new(StatusController::new(view)),
            install_flow: Arc::new(Mutex::new(())),
        })
    }

    pub fn paths(&self) -> &LauncherPaths {
        &self.paths
    }

    pub fn source(&self) -> &dyn UpdateSource {
        self.source.as_ref()
    }

    /// Wait for any in-flight install to finish, then claim the flow.
    pub async fn begin_flow(&self) -> FlowGuard {
        self.install_flow.clone().lock_owned().await
    }

    /// Claim the flow only if nothing is checking or installing right now.
    pub fn try_begin_flow(&self) -> Option<FlowGuard> {
        self.install_flow.clone().try_lock_owned().ok()
    }

    pub async fn status(&self) -> Option<LauncherStatus> {
        self.status.lock().await.status()
    }

    pub async fn label(&self) -> String {
        self.status.lock().await.label().to_string()
    }

    pub async fn version_text(&self) -> String {
        self.status.lock().await.version_text().to_string()
    }

    pub async fn set_status(&self, status: LauncherStatus) {
        self.status.lock().await.set_status(status);
    }

    pub async fn set_version(&self, version: &Version) {
        self.status.lock().await.set_version(version);
    }

    /// Release `flow` and publish the final `status` as one step.
    ///
    /// The status lock is taken first, so whoever claims the flow next reads
    /// `status` and never the state that was current while the flow was held.
    pub async fn finish_flow(&self, flow: FlowGuard, status: LauncherStatus) {
        let mut controller = self.status.lock().await;
        drop(flow);
        controller.set_status(status);
    }

    /// [`AppState::finish_flow`] ending in `Failed` with `err` surfaced.
    pub async fn fail_flow(&self, flow: FlowGuard, err: &LauncherError) {
        let mut controller = self.status.lock().await;
        drop(flow);
        controller.fail(err);
    }

    pub async fn subscribe(&self) -> watch::Receiver<Option<LauncherStatus>> {
        self.status.lock().await.subscribe()
    }
}
