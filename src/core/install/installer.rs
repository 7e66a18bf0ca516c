// ─── Installer ───
// Downloads the build archive in the background and, once it lands, swaps
// the artifact directory and stamps the version marker.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::extract::extract_archive;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::{AppState, FlowGuard, LauncherPaths, LauncherStatus};
use crate::core::version::{write_local_version, Version};

/// Why an install is happening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallKind {
    /// Nothing installed yet; the version to stamp is fetched first.
    Fresh,
    /// Installed build differs from the authority's `Version`.
    Update(Version),
}

impl InstallKind {
    fn status(self) -> LauncherStatus {
        match self {
            InstallKind::Fresh => LauncherStatus::DownloadingGame,
            InstallKind::Update(_) => LauncherStatus::DownloadingUpdate,
        }
    }
}

/// What the background download hands to its continuation.
struct DownloadCompletion {
    /// Written to the marker if the install succeeds.
    stamp: Version,
    result: LauncherResult<u64>,
}

/// A running install. Dropping it does not cancel the download.
#[derive(Debug)]
pub struct InstallHandle {
    version: Version,
    task: JoinHandle<()>,
}

impl InstallHandle {
    /// Version the install will stamp on success.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Wait until the install has either reached `Ready` or `Failed`.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            error!("Install task for {} aborted: {}", self.version, e);
        }
    }
}

#[derive(Clone)]
pub struct Installer {
    state: Arc<AppState>,
}

impl Installer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start installing. Returns as soon as the download is running.
    ///
    /// `flow` moves into the background task and is released together with
    /// the final `Ready` or `Failed`. `None` means the install aborted before
    /// the download started (status is already `Failed`).
    pub async fn install(&self, flow: FlowGuard, kind: InstallKind) -> Option<InstallHandle> {
        self.state.set_status(kind.status()).await;

        let stamp = match kind {
            InstallKind::Update(version) => version,
            InstallKind::Fresh => match self.fetch_remote_version().await {
                Ok(version) => version,
                Err(err) => {
                    self.state.fail_flow(flow, &err).await;
                    return None;
                }
            },
        };

        info!("Installing build {} ({:?})", stamp, kind);
        let state = self.state.clone();
        let task = tokio::spawn(async move {
            let staging = state.paths().staging_archive();
            let result = state.source().download_archive(&staging).await;
            complete(&state, flow, DownloadCompletion { stamp, result }).await;
        });

        Some(InstallHandle {
            version: stamp,
            task,
        })
    }

    async fn fetch_remote_version(&self) -> LauncherResult<Version> {
        let text = self.state.source().fetch_version().await?;
        Ok(Version::parse(&text)?)
    }
}

async fn complete(state: &AppState, flow: FlowGuard, completion: DownloadCompletion) {
    let DownloadCompletion { stamp, result } = completion;
    let paths = state.paths();

    let outcome = match result {
        Ok(bytes) => {
            debug!("Archive downloaded ({} bytes)", bytes);
            apply_archive(paths, &stamp).await
        }
        Err(err) => Err(err),
    };

    match outcome {
        Ok(()) => {
            info!("Installed build {}", stamp);
            state.set_version(&stamp).await;
            state.finish_flow(flow, LauncherStatus::Ready).await;
        }
        Err(err) => {
            if err.is_transport() {
                warn!("Download of {} failed, installed build left untouched", stamp);
            }
            discard_staging(&paths.staging_archive()).await;
            state.fail_flow(flow, &err).await;
        }
    }
}

/// Replace `Build/` with the staged archive and stamp the marker.
///
/// Steps are not rolled back: a failed extraction leaves `Build/` missing.
async fn apply_archive(paths: &LauncherPaths, stamp: &Version) -> LauncherResult<()> {
    let build_dir = paths.build_dir();
    if build_dir.exists() {
        tokio::fs::remove_dir_all(&build_dir)
            .await
            .map_err(|e| LauncherError::Io {
                path: build_dir.clone(),
                source: e,
            })?;
        debug!("Removed previous build at {:?}", build_dir);
    }

    let zip_path = paths.staging_archive();
    let root_folder = paths.build_dir_name();
    let (archive, dest) = (zip_path.clone(), build_dir.clone());
    let files = tokio::task::spawn_blocking(move || extract_archive(&archive, &dest, root_folder))
        .await
        .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))??;
    info!("Extracted {} files into {:?}", files, build_dir);

    tokio::fs::remove_file(&zip_path)
        .await
        .map_err(|e| LauncherError::Io {
            path: zip_path.clone(),
            source: e,
        })?;

    write_local_version(&paths.version_file(), stamp).await
}

async fn discard_staging(zip_path: &Path) {
    match tokio::fs::remove_file(zip_path).await {
        Ok(()) => debug!("Discarded staging archive {:?}", zip_path),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Cannot remove staging archive {:?}: {}", zip_path, e),
    }
}
