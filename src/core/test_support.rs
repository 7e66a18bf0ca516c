//! Fakes and scratch directories shared by the unit tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use async_trait::async_trait;
use tokio::sync::Notify;
use zip::write::SimpleFileOptions;

use crate::core::downloader::UpdateSource;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::{AppState, LauncherPaths, LauncherStatus, LauncherView};

/// Unique directory under the system temp dir, removed on drop.
pub struct ScratchDir(PathBuf);

impl ScratchDir {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "patchlauncher-{}-{}",
            label,
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Sorted names of the direct children of `dir`.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// In-memory zip with the given `(name, contents)` entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Zip holding a single shell script marked executable.
pub fn zip_executable(name: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file(name, SimpleFileOptions::default().unix_permissions(0o755))
        .unwrap();
    writer.write_all(b"#!/bin/sh\nexit 0\n").unwrap();
    writer.finish().unwrap().into_inner()
}

/// View that records everything shown to the user.
#[derive(Default)]
pub struct RecordingView {
    labels: Mutex<Vec<String>>,
    versions: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingView {
    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }

    pub fn versions(&self) -> Vec<String> {
        self.versions.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl LauncherView for RecordingView {
    fn status_changed(&self, _status: LauncherStatus, label: &str) {
        self.labels.lock().unwrap().push(label.to_string());
    }

    fn version_changed(&self, text: &str) {
        self.versions.lock().unwrap().push(text.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// View that notes, for every status change, whether the install flow could
/// be claimed at that moment.
#[derive(Default)]
pub struct FlowObserverView {
    state: OnceLock<Weak<AppState>>,
    seen: Mutex<Vec<(LauncherStatus, bool)>>,
}

impl FlowObserverView {
    /// `(status, flow_free)` pairs in the order the statuses were shown.
    pub fn seen(&self) -> Vec<(LauncherStatus, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

impl LauncherView for FlowObserverView {
    fn status_changed(&self, status: LauncherStatus, _label: &str) {
        let Some(state) = self.state.get().and_then(Weak::upgrade) else {
            return;
        };
        let flow_free = state.try_begin_flow().is_some();
        self.seen.lock().unwrap().push((status, flow_free));
    }

    fn version_changed(&self, _text: &str) {}

    fn show_error(&self, _message: &str) {}
}

/// Scripted remote. A missing version or archive behaves like a dropped
/// connection.
#[derive(Default)]
pub struct FakeSource {
    version: Mutex<Option<String>>,
    archive: Mutex<Option<Vec<u8>>>,
    hold: Option<Notify>,
    version_fetches: AtomicUsize,
    archive_fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(self, version: &str) -> Self {
        self.set_version(Some(version));
        self
    }

    pub fn with_archive(self, archive: Vec<u8>) -> Self {
        self.set_archive(Some(archive));
        self
    }

    /// Downloads block until [`FakeSource::release_download`] is called.
    pub fn holding_downloads(mut self) -> Self {
        self.hold = Some(Notify::new());
        self
    }

    pub fn release_download(&self) {
        if let Some(hold) = &self.hold {
            hold.notify_one();
        }
    }

    pub fn set_version(&self, version: Option<&str>) {
        *self.version.lock().unwrap() = version.map(ToString::to_string);
    }

    pub fn set_archive(&self, archive: Option<Vec<u8>>) {
        *self.archive.lock().unwrap() = archive;
    }

    pub fn version_fetches(&self) -> usize {
        self.version_fetches.load(Ordering::SeqCst)
    }

    pub fn archive_fetches(&self) -> usize {
        self.archive_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpdateSource for FakeSource {
    async fn fetch_version(&self) -> LauncherResult<String> {
        self.version_fetches.fetch_add(1, Ordering::SeqCst);
        let version = self.version.lock().unwrap().clone();
        version.ok_or_else(|| LauncherError::DownloadFailed {
            url: "fake://version".into(),
            status: 503,
        })
    }

    async fn download_archive(&self, dest: &Path) -> LauncherResult<u64> {
        self.archive_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }

        let archive = self.archive.lock().unwrap().clone();
        match archive {
            Some(bytes) => {
                tokio::fs::write(dest, &bytes).await.map_err(|source| LauncherError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;
                Ok(bytes.len() as u64)
            }
            None => {
                // Connection dropped after the first bytes arrived.
                tokio::fs::write(dest, b"PK\x03\x04")
                    .await
                    .map_err(|source| LauncherError::Io {
                        path: dest.to_path_buf(),
                        source,
                    })?;
                Err(LauncherError::DownloadFailed {
                    url: "fake://archive".into(),
                    status: 502,
                })
            }
        }
    }
}

/// Launcher state rooted in `scratch` with artifact name `Game`.
pub fn test_state(
    scratch: &ScratchDir,
    source: FakeSource,
) -> (Arc<AppState>, Arc<RecordingView>, Arc<FakeSource>) {
    let view = Arc::new(RecordingView::default());
    let source = Arc::new(source);
    let state = AppState::new(
        LauncherPaths::new(scratch.path(), "Game"),
        source.clone(),
        view.clone(),
    );
    (state, view, source)
}

/// Like [`test_state`], observed through a [`FlowObserverView`].
pub fn observed_state(
    scratch: &ScratchDir,
    source: FakeSource,
) -> (Arc<AppState>, Arc<FlowObserverView>, Arc<FakeSource>) {
    let view = Arc::new(FlowObserverView::default());
    let source = Arc::new(source);
    let state = AppState::new(
        LauncherPaths::new(scratch.path(), "Game"),
        source.clone(),
        view.clone(),
    );
    let _ = view.state.set(Arc::downgrade(&state));
    (state, view, source)
}
