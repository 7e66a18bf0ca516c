use std::path::Path;

use async_trait::async_trait;

use super::client::Downloader;
use crate::core::error::LauncherResult;
use crate::core::state::settings::Endpoints;

/// Remote side of the launcher: the version authority plus the archive source.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Raw version text published by the authority, e.g. `"3.1.4"`.
    async fn fetch_version(&self) -> LauncherResult<String>;

    /// Write the full build archive to `dest`, returning its size in bytes.
    async fn download_archive(&self, dest: &Path) -> LauncherResult<u64>;
}

/// [`UpdateSource`] backed by two plain HTTP endpoints.
pub struct HttpUpdateSource {
    downloader: Downloader,
    endpoints: Endpoints,
}

impl HttpUpdateSource {
    pub fn new(downloader: Downloader, endpoints: Endpoints) -> Self {
        Self {
            downloader,
            endpoints,
        }
    }
}

#[async_trait]
impl UpdateSource for HttpUpdateSource {
    async fn fetch_version(&self) -> LauncherResult<String> {
        self.downloader.fetch_text(&self.endpoints.version_url).await
    }

    async fn download_archive(&self, dest: &Path) -> LauncherResult<u64> {
        self.downloader
            .download_file(&self.endpoints.archive_url, dest)
            .await
    }
}
