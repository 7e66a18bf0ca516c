use std::path::Path;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Client, ClientBuilder, Response};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};

const APP_USER_AGENT: &str = concat!("PatchLauncher/", env!("CARGO_PKG_VERSION"));

/// The only HTTP client of the launcher, used for both the version
/// authority and the archive source.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Requests go out with the launcher user agent and `identity`
    /// encoding, so the archive on disk is byte for byte what the server holds.
    pub fn new() -> LauncherResult<Self> {
        Ok(Self::with_client(client_builder().build()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` and return the body as UTF-8 text.
    pub async fn fetch_text(&self, url: &str) -> LauncherResult<String> {
        let response = self.get(url).await?;
        let body = response.text().await?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }

    // ── Streaming file download ─────────────────────────

    /// Stream `url` into `dest`, returning the number of bytes written.
    ///
    /// Creates parent directories as needed. The file handle is dropped
    /// before returning so the caller can open the archive right away.
    pub async fn download_file(&self, url: &str, dest: &Path) -> LauncherResult<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let response = self.get(url).await?;
        let total_bytes = response.content_length();
        info!("Downloading {} ({:?} bytes) -> {:?}", url, total_bytes, dest);

        let mut written: u64 = 0;
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| LauncherError::Io {
                    path: dest.to_path_buf(),
                    source: e,
                })?;

            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await.map_err(|e| LauncherError::Io {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
                written += chunk.len() as u64;
            }

            file.flush().await.map_err(|e| LauncherError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
        }

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, written);
        Ok(written)
    }

    async fn get(&self, url: &str) -> LauncherResult<Response> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

fn client_builder() -> ClientBuilder {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
}
