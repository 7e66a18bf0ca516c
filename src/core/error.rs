use std::path::PathBuf;
use thiserror::Error;

use crate::core::version::VersionParseError;

/// Central error type for the launcher backend.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Version ─────────────────────────────────────────
    #[error("Invalid version: {0}")]
    Version(#[from] VersionParseError),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Config ──────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    // ── Launch ──────────────────────────────────────────
    #[error("Failed to start {path:?}: {source}")]
    Launch {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    /// Whether the failure happened talking to the remote side.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LauncherError::Http(_) | LauncherError::DownloadFailed { .. }
        )
    }
}
