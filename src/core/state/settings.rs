use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::paths::default_artifact_name;
use crate::core::error::{LauncherError, LauncherResult};

const SETTINGS_FILE: &str = "launcher_settings.json";

/// Persisted launcher configuration, `launcher_settings.json` in the root.
///
/// Every field is optional so command line flags can fill the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Plain-text endpoint returning `major.minor.sub_minor`.
    pub version_url: Option<String>,
    /// Zip archive of the full build.
    pub archive_url: Option<String>,
    /// Executable inside `Build/`.
    pub artifact_name: Option<String>,
}

/// Remote endpoints, both guaranteed present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub version_url: String,
    pub archive_url: String,
}

impl LauncherSettings {
    pub fn settings_path(root: &Path) -> PathBuf {
        root.join(SETTINGS_FILE)
    }

    /// Load settings from `root`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(root: &Path) -> Self {
        load_settings_from_disk(root).unwrap_or_default()
    }

    pub fn save(&self, root: &Path) -> LauncherResult<()> {
        std::fs::create_dir_all(root).map_err(|source| LauncherError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let path = Self::settings_path(root);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|source| LauncherError::Io { path, source })
    }

    /// Fields set in `overrides` win.
    pub fn merged_with(self, overrides: LauncherSettings) -> Self {
        Self {
            version_url: overrides.version_url.or(self.version_url),
            archive_url: overrides.archive_url.or(self.archive_url),
            artifact_name: overrides.artifact_name.or(self.artifact_name),
        }
    }

    pub fn artifact_name(&self) -> &str {
        self.artifact_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(default_artifact_name())
    }

    pub fn endpoints(&self) -> LauncherResult<Endpoints> {
        let version_url = required(&self.version_url, "version_url")?;
        let archive_url = required(&self.archive_url, "archive_url")?;
        Ok(Endpoints {
            version_url,
            archive_url,
        })
    }
}

fn required(value: &Option<String>, name: &str) -> LauncherResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| LauncherError::Config(format!("`{name}` is not configured")))
}

fn load_settings_from_disk(root: &Path) -> Option<LauncherSettings> {
    let path = LauncherSettings::settings_path(root);
    let raw = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!("Corrupt settings at {:?}: {}", path, e);
            None
        }
    }
}
