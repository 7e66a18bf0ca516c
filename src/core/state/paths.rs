use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "PatchLauncher";
const VERSION_FILE: &str = "Version.txt";
const STAGING_ARCHIVE: &str = "Build.zip";
const BUILD_DIR: &str = "Build";

/// Well-known locations under the launcher root.
///
/// - `Version.txt` — version marker of the installed build
/// - `Build.zip`   — staging archive, only present while installing
/// - `Build/`      — installed artifact tree
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    root: PathBuf,
    artifact_name: String,
}

impl LauncherPaths {
    pub fn new(root: impl Into<PathBuf>, artifact_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            artifact_name: artifact_name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version_file(&self) -> PathBuf {
        self.root.join(VERSION_FILE)
    }

    pub fn staging_archive(&self) -> PathBuf {
        self.root.join(STAGING_ARCHIVE)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR)
    }

    /// Name of the artifact directory, also accepted as a prefix inside archives.
    pub fn build_dir_name(&self) -> &'static str {
        BUILD_DIR
    }

    pub fn executable(&self) -> PathBuf {
        self.build_dir().join(&self.artifact_name)
    }
}

pub fn default_root_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn default_artifact_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "Game.exe"
    } else {
        "Game"
    }
}
