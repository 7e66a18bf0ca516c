// ─── Version Marker ───
// `Version.txt` records which version the installed build came from.

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use super::Version;
use crate::core::error::{LauncherError, LauncherResult};

/// Read the local marker.
///
/// `Ok(None)` means nothing was ever installed. A marker that exists but
/// holds a malformed version is an error, not an absence.
pub async fn read_local_version(path: &Path) -> LauncherResult<Option<Version>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(source) if source.kind() == ErrorKind::NotFound => {
            debug!("No version marker at {:?}", path);
            return Ok(None);
        }
        Err(source) => {
            return Err(LauncherError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    Ok(Some(Version::parse(&raw)?))
}

/// Overwrite the marker with `version`.
pub async fn write_local_version(path: &Path, version: &Version) -> LauncherResult<()> {
    tokio::fs::write(path, version.to_string())
        .await
        .map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Wrote version marker {} to {:?}", version, path);
    Ok(())
}
