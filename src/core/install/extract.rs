// ─── Archive Extraction ───
// Unpacks the downloaded build archive into the artifact directory.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

/// Extract `zip_path` into `dest`, returning the number of files written.
///
/// When every entry sits under a top-level folder named `root_folder`
/// (`Build/Game`, `Build/Data/...`) that folder is stripped, so archives
/// packed with or without it produce the same tree. Entries that would
/// escape `dest` are rejected.
pub fn extract_archive(zip_path: &Path, dest: &Path, root_folder: &str) -> LauncherResult<usize> {
    let zip_file = std::fs::File::open(zip_path).map_err(|source| LauncherError::Io {
        path: zip_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(zip_file)?;
    let strip_root = all_entries_under(&archive, root_folder);

    std::fs::create_dir_all(dest).map_err(|source| LauncherError::Io {
        path: dest.to_path_buf(),
        source,
    })?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut zipped = archive.by_index(index)?;

        let enclosed_name = zipped.enclosed_name().ok_or_else(|| {
            LauncherError::Other(format!("Invalid zip entry path: {}", zipped.name()))
        })?;
        let mut components = enclosed_name.components();
        if strip_root {
            let _ = components.next();
        }
        let mut rel_path = PathBuf::new();
        for component in components {
            if let Component::Normal(part) = component {
                rel_path.push(part);
            }
        }

        if rel_path.as_os_str().is_empty() {
            continue;
        }

        let out_path = dest.join(rel_path);
        if zipped.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|source| LauncherError::Io {
                path: out_path,
                source,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out = std::fs::File::create(&out_path).map_err(|source| LauncherError::Io {
            path: out_path.clone(),
            source,
        })?;
        std::io::copy(&mut zipped, &mut out).map_err(|source| LauncherError::Io {
            path: out_path.clone(),
            source,
        })?;
        drop(out);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = zipped.unix_mode() {
                let permissions = std::fs::Permissions::from_mode(mode & 0o7777);
                std::fs::set_permissions(&out_path, permissions).map_err(|source| {
                    LauncherError::Io {
                        path: out_path.clone(),
                        source,
                    }
                })?;
            }
        }

        debug!("Extracted {:?}", out_path);
        written += 1;
    }

    Ok(written)
}

fn all_entries_under<R>(archive: &zip::ZipArchive<R>, root_folder: &str) -> bool
where
    R: std::io::Read + std::io::Seek,
{
    let mut names = archive.file_names().peekable();
    if names.peek().is_none() {
        return false;
    }
    names.all(|name| {
        let mut segments = name.split(['/', '\\']);
        segments.next() == Some(root_folder) && segments.next().is_some()
    })
}
