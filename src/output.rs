use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{Error, Result};

/// Returns `path` if nothing exists there, otherwise the first free
/// `stem_N.ext` with `N` counting up from 1.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

    (1..)
        .map(|n| {
            let name = match &extension {
                Some(ext) => format!("{stem}_{n}.{ext}"),
                None => format!("{stem}_{n}"),
            };
            path.with_file_name(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Writes `bytes` to a non-colliding variant of `path`, creating parent
/// directories. Returns where the file ended up.
pub fn save(bytes: &[u8], path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::SaveFailure {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let target = unique_path(path);
    fs::write(&target, bytes).map_err(|source| Error::SaveFailure {
        path: target.clone(),
        source,
    })?;

    debug!(path = %target.display(), bytes = bytes.len(), "saved word cloud");
    Ok(target)
}
