use std::io::ErrorKind;
use std::path::Path;

use super::intent::{AssetPaths, LocalAssetState, Presence};
use crate::core::error::{UpdaterError, UpdaterResult};

/// Inspect one path. Directories and missing paths count as absent; any
/// other metadata failure is an error for the entry.
pub async fn probe(path: &Path) -> UpdaterResult<LocalAssetState> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(LocalAssetState {
            path: path.to_path_buf(),
            exists: true,
            length: meta.len(),
        }),
        Ok(_) => Ok(LocalAssetState::absent(path)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(LocalAssetState::absent(path)),
        Err(e) => Err(UpdaterError::io(path, e)),
    }
}

/// Which candidate files of an entry exist right now.
pub async fn presence(paths: &AssetPaths) -> UpdaterResult<Presence> {
    Ok(Presence {
        local: probe(&paths.local).await?.exists,
        jar: probe(&paths.jar).await?.exists,
        zip: probe(&paths.zip).await?.exists,
        bak: probe(&paths.bak).await?.exists,
    })
}

/// Delete a file, treating an already-missing file as done.
pub async fn remove_file(path: &Path) -> UpdaterResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(UpdaterError::io(path, e)),
    }
}
