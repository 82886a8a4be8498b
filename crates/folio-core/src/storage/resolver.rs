//! Walks logical paths down from a root folder.

use log::debug;

use crate::storage::backend::StorageBackend;
use crate::storage::error::Result;
use crate::storage::handle::FolderHandle;
use crate::storage::path::{LogicalPath, PathKind};

/// Resolve the folder named by `path`.
///
/// With [`PathKind::File`] the final segment is treated as a file name and
/// only the segments before it are walked; with [`PathKind::Directory`] the
/// whole path is. Each segment costs one backend lookup. The walk stops at the
/// first missing segment and returns `Ok(None)`; backend failures other than
/// absence are returned as errors.
pub async fn resolve_folder(
    backend: &dyn StorageBackend,
    root: &FolderHandle,
    path: &LogicalPath,
    kind: PathKind,
) -> Result<Option<FolderHandle>> {
    let mut current = root.clone();
    for segment in path.folder_segments(kind) {
        match backend.get_child_folder(&current, segment).await? {
            Some(next) => current = next,
            None => {
                debug!("Folder '{}' not found while resolving '{}'", segment, path);
                return Ok(None);
            }
        }
    }
    Ok(Some(current))
}
