use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use tempfile::NamedTempFile;
use tokio::fs::{self, File, OpenOptions};

use crate::storage::backend::{BoxedReader, BoxedWriter, StorageBackend};
use crate::storage::error::{Result, StorageSystemError};
use crate::storage::handle::{CollisionPolicy, FileHandle, FolderHandle};
use crate::storage::path::LogicalPath;

/// Local filesystem storage backend rooted at a base directory.
///
/// Symbolic links under the base directory are never followed: lookups and
/// listings skip them and creating through one fails with
/// [`StorageSystemError::InvalidPath`].
#[derive(Clone)]
pub struct LocalStorageBackend {
    base_path: PathBuf,
}

impl LocalStorageBackend {
    /// Create a new local backend. The base directory must already exist.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a logical path against the base path
    fn resolve_path(&self, path: &LogicalPath) -> PathBuf {
        path.to_native(&self.base_path)
    }

    /// Metadata of the entry itself; symbolic links are not followed, so a
    /// link is neither a file nor a folder to this backend.
    async fn metadata(&self, full_path: &Path, operation: &str) -> Result<Option<std::fs::Metadata>> {
        match fs::symlink_metadata(full_path).await {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(StorageSystemError::io(e, operation, full_path)),
        }
    }

    /// Fail if an existing component of `path` is a symbolic link. Checking
    /// stops at the first component that does not exist yet.
    async fn reject_links(&self, path: &LogicalPath) -> Result<()> {
        let mut current = self.base_path.clone();
        for segment in path.segments() {
            current.push(segment);
            match fs::symlink_metadata(&current).await {
                Ok(m) if m.file_type().is_symlink() => {
                    return Err(StorageSystemError::InvalidPath {
                        path: path.to_string(),
                        reason: "path goes through a symbolic link".to_string(),
                    });
                }
                Ok(_) => {}
                Err(e) if is_absent(&e) => return Ok(()),
                Err(e) => return Err(StorageSystemError::io(e, "symlink_metadata", &current)),
            }
        }
        Ok(())
    }

    async fn list_entries(&self, folder: &FolderHandle, want_dirs: bool) -> Result<Vec<LogicalPath>> {
        let full_path = self.resolve_path(folder.path());
        let logical = folder.path().to_string();
        let mut entries = fs::read_dir(&full_path)
            .await
            .map_err(|e| StorageSystemError::folder_io(e, "read_dir", &full_path, &logical))?;

        let mut result = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageSystemError::io(e, "read_dir_entry", &full_path))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StorageSystemError::io(e, "file_type", entry.path()))?;
            if file_type.is_dir() != want_dirs || !(file_type.is_dir() || file_type.is_file()) {
                continue;
            }

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    debug!("Skipping non UTF-8 entry {:?} in {}", raw, full_path.display());
                    continue;
                }
            };
            match folder.path().child(&name) {
                Ok(path) => result.push(path),
                Err(e) => debug!("Skipping entry '{}' in {}: {}", name, full_path.display(), e),
            }
        }

        result.sort();
        Ok(result)
    }
}

/// `NotFound`, or a path component that turned out to be a file.
fn is_absent(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

/// Write `contents` to a temporary file next to `full_path` and move it into
/// place, so readers never observe a half-written file.
fn persist_atomically(full_path: &Path, contents: &[u8]) -> Result<()> {
    let parent = full_path.parent().ok_or_else(|| StorageSystemError::InvalidPath {
        path: full_path.display().to_string(),
        reason: "path has no parent directory".to_string(),
    })?;

    let temp_file = NamedTempFile::new_in(parent)
        .map_err(|e| StorageSystemError::io(e, "create_temp_file", parent))?;

    temp_file
        .as_file()
        .write_all(contents)
        .map_err(|e| StorageSystemError::io(e, "write_to_temp_file", temp_file.path()))?;

    // Persist the temporary file, atomically replacing the target file
    temp_file
        .persist(full_path)
        .map_err(|e| StorageSystemError::io(e.error, "persist_temp_file", full_path))?;

    Ok(())
}

#[async_trait]
impl StorageBackend for LocalStorageBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn get_child_folder(&self, parent: &FolderHandle, name: &str) -> Result<Option<FolderHandle>> {
        let path = parent.path().child(name)?;
        let full_path = self.resolve_path(&path);
        let found = self.metadata(&full_path, "get_child_folder").await?;
        Ok(found.filter(|m| m.is_dir()).map(|_| FolderHandle::new(path)))
    }

    async fn get_file(&self, parent: &FolderHandle, name: &str) -> Result<Option<FileHandle>> {
        let path = parent.path().child(name)?;
        let full_path = self.resolve_path(&path);
        let found = self.metadata(&full_path, "get_file").await?;
        Ok(found.filter(|m| m.is_file()).map(|_| FileHandle::new(path)))
    }

    async fn create_file(&self, parent: &FolderHandle, path: &LogicalPath, policy: CollisionPolicy) -> Result<FileHandle> {
        let path = parent.path().concat(path);
        if path.is_root() {
            return Err(StorageSystemError::InvalidPath {
                path: String::new(),
                reason: "a file path needs at least one segment".to_string(),
            });
        }
        self.reject_links(&path).await?;
        let full_path = self.resolve_path(&path);

        let mut options = OpenOptions::new();
        options.write(true);
        match policy {
            CollisionPolicy::OpenIfExists => {
                options.create(true);
            }
            CollisionPolicy::ReplaceExisting => {
                options.create(true).truncate(true);
            }
            CollisionPolicy::FailIfExists => {
                options.create_new(true);
            }
        }

        options.open(&full_path).await.map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                StorageSystemError::AlreadyExists(path.to_string())
            } else {
                StorageSystemError::folder_io(e, "create_file", &full_path, &path.parent().to_string())
            }
        })?;

        debug!("Created or opened file {} ({:?})", path, policy);
        Ok(FileHandle::new(path))
    }

    async fn create_folder(&self, parent: &FolderHandle, path: &LogicalPath, policy: CollisionPolicy) -> Result<FolderHandle> {
        let path = parent.path().concat(path);
        if path.is_root() {
            return match policy {
                CollisionPolicy::OpenIfExists => Ok(FolderHandle::root()),
                _ => Err(StorageSystemError::InvalidPath {
                    path: String::new(),
                    reason: "the storage root cannot be recreated".to_string(),
                }),
            };
        }
        self.reject_links(&path).await?;
        let full_path = self.resolve_path(&path);
        let parent_logical = path.parent().to_string();

        if policy == CollisionPolicy::ReplaceExisting {
            match fs::remove_dir_all(&full_path).await {
                Ok(()) => debug!("Removed existing folder {} before replacing it", path),
                Err(e) if is_absent(&e) => {}
                Err(e) => return Err(StorageSystemError::io(e, "remove_dir_all", &full_path)),
            }
        }

        match fs::create_dir(&full_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists && policy == CollisionPolicy::OpenIfExists => {
                let existing = self.metadata(&full_path, "create_folder").await?;
                if !existing.is_some_and(|m| m.is_dir()) {
                    return Err(StorageSystemError::AlreadyExists(path.to_string()));
                }
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageSystemError::AlreadyExists(path.to_string()));
            }
            Err(e) => {
                return Err(StorageSystemError::folder_io(e, "create_dir", &full_path, &parent_logical));
            }
        }

        Ok(FolderHandle::new(path))
    }

    async fn delete_file(&self, file: &FileHandle) -> Result<()> {
        let full_path = self.resolve_path(file.path());
        fs::remove_file(&full_path)
            .await
            .map_err(|e| StorageSystemError::file_io(e, "remove_file", &full_path, &file.path().to_string()))
    }

    async fn delete_folder(&self, folder: &FolderHandle) -> Result<()> {
        let full_path = self.resolve_path(folder.path());
        fs::remove_dir_all(&full_path)
            .await
            .map_err(|e| StorageSystemError::folder_io(e, "remove_dir_all", &full_path, &folder.path().to_string()))
    }

    async fn list_child_files(&self, folder: &FolderHandle) -> Result<Vec<FileHandle>> {
        let paths = self.list_entries(folder, false).await?;
        Ok(paths.into_iter().map(FileHandle::new).collect())
    }

    async fn list_child_folders(&self, folder: &FolderHandle) -> Result<Vec<FolderHandle>> {
        let paths = self.list_entries(folder, true).await?;
        Ok(paths.into_iter().map(FolderHandle::new).collect())
    }

    async fn open_read(&self, file: &FileHandle) -> Result<BoxedReader> {
        let full_path = self.resolve_path(file.path());
        let handle = File::open(&full_path)
            .await
            .map_err(|e| StorageSystemError::file_io(e, "open_read", &full_path, &file.path().to_string()))?;
        Ok(Box::new(handle))
    }

    async fn open_write(&self, file: &FileHandle) -> Result<BoxedWriter> {
        let full_path = self.resolve_path(file.path());
        let handle = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&full_path)
            .await
            .map_err(|e| StorageSystemError::file_io(e, "open_write", &full_path, &file.path().to_string()))?;
        Ok(Box::new(handle))
    }

    async fn read_all_text(&self, file: &FileHandle) -> Result<String> {
        let full_path = self.resolve_path(file.path());
        fs::read_to_string(&full_path)
            .await
            .map_err(|e| StorageSystemError::file_io(e, "read_to_string", &full_path, &file.path().to_string()))
    }

    async fn read_all_bytes(&self, file: &FileHandle) -> Result<Vec<u8>> {
        let full_path = self.resolve_path(file.path());
        fs::read(&full_path)
            .await
            .map_err(|e| StorageSystemError::file_io(e, "read_to_bytes", &full_path, &file.path().to_string()))
    }

    async fn write_all_bytes(&self, file: &FileHandle, bytes: &[u8]) -> Result<()> {
        let full_path = self.resolve_path(file.path());
        let contents = bytes.to_vec();
        tokio::task::spawn_blocking(move || persist_atomically(&full_path, &contents))
            .await
            .map_err(|e| StorageSystemError::Backend {
                backend: self.name().to_string(),
                operation: "write_all_bytes".to_string(),
                message: e.to_string(),
            })?
    }
}

impl fmt::Debug for LocalStorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStorageBackend")
            .field("base_path", &self.base_path)
            .finish()
    }
}
