use std::fmt::Debug;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::storage::error::Result;
use crate::storage::handle::{CollisionPolicy, FileHandle, FolderHandle};
use crate::storage::path::LogicalPath;

/// Reader returned by [`StorageBackend::open_read`].
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Writer returned by [`StorageBackend::open_write`].
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// The folder/file primitives a storage root is built on.
///
/// Lookups (`get_child_folder`, `get_file`) report a missing child as
/// `Ok(None)` and reserve `Err` for real failures. Mutations and reads on
/// handles may return [`StorageSystemError::FileNotFound`] or
/// [`StorageSystemError::FolderNotFound`] when the target vanished in the
/// meantime.
///
/// [`StorageSystemError::FileNotFound`]: crate::storage::StorageSystemError::FileNotFound
/// [`StorageSystemError::FolderNotFound`]: crate::storage::StorageSystemError::FolderNotFound
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Look up a direct child folder of `parent`.
    async fn get_child_folder(&self, parent: &FolderHandle, name: &str) -> Result<Option<FolderHandle>>;

    /// Look up a file directly inside `parent`.
    async fn get_file(&self, parent: &FolderHandle, name: &str) -> Result<Option<FileHandle>>;

    /// Create a file at `path` below `parent`. Intermediate folders are not
    /// created; if one is missing the call fails.
    async fn create_file(&self, parent: &FolderHandle, path: &LogicalPath, policy: CollisionPolicy) -> Result<FileHandle>;

    /// Create a folder at `path` below `parent`, without creating intermediates.
    async fn create_folder(&self, parent: &FolderHandle, path: &LogicalPath, policy: CollisionPolicy) -> Result<FolderHandle>;

    /// Delete a single file.
    async fn delete_file(&self, file: &FileHandle) -> Result<()>;

    /// Delete a folder and everything below it.
    async fn delete_folder(&self, folder: &FolderHandle) -> Result<()>;

    /// Files directly inside `folder`, sorted by name.
    async fn list_child_files(&self, folder: &FolderHandle) -> Result<Vec<FileHandle>>;

    /// Folders directly inside `folder`, sorted by name.
    async fn list_child_folders(&self, folder: &FolderHandle) -> Result<Vec<FolderHandle>>;

    /// Open a file for reading from the start.
    async fn open_read(&self, file: &FileHandle) -> Result<BoxedReader>;

    /// Open a file for writing from the start, discarding previous contents.
    /// Data is only guaranteed to be stored once the writer has been shut down.
    async fn open_write(&self, file: &FileHandle) -> Result<BoxedWriter>;

    /// Read the whole file as UTF-8 text.
    async fn read_all_text(&self, file: &FileHandle) -> Result<String>;

    /// Replace the whole file with `text` in one step.
    async fn write_all_text(&self, file: &FileHandle, text: &str) -> Result<()> {
        self.write_all_bytes(file, text.as_bytes()).await
    }

    /// Read the whole file.
    async fn read_all_bytes(&self, file: &FileHandle) -> Result<Vec<u8>>;

    /// Replace the whole file with `bytes` in one step.
    async fn write_all_bytes(&self, file: &FileHandle, bytes: &[u8]) -> Result<()>;
}
