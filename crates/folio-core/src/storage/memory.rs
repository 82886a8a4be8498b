//! In-memory storage backend.
//!
//! Keeps folders and file contents in ordered maps behind a lock that is only
//! taken for the synchronous part of each call. Used by the test-suite and
//! usable wherever a throwaway storage root is wanted.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, ErrorKind};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::storage::backend::{BoxedReader, BoxedWriter, StorageBackend};
use crate::storage::error::{Result, StorageSystemError};
use crate::storage::handle::{CollisionPolicy, FileHandle, FolderHandle};
use crate::storage::path::LogicalPath;

const BACKEND_NAME: &str = "memory";

#[derive(Debug, Default)]
struct MemoryState {
    /// Every folder except the root, which always exists.
    folders: BTreeSet<LogicalPath>,
    files: BTreeMap<LogicalPath, Vec<u8>>,
}

impl MemoryState {
    fn folder_exists(&self, path: &LogicalPath) -> bool {
        path.is_root() || self.folders.contains(path)
    }

    fn require_parent(&self, path: &LogicalPath) -> Result<()> {
        let parent = path.parent();
        if self.folder_exists(&parent) {
            Ok(())
        } else {
            Err(StorageSystemError::FolderNotFound(parent.to_string()))
        }
    }

    fn remove_subtree(&mut self, path: &LogicalPath) {
        self.folders.retain(|p| !p.starts_with(path));
        self.files.retain(|p, _| !p.starts_with(path));
    }

    fn children<'a, I>(paths: I, folder: &LogicalPath) -> Vec<LogicalPath>
    where
        I: Iterator<Item = &'a LogicalPath>,
    {
        paths
            .filter(|p| p.depth() == folder.depth() + 1 && p.starts_with(folder))
            .cloned()
            .collect()
    }
}

/// Storage backend that lives entirely in memory.
///
/// Clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<RwLock<MemoryState>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`StorageSystemError::Backend`],
    /// the way an unavailable device would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn failure(operation: &str, message: impl Into<String>) -> StorageSystemError {
        StorageSystemError::Backend {
            backend: BACKEND_NAME.to_string(),
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    fn read(&self, operation: &str) -> Result<RwLockReadGuard<'_, MemoryState>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Self::failure(operation, "backend is offline"));
        }
        self.state
            .read()
            .map_err(|_| Self::failure(operation, "state lock poisoned"))
    }

    fn write(&self, operation: &str) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Self::failure(operation, "backend is offline"));
        }
        self.state
            .write()
            .map_err(|_| Self::failure(operation, "state lock poisoned"))
    }

    fn file_contents(&self, file: &FileHandle, operation: &str) -> Result<Vec<u8>> {
        let state = self.read(operation)?;
        state
            .files
            .get(file.path())
            .cloned()
            .ok_or_else(|| StorageSystemError::FileNotFound(file.path().to_string()))
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn get_child_folder(&self, parent: &FolderHandle, name: &str) -> Result<Option<FolderHandle>> {
        let path = parent.path().child(name)?;
        let state = self.read("get_child_folder")?;
        Ok(state.folders.contains(&path).then(|| FolderHandle::new(path)))
    }

    async fn get_file(&self, parent: &FolderHandle, name: &str) -> Result<Option<FileHandle>> {
        let path = parent.path().child(name)?;
        let state = self.read("get_file")?;
        Ok(state.files.contains_key(&path).then(|| FileHandle::new(path)))
    }

    async fn create_file(&self, parent: &FolderHandle, path: &LogicalPath, policy: CollisionPolicy) -> Result<FileHandle> {
        let path = parent.path().concat(path);
        if path.is_root() {
            return Err(StorageSystemError::InvalidPath {
                path: String::new(),
                reason: "a file path needs at least one segment".to_string(),
            });
        }

        let mut state = self.write("create_file")?;
        state.require_parent(&path)?;
        if state.folders.contains(&path) {
            return Err(StorageSystemError::AlreadyExists(path.to_string()));
        }

        match policy {
            CollisionPolicy::OpenIfExists => {
                state.files.entry(path.clone()).or_default();
            }
            CollisionPolicy::ReplaceExisting => {
                state.files.insert(path.clone(), Vec::new());
            }
            CollisionPolicy::FailIfExists => {
                if state.files.contains_key(&path) {
                    return Err(StorageSystemError::AlreadyExists(path.to_string()));
                }
                state.files.insert(path.clone(), Vec::new());
            }
        }
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

        let mut state = self.write("create_folder")?;
        state.require_parent(&path)?;
        if state.files.contains_key(&path) {
            return Err(StorageSystemError::AlreadyExists(path.to_string()));
        }

        let exists = state.folders.contains(&path);
        match policy {
            CollisionPolicy::OpenIfExists => {}
            CollisionPolicy::ReplaceExisting => state.remove_subtree(&path),
            CollisionPolicy::FailIfExists if exists => {
                return Err(StorageSystemError::AlreadyExists(path.to_string()));
            }
            CollisionPolicy::FailIfExists => {}
        }
        state.folders.insert(path.clone());
        Ok(FolderHandle::new(path))
    }

    async fn delete_file(&self, file: &FileHandle) -> Result<()> {
        let mut state = self.write("delete_file")?;
        state
            .files
            .remove(file.path())
            .map(|_| ())
            .ok_or_else(|| StorageSystemError::FileNotFound(file.path().to_string()))
    }

    async fn delete_folder(&self, folder: &FolderHandle) -> Result<()> {
        let mut state = self.write("delete_folder")?;
        if !state.folder_exists(folder.path()) {
            return Err(StorageSystemError::FolderNotFound(folder.path().to_string()));
        }
        state.remove_subtree(folder.path());
        Ok(())
    }

    async fn list_child_files(&self, folder: &FolderHandle) -> Result<Vec<FileHandle>> {
        let state = self.read("list_child_files")?;
        if !state.folder_exists(folder.path()) {
            return Err(StorageSystemError::FolderNotFound(folder.path().to_string()));
        }
        let paths = MemoryState::children(state.files.keys(), folder.path());
        Ok(paths.into_iter().map(FileHandle::new).collect())
    }

    async fn list_child_folders(&self, folder: &FolderHandle) -> Result<Vec<FolderHandle>> {
        let state = self.read("list_child_folders")?;
        if !state.folder_exists(folder.path()) {
            return Err(StorageSystemError::FolderNotFound(folder.path().to_string()));
        }
        let paths = MemoryState::children(state.folders.iter(), folder.path());
        Ok(paths.into_iter().map(FolderHandle::new).collect())
    }

    async fn open_read(&self, file: &FileHandle) -> Result<BoxedReader> {
        let contents = self.file_contents(file, "open_read")?;
        Ok(Box::new(Cursor::new(contents)))
    }

    async fn open_write(&self, file: &FileHandle) -> Result<BoxedWriter> {
        let mut state = self.write("open_write")?;
        let contents = state
            .files
            .get_mut(file.path())
            .ok_or_else(|| StorageSystemError::FileNotFound(file.path().to_string()))?;
        contents.clear();
        Ok(Box::new(MemoryWriter {
            path: file.path().clone(),
            state: Arc::clone(&self.state),
        }))
    }

    async fn read_all_text(&self, file: &FileHandle) -> Result<String> {
        let contents = self.file_contents(file, "read_all_text")?;
        String::from_utf8(contents).map_err(|e| {
            StorageSystemError::io(
                std::io::Error::new(ErrorKind::InvalidData, e),
                "read_to_string",
                PathBuf::from(file.path().to_string()),
            )
        })
    }

    async fn read_all_bytes(&self, file: &FileHandle) -> Result<Vec<u8>> {
        self.file_contents(file, "read_all_bytes")
    }

    async fn write_all_bytes(&self, file: &FileHandle, bytes: &[u8]) -> Result<()> {
        let mut state = self.write("write_all_bytes")?;
        state.require_parent(file.path())?;
        state.files.insert(file.path().clone(), bytes.to_vec());
        Ok(())
    }
}

/// Appends straight into the shared file map on every write.
struct MemoryWriter {
    path: LogicalPath,
    state: Arc<RwLock<MemoryState>>,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(_) => return Poll::Ready(Err(std::io::Error::other("state lock poisoned"))),
        };
        match state.files.get_mut(&self.path) {
            Some(contents) => {
                contents.extend_from_slice(buf);
                Poll::Ready(Ok(buf.len()))
            }
            None => Poll::Ready(Err(std::io::Error::new(
                ErrorKind::NotFound,
                format!("file '{}' was deleted while open", self.path),
            ))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
