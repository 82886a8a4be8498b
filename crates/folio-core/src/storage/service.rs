use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::constants;
use crate::storage::backend::StorageBackend;
use crate::storage::config::StorageConfig;
use crate::storage::error::{Result, StorageSystemError};
use crate::storage::handle::{CollisionPolicy, FileHandle, FolderHandle, Snapshot};
use crate::storage::local::LocalStorageBackend;
use crate::storage::location::StorageLocation;
use crate::storage::memory::InMemoryBackend;
use crate::storage::path::{LogicalPath, PathKind, ToLogicalPath};
use crate::storage::payload::{PayloadKind, PixelBuffer};
use crate::storage::resolver;

/// File and folder operations over a single storage root.
///
/// Every operation resolves its logical path from the root on each call; no
/// lookups are cached. A missing file or folder is reported as a value
/// (`None`, `false`, `Ok(false)`, or a no-op for deletes) while every other
/// backend failure comes back as an `Err`. Missing intermediate folders are
/// never created implicitly by file writes.
///
/// Cloning is cheap and clones share the backend. Concurrent writers to the
/// same path are not serialized.
#[derive(Clone)]
pub struct StorageService {
    backend: Arc<dyn StorageBackend>,
    root: FolderHandle,
    chunk_size: usize,
}

impl StorageService {
    /// Create a service rooted at the backend's root folder.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            root: FolderHandle::root(),
            chunk_size: constants::DEFAULT_CHUNK_SIZE,
        }
    }

    /// A service over a fresh [`InMemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()))
    }

    /// A service over an existing local directory.
    pub fn local(base_path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(LocalStorageBackend::new(base_path.into())))
    }

    /// Open the directory backing `location`, creating it if needed.
    pub async fn open(location: StorageLocation, config: &StorageConfig) -> Result<Self> {
        let dir = config.location_dir(location);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageSystemError::io(e, "create_dir_all", &dir))?;
        info!("Opened {} storage at {}", location, dir.display());
        Ok(Self::local(dir).with_chunk_size(config.chunk_size))
    }

    /// Set the block size used by [`StorageService::write_bytes`]. Zero is
    /// treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn root(&self) -> &FolderHandle {
        &self.root
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Resolve a folder from the root. See [`resolver::resolve_folder`].
    pub async fn resolve_folder(&self, path: impl ToLogicalPath, kind: PathKind) -> Result<Option<FolderHandle>> {
        let path = path.to_logical_path()?;
        self.resolve(&path, kind).await
    }

    async fn resolve(&self, path: &LogicalPath, kind: PathKind) -> Result<Option<FolderHandle>> {
        resolver::resolve_folder(self.backend.as_ref(), &self.root, path, kind).await
    }

    /// Find an existing file through the resolver.
    async fn lookup_file(&self, path: &LogicalPath) -> Result<Option<FileHandle>> {
        let Some(name) = path.file_name() else {
            return Ok(None);
        };
        match self.resolve(path, PathKind::File).await? {
            Some(folder) => self.backend.get_file(&folder, name).await,
            None => Ok(None),
        }
    }

    /// Resolve the containing folder and create or open the file in it with
    /// the payload's collision policy. `None` when the folder is missing.
    async fn prepare_file(&self, path: &LogicalPath, kind: PayloadKind) -> Result<Option<FileHandle>> {
        let Some(name) = path.file_name() else {
            return Ok(None);
        };
        let Some(folder) = self.resolve(path, PathKind::File).await? else {
            debug!("Not writing {} to '{}': containing folder is missing", kind, path);
            return Ok(None);
        };

        let name = LogicalPath::root().child(name)?;
        match self.backend.create_file(&folder, &name, kind.collision_policy()).await {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    // --- File operations ---

    /// Replace the contents of the file at `path` with `text`, creating the
    /// file if needed. Returns `Ok(false)` when the containing folder does
    /// not exist.
    pub async fn write_text(&self, path: impl ToLogicalPath, text: &str) -> Result<bool> {
        let path = path.to_logical_path()?;
        let Some(file) = self.prepare_file(&path, PayloadKind::Text).await? else {
            return Ok(false);
        };
        self.write_text_to(&file, text).await?;
        Ok(true)
    }

    /// Replace the contents of an already resolved file with `text`.
    pub async fn write_text_to(&self, file: &FileHandle, text: &str) -> Result<()> {
        self.backend.write_all_text(file, text).await
    }

    /// Copy `reader` into the file at `path`, creating the file if needed.
    /// Returns `Ok(false)` when the containing folder does not exist.
    ///
    /// See [`StorageService::write_bytes_to`] for how the stream is consumed.
    pub async fn write_bytes<R>(&self, path: impl ToLogicalPath, reader: R) -> Result<bool>
    where
        R: AsyncRead + Unpin + Send,
    {
        let path = path.to_logical_path()?;
        let Some(file) = self.prepare_file(&path, PayloadKind::ByteStream).await? else {
            return Ok(false);
        };
        self.write_bytes_to(&file, reader).await?;
        Ok(true)
    }

    /// Copy `reader` into an already resolved file, replacing its contents,
    /// and return the number of bytes written.
    ///
    /// The stream is copied in blocks of [`StorageService::chunk_size`]
    /// bytes. Copying stops only when the reader reports end of stream by
    /// returning zero bytes; a short read in the middle of the stream is
    /// not taken as the end, so payloads whose length is an exact multiple of
    /// the chunk size are copied in full. The reader is dropped when this
    /// returns, on success and on failure alike.
    pub async fn write_bytes_to<R>(&self, file: &FileHandle, mut reader: R) -> Result<u64>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut writer = self.backend.open_write(file).await?;
        let io_error = |e: std::io::Error| StorageSystemError::io(e, "write_bytes", PathBuf::from(file.path().to_string()));

        let total = copy_chunked(&mut reader, &mut writer, self.chunk_size)
            .await
            .map_err(io_error)?;
        writer.shutdown().await.map_err(io_error)?;

        debug!("Copied {} bytes into '{}'", total, file.path());
        Ok(total)
    }

    /// Write `pixels` into a fresh file at `path`, replacing any existing
    /// file. Returns `Ok(false)` when the containing folder does not exist.
    pub async fn write_image(&self, path: impl ToLogicalPath, pixels: &PixelBuffer) -> Result<bool> {
        let path = path.to_logical_path()?;
        let Some(file) = self.prepare_file(&path, PayloadKind::PixelBuffer).await? else {
            return Ok(false);
        };
        self.write_image_to(&file, pixels).await?;
        Ok(true)
    }

    /// Write raw pixels into an already resolved file as one blob.
    pub async fn write_image_to(&self, file: &FileHandle, pixels: &PixelBuffer) -> Result<()> {
        self.backend.write_all_bytes(file, pixels.as_bytes()).await
    }

    /// Read the file at `path` as text. `None` if the file or any folder
    /// on the way is missing.
    pub async fn read_text(&self, path: impl ToLogicalPath) -> Result<Option<String>> {
        let path = path.to_logical_path()?;
        let Some(file) = self.lookup_file(&path).await? else {
            return Ok(None);
        };
        match self.read_text_from(&file).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read an already resolved file as text.
    pub async fn read_text_from(&self, file: &FileHandle) -> Result<String> {
        self.backend.read_all_text(file).await
    }

    /// Read the raw contents of the file at `path`.
    pub async fn read_bytes(&self, path: impl ToLogicalPath) -> Result<Option<Vec<u8>>> {
        let path = path.to_logical_path()?;
        let Some(file) = self.lookup_file(&path).await? else {
            return Ok(None);
        };
        match self.backend.read_all_bytes(&file).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read back a blob stored by [`StorageService::write_image`]. The
    /// dimensions are not stored, so the caller supplies them.
    pub async fn read_image(&self, path: impl ToLogicalPath, width: u32, height: u32) -> Result<Option<PixelBuffer>> {
        match self.read_bytes(path).await? {
            Some(bytes) => PixelBuffer::new(width, height, bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Whether a file exists at `path`.
    pub async fn contains_file(&self, path: impl ToLogicalPath) -> Result<bool> {
        let path = path.to_logical_path()?;
        Ok(self.lookup_file(&path).await?.is_some())
    }

    /// The file at `path`, if it exists.
    pub async fn get_file(&self, path: impl ToLogicalPath) -> Result<Option<FileHandle>> {
        let path = path.to_logical_path()?;
        self.lookup_file(&path).await
    }

    /// Create the file at `path` or open it if it exists. Any failure,
    /// including a missing containing folder, gives `None`; use
    /// [`StorageService::try_create_or_get_file`] to see the cause.
    pub async fn create_or_get_file(&self, path: impl ToLogicalPath) -> Option<FileHandle> {
        collapse("create or open file", self.try_create_or_get_file(path).await)
    }

    /// Create an empty file at `path`, replacing any existing one. Failures
    /// give `None`; see [`StorageService::try_create_or_replace_file`].
    pub async fn create_or_replace_file(&self, path: impl ToLogicalPath) -> Option<FileHandle> {
        collapse("create or replace file", self.try_create_or_replace_file(path).await)
    }

    pub async fn try_create_or_get_file(&self, path: impl ToLogicalPath) -> Result<FileHandle> {
        self.create_file_at_root(path, CollisionPolicy::OpenIfExists).await
    }

    pub async fn try_create_or_replace_file(&self, path: impl ToLogicalPath) -> Result<FileHandle> {
        self.create_file_at_root(path, CollisionPolicy::ReplaceExisting).await
    }

    /// One backend call with the full path against the root, no resolver walk.
    async fn create_file_at_root(&self, path: impl ToLogicalPath, policy: CollisionPolicy) -> Result<FileHandle> {
        let path = path.to_logical_path()?;
        self.backend.create_file(&self.root, &path, policy).await
    }

    /// Delete the file at `path`. Deleting a file that does not exist, or
    /// whose folder does not exist, succeeds.
    pub async fn delete_file(&self, path: impl ToLogicalPath) -> Result<()> {
        let path = path.to_logical_path()?;
        let Some(file) = self.lookup_file(&path).await? else {
            debug!("Nothing to delete at '{}'", path);
            return Ok(());
        };
        match self.backend.delete_file(&file).await {
            Ok(()) => {
                info!("Deleted file '{}'", path);
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    // --- Folder operations ---

    /// Whether every segment of `path` names an existing folder.
    pub async fn contains_directory(&self, path: impl ToLogicalPath) -> Result<bool> {
        Ok(self.get_folder(path).await?.is_some())
    }

    /// The folder at `path`, if it exists.
    pub async fn get_folder(&self, path: impl ToLogicalPath) -> Result<Option<FolderHandle>> {
        let path = path.to_logical_path()?;
        self.resolve(&path, PathKind::Directory).await
    }

    /// Files directly inside the folder at `path`; `None` if the folder is
    /// missing.
    pub async fn list_files(&self, path: impl ToLogicalPath) -> Result<Option<Snapshot<FileHandle>>> {
        let Some(folder) = self.get_folder(path).await? else {
            return Ok(None);
        };
        match self.backend.list_child_files(&folder).await {
            Ok(files) => Ok(Some(Snapshot::new(files))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Folders directly inside the folder at `path`; `None` if the folder is
    /// missing.
    pub async fn list_folders(&self, path: impl ToLogicalPath) -> Result<Option<Snapshot<FolderHandle>>> {
        let Some(folder) = self.get_folder(path).await? else {
            return Ok(None);
        };
        match self.backend.list_child_folders(&folder).await {
            Ok(folders) => Ok(Some(Snapshot::new(folders))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create the folder at `path`, or return it if it already exists.
    /// Intermediate folders must already exist.
    pub async fn create_or_get_folder(&self, path: impl ToLogicalPath) -> Result<FolderHandle> {
        let path = path.to_logical_path()?;
        self.backend.create_folder(&self.root, &path, CollisionPolicy::OpenIfExists).await
    }

    /// Create an empty folder at `path`, deleting any existing folder and
    /// its contents first.
    pub async fn create_or_replace_folder(&self, path: impl ToLogicalPath) -> Result<FolderHandle> {
        let path = path.to_logical_path()?;
        let folder = self
            .backend
            .create_folder(&self.root, &path, CollisionPolicy::ReplaceExisting)
            .await?;
        info!("Replaced folder '{}'", path);
        Ok(folder)
    }

    /// Delete the folder at `path` and everything in it. Deleting a missing
    /// folder succeeds; deleting the root is refused.
    pub async fn delete_folder(&self, path: impl ToLogicalPath) -> Result<()> {
        let path = path.to_logical_path()?;
        let Some(folder) = self.resolve(&path, PathKind::Directory).await? else {
            debug!("Nothing to delete at '{}'", path);
            return Ok(());
        };
        if folder.is_root() {
            return Err(StorageSystemError::InvalidPath {
                path: path.to_string(),
                reason: "the storage root cannot be deleted".to_string(),
            });
        }

        match self.backend.delete_folder(&folder).await {
            Ok(()) => {
                info!("Deleted folder '{}'", path);
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn collapse<T>(operation: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to {}: {}", operation, e);
            None
        }
    }
}

/// Copy `reader` into `writer` one full chunk at a time.
async fn copy_chunked<R, W>(reader: &mut R, writer: &mut W, chunk_size: usize) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let filled = fill_chunk(reader, &mut buffer).await?;
        if filled > 0 {
            writer.write_all(&buffer[..filled]).await?;
            total += filled as u64;
        }
        // A partly filled chunk means the reader returned 0: end of stream.
        if filled < buffer.len() {
            break;
        }
    }
    Ok(total)
}

/// Read until `buffer` is full or the reader reports end of stream.
async fn fill_chunk<R>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

impl fmt::Debug for StorageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageService")
            .field("backend", &self.backend.name())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}
