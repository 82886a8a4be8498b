//! # Folio Storage
//!
//! Path-addressed file and folder operations over a pluggable backend.
//!
//! [`StorageService`] is the entry point. It parses logical paths such as
//! `"notes/2024/todo.txt"`, walks them from its root through a
//! [`StorageBackend`], and reports missing files and folders as values rather
//! than errors. [`LocalStorageBackend`] stores under a directory on disk and
//! [`InMemoryBackend`] keeps everything in process.

pub mod backend;
pub mod config;
pub mod error;
pub mod handle;
pub mod local;
pub mod location;
pub mod memory;
pub mod path;
pub mod payload;
pub mod resolver;
pub mod service;

pub use backend::{BoxedReader, BoxedWriter, StorageBackend};
pub use config::{ConfigData, ConfigFormat, StorageConfig};
pub use error::StorageSystemError;
pub use handle::{CollisionPolicy, FileHandle, FolderHandle, Snapshot};
pub use local::LocalStorageBackend;
pub use location::StorageLocation;
pub use memory::InMemoryBackend;
pub use path::{LogicalPath, PathKind, ToLogicalPath};
pub use payload::{BYTES_PER_PIXEL, PayloadKind, PixelBuffer};
pub use service::StorageService;

#[cfg(test)]
mod tests;
