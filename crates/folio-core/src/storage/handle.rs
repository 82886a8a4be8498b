use std::fmt;

use crate::storage::path::LogicalPath;

/// What a backend does when asked to create something that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Return the existing item untouched.
    #[default]
    OpenIfExists,
    /// Discard the existing item and create a fresh, empty one.
    ReplaceExisting,
    /// Fail with [`StorageSystemError::AlreadyExists`](crate::storage::StorageSystemError::AlreadyExists).
    FailIfExists,
}

/// A resolved folder, identified by its path from the backend root.
///
/// Handles are plain values. They stay valid as long as the folder does; a
/// handle to a folder deleted by someone else simply fails its next operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderHandle {
    path: LogicalPath,
}

impl FolderHandle {
    pub fn root() -> Self {
        Self {
            path: LogicalPath::root(),
        }
    }

    /// Construct a handle for a path the caller knows to be a folder.
    /// Backends use this after they have checked the folder exists.
    pub fn new(path: LogicalPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &LogicalPath {
        &self.path
    }

    /// Folder name, empty for the root.
    pub fn name(&self) -> &str {
        self.path.file_name().unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }
}

impl fmt::Display for FolderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path)
    }
}

/// A resolved file, identified by its path from the backend root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle {
    path: LogicalPath,
}

impl FileHandle {
    pub fn new(path: LogicalPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &LogicalPath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.file_name().unwrap_or("")
    }

    /// The folder containing this file.
    pub fn parent(&self) -> FolderHandle {
        FolderHandle::new(self.path.parent())
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path)
    }
}

/// A point-in-time listing of a folder's immediate children.
///
/// The listing is taken once; iterating consumes it and later changes to the
/// folder are not reflected.
#[derive(Debug)]
pub struct Snapshot<T> {
    items: std::vec::IntoIter<T>,
}

impl<T> Snapshot<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl<T> Iterator for Snapshot<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> ExactSizeIterator for Snapshot<T> {}
