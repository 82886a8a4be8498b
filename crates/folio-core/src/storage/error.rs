//! # Folio Storage System Errors
//!
//! Defines error types specific to the Folio storage system.
//!
//! This module includes [`StorageSystemError`], the enum returned by every
//! backend and service operation that can fail for reasons other than a missing
//! file or folder. Absence is reported as a value (`None`, `false`, or a no-op)
//! by the service; the `FileNotFound` and `FolderNotFound` variants only travel
//! between backends and the service, or out of the `try_*` creation calls.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageSystemError {
    #[error("I/O error during operation '{operation}' on path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path provided: '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid pixel buffer: {0}")]
    InvalidPixelBuffer(String),

    #[error("Backend '{backend}' failed during '{operation}': {message}")]
    Backend {
        backend: String,
        operation: String,
        message: String,
    },

    #[error("Serialization to '{format}' failed: {source}")]
    SerializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Deserialization from '{format}' failed: {source}")]
    DeserializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedConfigFormat(String),
}

/// Shorthand for results produced by the storage system.
pub type Result<T> = std::result::Result<T, StorageSystemError>;

impl StorageSystemError {
    /// Wrap an I/O error with the operation and on-disk path it came from.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        StorageSystemError::Io {
            source,
            operation: operation.into(),
            path: path.into(),
        }
    }

    /// Like [`StorageSystemError::io`], but maps `NotFound` to [`StorageSystemError::FileNotFound`]
    /// so callers can treat absence uniformly across backends.
    pub fn file_io(source: std::io::Error, operation: impl Into<String>, path: impl Into<PathBuf>, logical: &str) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageSystemError::FileNotFound(logical.to_string())
        } else if source.kind() == std::io::ErrorKind::AlreadyExists {
            StorageSystemError::AlreadyExists(logical.to_string())
        } else {
            Self::io(source, operation, path)
        }
    }

    /// Folder counterpart of [`StorageSystemError::file_io`].
    pub fn folder_io(source: std::io::Error, operation: impl Into<String>, path: impl Into<PathBuf>, logical: &str) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageSystemError::FolderNotFound(logical.to_string())
        } else if source.kind() == std::io::ErrorKind::AlreadyExists {
            StorageSystemError::AlreadyExists(logical.to_string())
        } else {
            Self::io(source, operation, path)
        }
    }

    /// Whether this error only says that the target does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageSystemError::FileNotFound(_) | StorageSystemError::FolderNotFound(_) => true,
            StorageSystemError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
