use thiserror::Error;

use crate::storage::error::StorageSystemError;

/// Errors raised while loading, saving or updating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Storage error on settings file '{file}': {source}")]
    Storage {
        file: String,
        #[source]
        source: StorageSystemError,
    },

    #[error("Settings file '{0}' was not written: its folder does not exist")]
    NotWritten(String),

    #[error("Invalid value for setting '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown {type_name} variant: '{name}'")]
    UnknownVariant { type_name: &'static str, name: String },
}

impl SettingsError {
    pub(crate) fn storage(file: impl ToString, source: StorageSystemError) -> Self {
        SettingsError::Storage {
            file: file.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;
