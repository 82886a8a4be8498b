//! # Folio Errors
//!
//! [`Error`] gathers the typed errors of each subsystem so callers that touch
//! both storage and settings can use a single `?`.
use thiserror::Error as ThisError;

use crate::settings::error::SettingsError;
use crate::storage::error::StorageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Settings error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, Error>;
