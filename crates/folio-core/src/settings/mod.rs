//! # Folio Settings
//!
//! Typed application settings persisted as one config file inside a storage
//! root. [`SettingsStore`] owns the file; [`Setting`] and [`EnumSetting`] are
//! key descriptors carrying a default, and [`EnumSource`] tracks a selection
//! among the variants of a [`NamedEnum`].

pub mod error;
pub mod named_enum;
pub mod store;

pub use error::SettingsError;
pub use named_enum::{EnumSetting, EnumSource, NamedEnum};
pub use store::{Setting, SettingsStore};

#[cfg(test)]
mod tests;
