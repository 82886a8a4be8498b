use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::constants;
use crate::settings::error::{Result, SettingsError};
use crate::storage::config::{ConfigData, ConfigFormat};
use crate::storage::error::StorageSystemError;
use crate::storage::path::{LogicalPath, ToLogicalPath};
use crate::storage::service::StorageService;

/// Settings held in memory and persisted as one file through a
/// [`StorageService`].
///
/// Reads and updates only touch the in-memory copy; call
/// [`SettingsStore::save`] to write it back. The lock is never held across an
/// await, so a store can be shared between tasks behind an `Arc`.
#[derive(Debug)]
pub struct SettingsStore {
    storage: StorageService,
    file: LogicalPath,
    format: ConfigFormat,
    data: RwLock<ConfigData>,
}

impl SettingsStore {
    /// An empty store for `file`. The format follows the file extension and
    /// falls back to JSON.
    pub fn new(storage: StorageService, file: impl ToLogicalPath) -> Result<Self> {
        let file = file
            .to_logical_path()
            .map_err(|e| SettingsError::storage("<invalid path>", e))?;
        let format = file
            .file_name()
            .and_then(ConfigFormat::from_file_name)
            .unwrap_or(ConfigFormat::Json);
        Ok(Self {
            storage,
            file,
            format,
            data: RwLock::new(ConfigData::new()),
        })
    }

    /// Open the default settings file of `storage` and load it.
    pub async fn open(storage: StorageService) -> Result<Self> {
        Self::load(storage, constants::DEFAULT_SETTINGS_FILE).await
    }

    /// Create a store for `file` and load its current contents.
    pub async fn load(storage: StorageService, file: impl ToLogicalPath) -> Result<Self> {
        let store = Self::new(storage, file)?;
        store.reload().await?;
        Ok(store)
    }

    /// Override the serialization format.
    pub fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = format;
        self
    }

    pub fn file(&self) -> &LogicalPath {
        &self.file
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Replace the in-memory settings with the file contents. A missing or
    /// blank file gives empty settings.
    pub async fn reload(&self) -> Result<()> {
        let text = self
            .storage
            .read_text(&self.file)
            .await
            .map_err(|e| SettingsError::storage(&self.file, e))?;

        let data = match text {
            Some(text) if !text.trim().is_empty() => {
                ConfigData::deserialize(&text, self.format).map_err(|e| SettingsError::storage(&self.file, e))?
            }
            Some(_) => ConfigData::new(),
            None => {
                debug!("No settings file at '{}', starting empty", self.file);
                ConfigData::new()
            }
        };

        *self.write_data() = data;
        Ok(())
    }

    /// Write the in-memory settings to the file.
    pub async fn save(&self) -> Result<()> {
        let text = self
            .read_data()
            .serialize(self.format)
            .map_err(|e| SettingsError::storage(&self.file, e))?;

        let written = self
            .storage
            .write_text(&self.file, &text)
            .await
            .map_err(|e| SettingsError::storage(&self.file, e))?;
        if !written {
            return Err(SettingsError::NotWritten(self.file.to_string()));
        }
        info!("Saved settings to '{}'", self.file);
        Ok(())
    }

    /// The stored value for `key`, if present and of type `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = self.read_data();
        let value = data.get(key);
        if value.is_none() && data.contains_key(key) {
            warn!("Setting '{}' has an unexpected type, ignoring it", key);
        }
        value
    }

    pub fn set<T: Serialize>(&self, key: &str, value: T) -> Result<()> {
        self.write_data().set(key, value).map_err(|e| match e {
            StorageSystemError::SerializationError { source, .. } => SettingsError::InvalidValue {
                key: key.to_string(),
                message: source.to_string(),
            },
            other => SettingsError::storage(&self.file, other),
        })
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.write_data().remove(key).is_some()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read_data().contains_key(key)
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.read_data().keys()
    }

    fn read_data(&self) -> RwLockReadGuard<'_, ConfigData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_data(&self) -> RwLockWriteGuard<'_, ConfigData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A typed settings key with a default value.
#[derive(Debug, Clone)]
pub struct Setting<T> {
    key: &'static str,
    default: T,
}

impl<T> Setting<T> {
    pub const fn new(key: &'static str, default: T) -> Self {
        Self { key, default }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }
}

impl<T> Setting<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// The stored value, or the default when unset or unreadable.
    pub fn get(&self, store: &SettingsStore) -> T {
        store.get(self.key).unwrap_or_else(|| self.default.clone())
    }

    pub fn set(&self, store: &SettingsStore, value: T) -> Result<()> {
        store.set(self.key, value)
    }

    /// Forget the stored value so [`Setting::get`] returns the default again.
    pub fn reset(&self, store: &SettingsStore) {
        store.remove(self.key);
    }
}
