use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::storage::error::{Result, StorageSystemError};
use crate::storage::location::StorageLocation;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from a file name's extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::from_path(Path::new(name))
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// In-memory representation of configuration data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    /// Raw configuration values
    #[serde(flatten)]
    values: HashMap<String, serde_json::Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Get a configuration value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| StorageSystemError::SerializationError {
            format: "json".to_string(),
            source: Box::new(e),
        })?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Remove a configuration value
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&self).map_err(|e| serialization_error("json", e)),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(&self).map_err(|e| serialization_error("yaml", e)),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(&self).map_err(|e| serialization_error("toml", e)),
        }
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| deserialization_error("json", e)),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| deserialization_error("yaml", e)),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| deserialization_error("toml", e)),
        }
    }

    /// Convert into a typed structure.
    pub fn to_typed<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        let value = serde_json::to_value(self).map_err(|e| serialization_error("json", e))?;
        serde_json::from_value(value).map_err(|e| deserialization_error("json", e))
    }
}

fn serialization_error<E>(format: &str, source: E) -> StorageSystemError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StorageSystemError::SerializationError {
        format: format.to_string(),
        source: Box::new(source),
    }
}

fn deserialization_error<E>(format: &str, source: E) -> StorageSystemError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StorageSystemError::DeserializationError {
        format: format.to_string(),
        source: Box::new(source),
    }
}

/// Where storage roots live on disk and how streams are copied into them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one folder per [`StorageLocation`].
    pub base_dir: PathBuf,
    pub local_dir: String,
    pub roaming_dir: String,
    pub temporary_dir: String,
    /// Block size used when copying byte streams into files.
    pub chunk_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Determine a sensible default base path relative to the current directory
        let current = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            base_dir: current.join(constants::DEFAULT_BASE_DIR_NAME),
            local_dir: constants::LOCAL_DIR_NAME.to_string(),
            roaming_dir: constants::ROAMING_DIR_NAME.to_string(),
            temporary_dir: constants::TEMPORARY_DIR_NAME.to_string(),
            chunk_size: constants::DEFAULT_CHUNK_SIZE,
        }
    }
}

impl StorageConfig {
    /// A default configuration rooted at `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Build from parsed configuration data; missing keys keep their defaults.
    pub fn from_config_data(data: &ConfigData) -> Result<Self> {
        let config: Self = data.to_typed()?;
        config.validate()
    }

    /// Load from a configuration file. A missing file yields the defaults.
    /// Environment overrides are applied afterwards.
    pub async fn load(path: &Path) -> Result<Self> {
        let config = match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let format = ConfigFormat::from_path(path)
                    .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.display().to_string()))?;
                let data = ConfigData::deserialize(&content, format)?;
                info!("Loaded storage configuration from {}", path.display());
                Self::from_config_data(&data)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No storage configuration at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(StorageSystemError::io(e, "load_config", path)),
        };
        config.with_env_overrides()
    }

    /// Apply `FOLIO_STORAGE_DIR` and `FOLIO_CHUNK_SIZE` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup, keyed like the environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(constants::STORAGE_DIR_ENV) {
            debug!("{} overrides base directory: {}", constants::STORAGE_DIR_ENV, dir);
            self.base_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(constants::CHUNK_SIZE_ENV) {
            self.chunk_size = raw.trim().parse().map_err(|e| deserialization_error("env", e))?;
        }
        self.validate()
    }

    /// Directory backing a storage location.
    pub fn location_dir(&self, location: StorageLocation) -> PathBuf {
        let name = match location {
            StorageLocation::Local => &self.local_dir,
            StorageLocation::Roaming => &self.roaming_dir,
            StorageLocation::Temporary => &self.temporary_dir,
        };
        self.base_dir.join(name)
    }

    fn validate(self) -> Result<Self> {
        if self.chunk_size == 0 {
            return Err(StorageSystemError::DeserializationError {
                format: "config".to_string(),
                source: "chunk_size must be greater than zero".into(),
            });
        }
        Ok(self)
    }
}
