use tempfile::tempdir;

use crate::constants;
use crate::storage::config::{ConfigData, ConfigFormat, StorageConfig};
use crate::storage::error::StorageSystemError;
use crate::storage::location::StorageLocation;

#[test]
fn test_config_format_from_extension() {
    assert_eq!(ConfigFormat::from_file_name("settings.json"), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_file_name("SETTINGS.JSON"), Some(ConfigFormat::Json));
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_file_name("settings.yml"), Some(ConfigFormat::Yaml));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_file_name("settings.toml"), Some(ConfigFormat::Toml));
    assert_eq!(ConfigFormat::from_file_name("settings.ini"), None);
    assert_eq!(ConfigFormat::from_file_name("settings"), None);
}

#[test]
fn test_config_data_get_set() {
    let mut data = ConfigData::new();
    data.set("flag", true).unwrap();
    data.set("name", "value").unwrap();

    assert_eq!(data.get::<bool>("flag"), Some(true));
    assert_eq!(data.get::<String>("name"), Some("value".to_string()));
    assert_eq!(data.get::<u32>("name"), None);
    assert_eq!(data.get::<u32>("missing"), None);
    assert_eq!(data.keys(), vec!["flag", "name"]);

    assert!(data.remove("flag").is_some());
    assert!(!data.contains_key("flag"));
}

#[test]
fn test_config_data_serialize_each_format() {
    let mut data = ConfigData::new();
    data.set("toggle", true).unwrap();
    data.set("choice", "Beta").unwrap();

    let mut formats = vec![ConfigFormat::Json];
    #[cfg(feature = "yaml-config")]
    formats.push(ConfigFormat::Yaml);
    #[cfg(feature = "toml-config")]
    formats.push(ConfigFormat::Toml);

    for format in formats {
        let text = data.serialize(format).unwrap();
        let back = ConfigData::deserialize(&text, format).unwrap();
        assert_eq!(back, data, "format {:?}", format);
    }
}

#[test]
fn test_config_data_rejects_malformed_input() {
    let err = ConfigData::deserialize("{not json", ConfigFormat::Json).unwrap_err();
    assert!(matches!(err, StorageSystemError::DeserializationError { .. }));
}

#[test]
fn test_storage_config_defaults() {
    let config = StorageConfig::with_base_dir("/data");
    assert_eq!(config.chunk_size, constants::DEFAULT_CHUNK_SIZE);
    assert_eq!(
        config.location_dir(StorageLocation::Local),
        std::path::Path::new("/data").join(constants::LOCAL_DIR_NAME)
    );
    assert_eq!(
        config.location_dir(StorageLocation::Temporary),
        std::path::Path::new("/data").join(constants::TEMPORARY_DIR_NAME)
    );
}

#[test]
fn test_storage_config_from_partial_data() {
    let mut data = ConfigData::new();
    data.set("base_dir", "/srv/folio").unwrap();
    data.set("chunk_size", 4096).unwrap();

    let config = StorageConfig::from_config_data(&data).unwrap();
    assert_eq!(config.base_dir, std::path::PathBuf::from("/srv/folio"));
    assert_eq!(config.chunk_size, 4096);
    assert_eq!(config.roaming_dir, constants::ROAMING_DIR_NAME);
}

#[test]
fn test_storage_config_rejects_zero_chunk() {
    let mut data = ConfigData::new();
    data.set("chunk_size", 0).unwrap();
    assert!(StorageConfig::from_config_data(&data).is_err());
}

#[test]
fn test_storage_config_overrides() {
    let config = StorageConfig::with_base_dir("/data")
        .with_overrides(|key| match key {
            constants::STORAGE_DIR_ENV => Some("/elsewhere".to_string()),
            constants::CHUNK_SIZE_ENV => Some(" 64 ".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.base_dir, std::path::PathBuf::from("/elsewhere"));
    assert_eq!(config.chunk_size, 64);

    let bad = StorageConfig::default().with_overrides(|key| {
        (key == constants::CHUNK_SIZE_ENV).then(|| "lots".to_string())
    });
    assert!(bad.is_err());
}

#[tokio::test]
async fn test_storage_config_load_file() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("storage.json");
    std::fs::write(&path, r#"{ "local_dir": "mine", "chunk_size": 32 }"#).expect("write config");

    let config = StorageConfig::load(&path).await.unwrap();
    assert_eq!(config.local_dir, "mine");
    assert_eq!(config.chunk_size, 32);
}

#[tokio::test]
async fn test_storage_config_load_missing_file_gives_defaults() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = StorageConfig::load(&temp_dir.path().join("absent.json")).await.unwrap();
    assert_eq!(config.local_dir, constants::LOCAL_DIR_NAME);
}

#[tokio::test]
async fn test_storage_config_load_unknown_format() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("storage.ini");
    std::fs::write(&path, "chunk_size = 1").expect("write config");

    let err = StorageConfig::load(&path).await.unwrap_err();
    assert!(matches!(err, StorageSystemError::UnsupportedConfigFormat(_)));
}
