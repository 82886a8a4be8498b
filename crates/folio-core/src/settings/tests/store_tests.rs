use std::sync::Arc;

#[cfg(feature = "toml-config")]
use tempfile::tempdir;

use crate::settings::error::SettingsError;
use crate::settings::named_enum::{EnumSetting, EnumSource};
use crate::settings::store::{Setting, SettingsStore};
use crate::storage::config::ConfigFormat;
use crate::storage::memory::InMemoryBackend;
use crate::storage::service::StorageService;

use super::Flavor;

const SAMPLE_TOGGLE: Setting<bool> = Setting::new("sample_toggle", false);
const SAMPLE_COUNT: Setting<u32> = Setting::new("sample_count", 3);
const SAMPLE_FLAVOR: EnumSetting<Flavor> = EnumSetting::new("sample_flavor", Flavor::Vanilla);

#[tokio::test]
async fn test_missing_file_loads_empty() {
    let storage = StorageService::in_memory();
    let store = SettingsStore::open(storage).await.unwrap();

    assert!(store.keys().is_empty());
    assert!(!SAMPLE_TOGGLE.get(&store));
    assert_eq!(SAMPLE_COUNT.get(&store), 3);
    assert_eq!(SAMPLE_FLAVOR.get(&store), Flavor::Vanilla);
}

#[tokio::test]
async fn test_set_save_and_reload() {
    let storage = StorageService::in_memory();
    let store = SettingsStore::open(storage.clone()).await.unwrap();

    SAMPLE_TOGGLE.set(&store, true).unwrap();
    SAMPLE_COUNT.set(&store, 9).unwrap();
    SAMPLE_FLAVOR.set(&store, Flavor::Strawberry).unwrap();
    store.save().await.unwrap();

    let reopened = SettingsStore::open(storage.clone()).await.unwrap();
    assert!(SAMPLE_TOGGLE.get(&reopened));
    assert_eq!(SAMPLE_COUNT.get(&reopened), 9);
    assert_eq!(SAMPLE_FLAVOR.get(&reopened), Flavor::Strawberry);

    let raw = storage.read_text("settings.json").await.unwrap().expect("file saved");
    assert!(raw.contains("\"Strawberry\""), "enums are stored by name: {}", raw);
}

#[tokio::test]
async fn test_reset_restores_default() {
    let store = SettingsStore::open(StorageService::in_memory()).await.unwrap();

    SAMPLE_COUNT.set(&store, 42).unwrap();
    SAMPLE_COUNT.reset(&store);
    assert_eq!(SAMPLE_COUNT.get(&store), 3);
    assert!(!store.contains_key(SAMPLE_COUNT.key()));

    SAMPLE_FLAVOR.set(&store, Flavor::Chocolate).unwrap();
    SAMPLE_FLAVOR.reset(&store);
    assert_eq!(SAMPLE_FLAVOR.get(&store), SAMPLE_FLAVOR.default_value());
}

#[tokio::test]
async fn test_unknown_enum_name_falls_back_to_default() {
    let storage = StorageService::in_memory();
    storage
        .write_text("settings.json", r#"{ "sample_flavor": "Pistachio", "sample_count": "many" }"#)
        .await
        .unwrap();

    let store = SettingsStore::open(storage).await.unwrap();
    assert_eq!(SAMPLE_FLAVOR.get(&store), Flavor::Vanilla);
    assert_eq!(SAMPLE_COUNT.get(&store), 3, "wrong type falls back to the default");
}

#[tokio::test]
async fn test_set_by_name() {
    let store = SettingsStore::open(StorageService::in_memory()).await.unwrap();

    assert_eq!(SAMPLE_FLAVOR.set_by_name(&store, "Chocolate").unwrap(), Flavor::Chocolate);
    assert_eq!(SAMPLE_FLAVOR.get(&store), Flavor::Chocolate);

    let err = SAMPLE_FLAVOR.set_by_name(&store, "Mint").unwrap_err();
    assert!(matches!(err, SettingsError::UnknownVariant { .. }));
    assert_eq!(SAMPLE_FLAVOR.get(&store), Flavor::Chocolate);
}

#[tokio::test]
async fn test_enum_source_round_trip_through_store() {
    let store = SettingsStore::open(StorageService::in_memory()).await.unwrap();
    SAMPLE_FLAVOR.set(&store, Flavor::Strawberry).unwrap();

    let mut source = EnumSource::<Flavor>::default();
    source.select_item(SAMPLE_FLAVOR.get(&store));
    assert_eq!(source.selected_item(), Flavor::Strawberry);

    source.select_item(Flavor::Chocolate);
    SAMPLE_FLAVOR.set(&store, source.selected_item()).unwrap();
    assert_eq!(SAMPLE_FLAVOR.get(&store), Flavor::Chocolate);
}

#[tokio::test]
async fn test_save_into_missing_folder_fails() {
    let store = SettingsStore::new(StorageService::in_memory(), "config/settings.json").unwrap();
    SAMPLE_TOGGLE.set(&store, true).unwrap();

    let err = store.save().await.unwrap_err();
    assert!(matches!(err, SettingsError::NotWritten(_)));
}

#[tokio::test]
async fn test_format_follows_file_extension() {
    let storage = StorageService::in_memory();
    let store = SettingsStore::new(storage.clone(), "prefs.yaml").unwrap();
    assert_eq!(store.file().to_string(), "prefs.yaml");
    #[cfg(feature = "yaml-config")]
    assert_eq!(store.format(), ConfigFormat::Yaml);

    let fallback = SettingsStore::new(storage, "prefs.conf").unwrap();
    assert_eq!(fallback.format(), ConfigFormat::Json);
    assert_eq!(fallback.with_format(ConfigFormat::Json).format(), ConfigFormat::Json);
}

#[cfg(feature = "toml-config")]
#[tokio::test]
async fn test_toml_settings_on_disk() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let storage = StorageService::local(temp_dir.path());

    let store = SettingsStore::load(storage.clone(), "settings.toml").await.unwrap();
    assert_eq!(store.format(), ConfigFormat::Toml);
    SAMPLE_TOGGLE.set(&store, true).unwrap();
    SAMPLE_FLAVOR.set(&store, Flavor::Chocolate).unwrap();
    store.save().await.unwrap();

    let text = std::fs::read_to_string(temp_dir.path().join("settings.toml")).expect("read settings");
    assert!(text.contains("sample_flavor = \"Chocolate\""), "{}", text);

    let reloaded = SettingsStore::load(storage, "settings.toml").await.unwrap();
    assert!(SAMPLE_TOGGLE.get(&reloaded));
}

#[tokio::test]
async fn test_blank_file_loads_empty() {
    let storage = StorageService::in_memory();
    storage.write_text("settings.json", "  \n").await.unwrap();

    let store = SettingsStore::open(storage).await.unwrap();
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_malformed_file_is_an_error() {
    let storage = StorageService::in_memory();
    storage.write_text("settings.json", "{ nope").await.unwrap();

    let err = SettingsStore::open(storage).await.unwrap_err();
    assert!(matches!(err, SettingsError::Storage { .. }));
}

#[tokio::test]
async fn test_store_shared_between_tasks() {
    let store = Arc::new(SettingsStore::open(StorageService::new(Arc::new(InMemoryBackend::new()))).await.unwrap());

    let tasks: Vec<_> = (0..4u32)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.set(&format!("key_{}", i), i).unwrap();
                store.save().await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.keys().len(), 4);
    assert_eq!(store.get::<u32>("key_2"), Some(2));
}
