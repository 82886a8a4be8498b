/// Application name
pub const APP_NAME: &str = "folio";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default directory, relative to the working directory, holding all storage locations
pub const DEFAULT_BASE_DIR_NAME: &str = ".folio";

/// Folder name of the local storage location
pub const LOCAL_DIR_NAME: &str = "local";

/// Folder name of the roaming storage location
pub const ROAMING_DIR_NAME: &str = "roaming";

/// Folder name of the temporary storage location
pub const TEMPORARY_DIR_NAME: &str = "temp";

/// Default block size, in bytes, for copying byte streams into files
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Environment variable overriding the storage base directory
pub const STORAGE_DIR_ENV: &str = "FOLIO_STORAGE_DIR";

/// Environment variable overriding the copy chunk size
pub const CHUNK_SIZE_ENV: &str = "FOLIO_CHUNK_SIZE";

/// File, inside a storage root, where settings are persisted
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
