pub mod constants;
pub mod error;
pub mod settings;
pub mod storage;

pub use error::{Error, Result};
pub use settings::{EnumSetting, EnumSource, NamedEnum, Setting, SettingsStore};
pub use storage::{
    FileHandle, FolderHandle, LogicalPath, PathKind, PixelBuffer, StorageBackend, StorageConfig, StorageLocation,
    StorageService, StorageSystemError,
};
