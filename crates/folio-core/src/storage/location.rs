use std::fmt;
use std::str::FromStr;

use crate::storage::error::StorageSystemError;

/// The application data areas a storage root can be opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageLocation {
    /// Data kept on this machine.
    #[default]
    Local,
    /// Data meant to follow the user between machines. Folio does not sync
    /// it; it is only kept apart from local data.
    Roaming,
    /// Scratch data that may be discarded at any time.
    Temporary,
}

impl StorageLocation {
    pub const ALL: [StorageLocation; 3] = [StorageLocation::Local, StorageLocation::Roaming, StorageLocation::Temporary];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageLocation::Local => "local",
            StorageLocation::Roaming => "roaming",
            StorageLocation::Temporary => "temporary",
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageLocation {
    type Err = StorageSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StorageLocation::ALL
            .into_iter()
            .find(|location| location.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StorageSystemError::InvalidPath {
                path: s.to_string(),
                reason: "unknown storage location".to_string(),
            })
    }
}
