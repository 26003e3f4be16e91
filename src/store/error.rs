use std::fmt;

use crate::storage::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Storage(StorageError),
    Serde(String),
    /// Snapshot written by a newer schema than this build understands.
    UnsupportedVersion(u64),
    InvalidQuantity { card_id: i64, quantity: u32 },
    NoDeckOpen,
    /// A deck save is already running; the second attempt is refused.
    SaveInProgress,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Storage(err) => write!(f, "storage error: {}", err),
            StoreError::Serde(message) => write!(f, "serialization error: {}", message),
            StoreError::UnsupportedVersion(version) => {
                write!(f, "unsupported snapshot version {}", version)
            }
            StoreError::InvalidQuantity { card_id, quantity } => {
                write!(f, "invalid quantity {} for card {}", quantity, card_id)
            }
            StoreError::NoDeckOpen => write!(f, "no deck is open"),
            StoreError::SaveInProgress => write!(f, "a deck save is already in progress"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        StoreError::Storage(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}
