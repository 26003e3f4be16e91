use std::sync::Arc;

use super::error::StorageError;

/// Key/value string storage that outlives the store object.
///
/// The durable adapter stands in for browser local storage; a second
/// instance with process lifetime stands in for session storage. One value
/// per key, latest write wins.
pub trait PersistencePort: Send + Sync {
    /// Read the value stored under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (or overwrite) the value stored under `key`.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Returns true if one existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

impl<P: PersistencePort + ?Sized> PersistencePort for Arc<P> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        (**self).remove(key)
    }
}
