//! Storage ports for the persisted snapshot.
//!
//! ```text
//! PreferencesStore ──► PersistencePort ──┬── InMemoryStorage (tests, session lifetime)
//!                                        └── FileStorage     (durable, one JSON file per key)
//! ```

mod error;
mod file;
mod in_memory;
mod port;

pub use error::StorageError;
pub use file::FileStorage;
pub use in_memory::InMemoryStorage;
pub use port::PersistencePort;
