//! Preferences store: reducer, persisted snapshot and the store object.
//!
//! ```text
//!  Action ──► reduce(&mut StoreState) ──► persist ──► emit "<slice>.changed"
//!                                           │
//!                       ┌───────────────────┴───────────────────┐
//!                       ▼                                       ▼
//!          durable: PersistedSnapshot (v2)         session: SearchSession
//!          identity, filters, hand,                text query, page
//!          print list, deck ids
//! ```
//!
//! The deck editor slice is held in memory only.

mod error;
mod preferences;
mod snapshot;
mod state;

pub use error::StoreError;
pub use preferences::PreferencesStore;
pub use snapshot::{migrate, PersistedSnapshot, SearchSession, SCHEMA_VERSION};
pub use state::{reduce, Action, DeckEditor, SaveState, StoreEvent, StoreState};
