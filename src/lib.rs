//! Client-side session and query state for a card database and deck builder.
//!
//! ```text
//!   filter ──► store (PreferencesStore) ◄── session (SessionReconciler) ──► api
//!                    ▲                                                        ▲
//!                    └────── deck (DeckAutoSave, DeckValidationClient) ───────┘
//! ```

pub mod api;
pub mod config;
pub mod deck;
pub mod filter;
pub mod lifecycle;
pub mod model;
pub mod session;
pub mod storage;
pub mod store;

pub use api::{AccountApi, ApiError, DeckValidator, InMemoryAccountApi};
#[cfg(feature = "http")]
pub use api::HttpAccountApi;
pub use config::ClientConfig;
pub use deck::{DeckAutoSave, DeckValidationClient, ValidationState};
pub use filter::{Field, FilterSet, Predicate, PredicateKind, PresetId, SearchQuery};
pub use lifecycle::{LifecyclePort, NoopLifecycle, RecordingLifecycle};
pub use model::{CardList, CardRef, Deck, SessionIdentity};
pub use session::{Notice, ReconcilerState, SessionReconciler};
pub use storage::{FileStorage, InMemoryStorage, PersistencePort};
pub use store::{Action, PreferencesStore, StoreError, StoreEvent};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
