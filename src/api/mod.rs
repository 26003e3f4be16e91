//! Remote REST API: ports, wire types and adapters.
//!
//! ```text
//!   SessionReconciler / DeckAutoSave ──► AccountApi ──┬── HttpAccountApi     (reqwest, feature "http")
//!   DeckValidationClient ──────────────► DeckValidator ┴── InMemoryAccountApi (scripted, tests)
//! ```

mod error;
#[cfg(feature = "http")]
mod http;
mod in_memory;
mod port;
mod types;

pub use error::ApiError;
#[cfg(feature = "http")]
pub use http::HttpAccountApi;
pub use in_memory::{Endpoint, InMemoryAccountApi};
pub use port::{AccountApi, DeckValidator};
pub use types::{
    AccountPreferences, Credentials, Registration, ValidationRequest, ValidationVerdict,
};
