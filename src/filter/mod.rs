//! Filters: predicates, the token codec, presets and the `FilterSet` query state.
//!
//! ```
//! use cardbase_session::filter::{Field, FilterSet, PresetId};
//!
//! let mut filters = FilterSet::empty();
//! filters.set_singleton(Field::Series, "ST01");
//! filters.apply_preset(PresetId::BaseRarities, true);
//!
//! let query = filters.materialize_for_query().unwrap();
//! assert_eq!(query.filters.len(), 5);
//! ```

pub mod codec;
mod error;
mod predicate;
mod preset;
mod query;
mod set;

pub use error::{DecodeError, EncodingError, TokenPart};
pub use predicate::{Field, Predicate, PredicateKind};
pub use preset::{vocabulary, Expansion, PresetId, ACTION_POINT, PRINT_TYPES, RARITIES};
pub use query::SearchQuery;
pub use set::{FilterSet, DEFAULT_PAGE_SIZE, DEFAULT_SORT, SORT_KEYS};
