use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::StoreError;
use super::state::{DeckEditor, StoreState};
use crate::filter::{FilterSet, DEFAULT_SORT, SORT_KEYS};
use crate::model::{CardList, SessionIdentity};

pub const SCHEMA_VERSION: u64 = 2;

/// Sort keys written by version 1 clients and their replacements.
const LEGACY_SORTS: [(&str, &str); 4] = [
    ("name", "name_asc"),
    ("newest", "release_desc"),
    ("number", "number_asc"),
    ("price", "price_desc"),
];

/// The allow-listed part of the store that survives restarts.
///
/// The deck editor is left out on purpose: an in-progress deck lives only in
/// memory. `preferences` never carries the text query or page; those live in
/// [`SearchSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(default = "legacy_version")]
    pub version: u64,
    #[serde(default)]
    pub identity: SessionIdentity,
    #[serde(default)]
    pub preferences: FilterSet,
    #[serde(default)]
    pub hand: CardList,
    #[serde(default)]
    pub print_list: CardList,
    #[serde(default)]
    pub deck_ids: Vec<i64>,
}

fn legacy_version() -> u64 {
    1
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        PersistedSnapshot::capture(&StoreState::default())
    }
}

impl PersistedSnapshot {
    pub fn capture(state: &StoreState) -> Self {
        let mut preferences = state.filters.clone();
        preferences.set_query("");
        PersistedSnapshot {
            version: SCHEMA_VERSION,
            identity: state.identity.clone(),
            preferences,
            hand: state.hand.clone(),
            print_list: state.print_list.clone(),
            deck_ids: state.deck_ids.clone(),
        }
    }

    /// Rebuild store state, layering the session blob over the preferences.
    pub fn into_state(self, session: Option<SearchSession>) -> StoreState {
        let mut filters = self.preferences;
        if let Some(session) = session {
            filters.set_query(session.query);
            filters.set_page(session.page);
        }
        StoreState {
            identity: self.identity,
            filters,
            hand: self.hand,
            print_list: self.print_list,
            deck_ids: self.deck_ids,
            deck_editor: DeckEditor::default(),
        }
    }
}

/// Session-lifetime slice: what the user typed and which page they were on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSession {
    #[serde(default)]
    pub query: String,
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

impl SearchSession {
    pub fn capture(filters: &FilterSet) -> Self {
        SearchSession {
            query: filters.query().to_string(),
            page: filters.page(),
        }
    }
}

fn current_sort(legacy: &str) -> Option<&'static str> {
    LEGACY_SORTS
        .iter()
        .find(|(old, _)| *old == legacy)
        .map(|(_, new)| *new)
}

/// Parse a stored snapshot, upgrading older schemas first.
///
/// Version 1 (or unversioned) snapshots get their legacy sort key rewritten
/// and their presets reconstructed from the predicate list. Snapshots from a
/// newer schema are refused.
pub fn migrate(raw: &str) -> Result<PersistedSnapshot, StoreError> {
    let mut value: Value = serde_json::from_str(raw)?;
    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .unwrap_or_else(legacy_version);
    if version > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }

    if version < SCHEMA_VERSION {
        if let Some(sort) = value.pointer_mut("/preferences/sort") {
            if let Some(replacement) = sort.as_str().and_then(current_sort) {
                debug!("migrating legacy sort key to {}", replacement);
                *sort = Value::from(replacement);
            }
        }
    }

    let mut snapshot: PersistedSnapshot = serde_json::from_value(value)?;
    if version < SCHEMA_VERSION {
        snapshot.preferences.adopt_detected_presets();
    }
    if !SORT_KEYS.contains(&snapshot.preferences.sort()) {
        warn!(
            "unknown stored sort key {:?}, using {}",
            snapshot.preferences.sort(),
            DEFAULT_SORT
        );
        snapshot.preferences.set_sort(DEFAULT_SORT);
    }
    snapshot.preferences.normalize();
    snapshot.version = SCHEMA_VERSION;
    Ok(snapshot)
}
