use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::codec;
use super::error::{DecodeError, EncodingError};
use super::predicate::{Field, Predicate, PredicateKind};
use super::preset::{Expansion, PresetId, ACTION_POINT};
use super::query::SearchQuery;

pub const SORT_KEYS: [&str; 5] = [
    "name_asc",
    "name_desc",
    "number_asc",
    "release_desc",
    "price_desc",
];
pub const DEFAULT_SORT: &str = "number_asc";
pub const DEFAULT_PAGE_SIZE: u32 = 60;

/// Full query state: text query, sort, paging and an ordered predicate list.
///
/// Predicate order is kept for display; it does not change what a query
/// means (see [`FilterSet::is_query_equivalent`]). Presets applied through
/// [`FilterSet::apply_preset`] are recorded per field so they can be
/// expanded for the server without guessing from the member values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    #[serde(default)]
    query: String,
    #[serde(default = "default_sort")]
    sort: String,
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default)]
    predicates: Vec<Predicate>,
    #[serde(default)]
    applied_presets: BTreeMap<Field, PresetId>,
}

fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}

fn first_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for FilterSet {
    /// The stock search: basic prints, no Action Point cards, base rarities.
    fn default() -> Self {
        let mut set = FilterSet::empty();
        set.apply_preset(PresetId::BasicPrints, true);
        set.set_singleton(Field::CardType, ACTION_POINT);
        set.apply_preset(PresetId::BaseRarities, true);
        set
    }
}

impl FilterSet {
    /// A filter set with no predicates and default sort/paging.
    pub fn empty() -> Self {
        FilterSet {
            query: String::new(),
            sort: default_sort(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            predicates: Vec::new(),
            applied_presets: BTreeMap::new(),
        }
    }

    /// Build from a raw predicate list, reconstructing presets by exact member match.
    pub fn from_predicates(predicates: Vec<Predicate>) -> Self {
        let mut set = FilterSet::empty();
        set.predicates = predicates;
        set.adopt_detected_presets();
        set
    }

    pub fn from_share_token(token: &str) -> Result<Self, DecodeError> {
        Ok(FilterSet::from_predicates(codec::from_share_token(token)?))
    }

    pub fn share_token(&self) -> Result<String, EncodingError> {
        codec::share_token(&self.predicates)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> &str {
        &self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn predicates_for(&self, field: Field) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter().filter(move |p| p.is_field(field))
    }

    pub fn has(&self, field: Field, value: &str) -> bool {
        self.predicates.iter().any(|p| p.matches(field, value))
    }

    pub fn applied_preset(&self, field: Field) -> Option<PresetId> {
        self.applied_presets.get(&field).copied()
    }

    pub fn applied_presets(&self) -> impl Iterator<Item = PresetId> + '_ {
        self.applied_presets.values().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty() && self.query.is_empty()
    }

    // ========================================================================
    // Query / sort / paging
    // ========================================================================

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: impl Into<String>) {
        self.sort = sort.into();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Clamp paging values that arrived from storage or the wire.
    pub fn normalize(&mut self) {
        self.page = self.page.max(1);
        self.page_size = self.page_size.max(1);
        if self.sort.is_empty() {
            self.sort = default_sort();
        }
    }

    // ========================================================================
    // Predicate operations
    // ========================================================================

    /// Replace the single active value for `field`.
    ///
    /// Every predicate on the field is removed first. The exclusion field is
    /// the one exception: it also works as a group, so its OR members stay.
    /// An empty value only removes.
    pub fn set_singleton(&mut self, field: Field, value: &str) {
        self.set_singleton_with_label(field, value, value);
    }

    pub fn set_singleton_with_label(&mut self, field: Field, value: &str, label: &str) {
        let keep_members = field == Field::EXCLUSION;
        self.predicates.retain(|p| {
            !p.is_field(field) || (keep_members && p.kind == PredicateKind::Or)
        });
        let value = value.trim();
        if !value.is_empty() {
            self.predicates.push(
                Predicate::new(field.singleton_kind(), field.as_str(), value).with_label(label),
            );
        }
        self.page = 1;
    }

    /// Add or remove one OR member of a group field.
    ///
    /// Manual toggles detach the field from any applied preset.
    pub fn toggle_group_member(&mut self, field: Field, value: &str, present: bool) {
        self.applied_presets.remove(&field);
        self.toggle_member(field, value, present);
    }

    fn toggle_member(&mut self, field: Field, value: &str, present: bool) {
        if present {
            let exists = self
                .predicates
                .iter()
                .any(|p| p.kind == PredicateKind::Or && p.matches(field, value));
            if !exists {
                self.predicates.push(Predicate::or(field, value));
            }
        } else {
            self.predicates.retain(|p| !p.matches(field, value));
        }
        self.page = 1;
    }

    /// Enable or disable a preset.
    ///
    /// Enabling adds every member and drops every other OR value on the field,
    /// so the outcome does not depend on prior state. Disabling clears the field.
    pub fn apply_preset(&mut self, preset: PresetId, enabled: bool) {
        let field = preset.field();
        if enabled {
            for member in preset.members() {
                self.toggle_member(field, member, true);
            }
            let strays: Vec<String> = self
                .predicates
                .iter()
                .filter(|p| {
                    p.kind == PredicateKind::Or && p.is_field(field) && !preset.is_member(&p.value)
                })
                .map(|p| p.value.clone())
                .collect();
            for value in strays {
                self.toggle_member(field, &value, false);
            }
            self.applied_presets.insert(field, preset);
        } else {
            self.remove_field(field);
        }
        self.page = 1;
    }

    /// Remove every predicate for `(field, value)` regardless of kind.
    pub fn remove(&mut self, field: Field, value: &str) {
        let before = self.predicates.len();
        self.predicates.retain(|p| !p.matches(field, value));
        if self.predicates.len() != before {
            self.applied_presets.remove(&field);
            self.page = 1;
        }
    }

    pub fn remove_field(&mut self, field: Field) {
        self.predicates.retain(|p| !p.is_field(field));
        self.applied_presets.remove(&field);
        self.page = 1;
    }

    pub fn clear_predicates(&mut self) {
        self.predicates.clear();
        self.applied_presets.clear();
        self.page = 1;
    }

    // ========================================================================
    // Preset detection
    // ========================================================================

    /// The preset whose member set exactly equals the OR values on `field`.
    pub fn detect_preset(&self, field: Field) -> Option<PresetId> {
        let values: HashSet<&str> = self
            .predicates
            .iter()
            .filter(|p| p.kind == PredicateKind::Or && p.is_field(field))
            .map(|p| p.value.as_str())
            .collect();
        if values.is_empty() {
            return None;
        }
        PresetId::ALL.iter().copied().find(|preset| {
            preset.field() == field
                && preset.members().len() == values.len()
                && preset.members().iter().all(|member| values.contains(member))
        })
    }

    /// Record presets for fields whose OR members match one exactly.
    pub(crate) fn adopt_detected_presets(&mut self) {
        for preset in PresetId::ALL {
            let field = preset.field();
            if self.applied_presets.contains_key(&field) {
                continue;
            }
            if let Some(found) = self.detect_preset(field) {
                self.applied_presets.insert(field, found);
            }
        }
    }

    // ========================================================================
    // Query semantics
    // ========================================================================

    /// Same query, sort, paging and predicate multiset.
    pub fn is_query_equivalent(&self, other: &FilterSet) -> bool {
        if self.query != other.query
            || self.sort != other.sort
            || self.page != other.page
            || self.page_size != other.page_size
        {
            return false;
        }
        let mut mine: Vec<_> = self.predicates.iter().map(Predicate::sort_key).collect();
        let mut theirs: Vec<_> = other.predicates.iter().map(Predicate::sort_key).collect();
        mine.sort();
        theirs.sort();
        mine == theirs
    }

    /// Flatten into the server's shape: exclusion presets become NOT lists.
    pub fn materialize_for_query(&self) -> Result<SearchQuery, EncodingError> {
        let mut filters: Vec<Predicate> = Vec::with_capacity(self.predicates.len());
        let mut expanded: HashSet<Field> = HashSet::new();

        for predicate in &self.predicates {
            let preset = predicate
                .known_field()
                .and_then(|field| self.applied_presets.get(&field).copied())
                .filter(|preset| preset.expansion() == Expansion::Exclusion);

            match preset {
                Some(preset) if predicate.kind == PredicateKind::Or => {
                    if expanded.insert(preset.field()) {
                        for value in preset.excluded_values() {
                            let not = Predicate::not(preset.field(), value);
                            if !filters.contains(&not) {
                                filters.push(not);
                            }
                        }
                    }
                }
                _ => {
                    if !filters.contains(predicate) {
                        filters.push(predicate.clone());
                    }
                }
            }
        }

        let filter_token = codec::encode_all(&filters)?;
        Ok(SearchQuery {
            query: self.query.trim().to_string(),
            sort: self.sort.clone(),
            page: self.page,
            page_size: self.page_size,
            filters,
            filter_token,
        })
    }
}
