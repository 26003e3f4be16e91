use serde::{Deserialize, Serialize};

use super::card::CardList;
use crate::filter::FilterSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Unlisted,
}

/// A deck owned by one account.
///
/// `id` is `None` until the server has stored the deck. `preferences` is the
/// deck's own default search, separate from the global one in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub game: String,
    #[serde(default)]
    pub cards: CardList,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default = "FilterSet::empty")]
    pub preferences: FilterSet,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
}

impl Deck {
    pub fn new(name: impl Into<String>, game: impl Into<String>) -> Self {
        Deck {
            id: None,
            name: name.into(),
            game: game.into(),
            cards: CardList::new(),
            visibility: Visibility::Private,
            preferences: FilterSet::empty(),
            created_at: None,
            modified_at: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_stored(&self) -> bool {
        self.id.is_some()
    }

    /// Listing row for a stored deck.
    pub fn summary(&self) -> Option<DeckSummary> {
        self.id.map(|id| DeckSummary {
            id,
            name: self.name.clone(),
            game: self.game.clone(),
            visibility: self.visibility,
            card_count: self.cards.total_quantity(),
            modified_at: self.modified_at.clone(),
        })
    }
}

/// Row returned by the deck listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub game: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub card_count: u64,
    #[serde(default)]
    pub modified_at: Option<String>,
}
