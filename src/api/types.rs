use serde::{Deserialize, Serialize};

use crate::model::{CardList, Deck};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

/// Account-scoped search preferences. Missing values leave local ones alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Body of `POST /api/decks/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub game: String,
    pub cards: CardList,
}

impl From<&Deck> for ValidationRequest {
    fn from(deck: &Deck) -> Self {
        ValidationRequest {
            game: deck.game.clone(),
            cards: deck.cards.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ValidationVerdict {
    pub const EMPTY_DECK: &'static str = "Deck is empty";

    /// Fixed verdict for a deck with no cards; never sent to the validator.
    pub fn empty_deck() -> Self {
        ValidationVerdict {
            valid: false,
            errors: vec![Self::EMPTY_DECK.to_string()],
        }
    }

    pub fn valid() -> Self {
        ValidationVerdict {
            valid: true,
            errors: Vec::new(),
        }
    }
}
