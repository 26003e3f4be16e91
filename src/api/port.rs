use async_trait::async_trait;

use super::error::ApiError;
use super::types::{
    AccountPreferences, Credentials, Registration, ValidationRequest, ValidationVerdict,
};
use crate::model::{CardList, CardRef, Deck, DeckSummary, SessionIdentity};

/// The account half of the remote REST API.
///
/// Expected absences are values, not errors: `me` returns `Ok(None)` for a
/// logged-out caller and `preferences` returns `Ok(None)` for an account that
/// has never saved any.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// `GET /api/auth/me`
    async fn me(&self) -> Result<Option<SessionIdentity>, ApiError>;

    /// `POST /api/auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<SessionIdentity, ApiError>;

    /// `POST /api/auth/register`
    async fn register(&self, registration: &Registration) -> Result<SessionIdentity, ApiError>;

    /// `POST /api/auth/logout`
    async fn logout(&self) -> Result<(), ApiError>;

    /// `GET /api/users/me/preferences`
    async fn preferences(&self) -> Result<Option<AccountPreferences>, ApiError>;

    /// `PUT /api/users/me/preferences`
    async fn save_preferences(&self, preferences: &AccountPreferences) -> Result<(), ApiError>;

    /// `GET /api/users/me/hand`
    async fn hand(&self) -> Result<CardList, ApiError>;

    /// `GET /api/user/decks`
    async fn list_decks(&self) -> Result<Vec<DeckSummary>, ApiError>;

    /// Ids of the caller's decks, in listing order.
    async fn deck_ids(&self) -> Result<Vec<i64>, ApiError> {
        Ok(self.list_decks().await?.into_iter().map(|d| d.id).collect())
    }

    /// `POST /api/user/decks`
    async fn create_deck(&self, deck: &Deck) -> Result<Deck, ApiError>;

    /// `GET /api/user/decks/{id}`
    async fn get_deck(&self, id: i64) -> Result<Deck, ApiError>;

    /// `PUT /api/user/decks/{id}`
    async fn save_deck(&self, id: i64, deck: &Deck) -> Result<Deck, ApiError>;

    /// `POST /api/user/decks/{id}/cards/batch`
    async fn add_deck_cards(&self, id: i64, cards: &[CardRef]) -> Result<Deck, ApiError>;
}

/// Remote deck legality check.
#[async_trait]
pub trait DeckValidator: Send + Sync {
    /// `POST /api/decks/validate`
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationVerdict, ApiError>;
}
