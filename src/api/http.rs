//! reqwest adapter for the remote REST API.
//!
//! One client with a cookie store carries the session cookie, so every
//! request after login is credentialed.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;
use super::port::{AccountApi, DeckValidator};
use super::types::{
    AccountPreferences, Credentials, Registration, ValidationRequest, ValidationVerdict,
};
use crate::config::ClientConfig;
use crate::model::{CardList, CardRef, Deck, DeckSummary, SessionIdentity};

const ME: &str = "/api/auth/me";
const LOGIN: &str = "/api/auth/login";
const REGISTER: &str = "/api/auth/register";
const LOGOUT: &str = "/api/auth/logout";
const PREFERENCES: &str = "/api/users/me/preferences";
const HAND: &str = "/api/users/me/hand";
const DECKS: &str = "/api/user/decks";
const VALIDATE: &str = "/api/decks/validate";

#[derive(Serialize)]
struct BatchCards<'a> {
    cards: &'a [CardRef],
}

#[derive(Clone)]
pub struct HttpAccountApi {
    client: Client,
    config: ClientConfig,
}

impl HttpAccountApi {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;
        Ok(HttpAccountApi { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.config.endpoint(path))
    }

    /// Send and map non-success statuses onto [`ApiError`].
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} -> {}", path, status);
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_string())),
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path), path).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(method, path).json(body), path)
            .await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AccountApi for HttpAccountApi {
    async fn me(&self) -> Result<Option<SessionIdentity>, ApiError> {
        match self.get_json(ME).await {
            Ok(identity) => Ok(Some(identity)),
            Err(ApiError::Unauthorized) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionIdentity, ApiError> {
        self.send_json(Method::POST, LOGIN, credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<SessionIdentity, ApiError> {
        self.send_json(Method::POST, REGISTER, registration).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, LOGOUT), LOGOUT).await?;
        Ok(())
    }

    async fn preferences(&self) -> Result<Option<AccountPreferences>, ApiError> {
        match self.get_json(PREFERENCES).await {
            Ok(preferences) => Ok(Some(preferences)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn save_preferences(&self, preferences: &AccountPreferences) -> Result<(), ApiError> {
        self.send(
            self.request(Method::PUT, PREFERENCES).json(preferences),
            PREFERENCES,
        )
        .await?;
        Ok(())
    }

    async fn hand(&self) -> Result<CardList, ApiError> {
        self.get_json(HAND).await
    }

    async fn list_decks(&self) -> Result<Vec<DeckSummary>, ApiError> {
        self.get_json(DECKS).await
    }

    async fn create_deck(&self, deck: &Deck) -> Result<Deck, ApiError> {
        self.send_json(Method::POST, DECKS, deck).await
    }

    async fn get_deck(&self, id: i64) -> Result<Deck, ApiError> {
        self.get_json(&format!("{}/{}", DECKS, id)).await
    }

    async fn save_deck(&self, id: i64, deck: &Deck) -> Result<Deck, ApiError> {
        let path = format!("{}/{}", DECKS, id);
        self.send_json(Method::PUT, &path, deck).await
    }

    async fn add_deck_cards(&self, id: i64, cards: &[CardRef]) -> Result<Deck, ApiError> {
        let path = format!("{}/{}/cards/batch", DECKS, id);
        self.send_json(Method::POST, &path, &BatchCards { cards }).await
    }
}

#[async_trait]
impl DeckValidator for HttpAccountApi {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationVerdict, ApiError> {
        self.send_json(Method::POST, VALIDATE, request).await
    }
}
