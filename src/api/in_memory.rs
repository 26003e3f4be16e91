use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::error::ApiError;
use super::port::{AccountApi, DeckValidator};
use super::types::{
    AccountPreferences, Credentials, Registration, ValidationRequest, ValidationVerdict,
};
use crate::model::{CardList, CardRef, Deck, DeckSummary, SessionIdentity};

/// Which remote call was made; used for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Me,
    Login,
    Register,
    Logout,
    Preferences,
    SavePreferences,
    Hand,
    ListDecks,
    CreateDeck,
    GetDeck,
    SaveDeck,
    AddDeckCards,
    Validate,
}

struct Account {
    identity: SessionIdentity,
    password: String,
}

struct StoredDeck {
    owner: i64,
    deck: Deck,
}

#[derive(Default)]
struct Backend {
    accounts: BTreeMap<String, Account>,
    session: Option<i64>,
    preferences: HashMap<i64, AccountPreferences>,
    hands: HashMap<i64, CardList>,
    decks: BTreeMap<i64, StoredDeck>,
    next_deck_id: i64,
    failures: HashMap<Endpoint, ApiError>,
    calls: HashMap<Endpoint, usize>,
    save_delay: Option<Duration>,
    validation_delays: VecDeque<Duration>,
    min_deck_size: u64,
    validation_requests: Vec<ValidationRequest>,
    saved_decks: Vec<Deck>,
}

/// In-process stand-in for the remote API, for tests and offline use.
///
/// Clones share the same backend, so a test can keep a handle for
/// assertions while the code under test owns another.
#[derive(Clone, Default)]
pub struct InMemoryAccountApi {
    backend: Arc<Mutex<Backend>>,
}

impl InMemoryAccountApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Backend>, ApiError> {
        self.backend
            .lock()
            .map_err(|_| ApiError::Transport("in-memory backend lock poisoned".into()))
    }

    /// Count the call and return an injected failure, if any.
    fn begin(&self, endpoint: Endpoint) -> Result<MutexGuard<'_, Backend>, ApiError> {
        let mut backend = self.lock()?;
        *backend.calls.entry(endpoint).or_insert(0) += 1;
        if let Some(err) = backend.failures.get(&endpoint) {
            return Err(err.clone());
        }
        Ok(backend)
    }

    fn with_backend(&self, f: impl FnOnce(&mut Backend)) {
        if let Ok(mut backend) = self.backend.lock() {
            f(&mut backend);
        }
    }

    // ========================================================================
    // Scripting
    // ========================================================================

    pub fn add_user(&self, identity: SessionIdentity, password: &str) {
        self.with_backend(|backend| {
            backend.accounts.insert(
                identity.username.clone(),
                Account {
                    identity,
                    password: password.to_string(),
                },
            );
        });
    }

    /// Pretend a session cookie for `user_id` already exists.
    pub fn sign_in_as(&self, user_id: i64) {
        self.with_backend(|backend| backend.session = Some(user_id));
    }

    pub fn set_preferences(&self, user_id: i64, preferences: AccountPreferences) {
        self.with_backend(|backend| {
            backend.preferences.insert(user_id, preferences);
        });
    }

    pub fn set_hand(&self, user_id: i64, hand: CardList) {
        self.with_backend(|backend| {
            backend.hands.insert(user_id, hand);
        });
    }

    /// Store a deck for `owner` and return its id.
    pub fn add_deck(&self, owner: i64, deck: Deck) -> i64 {
        let mut id = 0;
        self.with_backend(|backend| {
            id = backend.store_new_deck(owner, deck);
        });
        id
    }

    pub fn fail(&self, endpoint: Endpoint, err: ApiError) {
        self.with_backend(|backend| {
            backend.failures.insert(endpoint, err);
        });
    }

    pub fn clear_failure(&self, endpoint: Endpoint) {
        self.with_backend(|backend| {
            backend.failures.remove(&endpoint);
        });
    }

    /// Delay applied to every deck create/save before it completes.
    pub fn set_save_delay(&self, delay: Duration) {
        self.with_backend(|backend| backend.save_delay = Some(delay));
    }

    /// Queue a delay for the next validation call. Calls past the queue
    /// answer immediately.
    pub fn push_validation_delay(&self, delay: Duration) {
        self.with_backend(|backend| backend.validation_delays.push_back(delay));
    }

    /// Decks below this many cards are reported invalid.
    pub fn set_min_deck_size(&self, cards: u64) {
        self.with_backend(|backend| backend.min_deck_size = cards);
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.backend
            .lock()
            .map(|backend| backend.calls.get(&endpoint).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn current_user(&self) -> Option<i64> {
        self.backend.lock().ok().and_then(|backend| backend.session)
    }

    pub fn stored_preferences(&self, user_id: i64) -> Option<AccountPreferences> {
        self.backend
            .lock()
            .ok()
            .and_then(|backend| backend.preferences.get(&user_id).cloned())
    }

    pub fn stored_deck(&self, id: i64) -> Option<Deck> {
        self.backend
            .lock()
            .ok()
            .and_then(|backend| backend.decks.get(&id).map(|stored| stored.deck.clone()))
    }

    /// Every deck body received by create/save, in arrival order.
    pub fn saved_decks(&self) -> Vec<Deck> {
        self.backend
            .lock()
            .map(|backend| backend.saved_decks.clone())
            .unwrap_or_default()
    }

    pub fn validation_requests(&self) -> Vec<ValidationRequest> {
        self.backend
            .lock()
            .map(|backend| backend.validation_requests.clone())
            .unwrap_or_default()
    }
}

impl Backend {
    fn signed_in(&self) -> Result<i64, ApiError> {
        self.session.ok_or(ApiError::Unauthorized)
    }

    fn identity_of(&self, user_id: i64) -> Option<SessionIdentity> {
        self.accounts
            .values()
            .find(|account| account.identity.id == Some(user_id))
            .map(|account| account.identity.clone())
    }

    fn store_new_deck(&mut self, owner: i64, mut deck: Deck) -> i64 {
        self.next_deck_id += 1;
        let id = self.next_deck_id;
        deck.id = Some(id);
        self.decks.insert(id, StoredDeck { owner, deck });
        id
    }

    fn owned_deck(&mut self, owner: i64, id: i64) -> Result<&mut Deck, ApiError> {
        match self.decks.get_mut(&id) {
            Some(stored) if stored.owner == owner => Ok(&mut stored.deck),
            _ => Err(ApiError::NotFound(format!("/api/user/decks/{}", id))),
        }
    }
}

#[async_trait]
impl AccountApi for InMemoryAccountApi {
    async fn me(&self) -> Result<Option<SessionIdentity>, ApiError> {
        let backend = self.begin(Endpoint::Me)?;
        Ok(backend
            .session
            .and_then(|user_id| backend.identity_of(user_id)))
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionIdentity, ApiError> {
        let mut backend = self.begin(Endpoint::Login)?;
        let identity = match backend.accounts.get(&credentials.username) {
            Some(account) if account.password == credentials.password => {
                account.identity.clone()
            }
            _ => return Err(ApiError::Unauthorized),
        };
        backend.session = identity.id;
        Ok(identity)
    }

    async fn register(&self, registration: &Registration) -> Result<SessionIdentity, ApiError> {
        let mut backend = self.begin(Endpoint::Register)?;
        if backend.accounts.contains_key(&registration.username) {
            return Err(ApiError::Status {
                status: 409,
                message: format!("username {} is taken", registration.username),
            });
        }
        let id = backend
            .accounts
            .values()
            .filter_map(|account| account.identity.id)
            .max()
            .unwrap_or(0)
            + 1;
        let display_name = if registration.display_name.is_empty() {
            registration.username.clone()
        } else {
            registration.display_name.clone()
        };
        let identity = SessionIdentity {
            id: Some(id),
            username: registration.username.clone(),
            email: registration.email.clone(),
            role: "user".to_string(),
            display_name,
        };
        backend.accounts.insert(
            registration.username.clone(),
            Account {
                identity: identity.clone(),
                password: registration.password.clone(),
            },
        );
        backend.session = Some(id);
        Ok(identity)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let mut backend = self.begin(Endpoint::Logout)?;
        backend.session = None;
        Ok(())
    }

    async fn preferences(&self) -> Result<Option<AccountPreferences>, ApiError> {
        let backend = self.begin(Endpoint::Preferences)?;
        let user_id = backend.signed_in()?;
        Ok(backend.preferences.get(&user_id).cloned())
    }

    async fn save_preferences(&self, preferences: &AccountPreferences) -> Result<(), ApiError> {
        let mut backend = self.begin(Endpoint::SavePreferences)?;
        let user_id = backend.signed_in()?;
        backend.preferences.insert(user_id, preferences.clone());
        Ok(())
    }

    async fn hand(&self) -> Result<CardList, ApiError> {
        let backend = self.begin(Endpoint::Hand)?;
        let user_id = backend.signed_in()?;
        Ok(backend.hands.get(&user_id).cloned().unwrap_or_default())
    }

    async fn list_decks(&self) -> Result<Vec<DeckSummary>, ApiError> {
        let backend = self.begin(Endpoint::ListDecks)?;
        let user_id = backend.signed_in()?;
        Ok(backend
            .decks
            .values()
            .filter(|stored| stored.owner == user_id)
            .filter_map(|stored| stored.deck.summary())
            .collect())
    }

    async fn create_deck(&self, deck: &Deck) -> Result<Deck, ApiError> {
        let delay = {
            let backend = self.begin(Endpoint::CreateDeck)?;
            backend.signed_in()?;
            backend.save_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut backend = self.lock()?;
        let owner = backend.signed_in()?;
        backend.saved_decks.push(deck.clone());
        let id = backend.store_new_deck(owner, deck.clone());
        let stored = backend.owned_deck(owner, id)?;
        Ok(stored.clone())
    }

    async fn get_deck(&self, id: i64) -> Result<Deck, ApiError> {
        let mut backend = self.begin(Endpoint::GetDeck)?;
        let owner = backend.signed_in()?;
        Ok(backend.owned_deck(owner, id)?.clone())
    }

    async fn save_deck(&self, id: i64, deck: &Deck) -> Result<Deck, ApiError> {
        let delay = {
            let backend = self.begin(Endpoint::SaveDeck)?;
            backend.signed_in()?;
            backend.save_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut backend = self.lock()?;
        let owner = backend.signed_in()?;
        backend.saved_decks.push(deck.clone());
        let stored = backend.owned_deck(owner, id)?;
        *stored = deck.clone();
        stored.id = Some(id);
        Ok(stored.clone())
    }

    async fn add_deck_cards(&self, id: i64, cards: &[CardRef]) -> Result<Deck, ApiError> {
        let mut backend = self.begin(Endpoint::AddDeckCards)?;
        let owner = backend.signed_in()?;
        let deck = backend.owned_deck(owner, id)?;
        for card in cards {
            deck.cards.add(card.card_id, card.quantity);
        }
        Ok(deck.clone())
    }
}

#[async_trait]
impl DeckValidator for InMemoryAccountApi {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationVerdict, ApiError> {
        let (delay, min_deck_size) = {
            let mut backend = self.begin(Endpoint::Validate)?;
            backend.validation_requests.push(request.clone());
            (backend.validation_delays.pop_front(), backend.min_deck_size)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let total = request.cards.total_quantity();
        if total >= min_deck_size {
            Ok(ValidationVerdict::valid())
        } else {
            Ok(ValidationVerdict {
                valid: false,
                errors: vec![format!(
                    "Deck needs at least {} cards, has {}",
                    min_deck_size, total
                )],
            })
        }
    }
}
