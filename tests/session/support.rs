//! Shared fixtures: an account backend with one known user and a store
//! wired to shared in-memory storage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cardbase_session::api::{AccountPreferences, Credentials};
use cardbase_session::storage::StorageError;
use cardbase_session::{
    Action, CardList, CardRef, ClientConfig, InMemoryAccountApi, InMemoryStorage,
    PersistencePort, PreferencesStore, SessionIdentity,
};

pub const USER_ID: i64 = 7;

/// Route the crate's `log` output through the test harness.
/// Set `RUST_LOG=debug` to see the reconciler's fetch fallbacks.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn credentials() -> Credentials {
    Credentials::new("ria", "hunter2")
}

/// Backend with user 7, a stored hand of `[{9, 5}]`, two decks and
/// account preferences of `price_desc` / 24.
pub fn account_backend() -> Arc<InMemoryAccountApi> {
    let api = InMemoryAccountApi::new();
    api.add_user(SessionIdentity::user(USER_ID, "ria"), "hunter2");
    api.set_hand(USER_ID, CardList::from(vec![CardRef::new(9, 5)]));
    api.set_preferences(
        USER_ID,
        AccountPreferences {
            sort: Some("price_desc".into()),
            page_size: Some(24),
        },
    );
    api.add_deck(USER_ID, cardbase_session::Deck::new("Red Aggro", "ua"));
    api.add_deck(USER_ID, cardbase_session::Deck::new("Blue Control", "ua"));
    Arc::new(api)
}

pub struct Storage {
    pub durable: InMemoryStorage,
    pub session: InMemoryStorage,
}

impl Storage {
    pub fn new() -> Self {
        Storage {
            durable: InMemoryStorage::new(),
            session: InMemoryStorage::new(),
        }
    }

    /// A fresh store over the same storage, as after a page reload.
    pub fn open(&self) -> PreferencesStore {
        PreferencesStore::open(
            self.durable.clone(),
            self.session.clone(),
            &ClientConfig::default(),
        )
    }
}

pub fn add_to_hand(store: &mut PreferencesStore, card_id: i64, quantity: u32) {
    store
        .dispatch(Action::AddToHand { card_id, quantity })
        .unwrap();
}

pub fn add_to_print_list(store: &mut PreferencesStore, card_id: i64, quantity: u32) {
    store
        .dispatch(Action::AddToPrintList { card_id, quantity })
        .unwrap();
}

/// In-memory storage whose writes can be switched off to simulate a full disk.
#[derive(Clone, Default)]
pub struct FlakyStorage {
    inner: InMemoryStorage,
    failing: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl PersistencePort for FlakyStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io("quota exceeded".into()));
        }
        self.inner.save(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.remove(key)
    }
}
