use std::fmt;
use std::sync::Arc;

use log::{debug, error, info, warn};

use super::error::SessionError;
use super::merge::AccountData;
use super::notice::Notice;
use crate::api::{AccountApi, AccountPreferences, ApiError, Credentials, Registration};
use crate::model::{CardList, SessionIdentity};
use crate::storage::PersistencePort;
use crate::store::{Action, PreferencesStore, StoreError};

/// Where the reconciler is in the identity lifecycle.
///
/// ```text
/// Uninitialized ──► Initializing ──┬──► Anonymous ◄──┐
///                                  │        │        │ logout
///                                  │        ▼ login  │
///                                  └──► Authenticated ┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    Uninitialized,
    Initializing,
    Anonymous,
    Authenticated { user_id: i64 },
}

impl fmt::Display for ReconcilerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcilerState::Uninitialized => write!(f, "uninitialized"),
            ReconcilerState::Initializing => write!(f, "initializing"),
            ReconcilerState::Anonymous => write!(f, "anonymous"),
            ReconcilerState::Authenticated { user_id } => write!(f, "authenticated({})", user_id),
        }
    }
}

/// Outcome of one identity transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub state: ReconcilerState,
    /// True for a login by a different identity than the last one processed;
    /// false for a same-identity restore such as a page refresh.
    pub new_login: bool,
    pub notices: Vec<Notice>,
}

/// Applies identity changes to a [`PreferencesStore`].
///
/// The store is passed into each call rather than owned, so the application
/// root stays its only owner.
pub struct SessionReconciler<A> {
    api: Arc<A>,
    state: ReconcilerState,
    last_identity: Option<i64>,
}

impl<A: AccountApi> SessionReconciler<A> {
    pub fn new(api: Arc<A>) -> Self {
        SessionReconciler {
            api,
            state: ReconcilerState::Uninitialized,
            last_identity: None,
        }
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Enter `Initializing`. No network calls.
    ///
    /// The identity held by the store (restored from the snapshot) becomes
    /// the last processed identity, so a refresh is not mistaken for a login.
    pub fn initialize<D, S>(&mut self, store: &PreferencesStore<D, S>)
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        self.last_identity = store.identity().id;
        self.transition(ReconcilerState::Initializing);
    }

    /// Check `/api/auth/me` on page load and settle into a stable state.
    ///
    /// Only a definite "no session" answer (`Ok(None)` or a 401) counts as
    /// signed out; if the store still held an authenticated identity, the
    /// logout reset is applied. Any other failure keeps the stored
    /// identity and its filters untouched.
    pub async fn restore_session<D, S>(
        &mut self,
        store: &mut PreferencesStore<D, S>,
    ) -> Result<Reconciliation, SessionError>
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        if self.state == ReconcilerState::Uninitialized {
            self.initialize(store);
        }

        let current = match self.api.me().await {
            Ok(identity) => identity,
            Err(err) if err.is_expected_absence() => {
                debug!("no session on restore: {}", err);
                None
            }
            Err(err) => {
                warn!("session check failed, keeping stored identity: {}", err);
                return Ok(self.settle_on_stored(store));
            }
        };

        match current {
            Some(identity) if identity.is_authenticated() => {
                self.authenticate(store, identity).await
            }
            _ => {
                let mut notices = Vec::new();
                if store.identity().is_authenticated() {
                    info!("stored session is no longer valid, resetting to anonymous");
                    notices.push(Notice::SignedOut);
                    let applied = apply(store, Action::SignOut);
                    self.last_identity = None;
                    self.transition(ReconcilerState::Anonymous);
                    applied?;
                    announce(store, &notices);
                } else {
                    self.last_identity = None;
                    self.transition(ReconcilerState::Anonymous);
                }
                Ok(Reconciliation {
                    state: self.state,
                    new_login: false,
                    notices,
                })
            }
        }
    }

    /// Settle on whatever identity the store already holds, without a reset.
    fn settle_on_stored<D, S>(&mut self, store: &PreferencesStore<D, S>) -> Reconciliation
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        let next = match store.identity().id {
            Some(user_id) => ReconcilerState::Authenticated { user_id },
            None => ReconcilerState::Anonymous,
        };
        self.last_identity = store.identity().id;
        self.transition(next);
        Reconciliation {
            state: self.state,
            new_login: false,
            notices: Vec::new(),
        }
    }

    pub async fn login<D, S>(
        &mut self,
        store: &mut PreferencesStore<D, S>,
        credentials: &Credentials,
    ) -> Result<Reconciliation, SessionError>
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        let identity = self.api.login(credentials).await?;
        self.authenticate(store, identity).await
    }

    pub async fn register<D, S>(
        &mut self,
        store: &mut PreferencesStore<D, S>,
        registration: &Registration,
    ) -> Result<Reconciliation, SessionError>
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        let identity = self.api.register(registration).await?;
        self.authenticate(store, identity).await
    }

    /// Shared path into `Authenticated`.
    ///
    /// The three account fetches run concurrently and all finish before the
    /// merge. Each failure degrades to an empty value on its own.
    pub async fn authenticate<D, S>(
        &mut self,
        store: &mut PreferencesStore<D, S>,
        identity: SessionIdentity,
    ) -> Result<Reconciliation, SessionError>
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        let user_id = match identity.id {
            Some(id) => id,
            None => return Err(SessionError::Api(ApiError::Unauthorized)),
        };
        let new_login = self.last_identity != Some(user_id);

        let (preferences, hand, deck_ids) = tokio::join!(
            self.api.preferences(),
            self.api.hand(),
            self.api.deck_ids()
        );
        let preferences = preferences.unwrap_or_else(|err| {
            log_fetch_failure("preferences", &err);
            None
        });
        let hand = hand.unwrap_or_else(|err| {
            log_fetch_failure("hand", &err);
            CardList::new()
        });
        let deck_ids = deck_ids.unwrap_or_else(|err| {
            log_fetch_failure("deck ids", &err);
            Vec::new()
        });

        let hand_items = store.hand().len();
        let print_items = store.print_list().len();
        let account_hand_items = hand.len();

        let applied = apply(
            store,
            Action::MergeAccount(AccountData {
                identity,
                preferences,
                hand,
                deck_ids,
            }),
        );
        self.last_identity = Some(user_id);
        self.transition(ReconcilerState::Authenticated { user_id });
        applied?;

        let mut notices = Vec::new();
        if new_login && (hand_items > 0 || print_items > 0) {
            notices.push(Notice::LocalCartsPreserved {
                hand_items,
                print_items,
                account_hand_items,
            });
        }
        announce(store, &notices);

        Ok(Reconciliation {
            state: self.state,
            new_login,
            notices,
        })
    }

    /// Sign out remotely, then reset local identity-scoped state.
    ///
    /// The local reset happens even if the remote call fails; carts survive
    /// either way.
    pub async fn logout<D, S>(
        &mut self,
        store: &mut PreferencesStore<D, S>,
    ) -> Result<Reconciliation, SessionError>
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        if let Err(err) = self.api.logout().await {
            warn!("remote logout failed, resetting locally anyway: {}", err);
        }

        let applied = apply(store, Action::SignOut);
        self.last_identity = None;
        self.transition(ReconcilerState::Anonymous);
        applied?;

        let notices = vec![Notice::SignedOut];
        announce(store, &notices);
        Ok(Reconciliation {
            state: self.state,
            new_login: false,
            notices,
        })
    }

    /// Save the current sort and page size to the account.
    ///
    /// Returns `Ok(false)` without a request when nobody is signed in.
    pub async fn push_preferences<D, S>(
        &self,
        store: &PreferencesStore<D, S>,
    ) -> Result<bool, SessionError>
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        if !matches!(self.state, ReconcilerState::Authenticated { .. }) {
            debug!("not signed in, skipping preference push");
            return Ok(false);
        }
        let preferences = AccountPreferences {
            sort: Some(store.filters().sort().to_string()),
            page_size: Some(store.filters().page_size()),
        };
        self.api.save_preferences(&preferences).await?;
        Ok(true)
    }

    fn transition(&mut self, next: ReconcilerState) {
        if self.state != next {
            info!("session {} -> {}", self.state, next);
        }
        self.state = next;
    }
}

fn log_fetch_failure(what: &str, err: &ApiError) {
    if err.is_expected_absence() {
        debug!("no account {} ({}), using defaults", what, err);
    } else {
        warn!("failed to fetch account {}: {}, using defaults", what, err);
    }
}

/// Dispatch an identity change.
///
/// A failed snapshot write still leaves the change applied in memory, so it
/// is logged and the transition goes ahead; reducer errors propagate.
fn apply<D, S>(store: &mut PreferencesStore<D, S>, action: Action) -> Result<(), SessionError>
where
    D: PersistencePort,
    S: PersistencePort,
{
    match store.dispatch(action) {
        Ok(_) => Ok(()),
        Err(StoreError::Storage(err)) => {
            error!("identity change applied but not persisted: {}", err);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn announce<D, S>(store: &mut PreferencesStore<D, S>, notices: &[Notice])
where
    D: PersistencePort,
    S: PersistencePort,
{
    for notice in notices {
        match serde_json::to_string(notice) {
            Ok(payload) => store.announce(Notice::EVENT, payload),
            Err(err) => warn!("could not serialize notice: {}", err),
        }
    }
}
