use std::fmt;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::api::{AccountApi, ApiError};
use crate::lifecycle::{LifecyclePort, NoopLifecycle};
use crate::model::Deck;
use crate::storage::PersistencePort;
use crate::store::{Action, PreferencesStore, StoreError};

pub const UNLOAD_WARNING: &str = "Your deck is still being saved.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSaveError {
    Api(ApiError),
    Store(StoreError),
    /// The spawned save task panicked or was cancelled.
    Join(String),
    /// `on_unload` was called outside a Tokio runtime.
    Runtime(String),
}

impl fmt::Display for AutoSaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoSaveError::Api(err) => write!(f, "deck save failed: {}", err),
            AutoSaveError::Store(err) => write!(f, "deck editor update failed: {}", err),
            AutoSaveError::Join(message) => write!(f, "deck save task failed: {}", message),
            AutoSaveError::Runtime(message) => write!(f, "no runtime for deck save: {}", message),
        }
    }
}

impl std::error::Error for AutoSaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AutoSaveError::Api(err) => Some(err),
            AutoSaveError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for AutoSaveError {
    fn from(err: ApiError) -> Self {
        AutoSaveError::Api(err)
    }
}

impl From<StoreError> for AutoSaveError {
    fn from(err: StoreError) -> Self {
        AutoSaveError::Store(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadOutcome {
    /// A save was fired; it may not finish before the page goes away.
    Started,
    /// The guard was already `Saving`; nothing new was sent.
    AlreadySaving,
    NoDeck,
    /// Nobody is signed in, so there is nowhere to save to.
    Anonymous,
    /// No listener is attached: `mount` was never called or `unmount` ran.
    NotMounted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnmountOutcome {
    /// The server's copy of the deck; the draft has been cleared.
    Saved(Deck),
    /// The identity went anonymous; the draft was dropped unsaved.
    Discarded,
    NoDeck,
}

struct PendingSave {
    revision: u64,
    handle: JoinHandle<Result<Deck, ApiError>>,
}

/// Best-effort flush of the in-memory deck on unload and on unmount.
///
/// ```text
///   mount ──► listener on
///   unload ──► BeginDeckSave (guard: Idle -> Saving) ──► spawn save ──► warn host
///   unmount ──► listener off ──► await spawned save, or save now ──► FinishDeckSave ──► CloseDeck
/// ```
///
/// The store's `SaveState` is the one-shot guard: whichever trigger moves it
/// to `Saving` first submits, the other waits on or skips that save.
pub struct DeckAutoSave<A, L = NoopLifecycle> {
    api: Arc<A>,
    lifecycle: L,
    pending: Option<PendingSave>,
    mounted: bool,
}

impl<A> DeckAutoSave<A, NoopLifecycle>
where
    A: AccountApi + 'static,
{
    pub fn new(api: Arc<A>) -> Self {
        DeckAutoSave::with_lifecycle(api, NoopLifecycle)
    }
}

impl<A, L> DeckAutoSave<A, L>
where
    A: AccountApi + 'static,
    L: LifecyclePort,
{
    pub fn with_lifecycle(api: Arc<A>, lifecycle: L) -> Self {
        DeckAutoSave {
            api,
            lifecycle,
            pending: None,
            mounted: false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending.is_some()
    }

    pub fn mount(&mut self) {
        self.lifecycle.set_unload_listener(true);
        self.mounted = true;
    }

    /// Unload trigger. Fires the save without waiting for it.
    pub fn on_unload<D, S>(
        &mut self,
        store: &mut PreferencesStore<D, S>,
    ) -> Result<UnloadOutcome, AutoSaveError>
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        if !self.mounted {
            debug!("unload fired without a mounted listener, ignoring");
            return Ok(UnloadOutcome::NotMounted);
        }
        let editor = store.deck_editor();
        if editor.is_saving() {
            debug!("unload while a deck save is running, not resubmitting");
            return Ok(UnloadOutcome::AlreadySaving);
        }
        let deck = match &editor.draft {
            Some(deck) => deck.clone(),
            None => return Ok(UnloadOutcome::NoDeck),
        };
        let revision = editor.revision;
        if !store.identity().is_authenticated() {
            return Ok(UnloadOutcome::Anonymous);
        }
        let runtime = Handle::try_current().map_err(|e| AutoSaveError::Runtime(e.to_string()))?;

        store.dispatch(Action::BeginDeckSave)?;
        let api = Arc::clone(&self.api);
        let handle = runtime.spawn(async move { save_draft(api.as_ref(), &deck).await });
        self.pending = Some(PendingSave { revision, handle });
        self.lifecycle.warn_before_unload(UNLOAD_WARNING);
        info!("deck save started on unload");
        Ok(UnloadOutcome::Started)
    }

    /// Teardown trigger. Saves (or finishes the unload save) before the
    /// draft is cleared.
    ///
    /// On failure the draft is kept, the guard returns to `Idle` and the
    /// error is returned.
    pub async fn unmount<D, S>(
        &mut self,
        store: &mut PreferencesStore<D, S>,
    ) -> Result<UnmountOutcome, AutoSaveError>
    where
        D: PersistencePort,
        S: PersistencePort,
    {
        if self.mounted {
            self.lifecycle.set_unload_listener(false);
            self.mounted = false;
        }

        if let Some(pending) = self.pending.take() {
            let result = match pending.handle.await {
                Ok(result) => result,
                Err(err) => {
                    store.dispatch(Action::FinishDeckSave { saved: None })?;
                    return Err(AutoSaveError::Join(err.to_string()));
                }
            };
            match result {
                Ok(saved) => {
                    store.dispatch(Action::FinishDeckSave {
                        saved: Some(saved.clone()),
                    })?;
                    if store.deck_editor().revision == pending.revision {
                        store.dispatch(Action::CloseDeck)?;
                        return Ok(UnmountOutcome::Saved(saved));
                    }
                    debug!("deck changed after the unload save, saving again");
                }
                Err(err) => {
                    error!("deck save started on unload failed: {}", err);
                    store.dispatch(Action::FinishDeckSave { saved: None })?;
                    return Err(err.into());
                }
            }
        }

        let deck = match &store.deck_editor().draft {
            Some(deck) => deck.clone(),
            None => return Ok(UnmountOutcome::NoDeck),
        };
        if !store.identity().is_authenticated() {
            warn!("signed out before the deck was saved, discarding draft");
            store.dispatch(Action::CloseDeck)?;
            return Ok(UnmountOutcome::Discarded);
        }

        store.dispatch(Action::BeginDeckSave)?;
        match save_draft(self.api.as_ref(), &deck).await {
            Ok(saved) => {
                store.dispatch(Action::FinishDeckSave {
                    saved: Some(saved.clone()),
                })?;
                store.dispatch(Action::CloseDeck)?;
                info!("deck saved on unmount");
                Ok(UnmountOutcome::Saved(saved))
            }
            Err(err) => {
                error!("deck save on unmount failed: {}", err);
                store.dispatch(Action::FinishDeckSave { saved: None })?;
                Err(err.into())
            }
        }
    }
}

/// `PUT` for a stored deck, `POST` for a new one.
async fn save_draft<A: AccountApi + ?Sized>(api: &A, deck: &Deck) -> Result<Deck, ApiError> {
    match deck.id {
        Some(id) => api.save_deck(id, deck).await,
        None => api.create_deck(deck).await,
    }
}
