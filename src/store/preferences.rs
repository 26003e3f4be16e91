use log::{debug, error, info, warn};

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;

use super::error::StoreError;
use super::snapshot::{migrate, PersistedSnapshot, SearchSession};
use super::state::{reduce, Action, DeckEditor, StoreEvent, StoreState};
use crate::config::ClientConfig;
use crate::filter::FilterSet;
use crate::model::{CardList, SessionIdentity};
use crate::storage::{InMemoryStorage, PersistencePort};

/// Single owner of the session-scoped feature state.
///
/// Every successful [`dispatch`](PreferencesStore::dispatch) writes the
/// durable snapshot and the session blob before returning, then notifies
/// listeners registered with `on`.
pub struct PreferencesStore<D = InMemoryStorage, S = InMemoryStorage> {
    state: StoreState,
    durable: D,
    session: S,
    storage_key: String,
    session_key: String,
    #[cfg(feature = "emitter")]
    emitter: EventEmitter,
}

impl PreferencesStore<InMemoryStorage, InMemoryStorage> {
    /// Store backed by fresh in-memory storage, with default keys.
    pub fn in_memory() -> Self {
        PreferencesStore::open(
            InMemoryStorage::new(),
            InMemoryStorage::new(),
            &ClientConfig::default(),
        )
    }
}

impl<D, S> PreferencesStore<D, S>
where
    D: PersistencePort,
    S: PersistencePort,
{
    /// Load the prior snapshot if there is a usable one, else seed defaults.
    ///
    /// A missing, unreadable or unparsable snapshot is not an error; the
    /// store starts from the stock state and overwrites it on first dispatch.
    pub fn open(durable: D, session: S, config: &ClientConfig) -> Self {
        let snapshot = load_snapshot(&durable, &config.storage_key);
        let search = load_search_session(&session, &config.session_key);
        let state = match snapshot {
            Some(snapshot) => snapshot.into_state(search),
            None => StoreState::default(),
        };

        PreferencesStore {
            state,
            durable,
            session,
            storage_key: config.storage_key.clone(),
            session_key: config.session_key.clone(),
            #[cfg(feature = "emitter")]
            emitter: EventEmitter::new(),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.state.identity
    }

    pub fn filters(&self) -> &FilterSet {
        &self.state.filters
    }

    pub fn hand(&self) -> &CardList {
        &self.state.hand
    }

    pub fn print_list(&self) -> &CardList {
        &self.state.print_list
    }

    pub fn deck_ids(&self) -> &[i64] {
        &self.state.deck_ids
    }

    pub fn deck_editor(&self) -> &DeckEditor {
        &self.state.deck_editor
    }

    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot::capture(&self.state)
    }

    pub fn search_session(&self) -> SearchSession {
        SearchSession::capture(&self.state.filters)
    }

    pub fn durable(&self) -> &D {
        &self.durable
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Run one action through the reducer, persist, then notify.
    ///
    /// A rejected action changes nothing. A storage failure is returned after
    /// the in-memory state has already moved on; the next successful write
    /// catches storage up.
    pub fn dispatch(&mut self, action: Action) -> Result<Vec<StoreEvent>, StoreError> {
        let events = reduce(&mut self.state, action)?;
        if let Err(err) = self.persist() {
            error!("failed to persist preferences snapshot: {}", err);
            return Err(err);
        }
        for event in &events {
            self.notify(*event);
        }
        Ok(events)
    }

    /// Write the durable snapshot and the session blob.
    pub fn persist(&self) -> Result<(), StoreError> {
        let snapshot = serde_json::to_string(&self.snapshot())?;
        self.durable.save(&self.storage_key, &snapshot)?;
        let search = serde_json::to_string(&self.search_session())?;
        self.session.save(&self.session_key, &search)?;
        debug!("persisted snapshot under {}", self.storage_key);
        Ok(())
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    fn slice_json(&self, event: StoreEvent) -> Result<String, serde_json::Error> {
        match event {
            StoreEvent::FiltersChanged => serde_json::to_string(&self.state.filters),
            StoreEvent::HandChanged => serde_json::to_string(&self.state.hand),
            StoreEvent::PrintListChanged => serde_json::to_string(&self.state.print_list),
            StoreEvent::DeckChanged => serde_json::to_string(&self.state.deck_editor),
            StoreEvent::IdentityChanged => serde_json::to_string(&self.state.identity),
            StoreEvent::DeckIdsChanged => serde_json::to_string(&self.state.deck_ids),
        }
    }

    fn notify(&mut self, event: StoreEvent) {
        match self.slice_json(event) {
            Ok(payload) => self.announce(event.name(), payload),
            Err(err) => warn!("could not serialize {} payload: {}", event.name(), err),
        }
    }

    /// Register a listener for an event name. Payloads are JSON strings.
    #[cfg(feature = "emitter")]
    pub fn on<F>(&mut self, event: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.emitter.on(event, listener);
    }

    /// Emit a named event and wait for its listeners to finish.
    #[cfg(feature = "emitter")]
    pub fn announce(&mut self, event: &str, payload: String) {
        for handle in self.emitter.emit(event, payload) {
            if handle.join().is_err() {
                warn!("listener for {} panicked", event);
            }
        }
    }

    #[cfg(not(feature = "emitter"))]
    pub fn announce(&mut self, event: &str, _payload: String) {
        debug!("{} (no emitter)", event);
    }
}

fn load_snapshot<D: PersistencePort>(durable: &D, key: &str) -> Option<PersistedSnapshot> {
    let raw = match durable.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("no stored snapshot under {}, seeding defaults", key);
            return None;
        }
        Err(err) => {
            warn!("could not read snapshot {}: {}, seeding defaults", key, err);
            return None;
        }
    };
    match migrate(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!("discarding stored snapshot {}: {}", key, err);
            None
        }
    }
}

fn load_search_session<S: PersistencePort>(session: &S, key: &str) -> Option<SearchSession> {
    match session.load(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw)
            .map_err(|err| warn!("discarding search session {}: {}", key, err))
            .ok(),
        Ok(None) => None,
        Err(err) => {
            warn!("could not read search session {}: {}", key, err);
            None
        }
    }
}
