use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{DeckValidator, ValidationRequest, ValidationVerdict};
use crate::config::{ClientConfig, DEFAULT_VALIDATION_DEBOUNCE_MS};
use crate::model::Deck;
use crate::store::DeckEditor;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum ValidationState {
    #[default]
    Idle,
    /// An edit is waiting out the debounce window or its call is in flight.
    Pending,
    Checked(ValidationVerdict),
    Failed(String),
}

/// Debounced bridge from deck edits to the remote legality check.
///
/// Each edit restarts the window. When the window passes without another
/// edit, the check is sent as a detached task, so later edits never cancel
/// a call already in flight. Every edit takes a new sequence number and a
/// response is published only if its number is still the latest.
pub struct DeckValidationClient<V> {
    validator: Arc<V>,
    window: Duration,
    sequence: Arc<AtomicU64>,
    state: Arc<watch::Sender<ValidationState>>,
    timer: Option<JoinHandle<()>>,
    seen_revision: Option<u64>,
}

impl<V> DeckValidationClient<V>
where
    V: DeckValidator + 'static,
{
    pub fn new(validator: Arc<V>) -> Self {
        Self::with_window(
            validator,
            Duration::from_millis(DEFAULT_VALIDATION_DEBOUNCE_MS),
        )
    }

    pub fn from_config(validator: Arc<V>, config: &ClientConfig) -> Self {
        Self::with_window(validator, config.validation_debounce)
    }

    pub fn with_window(validator: Arc<V>, window: Duration) -> Self {
        let (state, _) = watch::channel(ValidationState::Idle);
        DeckValidationClient {
            validator,
            window,
            sequence: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            timer: None,
            seen_revision: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ValidationState {
        self.state.borrow().clone()
    }

    /// Feed the latest deck after a change to its cards or metadata.
    pub fn deck_changed(&mut self, deck: &Deck) {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_timer();

        if deck.cards.is_empty() {
            self.state
                .send_replace(ValidationState::Checked(ValidationVerdict::empty_deck()));
            return;
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("deck validation needs a tokio runtime: {}", err);
                self.state
                    .send_replace(ValidationState::Failed(err.to_string()));
                return;
            }
        };

        self.state.send_replace(ValidationState::Pending);
        let request = ValidationRequest::from(deck);
        let window = self.window;
        let validator = Arc::clone(&self.validator);
        let sequence = Arc::clone(&self.sequence);
        let state = Arc::clone(&self.state);
        let spawner = runtime.clone();

        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(window).await;
            if sequence.load(Ordering::SeqCst) != ticket {
                return;
            }
            // Detached so that the next edit's abort cannot cancel the call.
            spawner.spawn(async move {
                let result = validator.validate(&request).await;
                if sequence.load(Ordering::SeqCst) != ticket {
                    debug!("dropping stale validation response #{}", ticket);
                    return;
                }
                let next = match result {
                    Ok(verdict) => ValidationState::Checked(verdict),
                    Err(err) => {
                        error!("deck validation failed: {}", err);
                        ValidationState::Failed(err.to_string())
                    }
                };
                state.send_replace(next);
            });
        }));
    }

    /// Follow the store's deck-editor slice.
    ///
    /// Call after every `deck.changed` event. Card and metadata edits bump
    /// the editor revision and restart the window; save-state flips leave it
    /// alone and are ignored. Closing the deck cancels. Returns whether the
    /// call changed anything.
    pub fn observe(&mut self, editor: &DeckEditor) -> bool {
        if self.seen_revision == Some(editor.revision) {
            return false;
        }
        self.seen_revision = Some(editor.revision);
        match &editor.draft {
            Some(deck) => self.deck_changed(deck),
            None => self.cancel(),
        }
        true
    }

    /// Stop the pending timer and ignore any call still in flight.
    pub fn cancel(&mut self) {
        self.sequence.fetch_add(1, Ordering::SeqCst);
        self.abort_timer();
        self.state.send_replace(ValidationState::Idle);
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<V> Drop for DeckValidationClient<V> {
    fn drop(&mut self) {
        self.sequence.fetch_add(1, Ordering::SeqCst);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
