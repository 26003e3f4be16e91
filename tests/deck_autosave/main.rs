//! Unload and unmount triggers racing over the one-shot save guard.

use std::sync::Arc;
use std::time::Duration;

use cardbase_session::api::{ApiError, Endpoint};
use cardbase_session::deck::{AutoSaveError, UnloadOutcome, UnmountOutcome, UNLOAD_WARNING};
use cardbase_session::store::SaveState;
use cardbase_session::{
    Action, DeckAutoSave, Deck, InMemoryAccountApi, PreferencesStore, RecordingLifecycle,
    SessionIdentity,
};

const OWNER: i64 = 3;

struct Fixture {
    api: Arc<InMemoryAccountApi>,
    store: PreferencesStore,
    lifecycle: RecordingLifecycle,
    deck_id: i64,
}

/// Signed-in store with a stored deck open in the editor.
fn fixture() -> Fixture {
    let api = InMemoryAccountApi::new();
    let mut deck = Deck::new("Green Ramp", "ua");
    deck.cards.add(10, 4);
    let deck_id = api.add_deck(OWNER, deck);
    api.sign_in_as(OWNER);
    api.set_save_delay(Duration::from_millis(200));

    let mut store = PreferencesStore::in_memory();
    store
        .dispatch(Action::SetIdentity(SessionIdentity::user(OWNER, "kai")))
        .unwrap();
    let mut opened = Deck::new("Green Ramp", "ua").with_id(deck_id);
    opened.cards.add(10, 4);
    store.dispatch(Action::OpenDeck(opened)).unwrap();

    Fixture {
        api: Arc::new(api),
        store,
        lifecycle: RecordingLifecycle::new(),
        deck_id,
    }
}

#[tokio::test(start_paused = true)]
async fn unload_then_unmount_saves_once() {
    let Fixture {
        api,
        mut store,
        lifecycle,
        deck_id,
    } = fixture();
    let mut autosave = DeckAutoSave::with_lifecycle(Arc::clone(&api), lifecycle.clone());
    autosave.mount();
    store
        .dispatch(Action::AddDeckCard {
            card_id: 11,
            quantity: 2,
        })
        .unwrap();

    assert_eq!(
        autosave.on_unload(&mut store).unwrap(),
        UnloadOutcome::Started
    );
    assert_eq!(store.deck_editor().save_state, SaveState::Saving);

    let outcome = autosave.unmount(&mut store).await.unwrap();

    assert_eq!(api.calls(Endpoint::SaveDeck), 1);
    match outcome {
        UnmountOutcome::Saved(saved) => {
            assert_eq!(saved.id, Some(deck_id));
            assert_eq!(saved.cards.quantity_of(11), 2);
        }
        other => panic!("expected Saved, got {:?}", other),
    }
    assert!(store.deck_editor().draft.is_none());
    assert_eq!(store.deck_editor().save_state, SaveState::Idle);
    assert_eq!(lifecycle.warnings(), vec![UNLOAD_WARNING.to_string()]);
    assert!(!lifecycle.listener_active());
}

#[tokio::test(start_paused = true)]
async fn second_unload_does_not_resubmit() {
    let Fixture {
        api,
        mut store,
        lifecycle,
        ..
    } = fixture();
    let mut autosave = DeckAutoSave::with_lifecycle(Arc::clone(&api), lifecycle.clone());
    autosave.mount();

    assert_eq!(
        autosave.on_unload(&mut store).unwrap(),
        UnloadOutcome::Started
    );
    assert_eq!(
        autosave.on_unload(&mut store).unwrap(),
        UnloadOutcome::AlreadySaving
    );

    autosave.unmount(&mut store).await.unwrap();
    assert_eq!(api.calls(Endpoint::SaveDeck), 1);
    assert_eq!(lifecycle.warnings().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn edits_after_unload_save_are_saved_on_unmount() {
    let Fixture { api, mut store, .. } = fixture();
    let mut autosave = DeckAutoSave::new(Arc::clone(&api));
    autosave.mount();

    autosave.on_unload(&mut store).unwrap();
    store
        .dispatch(Action::RenameDeck("Green Ramp v2".into()))
        .unwrap();

    let outcome = autosave.unmount(&mut store).await.unwrap();

    assert_eq!(api.calls(Endpoint::SaveDeck), 2);
    let saved = api.saved_decks();
    assert_eq!(saved.last().unwrap().name, "Green Ramp v2");
    assert!(matches!(outcome, UnmountOutcome::Saved(_)));
}

#[tokio::test]
async fn anonymous_unmount_discards_draft() {
    let Fixture { api, mut store, .. } = fixture();
    store
        .dispatch(Action::SetIdentity(SessionIdentity::anonymous()))
        .unwrap();
    let mut autosave = DeckAutoSave::new(Arc::clone(&api));
    autosave.mount();

    assert_eq!(
        autosave.on_unload(&mut store).unwrap(),
        UnloadOutcome::Anonymous
    );
    let outcome = autosave.unmount(&mut store).await.unwrap();

    assert_eq!(outcome, UnmountOutcome::Discarded);
    assert!(store.deck_editor().draft.is_none());
    assert_eq!(api.calls(Endpoint::SaveDeck), 0);
    assert_eq!(api.calls(Endpoint::CreateDeck), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_unmount_save_keeps_draft() {
    let Fixture { api, mut store, .. } = fixture();
    api.fail(
        Endpoint::SaveDeck,
        ApiError::Status {
            status: 503,
            message: "maintenance".into(),
        },
    );
    let mut autosave = DeckAutoSave::new(Arc::clone(&api));
    autosave.mount();

    let err = autosave.unmount(&mut store).await.unwrap_err();

    assert!(matches!(err, AutoSaveError::Api(ApiError::Status { status: 503, .. })));
    assert!(store.deck_editor().draft.is_some());
    assert_eq!(store.deck_editor().save_state, SaveState::Idle);
}

#[tokio::test(start_paused = true)]
async fn failed_unload_save_surfaces_on_unmount() {
    let Fixture { api, mut store, .. } = fixture();
    api.fail(Endpoint::SaveDeck, ApiError::Transport("offline".into()));
    let mut autosave = DeckAutoSave::new(Arc::clone(&api));
    autosave.mount();

    autosave.on_unload(&mut store).unwrap();
    let err = autosave.unmount(&mut store).await.unwrap_err();

    assert_eq!(err, AutoSaveError::Api(ApiError::Transport("offline".into())));
    assert!(store.deck_editor().draft.is_some());
    assert_eq!(store.deck_editor().save_state, SaveState::Idle);
    assert!(!autosave.has_pending_save());
}
