//! Snapshot round trips through file-backed storage, plus migration.

use cardbase_session::filter::{Field, PresetId};
use cardbase_session::storage::FileStorage;
use cardbase_session::store::{PersistedSnapshot, SCHEMA_VERSION};
use cardbase_session::{
    Action, ClientConfig, Deck, FilterSet, InMemoryStorage, PersistencePort, PreferencesStore,
    SessionIdentity,
};

fn open(dir: &std::path::Path, session: &InMemoryStorage) -> PreferencesStore<FileStorage> {
    PreferencesStore::open(
        FileStorage::new(dir),
        session.clone(),
        &ClientConfig::default(),
    )
}

#[test]
fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let session = InMemoryStorage::new();
    {
        let mut store = open(dir.path(), &session);
        store
            .dispatch(Action::SetIdentity(SessionIdentity::user(4, "lee")))
            .unwrap();
        store
            .dispatch(Action::AddToHand {
                card_id: 12,
                quantity: 3,
            })
            .unwrap();
        store
            .dispatch(Action::AddToPrintList {
                card_id: 13,
                quantity: 1,
            })
            .unwrap();
        store.dispatch(Action::SetDeckIds(vec![5, 6])).unwrap();
        store.dispatch(Action::SetSort("name_asc".into())).unwrap();
        store.dispatch(Action::SetQuery("wyvern".into())).unwrap();
        store.dispatch(Action::SetPage(3)).unwrap();
    }

    let store = open(dir.path(), &session);
    assert_eq!(store.identity().id, Some(4));
    assert_eq!(store.hand().quantity_of(12), 3);
    assert_eq!(store.print_list().quantity_of(13), 1);
    assert_eq!(store.deck_ids(), &[5, 6]);
    assert_eq!(store.filters().sort(), "name_asc");
    assert_eq!(store.filters().query(), "wyvern");
    assert_eq!(store.filters().page(), 3);
}

#[test]
fn new_session_forgets_query_but_keeps_preferences() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = open(dir.path(), &InMemoryStorage::new());
        store.dispatch(Action::SetQuery("wyvern".into())).unwrap();
        store.dispatch(Action::SetPageSize(30)).unwrap();
    }

    // A new browser session starts with empty session storage.
    let store = open(dir.path(), &InMemoryStorage::new());
    assert_eq!(store.filters().query(), "");
    assert_eq!(store.filters().page_size(), 30);
}

#[test]
fn open_deck_is_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let session = InMemoryStorage::new();
    {
        let mut store = open(dir.path(), &session);
        store
            .dispatch(Action::OpenDeck(Deck::new("Draft", "ua")))
            .unwrap();
        store
            .dispatch(Action::AddDeckCard {
                card_id: 1,
                quantity: 2,
            })
            .unwrap();
    }

    let store = open(dir.path(), &session);
    assert!(store.deck_editor().draft.is_none());
}

#[test]
fn corrupt_snapshot_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::default();
    FileStorage::new(dir.path())
        .save(&config.storage_key, "{ not json")
        .unwrap();

    let store = open(dir.path(), &InMemoryStorage::new());
    assert_eq!(store.filters(), &FilterSet::default());
    assert!(store.hand().is_empty());
}

#[test]
fn legacy_snapshot_is_migrated_on_load_and_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::default();
    let durable = FileStorage::new(dir.path());
    durable
        .save(
            &config.storage_key,
            r#"{
                "identity": {"id": null},
                "preferences": {
                    "sort": "price",
                    "predicates": [
                        {"kind": "OR", "field": "print_type", "value": "Base"},
                        {"kind": "NOT", "field": "card_type", "value": "Action Point"}
                    ]
                },
                "hand": [{"cardId": 2, "quantity": 1}, {"cardId": 3, "quantity": 0}]
            }"#,
        )
        .unwrap();

    let mut store = open(dir.path(), &InMemoryStorage::new());
    assert_eq!(store.filters().sort(), "price_desc");
    assert_eq!(
        store.filters().applied_preset(Field::PrintType),
        Some(PresetId::BasicPrints)
    );
    assert_eq!(store.hand().len(), 1);

    store.dispatch(Action::NextPage).unwrap();
    let raw = durable.load(&config.storage_key).unwrap().unwrap();
    let rewritten: PersistedSnapshot = serde_json::from_str(&raw).unwrap();
    assert_eq!(rewritten.version, SCHEMA_VERSION);
    assert_eq!(rewritten.preferences.sort(), "price_desc");
}

#[test]
fn snapshot_from_a_newer_client_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::default();
    FileStorage::new(dir.path())
        .save(
            &config.storage_key,
            r#"{"version": 3, "hand": [{"cardId": 1, "quantity": 1}]}"#,
        )
        .unwrap();

    let store = open(dir.path(), &InMemoryStorage::new());
    assert!(store.hand().is_empty());
}
