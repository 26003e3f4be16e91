use serde::{Deserialize, Serialize};

use super::error::StoreError;
use crate::filter::{Field, FilterSet, PresetId};
use crate::model::{CardList, Deck, SessionIdentity, Visibility};
use crate::session::merge::{self, AccountData};

/// The one-shot guard on deck saves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
}

/// In-memory deck being edited. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckEditor {
    pub draft: Option<Deck>,
    pub save_state: SaveState,
    /// Bumped on every change to the draft's cards or metadata.
    pub revision: u64,
}

impl DeckEditor {
    pub fn is_saving(&self) -> bool {
        self.save_state == SaveState::Saving
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    pub identity: SessionIdentity,
    pub filters: FilterSet,
    pub hand: CardList,
    pub print_list: CardList,
    pub deck_ids: Vec<i64>,
    pub deck_editor: DeckEditor,
}

impl Default for StoreState {
    fn default() -> Self {
        StoreState {
            identity: SessionIdentity::anonymous(),
            filters: FilterSet::default(),
            hand: CardList::new(),
            print_list: CardList::new(),
            deck_ids: Vec::new(),
            deck_editor: DeckEditor::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Search filters
    SetQuery(String),
    SetSort(String),
    SetPage(u32),
    NextPage,
    SetPageSize(u32),
    SetSingleton { field: Field, value: String },
    ToggleGroupMember { field: Field, value: String, present: bool },
    ApplyPreset { preset: PresetId, enabled: bool },
    RemoveFilter { field: Field, value: String },
    ClearFilters,
    /// Back to the stock search.
    ResetFilters,
    ReplaceFilters(FilterSet),

    // Hand cart
    AddToHand { card_id: i64, quantity: u32 },
    SetHandQuantity { card_id: i64, quantity: u32 },
    RemoveFromHand(i64),
    ClearHand,

    // Proxy print list
    AddToPrintList { card_id: i64, quantity: u32 },
    SetPrintQuantity { card_id: i64, quantity: u32 },
    RemoveFromPrintList(i64),
    ClearPrintList,
    SendHandToPrintList,

    // Identity
    SetIdentity(SessionIdentity),
    SetDeckIds(Vec<i64>),
    TrackDeckId(i64),
    MergeAccount(AccountData),
    SignOut,

    // Deck editor
    OpenDeck(Deck),
    AddDeckCard { card_id: i64, quantity: u32 },
    SetDeckCardQuantity { card_id: i64, quantity: u32 },
    RenameDeck(String),
    SetDeckVisibility(Visibility),
    SetDeckFilters(FilterSet),
    CloseDeck,
    BeginDeckSave,
    /// `saved` is the server's copy on success, `None` on failure.
    FinishDeckSave { saved: Option<Deck> },
}

/// Which slice of the store an action touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    FiltersChanged,
    HandChanged,
    PrintListChanged,
    DeckChanged,
    IdentityChanged,
    DeckIdsChanged,
}

impl StoreEvent {
    pub fn name(self) -> &'static str {
        match self {
            StoreEvent::FiltersChanged => "filters.changed",
            StoreEvent::HandChanged => "hand.changed",
            StoreEvent::PrintListChanged => "print_list.changed",
            StoreEvent::DeckChanged => "deck.changed",
            StoreEvent::IdentityChanged => "identity.changed",
            StoreEvent::DeckIdsChanged => "deck_ids.changed",
        }
    }
}

fn positive(card_id: i64, quantity: u32) -> Result<u32, StoreError> {
    if quantity == 0 {
        Err(StoreError::InvalidQuantity { card_id, quantity })
    } else {
        Ok(quantity)
    }
}

fn draft_mut(state: &mut StoreState) -> Result<&mut Deck, StoreError> {
    state
        .deck_editor
        .draft
        .as_mut()
        .ok_or(StoreError::NoDeckOpen)
}

/// Apply one action to the state and report which slices it touched.
///
/// Errors leave the state untouched.
pub fn reduce(state: &mut StoreState, action: Action) -> Result<Vec<StoreEvent>, StoreError> {
    use StoreEvent::*;

    let events = match action {
        Action::SetQuery(query) => {
            state.filters.set_query(query);
            vec![FiltersChanged]
        }
        Action::SetSort(sort) => {
            state.filters.set_sort(sort);
            vec![FiltersChanged]
        }
        Action::SetPage(page) => {
            state.filters.set_page(page);
            vec![FiltersChanged]
        }
        Action::NextPage => {
            state.filters.next_page();
            vec![FiltersChanged]
        }
        Action::SetPageSize(size) => {
            state.filters.set_page_size(size);
            vec![FiltersChanged]
        }
        Action::SetSingleton { field, value } => {
            state.filters.set_singleton(field, &value);
            vec![FiltersChanged]
        }
        Action::ToggleGroupMember {
            field,
            value,
            present,
        } => {
            state.filters.toggle_group_member(field, &value, present);
            vec![FiltersChanged]
        }
        Action::ApplyPreset { preset, enabled } => {
            state.filters.apply_preset(preset, enabled);
            vec![FiltersChanged]
        }
        Action::RemoveFilter { field, value } => {
            state.filters.remove(field, &value);
            vec![FiltersChanged]
        }
        Action::ClearFilters => {
            state.filters.clear_predicates();
            vec![FiltersChanged]
        }
        Action::ResetFilters => {
            state.filters = FilterSet::default();
            vec![FiltersChanged]
        }
        Action::ReplaceFilters(mut filters) => {
            filters.normalize();
            state.filters = filters;
            vec![FiltersChanged]
        }

        Action::AddToHand { card_id, quantity } => {
            state.hand.add(card_id, positive(card_id, quantity)?);
            vec![HandChanged]
        }
        Action::SetHandQuantity { card_id, quantity } => {
            state.hand.set_quantity(card_id, quantity);
            vec![HandChanged]
        }
        Action::RemoveFromHand(card_id) => {
            state.hand.remove(card_id);
            vec![HandChanged]
        }
        Action::ClearHand => {
            state.hand.clear();
            vec![HandChanged]
        }

        Action::AddToPrintList { card_id, quantity } => {
            state.print_list.add(card_id, positive(card_id, quantity)?);
            vec![PrintListChanged]
        }
        Action::SetPrintQuantity { card_id, quantity } => {
            state.print_list.set_quantity(card_id, quantity);
            vec![PrintListChanged]
        }
        Action::RemoveFromPrintList(card_id) => {
            state.print_list.remove(card_id);
            vec![PrintListChanged]
        }
        Action::ClearPrintList => {
            state.print_list.clear();
            vec![PrintListChanged]
        }
        Action::SendHandToPrintList => {
            state.print_list.extend_from(&state.hand);
            vec![PrintListChanged]
        }

        Action::SetIdentity(identity) => {
            state.identity = identity;
            vec![IdentityChanged]
        }
        Action::SetDeckIds(ids) => {
            state.deck_ids = ids;
            vec![DeckIdsChanged]
        }
        Action::TrackDeckId(id) => {
            if state.deck_ids.contains(&id) {
                Vec::new()
            } else {
                state.deck_ids.push(id);
                vec![DeckIdsChanged]
            }
        }
        Action::MergeAccount(data) => {
            merge::merge_account(state, &data);
            vec![IdentityChanged, FiltersChanged, DeckIdsChanged]
        }
        Action::SignOut => {
            merge::reset_for_logout(state);
            vec![IdentityChanged, FiltersChanged, DeckIdsChanged]
        }

        Action::OpenDeck(deck) => {
            state.deck_editor.draft = Some(deck);
            state.deck_editor.save_state = SaveState::Idle;
            state.deck_editor.revision += 1;
            vec![DeckChanged]
        }
        Action::AddDeckCard { card_id, quantity } => {
            let quantity = positive(card_id, quantity)?;
            draft_mut(state)?.cards.add(card_id, quantity);
            state.deck_editor.revision += 1;
            vec![DeckChanged]
        }
        Action::SetDeckCardQuantity { card_id, quantity } => {
            draft_mut(state)?.cards.set_quantity(card_id, quantity);
            state.deck_editor.revision += 1;
            vec![DeckChanged]
        }
        Action::RenameDeck(name) => {
            draft_mut(state)?.name = name;
            state.deck_editor.revision += 1;
            vec![DeckChanged]
        }
        Action::SetDeckVisibility(visibility) => {
            draft_mut(state)?.visibility = visibility;
            state.deck_editor.revision += 1;
            vec![DeckChanged]
        }
        Action::SetDeckFilters(mut filters) => {
            filters.normalize();
            draft_mut(state)?.preferences = filters;
            state.deck_editor.revision += 1;
            vec![DeckChanged]
        }
        Action::CloseDeck => {
            state.deck_editor.draft = None;
            state.deck_editor.save_state = SaveState::Idle;
            state.deck_editor.revision += 1;
            vec![DeckChanged]
        }
        Action::BeginDeckSave => {
            if state.deck_editor.draft.is_none() {
                return Err(StoreError::NoDeckOpen);
            }
            if state.deck_editor.is_saving() {
                return Err(StoreError::SaveInProgress);
            }
            state.deck_editor.save_state = SaveState::Saving;
            vec![DeckChanged]
        }
        Action::FinishDeckSave { saved } => {
            state.deck_editor.save_state = SaveState::Idle;
            let mut events = vec![DeckChanged];
            let stored_id = saved.as_ref().and_then(|deck| deck.id);
            if let (Some(draft), Some(saved)) = (state.deck_editor.draft.as_mut(), saved) {
                if draft.id.is_none() {
                    draft.id = saved.id;
                }
                draft.created_at = saved.created_at;
                draft.modified_at = saved.modified_at;
            }
            if let Some(id) = stored_id {
                if !state.deck_ids.contains(&id) {
                    state.deck_ids.push(id);
                    events.push(DeckIdsChanged);
                }
            }
            events
        }
    };

    Ok(events)
}
