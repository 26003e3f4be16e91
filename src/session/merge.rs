use crate::api::AccountPreferences;
use crate::filter::FilterSet;
use crate::model::{CardList, SessionIdentity};
use crate::store::StoreState;

/// Everything fetched for an account on login or session restore.
///
/// `preferences` is `None` when the account has none saved or the fetch
/// failed; the local values are kept in that case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountData {
    pub identity: SessionIdentity,
    pub preferences: Option<AccountPreferences>,
    pub hand: CardList,
    pub deck_ids: Vec<i64>,
}

/// Fold account data into local state.
///
/// Sort and page size come from the account; the deck-id list is replaced.
/// The local hand cart and print list are left exactly as they are, and the
/// account's stored hand is ignored.
pub fn merge_account(state: &mut StoreState, data: &AccountData) {
    state.identity = data.identity.clone();
    if let Some(preferences) = &data.preferences {
        if let Some(sort) = &preferences.sort {
            state.filters.set_sort(sort.clone());
        }
        if let Some(page_size) = preferences.page_size {
            state.filters.set_page_size(page_size);
        }
    }
    state.deck_ids = data.deck_ids.clone();
}

/// Logged-out state: anonymous identity, stock filters, no deck ids.
/// The hand cart and print list survive.
pub fn reset_for_logout(state: &mut StoreState) {
    state.identity = SessionIdentity::anonymous();
    state.filters = FilterSet::default();
    state.deck_ids.clear();
}
