//! Plain data shared by the store, the API port and the deck helpers.

mod card;
mod deck;
mod identity;

pub use card::{CardList, CardRef};
pub use deck::{Deck, DeckSummary, Visibility};
pub use identity::SessionIdentity;
