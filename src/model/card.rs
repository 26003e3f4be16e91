use serde::{Deserialize, Serialize};

/// A card and how many copies of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRef {
    pub card_id: i64,
    pub quantity: u32,
}

impl CardRef {
    pub fn new(card_id: i64, quantity: u32) -> Self {
        CardRef { card_id, quantity }
    }
}

/// Ordered card list where a zero quantity means "not in the list".
///
/// Used for the hand cart, the proxy print list and deck contents. Entries
/// keep insertion order; zero-quantity entries are dropped on the way in,
/// including when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CardRef>", into = "Vec<CardRef>")]
pub struct CardList {
    cards: Vec<CardRef>,
}

impl From<Vec<CardRef>> for CardList {
    fn from(cards: Vec<CardRef>) -> Self {
        let mut list = CardList::new();
        for card in cards {
            list.add(card.card_id, card.quantity);
        }
        list
    }
}

impl From<CardList> for Vec<CardRef> {
    fn from(list: CardList) -> Self {
        list.cards
    }
}

impl CardList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[CardRef] {
        &self.cards
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardRef> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total_quantity(&self) -> u64 {
        self.cards.iter().map(|c| u64::from(c.quantity)).sum()
    }

    pub fn quantity_of(&self, card_id: i64) -> u32 {
        self.cards
            .iter()
            .find(|c| c.card_id == card_id)
            .map(|c| c.quantity)
            .unwrap_or(0)
    }

    /// Add copies, merging into an existing entry. Adding zero is a no-op.
    pub fn add(&mut self, card_id: i64, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.cards.iter_mut().find(|c| c.card_id == card_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.cards.push(CardRef::new(card_id, quantity)),
        }
    }

    /// Set the exact quantity; zero removes the entry.
    pub fn set_quantity(&mut self, card_id: i64, quantity: u32) {
        if quantity == 0 {
            self.remove(card_id);
            return;
        }
        match self.cards.iter_mut().find(|c| c.card_id == card_id) {
            Some(existing) => existing.quantity = quantity,
            None => self.cards.push(CardRef::new(card_id, quantity)),
        }
    }

    /// Returns true if the card was present.
    pub fn remove(&mut self, card_id: i64) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.card_id != card_id);
        self.cards.len() != before
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn extend_from(&mut self, other: &CardList) {
        for card in other.iter() {
            self.add(card.card_id, card.quantity);
        }
    }
}

impl<'a> IntoIterator for &'a CardList {
    type Item = &'a CardRef;
    type IntoIter = std::slice::Iter<'a, CardRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}
