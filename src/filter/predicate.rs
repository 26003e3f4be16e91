use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Logical kind of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PredicateKind {
    And,
    Or,
    Not,
}

impl PredicateKind {
    /// The one-character sigil that starts an encoded token of this kind.
    pub fn sigil(self) -> char {
        match self {
            PredicateKind::And => '&',
            PredicateKind::Or => '|',
            PredicateKind::Not => '!',
        }
    }

    pub fn from_sigil(sigil: char) -> Option<Self> {
        match sigil {
            '&' => Some(PredicateKind::And),
            '|' => Some(PredicateKind::Or),
            '!' => Some(PredicateKind::Not),
            _ => None,
        }
    }
}

/// The filterable card attributes the search API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Series,
    Color,
    CardType,
    PrintType,
    Rarity,
    Keyword,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Series,
        Field::Color,
        Field::CardType,
        Field::PrintType,
        Field::Rarity,
        Field::Keyword,
    ];

    /// The single field whose singleton predicate is an exclusion (NOT) rather than AND.
    pub const EXCLUSION: Field = Field::CardType;

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Series => "series",
            Field::Color => "color",
            Field::CardType => "card_type",
            Field::PrintType => "print_type",
            Field::Rarity => "rarity",
            Field::Keyword => "keyword",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Field::ALL.iter().copied().find(|field| field.as_str() == name)
    }

    /// Kind used when this field is set through `FilterSet::set_singleton`.
    pub fn singleton_kind(self) -> PredicateKind {
        if self == Field::EXCLUSION {
            PredicateKind::Not
        } else {
            PredicateKind::And
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filter condition.
///
/// `field` stays a plain string so predicates for fields this crate does not
/// know about survive a snapshot or share-link round trip. `label` is display
/// text only and takes no part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predicate {
    pub kind: PredicateKind,
    pub field: String,
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl Predicate {
    pub fn new(kind: PredicateKind, field: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Predicate {
            kind,
            field: field.into(),
            label: value.clone(),
            value,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn and(field: Field, value: impl Into<String>) -> Self {
        Predicate::new(PredicateKind::And, field.as_str(), value)
    }

    pub fn or(field: Field, value: impl Into<String>) -> Self {
        Predicate::new(PredicateKind::Or, field.as_str(), value)
    }

    pub fn not(field: Field, value: impl Into<String>) -> Self {
        Predicate::new(PredicateKind::Not, field.as_str(), value)
    }

    /// The typed field, if the name is part of the known vocabulary.
    pub fn known_field(&self) -> Option<Field> {
        Field::parse(&self.field)
    }

    pub fn is_field(&self, field: Field) -> bool {
        self.field == field.as_str()
    }

    pub fn matches(&self, field: Field, value: &str) -> bool {
        self.is_field(field) && self.value == value
    }

    pub(crate) fn sort_key(&self) -> (PredicateKind, &str, &str) {
        (self.kind, self.field.as_str(), self.value.as_str())
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.field == other.field && self.value == other.value
    }
}

impl Eq for Predicate {}

impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.field.hash(state);
        self.value.hash(state);
    }
}
