use serde::{Deserialize, Serialize};

use super::predicate::Field;

pub const RARITIES: [&str; 6] = [
    "Common",
    "Uncommon",
    "Rare",
    "Super Rare",
    "Legendary",
    "Special",
];

pub const PRINT_TYPES: [&str; 5] = ["Base", "Alternate Art", "Parallel", "Serialized", "Promo"];

/// Card type excluded by default from every search.
pub const ACTION_POINT: &str = "Action Point";

/// How a preset reaches the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// Members are sent as OR predicates.
    Inclusion,
    /// Every vocabulary value outside the member set is sent as a NOT predicate.
    Exclusion,
}

/// Named, fixed member sets toggled as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetId {
    BaseRarities,
    BasicPrints,
    HighRarities,
}

impl PresetId {
    pub const ALL: [PresetId; 3] = [
        PresetId::BaseRarities,
        PresetId::BasicPrints,
        PresetId::HighRarities,
    ];

    pub fn field(self) -> Field {
        match self {
            PresetId::BaseRarities | PresetId::HighRarities => Field::Rarity,
            PresetId::BasicPrints => Field::PrintType,
        }
    }

    pub fn members(self) -> &'static [&'static str] {
        match self {
            PresetId::BaseRarities => &["Common", "Uncommon", "Rare", "Super Rare"],
            PresetId::BasicPrints => &["Base"],
            PresetId::HighRarities => &["Super Rare", "Legendary", "Special"],
        }
    }

    pub fn expansion(self) -> Expansion {
        match self {
            PresetId::BasicPrints => Expansion::Exclusion,
            PresetId::BaseRarities | PresetId::HighRarities => Expansion::Inclusion,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PresetId::BaseRarities => "base_rarities",
            PresetId::BasicPrints => "basic_prints",
            PresetId::HighRarities => "high_rarities",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PresetId::ALL.iter().copied().find(|preset| preset.name() == name)
    }

    pub fn is_member(self, value: &str) -> bool {
        self.members().contains(&value)
    }

    /// Values of the preset's field that the preset leaves out.
    pub fn excluded_values(self) -> Vec<&'static str> {
        vocabulary(self.field())
            .iter()
            .copied()
            .filter(|value| !self.is_member(value))
            .collect()
    }
}

/// Known values for the fields presets operate on.
pub fn vocabulary(field: Field) -> &'static [&'static str] {
    match field {
        Field::Rarity => &RARITIES,
        Field::PrintType => &PRINT_TYPES,
        _ => &[],
    }
}
