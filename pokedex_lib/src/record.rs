//! The normalized Pokémon record as stored and served.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One Pokémon's normalized data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonRecord {
    pub id: u32,
    pub name: String,
    /// Type labels in slot order. Never empty.
    pub types: Vec<String>,
    pub height: u32,
    pub weight: u32,
    pub base_experience: u32,
    pub is_legendary: bool,
    pub is_mythical: bool,
    pub generation: u32,
    pub sprite_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_shiny: Option<String>,
    pub stats: BaseStats,
    pub abilities: Vec<String>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habitat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}

/// Six base stats. Values are 0-255 by convention, not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl BaseStats {
    pub fn total(&self) -> u32 {
        self.hp
            + self.attack
            + self.defense
            + self.special_attack
            + self.special_defense
            + self.speed
    }
}

/// Rarity class derived from the legendary/mythical flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Legendary,
    Mythical,
    Normal,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rarity::Legendary => "legendary",
            Rarity::Mythical => "mythical",
            Rarity::Normal => "normal",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Rarity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legendary" => Ok(Rarity::Legendary),
            "mythical" => Ok(Rarity::Mythical),
            "normal" => Ok(Rarity::Normal),
            _ => Err(()),
        }
    }
}

impl PokemonRecord {
    pub fn rarity(&self) -> Rarity {
        if self.is_legendary {
            Rarity::Legendary
        } else if self.is_mythical {
            Rarity::Mythical
        } else {
            Rarity::Normal
        }
    }
}
