//! Pokémon resource returned by `/pokemon/{id}`.

use serde::{Deserialize, Serialize};

use super::NamedResource;

/// National dex number (e.g. 25 for pikachu).
pub type PokemonID = u32;

/// Subset of the `/pokemon/{id}` payload the ingestion pipeline consumes.
///
/// Unknown fields are ignored. Numeric fields the API may omit default to 0,
/// list fields default to empty.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Pokemon {
    pub id: PokemonID,

    pub name: String,

    /// Height in decimetres.
    #[serde(default)]
    pub height: u32,

    /// Weight in hectograms.
    #[serde(default)]
    pub weight: u32,

    /// `null` for a handful of forms, so kept optional here.
    #[serde(default)]
    pub base_experience: Option<u32>,

    #[serde(default)]
    pub types: Vec<TypeSlot>,

    #[serde(default)]
    pub sprites: Sprites,

    #[serde(default)]
    pub stats: Vec<StatEntry>,

    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,

    /// Link to the species resource holding classification metadata.
    pub species: NamedResource,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatEntry {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedResource,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub slot: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Sprites {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
}

impl Pokemon {
    /// Base stat value by API stat name (`hp`, `special-attack`, ...), if present.
    pub fn base_stat(&self, name: &str) -> Option<u32> {
        self.stats
            .iter()
            .find(|entry| entry.stat.name == name)
            .map(|entry| entry.base_stat)
    }

    /// Type names ordered by slot.
    pub fn type_names(&self) -> Vec<String> {
        let mut slots: Vec<&TypeSlot> = self.types.iter().collect();
        slots.sort_by_key(|t| t.slot);
        slots.into_iter().map(|t| t.kind.name.clone()).collect()
    }
}
