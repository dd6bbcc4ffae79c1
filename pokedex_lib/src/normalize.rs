//! Strict mapping from PokéAPI payloads to [`PokemonRecord`].

use pokeapi::types::{Pokemon, Species};
use url::Url;

use crate::record::{BaseStats, PokemonRecord};

/// Why a payload pair could not be turned into a record.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("pokemon {0} has no types")]
    NoTypes(u32),
    #[error("pokemon {0} has no front sprite")]
    MissingSprite(u32),
    #[error("pokemon {0} species has no color")]
    MissingColor(u32),
    #[error("cannot read generation number from '{0}'")]
    BadGenerationUrl(String),
}

/// Combine a Pokémon payload and its species payload into one record.
///
/// Missing numeric fields become 0, missing optional labels become `None`.
/// Types, the primary sprite, the color and a parseable generation URL are
/// required.
pub fn normalize(pokemon: &Pokemon, species: &Species) -> Result<PokemonRecord, NormalizeError> {
    let types = pokemon.type_names();
    if types.is_empty() {
        return Err(NormalizeError::NoTypes(pokemon.id));
    }

    let sprite_url = pokemon
        .sprites
        .front_default
        .clone()
        .ok_or(NormalizeError::MissingSprite(pokemon.id))?;

    let color = species
        .color
        .as_ref()
        .map(|c| c.name.clone())
        .ok_or(NormalizeError::MissingColor(pokemon.id))?;

    let generation = generation_from_url(&species.generation.url)?;

    let stat = |name: &str| pokemon.base_stat(name).unwrap_or(0);

    Ok(PokemonRecord {
        id: pokemon.id,
        name: pokemon.name.clone(),
        types,
        height: pokemon.height,
        weight: pokemon.weight,
        base_experience: pokemon.base_experience.unwrap_or(0),
        is_legendary: species.is_legendary,
        is_mythical: species.is_mythical,
        generation,
        sprite_url,
        sprite_shiny: pokemon.sprites.front_shiny.clone(),
        stats: BaseStats {
            hp: stat("hp"),
            attack: stat("attack"),
            defense: stat("defense"),
            special_attack: stat("special-attack"),
            special_defense: stat("special-defense"),
            speed: stat("speed"),
        },
        abilities: pokemon
            .abilities
            .iter()
            .map(|a| a.ability.name.clone())
            .collect(),
        color,
        habitat: species.habitat.as_ref().map(|h| h.name.clone()),
        shape: species.shape.as_ref().map(|s| s.name.clone()),
    })
}

/// Generation number from the last non-empty path segment,
/// e.g. `https://pokeapi.co/api/v2/generation/4/` -> 4.
pub fn generation_from_url(raw: &str) -> Result<u32, NormalizeError> {
    let bad = || NormalizeError::BadGenerationUrl(raw.to_string());
    let url = Url::parse(raw).map_err(|_| bad())?;
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .and_then(|segment| segment.parse::<u32>().ok())
        .filter(|generation| *generation > 0)
        .ok_or_else(bad)
}
