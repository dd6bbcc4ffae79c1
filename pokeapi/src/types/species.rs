//! Species resource returned by `/pokemon-species/{id}`.

use serde::{Deserialize, Serialize};

use super::NamedResource;

/// Classification metadata for a species.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Species {
    pub name: String,

    #[serde(default)]
    pub is_legendary: bool,

    #[serde(default)]
    pub is_mythical: bool,

    /// Generation reference, e.g. `https://pokeapi.co/api/v2/generation/1/`.
    pub generation: NamedResource,

    pub color: Option<NamedResource>,

    pub habitat: Option<NamedResource>,

    pub shape: Option<NamedResource>,
}
