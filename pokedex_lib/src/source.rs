//! Where ingestion gets its records from.

use async_trait::async_trait;
use pokeapi::Client;

use crate::normalize::{normalize, NormalizeError};
use crate::record::PokemonRecord;

/// Something that can produce one normalized record per identifier.
///
/// `None` means "unavailable": the caller skips the id and moves on.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_record(&self, id: u32) -> Option<PokemonRecord>;
}

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Api(#[from] pokeapi::Error),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Record source backed by the PokéAPI: the Pokémon payload, then the
/// species payload it links to.
pub struct PokeApiSource {
    client: Client,
}

impl PokeApiSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn try_fetch_record(&self, id: u32) -> Result<PokemonRecord, SourceError> {
        let pokemon = self.client.get_pokemon(id).await?;
        let species = self
            .client
            .get_species_by_url(&pokemon.species.url)
            .await?;
        Ok(normalize(&pokemon, &species)?)
    }
}

#[async_trait]
impl RecordSource for PokeApiSource {
    async fn fetch_record(&self, id: u32) -> Option<PokemonRecord> {
        match self.try_fetch_record(id).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping pokemon {}: {}", id, e);
                None
            }
        }
    }
}
