//! Library layer for the Pokédex data service: ingestion, storage, queries and aggregations.
//!
//! Wraps the `pokeapi` client with a throttled batch ingestor, persists
//! normalized records in SQLite, and answers list and dashboard queries.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod query;
pub mod rate_limiter;
pub mod record;
pub mod service;
pub mod source;
pub mod stats;
pub mod validation;

pub use pokeapi;

pub use auth::AdminKeys;
pub use config::PokedexConfig;
pub use db::{Db, DbError, DbPokemonFilter, PokemonPage};
pub use error::PokedexError;
pub use ingest::{
    BatchIngestor, BatchReport, IdRange, IngestMode, IngestReport, IngestSettings, KnownIds,
    RunStats, SeedOutcome,
};
pub use query::{ListParams, Pagination, PokemonList, PokemonQuery};
pub use record::{BaseStats, PokemonRecord, Rarity};
pub use service::{Pokedex, SeedInfo, SharedDb, Store};
pub use source::{PokeApiSource, RecordSource, SourceError};
pub use stats::{DashboardStats, GenerationCount, RarityCounts, TypeCount};
