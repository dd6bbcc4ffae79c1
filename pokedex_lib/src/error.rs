//! Error types for the library layer.

use std::fmt;

use crate::db::DbError;

/// Errors produced by the library layer, wrapping storage and upstream API
/// errors and adding configuration, authorization and input failures.
#[derive(Debug)]
pub enum PokedexError {
    /// No data store is configured; every operation fails closed.
    NotConfigured,
    /// The admin token did not match.
    Unauthorized,
    /// An error from the underlying API client.
    Api(pokeapi::Error),
    /// A storage operation failed.
    Db(DbError),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
    /// A spawned storage task panicked or was cancelled.
    Task(tokio::task::JoinError),
}

impl fmt::Display for PokedexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "data store is not configured (set POKEDEX_DB)"),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Db(e) => write!(f, "Storage error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Task(e) => write!(f, "Storage task failed: {}", e),
        }
    }
}

impl std::error::Error for PokedexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Db(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::Task(e) => Some(e),
            _ => None,
        }
    }
}

impl From<pokeapi::Error> for PokedexError {
    fn from(e: pokeapi::Error) -> Self {
        Self::Api(e)
    }
}

impl From<DbError> for PokedexError {
    fn from(e: DbError) -> Self {
        Self::Db(e)
    }
}

impl From<serde_json::Error> for PokedexError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

impl From<tokio::task::JoinError> for PokedexError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e)
    }
}
