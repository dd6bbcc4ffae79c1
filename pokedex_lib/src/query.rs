//! Turning raw list parameters into a validated storage query.

use serde::{Deserialize, Serialize};

use crate::db::{DbPokemonFilter, PokemonPage};
use crate::error::PokedexError;
use crate::record::PokemonRecord;
use crate::validation;

/// Raw list parameters as they arrive on the query string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub legendary: Option<String>,
    pub generation: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A validated list request.
#[derive(Debug, Clone, PartialEq)]
pub struct PokemonQuery {
    pub filter: DbPokemonFilter,
    pub page: u32,
    pub limit: u32,
}

impl Default for PokemonQuery {
    fn default() -> Self {
        Self {
            filter: DbPokemonFilter::default(),
            page: 1,
            limit: validation::DEFAULT_PAGE_SIZE,
        }
    }
}

impl TryFrom<&ListParams> for PokemonQuery {
    type Error = PokedexError;

    fn try_from(params: &ListParams) -> Result<Self, Self::Error> {
        let mut query = PokemonQuery::default();
        if let Some(ref name) = params.name {
            query.filter.name = validation::validate_name(name)?;
        }
        if let Some(ref type_name) = params.type_name {
            query.filter.type_name = validation::validate_type(type_name)?;
        }
        if let Some(ref rarity) = params.legendary {
            query.filter.rarity = validation::validate_rarity(rarity)?;
        }
        if let Some(ref generation) = params.generation {
            query.filter.generation = validation::validate_generation(generation)?;
        }
        if let Some(ref page) = params.page {
            query.page = validation::validate_page(page)?;
        }
        if let Some(ref limit) = params.limit {
            query.limit = validation::validate_limit(limit)?;
        }
        Ok(query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_i = i64::from(limit.max(1));
        Self {
            page,
            limit,
            total,
            pages: (total + limit_i - 1) / limit_i,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(1, validation::DEFAULT_PAGE_SIZE, 0)
    }
}

/// One page of a list request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokemonList {
    pub records: Vec<PokemonRecord>,
    pub pagination: Pagination,
    /// Set when the collection itself is empty, as opposed to no matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub const NO_DATA_MESSAGE: &str = "No Pokémon data in the database yet";

impl PokemonList {
    pub fn from_page(query: &PokemonQuery, page: PokemonPage) -> Self {
        Self {
            records: page.records,
            pagination: Pagination::new(query.page, query.limit, page.total),
            message: None,
        }
    }

    pub fn empty(query: &PokemonQuery) -> Self {
        Self {
            records: Vec::new(),
            pagination: Pagination::new(query.page, query.limit, 0),
            message: None,
        }
    }

    /// Empty collection: no records, zero total, and the "no data yet" note.
    pub fn no_data(query: &PokemonQuery) -> Self {
        Self {
            message: Some(NO_DATA_MESSAGE.to_string()),
            ..Self::empty(query)
        }
    }
}
