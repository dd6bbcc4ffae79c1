//! Grouped counts over the stored collection for the dashboard charts.

use serde::{Deserialize, Serialize};

use crate::db::{Db, DbError};

/// Number of Pokémon carrying a given type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub type_name: String,
    pub count: i64,
}

/// Number of Pokémon introduced in a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationCount {
    pub generation: u32,
    pub count: i64,
}

/// Legendary / mythical / normal split.
///
/// `normal` is derived as `total - legendary - mythical`, so the three parts
/// always add up to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityCounts {
    pub legendary: i64,
    pub mythical: i64,
    pub normal: i64,
    pub total: i64,
}

impl RarityCounts {
    pub fn from_totals(total: i64, legendary: i64, mythical: i64) -> Self {
        Self {
            legendary,
            mythical,
            normal: total - legendary - mythical,
            total,
        }
    }
}

/// Everything the dashboard's chart panel needs in one payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub type_counts: Vec<TypeCount>,
    pub rarity_counts: RarityCounts,
    pub generation_counts: Vec<GenerationCount>,
}

impl DashboardStats {
    /// Read all three aggregations. An empty collection yields zeroed output.
    pub fn collect(db: &Db) -> Result<Self, DbError> {
        Ok(Self {
            type_counts: db.aggregate_by_type()?,
            rarity_counts: db.aggregate_by_rarity()?,
            generation_counts: db.aggregate_by_generation()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rarity_counts.total == 0
    }
}
