//! SQLite storage for the Pokédex collection.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use serde::Serialize;

use crate::record::{BaseStats, PokemonRecord, Rarity};
use crate::stats::{GenerationCount, RarityCounts, TypeCount};

const SCHEMA_VERSION: i32 = 1;

const SELECT_COLUMNS: &str = "p.id, p.name, p.types, p.height, p.weight, p.base_experience,
        p.is_legendary, p.is_mythical, p.generation, p.sprite_url, p.sprite_shiny,
        p.hp, p.attack, p.defense, p.special_attack, p.special_defense, p.speed,
        p.abilities, p.color, p.habitat, p.shape";

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), DbError> {
        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;
        ensure_indexes(&self.conn)?;

        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>, DbError> {
        self.conn
            .query_row(
                "SELECT value FROM ingest_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO ingest_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM pokemon", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Highest stored identifier, or `None` for an empty collection.
    pub fn max_id(&self) -> Result<Option<u32>, DbError> {
        let max: Option<u32> = self
            .conn
            .query_row("SELECT MAX(id) FROM pokemon", [], |row| row.get(0))?;
        Ok(max)
    }

    pub fn contains(&self, id: u32) -> Result<bool, DbError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM pokemon WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get(&self, id: u32) -> Result<Option<PokemonRecord>, DbError> {
        let sql = format!("SELECT {} FROM pokemon p WHERE p.id = ?1", SELECT_COLUMNS);
        self.conn
            .query_row(&sql, params![id], map_record)
            .optional()
            .map_err(DbError::from)
    }

    /// Clear the collection and insert `records` in one transaction, then
    /// rebuild the lookup indexes. Returns the number of rows inserted.
    ///
    /// Repeated identifiers inside `records` are inserted once (first wins).
    pub fn replace_all(&mut self, records: &[PokemonRecord]) -> Result<usize, DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM pokemon_types", [])?;
        tx.execute("DELETE FROM pokemon", [])?;

        let mut seen = HashSet::with_capacity(records.len());
        let mut inserted = 0;
        for record in records {
            if !seen.insert(record.id) {
                tracing::warn!("Duplicate pokemon id {} in replace batch, skipping", record.id);
                continue;
            }
            insert_record(&tx, record)?;
            inserted += 1;
        }
        tx.commit()?;

        self.rebuild_indexes()?;
        Ok(inserted)
    }

    /// Insert only the records whose identifier is not stored yet.
    /// Returns the number of rows inserted; running it twice is a no-op.
    pub fn append_new(&mut self, records: &[PokemonRecord]) -> Result<usize, DbError> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut exists = tx.prepare("SELECT 1 FROM pokemon WHERE id = ?1")?;
            for record in records {
                if exists.exists(params![record.id])? {
                    tracing::debug!("Pokemon {} already stored, skipping", record.id);
                    continue;
                }
                insert_record(&tx, record)?;
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn rebuild_indexes(&self) -> Result<(), DbError> {
        ensure_indexes(&self.conn)?;
        self.conn
            .execute_batch("REINDEX pokemon; REINDEX pokemon_types;")?;
        Ok(())
    }

    /// One page of records matching `filter`, ordered by id, plus the total
    /// number of matches independent of paging.
    pub fn query_pokemon(
        &self,
        filter: &DbPokemonFilter,
        page: u32,
        page_size: u32,
    ) -> Result<PokemonPage, DbError> {
        let (where_sql, params_vec) = build_where(filter);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let count_sql = format!("SELECT COUNT(1) FROM pokemon p WHERE 1=1{}", where_sql);
        let total: i64 = self
            .conn
            .query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let sql = format!(
            "SELECT {} FROM pokemon p WHERE 1=1{} ORDER BY p.id ASC LIMIT {} OFFSET {}",
            SELECT_COLUMNS, where_sql, page_size, offset
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), map_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(PokemonPage { records, total })
    }

    /// Type label counts, most common first.
    pub fn aggregate_by_type(&self) -> Result<Vec<TypeCount>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT type_name, COUNT(1) AS cnt
             FROM pokemon_types
             GROUP BY type_name
             ORDER BY cnt DESC, type_name ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TypeCount {
                type_name: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn aggregate_by_rarity(&self) -> Result<RarityCounts, DbError> {
        let (total, legendary, mythical): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(1),
                    COALESCE(SUM(is_legendary), 0),
                    COALESCE(SUM(is_mythical), 0)
             FROM pokemon",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok(RarityCounts::from_totals(total, legendary, mythical))
    }

    /// Counts per generation, ascending by generation.
    pub fn aggregate_by_generation(&self) -> Result<Vec<GenerationCount>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT generation, COUNT(1)
             FROM pokemon
             GROUP BY generation
             ORDER BY generation ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(GenerationCount {
                generation: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

fn ensure_indexes(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_pokemon_name ON pokemon(name);
         CREATE INDEX IF NOT EXISTS idx_pokemon_types_type ON pokemon_types(type_name);
         CREATE INDEX IF NOT EXISTS idx_pokemon_legendary ON pokemon(is_legendary);
         CREATE INDEX IF NOT EXISTS idx_pokemon_mythical ON pokemon(is_mythical);
         CREATE INDEX IF NOT EXISTS idx_pokemon_generation ON pokemon(generation);
         CREATE UNIQUE INDEX IF NOT EXISTS idx_pokemon_id ON pokemon(id);",
    )?;
    Ok(())
}

/// Plain INSERT: a second insert of the same id fails on the unique index.
fn insert_record(tx: &Transaction<'_>, record: &PokemonRecord) -> Result<(), DbError> {
    let mut stmt_pokemon = tx.prepare_cached(
        "INSERT INTO pokemon (
           id, name, types, height, weight, base_experience,
           is_legendary, is_mythical, generation, sprite_url, sprite_shiny,
           hp, attack, defense, special_attack, special_defense, speed,
           abilities, color, habitat, shape
         )
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
    )?;
    stmt_pokemon.execute(params![
        record.id,
        record.name,
        serde_json::to_string(&record.types)?,
        record.height,
        record.weight,
        record.base_experience,
        record.is_legendary,
        record.is_mythical,
        record.generation,
        record.sprite_url,
        record.sprite_shiny,
        record.stats.hp,
        record.stats.attack,
        record.stats.defense,
        record.stats.special_attack,
        record.stats.special_defense,
        record.stats.speed,
        serde_json::to_string(&record.abilities)?,
        record.color,
        record.habitat,
        record.shape
    ])?;

    let mut stmt_types = tx.prepare_cached(
        "INSERT INTO pokemon_types (pokemon_id, slot, type_name) VALUES (?1, ?2, ?3)",
    )?;
    for (slot, type_name) in record.types.iter().enumerate() {
        stmt_types.execute(params![record.id, slot as i64 + 1, type_name])?;
    }
    Ok(())
}

fn build_where(filter: &DbPokemonFilter) -> (String, Vec<Box<dyn rusqlite::types::ToSql>>) {
    let mut sql = String::new();
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(ref name) = filter.name {
        params_vec.push(Box::new(format!("%{}%", escape_like(name))));
        sql.push_str(&format!(" AND p.name LIKE ?{} ESCAPE '\\'", params_vec.len()));
    }
    if let Some(ref type_name) = filter.type_name {
        params_vec.push(Box::new(type_name.clone()));
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM pokemon_types t WHERE t.pokemon_id = p.id AND t.type_name = ?{})",
            params_vec.len()
        ));
    }
    match filter.rarity {
        Some(Rarity::Legendary) => sql.push_str(" AND p.is_legendary = 1"),
        Some(Rarity::Mythical) => sql.push_str(" AND p.is_mythical = 1"),
        Some(Rarity::Normal) => sql.push_str(" AND p.is_legendary = 0 AND p.is_mythical = 0"),
        None => {}
    }
    if let Some(generation) = filter.generation {
        params_vec.push(Box::new(generation));
        sql.push_str(&format!(" AND p.generation = ?{}", params_vec.len()));
    }

    (sql, params_vec)
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<PokemonRecord> {
    Ok(PokemonRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        types: json_list(row, 2)?,
        height: row.get(3)?,
        weight: row.get(4)?,
        base_experience: row.get(5)?,
        is_legendary: row.get(6)?,
        is_mythical: row.get(7)?,
        generation: row.get(8)?,
        sprite_url: row.get(9)?,
        sprite_shiny: row.get(10)?,
        stats: BaseStats {
            hp: row.get(11)?,
            attack: row.get(12)?,
            defense: row.get(13)?,
            special_attack: row.get(14)?,
            special_defense: row.get(15)?,
            speed: row.get(16)?,
        },
        abilities: json_list(row, 17)?,
        color: row.get(18)?,
        habitat: row.get(19)?,
        shape: row.get(20)?,
    })
}

/// Filter parameters for [`Db::query_pokemon`]. All set fields must match.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DbPokemonFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Exact type label the Pokémon must carry.
    pub type_name: Option<String>,
    pub rarity: Option<Rarity>,
    pub generation: Option<u32>,
}

/// A page of records returned by [`Db::query_pokemon`].
#[derive(Debug, Clone, Serialize)]
pub struct PokemonPage {
    pub records: Vec<PokemonRecord>,
    pub total: i64,
}
