//! The Pokédex service: list, stats and seed over an explicit store.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use crate::auth::AdminKeys;
use crate::cache::TtlCache;
use crate::config::PokedexConfig;
use crate::db::{Db, DbError};
use crate::error::PokedexError;
use crate::ingest::{
    BatchIngestor, BatchReport, IngestMode, IngestReport, IngestSettings, KnownIds, SeedOutcome,
};
use crate::query::{PokemonList, PokemonQuery};
use crate::source::{PokeApiSource, RecordSource};
use crate::stats::DashboardStats;

pub const META_LAST_SEEDED_AT: &str = "last_seeded_at";
pub const META_LAST_SEED_MODE: &str = "last_seed_mode";
pub const META_LAST_SEED_STATS: &str = "last_seed_stats";

const STATS_KEY: &str = "dashboard";

/// A database handle shared between request handlers and ingestion.
#[derive(Clone)]
pub struct SharedDb(Arc<Mutex<Db>>);

impl SharedDb {
    pub fn new(db: Db) -> Self {
        Self(Arc::new(Mutex::new(db)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, Db> {
        self.0.lock().await
    }

    /// Run `f` on the blocking pool while holding the lock.
    pub async fn write<T, F>(&self, f: F) -> Result<T, PokedexError>
    where
        F: FnOnce(&mut Db) -> Result<T, PokedexError> + Send + 'static,
        T: Send + 'static,
    {
        let mut db = Arc::clone(&self.0).lock_owned().await;
        tokio::task::spawn_blocking(move || f(&mut db)).await?
    }
}

#[async_trait]
impl KnownIds for SharedDb {
    async fn contains_id(&self, id: u32) -> Result<bool, DbError> {
        self.lock().await.contains(id)
    }
}

/// Whether a data store is available.
#[derive(Clone)]
pub enum Store {
    Unconfigured,
    Ready(SharedDb),
}

impl Store {
    /// Open and initialize the database at `path`; no path means unconfigured.
    pub fn open(path: Option<&Path>) -> Result<Self, PokedexError> {
        match path {
            None => Ok(Store::Unconfigured),
            Some(path) => {
                let db = Db::open(path)?;
                db.init()?;
                Ok(Store::Ready(SharedDb::new(db)))
            }
        }
    }

    pub fn in_memory() -> Result<Self, PokedexError> {
        let db = Db::open_in_memory()?;
        db.init()?;
        Ok(Store::Ready(SharedDb::new(db)))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Store::Ready(_))
    }

    pub fn db(&self) -> Result<&SharedDb, PokedexError> {
        match self {
            Store::Ready(db) => Ok(db),
            Store::Unconfigured => Err(PokedexError::NotConfigured),
        }
    }
}

/// Bookkeeping from the most recent seed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedInfo {
    pub stored: i64,
    pub last_seeded_at: Option<String>,
    pub last_seed_mode: Option<String>,
}

pub struct Pokedex {
    store: Store,
    source: Arc<dyn RecordSource>,
    settings: IngestSettings,
    admin_keys: AdminKeys,
    stats_cache: TtlCache<&'static str, DashboardStats>,
}

impl Pokedex {
    pub fn new(
        store: Store,
        source: Arc<dyn RecordSource>,
        settings: IngestSettings,
        admin_keys: AdminKeys,
        stats_ttl: Duration,
    ) -> Self {
        Self {
            store,
            source,
            settings,
            admin_keys,
            stats_cache: TtlCache::new(stats_ttl),
        }
    }

    /// Wire a service from configuration: SQLite store plus PokéAPI source.
    pub fn from_config(config: &PokedexConfig) -> Result<Self, PokedexError> {
        let store = Store::open(config.db_path.as_deref())?;
        let client = match config.pokeapi_base_url {
            Some(ref url) => pokeapi::Client::with_base_url(url)?,
            None => pokeapi::Client::new()?,
        };
        if !store.is_configured() {
            tracing::warn!("POKEDEX_DB is not set; running unconfigured");
        }
        Ok(Self::new(
            store,
            Arc::new(PokeApiSource::new(client)),
            config.ingest.clone(),
            AdminKeys::new(config.admin_api_key.clone()),
            config.stats_ttl,
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_configured()
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    pub fn authorize(&self, token: Option<&str>) -> Result<(), PokedexError> {
        match token {
            Some(token) if self.admin_keys.verify(token) => Ok(()),
            _ => Err(PokedexError::Unauthorized),
        }
    }

    pub async fn list(&self, query: &PokemonQuery) -> Result<PokemonList, PokedexError> {
        let db = self.store.db()?.lock().await;
        if db.count()? == 0 {
            return Ok(PokemonList::no_data(query));
        }
        let page = db.query_pokemon(&query.filter, query.page, query.limit)?;
        Ok(PokemonList::from_page(query, page))
    }

    pub async fn stats(&self) -> Result<DashboardStats, PokedexError> {
        let shared = self.store.db()?;
        if let Some(stats) = self.stats_cache.get(&STATS_KEY) {
            return Ok(stats);
        }
        let stats = DashboardStats::collect(&*shared.lock().await)?;
        self.stats_cache.set(STATS_KEY, stats.clone());
        Ok(stats)
    }

    pub async fn seed_info(&self) -> Result<SeedInfo, PokedexError> {
        let db = self.store.db()?.lock().await;
        Ok(SeedInfo {
            stored: db.count()?,
            last_seeded_at: db.get_meta(META_LAST_SEEDED_AT)?,
            last_seed_mode: db.get_meta(META_LAST_SEED_MODE)?,
        })
    }

    /// Run one seed request.
    ///
    /// `Create` refuses when data exists, `Append` continues after the highest
    /// stored id and skips ids already present, `Replace` always starts over.
    /// `limit` is capped at the configured maximum id.
    pub async fn seed<F>(
        &self,
        mode: IngestMode,
        limit: u32,
        observer: F,
    ) -> Result<SeedOutcome, PokedexError>
    where
        F: FnMut(&BatchReport) + Send,
    {
        let shared = self.store.db()?;

        let (existing_count, max_stored) = {
            let db = shared.lock().await;
            (db.count()?, db.max_id()?)
        };
        if mode == IngestMode::Create && existing_count > 0 {
            tracing::info!(
                "Seed refused: {} Pokémon already stored",
                existing_count
            );
            return Ok(SeedOutcome::AlreadyPopulated { existing_count });
        }

        let max_stored = if mode == IngestMode::Append {
            max_stored
        } else {
            None
        };
        let range = mode.plan(limit, max_stored, self.settings.max_id);
        tracing::info!("Seeding Pokémon {} ({} mode)", range, mode);

        let known: Option<&dyn KnownIds> = match mode {
            IngestMode::Append => Some(shared),
            _ => None,
        };
        let ingestor = BatchIngestor::new(Arc::clone(&self.source), self.settings.clone());
        let report = ingestor.run(range, known, observer).await?;

        if report.records.is_empty() {
            return Ok(SeedOutcome::NothingFetched {
                mode,
                existing_count,
                stats: report.stats,
            });
        }

        let IngestReport { records, stats } = report;
        let stats_json = serde_json::to_string(&stats)?;
        let (count, total_count) = shared
            .write(move |db| {
                let count = match mode {
                    IngestMode::Append => db.append_new(&records)?,
                    IngestMode::Create | IngestMode::Replace => db.replace_all(&records)?,
                };
                db.set_meta(META_LAST_SEEDED_AT, &Utc::now().to_rfc3339())?;
                db.set_meta(META_LAST_SEED_MODE, &mode.to_string())?;
                db.set_meta(META_LAST_SEED_STATS, &stats_json)?;
                Ok((count, db.count()?))
            })
            .await?;
        self.stats_cache.clear();

        tracing::info!("Stored {} Pokémon ({} total)", count, total_count);
        Ok(SeedOutcome::Inserted {
            mode,
            count,
            total_count,
            stats,
        })
    }
}
