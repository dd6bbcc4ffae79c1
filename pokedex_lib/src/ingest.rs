//! Batched, throttled ingestion across an identifier range.
//!
//! Ids are walked in fixed-size batches. Inside a batch each fetch is
//! started through a [`DispatchGate`] and left running; the batch is then
//! awaited as a whole, failures dropped, and the controller sleeps the
//! cooldown before the next batch.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::db::DbError;
use crate::rate_limiter::{DispatchGate, RequestTracker, TrackerSummary};
use crate::record::PokemonRecord;
use crate::source::RecordSource;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_DISPATCH_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_BATCH_COOLDOWN: Duration = Duration::from_millis(1000);
/// Highest identifier ingestion will ever request.
pub const MAX_POKEMON_ID: u32 = 1010;
pub const DEFAULT_SEED_LIMIT: u32 = 151;

/// Inclusive identifier range. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdRange {
    pub start: u32,
    pub end: u32,
}

impl IdRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    /// Consecutive sub-ranges of at most `size` ids covering `self`.
    pub fn batches(&self, size: usize) -> Vec<IdRange> {
        let size = size.max(1) as u32;
        let mut out = Vec::new();
        if self.is_empty() {
            return out;
        }
        let mut start = self.start;
        loop {
            let end = start.saturating_add(size - 1).min(self.end);
            out.push(IdRange::new(start, end));
            if end >= self.end {
                break;
            }
            start = end + 1;
        }
        out
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Pacing and bounds for an ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSettings {
    pub batch_size: usize,
    pub dispatch_delay: Duration,
    pub batch_cooldown: Duration,
    pub max_id: u32,
    pub default_limit: u32,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            dispatch_delay: DEFAULT_DISPATCH_DELAY,
            batch_cooldown: DEFAULT_BATCH_COOLDOWN,
            max_id: MAX_POKEMON_ID,
            default_limit: DEFAULT_SEED_LIMIT,
        }
    }
}

/// How a seed run treats what is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Populate an empty collection; refuse when data exists.
    Create,
    /// Continue after the highest stored id, skipping ids already present.
    Append,
    /// Clear and repopulate unconditionally.
    Replace,
}

impl IngestMode {
    /// Label reported back to callers in the `action` field.
    pub fn action(&self) -> &'static str {
        match self {
            IngestMode::Create => "created",
            IngestMode::Append => "added",
            IngestMode::Replace => "replaced",
        }
    }

    /// The ids this mode should fetch for `limit`, given the highest stored id.
    pub fn plan(&self, limit: u32, max_stored: Option<u32>, max_id: u32) -> IdRange {
        let limit = limit.min(max_id);
        match self {
            IngestMode::Append => {
                let start = max_stored.map(|id| id.saturating_add(1)).unwrap_or(1);
                let end = start.saturating_add(limit).saturating_sub(1).min(max_id);
                IdRange::new(start, end)
            }
            IngestMode::Create | IngestMode::Replace => IdRange::new(1, limit),
        }
    }
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IngestMode::Create => "create",
            IngestMode::Append => "append",
            IngestMode::Replace => "replace",
        };
        write!(f, "{}", s)
    }
}

/// Existence lookup used in incremental mode.
#[async_trait]
pub trait KnownIds: Send + Sync {
    async fn contains_id(&self, id: u32) -> Result<bool, DbError>;
}

/// What happened in one batch, handed to the run observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub index: usize,
    pub total_batches: usize,
    pub range: IdRange,
    pub dispatched: usize,
    pub fetched: usize,
    pub failed: usize,
    pub skipped_existing: usize,
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub batches: usize,
    pub dispatched: usize,
    pub skipped_existing: usize,
    pub failed: usize,
    pub requests: TrackerSummary,
}

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub records: Vec<PokemonRecord>,
    pub stats: RunStats,
}

/// Result of a seed request as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SeedOutcome {
    /// Create mode found data already stored and did nothing.
    AlreadyPopulated { existing_count: i64 },
    /// The run finished without a single usable record.
    NothingFetched {
        mode: IngestMode,
        existing_count: i64,
        stats: RunStats,
    },
    Inserted {
        mode: IngestMode,
        count: usize,
        total_count: i64,
        stats: RunStats,
    },
}

impl SeedOutcome {
    pub fn message(&self) -> String {
        match self {
            SeedOutcome::AlreadyPopulated { existing_count } => {
                format!("{} Pokémon already exist in the database", existing_count)
            }
            SeedOutcome::NothingFetched { mode, .. } => match mode {
                IngestMode::Append => "No new Pokémon found to add".to_string(),
                _ => "Could not fetch any Pokémon data".to_string(),
            },
            SeedOutcome::Inserted { mode, count, .. } => match mode {
                IngestMode::Append => format!("{} Pokémon added successfully", count),
                _ => format!("{} Pokémon inserted successfully", count),
            },
        }
    }
}

/// Drives a [`RecordSource`] across an [`IdRange`].
pub struct BatchIngestor {
    source: Arc<dyn RecordSource>,
    settings: IngestSettings,
    gate: DispatchGate,
}

impl BatchIngestor {
    pub fn new(source: Arc<dyn RecordSource>, settings: IngestSettings) -> Self {
        let gate = DispatchGate::new(settings.dispatch_delay);
        Self {
            source,
            settings,
            gate,
        }
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Fetch every id in `range`.
    ///
    /// With `known` set, ids it reports as present are skipped without a
    /// fetch. Unavailable ids are dropped; only a failing `known` lookup
    /// aborts the run.
    pub async fn run<F>(
        &self,
        range: IdRange,
        known: Option<&dyn KnownIds>,
        mut observer: F,
    ) -> Result<IngestReport, DbError>
    where
        F: FnMut(&BatchReport) + Send,
    {
        let batches = range.batches(self.settings.batch_size);
        let tracker = RequestTracker::new();
        let mut records = Vec::new();
        let mut stats = RunStats {
            batches: batches.len(),
            ..Default::default()
        };

        tracing::info!(
            "Ingesting ids {} in {} batch(es) of up to {}",
            range,
            batches.len(),
            self.settings.batch_size
        );
        self.gate.reset().await;

        for (index, batch) in batches.iter().enumerate() {
            tracing::debug!("Processing batch {}", batch);
            let mut report = BatchReport {
                index,
                total_batches: batches.len(),
                range: *batch,
                dispatched: 0,
                fetched: 0,
                failed: 0,
                skipped_existing: 0,
            };

            let mut in_flight = Vec::with_capacity(batch.len());
            for id in batch.ids() {
                if let Some(known) = known {
                    if known.contains_id(id).await? {
                        tracing::debug!("Pokemon {} already stored, skipping", id);
                        report.skipped_existing += 1;
                        continue;
                    }
                }
                self.gate.acquire().await;
                let source = Arc::clone(&self.source);
                in_flight.push((id, tokio::spawn(async move { source.fetch_record(id).await })));
                report.dispatched += 1;
            }

            for (id, handle) in in_flight {
                match handle.await {
                    Ok(Some(record)) => {
                        tracker.record_success();
                        report.fetched += 1;
                        records.push(record);
                    }
                    Ok(None) => {
                        tracker.record_failure();
                        report.failed += 1;
                    }
                    Err(e) => {
                        tracing::error!("Fetch task for pokemon {} failed: {}", id, e);
                        tracker.record_failure();
                        report.failed += 1;
                    }
                }
            }

            stats.dispatched += report.dispatched;
            stats.skipped_existing += report.skipped_existing;
            stats.failed += report.failed;
            observer(&report);

            if batch.end < range.end && !self.settings.batch_cooldown.is_zero() {
                tracker.record_cooldown(self.settings.batch_cooldown);
                tokio::time::sleep(self.settings.batch_cooldown).await;
            }
        }

        stats.requests = tracker.summary();
        tracing::info!(
            "Ingestion finished: {} fetched, {} failed, {} skipped",
            records.len(),
            stats.failed,
            stats.skipped_existing
        );
        Ok(IngestReport { records, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::record;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    struct FakeSource {
        failing: HashSet<u32>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(failing: &[u32]) -> Arc<Self> {
            Arc::new(Self {
                failing: failing.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RecordSource for FakeSource {
        async fn fetch_record(&self, id: u32) -> Option<PokemonRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&id) {
                None
            } else {
                Some(record(id, &format!("mon-{}", id), &["normal"]))
            }
        }
    }

    /// Each fetch takes `latency` before answering.
    struct SlowSource {
        latency: Duration,
    }

    #[async_trait]
    impl RecordSource for SlowSource {
        async fn fetch_record(&self, id: u32) -> Option<PokemonRecord> {
            tokio::time::sleep(self.latency).await;
            Some(record(id, &format!("mon-{}", id), &["normal"]))
        }
    }

    struct Stored(HashSet<u32>);

    #[async_trait]
    impl KnownIds for Stored {
        async fn contains_id(&self, id: u32) -> Result<bool, DbError> {
            Ok(self.0.contains(&id))
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl KnownIds for BrokenStore {
        async fn contains_id(&self, _id: u32) -> Result<bool, DbError> {
            Err(DbError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    fn ingestor(source: Arc<FakeSource>) -> BatchIngestor {
        BatchIngestor::new(source, IngestSettings::default())
    }

    #[test]
    fn batches_cover_range() {
        let b = IdRange::new(1, 25).batches(10);
        assert_eq!(
            b,
            vec![IdRange::new(1, 10), IdRange::new(11, 20), IdRange::new(21, 25)]
        );
        assert!(IdRange::new(5, 4).batches(10).is_empty());
        assert_eq!(IdRange::new(7, 7).batches(10), vec![IdRange::new(7, 7)]);
    }

    #[test]
    fn plan_create_caps_at_max() {
        assert_eq!(IngestMode::Create.plan(151, Some(40), 1010), IdRange::new(1, 151));
        assert_eq!(IngestMode::Create.plan(5000, None, 1010), IdRange::new(1, 1010));
    }

    #[test]
    fn plan_append_continues_after_highest_id() {
        assert_eq!(IngestMode::Append.plan(10, Some(151), 1010), IdRange::new(152, 161));
        assert_eq!(IngestMode::Append.plan(10, None, 1010), IdRange::new(1, 10));
        assert_eq!(IngestMode::Append.plan(100, Some(1000), 1010), IdRange::new(1001, 1010));
        assert!(IngestMode::Append.plan(10, Some(1010), 1010).is_empty());
    }

    #[tokio::test]
    async fn single_batch_for_ten_ids() {
        tokio::time::pause();
        let source = FakeSource::new(&[]);
        let mut seen = Vec::new();
        let report = ingestor(source.clone())
            .run(IdRange::new(1, 10), None, |b| seen.push(b.clone()))
            .await
            .unwrap();
        assert_eq!(report.stats.batches, 1);
        assert_eq!(seen.len(), 1);
        assert!(report.records.len() <= 10);
        assert_eq!(report.records.len(), 10);
        assert_eq!(source.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn failing_id_is_dropped() {
        tokio::time::pause();
        let report = ingestor(FakeSource::new(&[3]))
            .run(IdRange::new(1, 5), None, |_| {})
            .await
            .unwrap();
        let ids: Vec<u32> = report.records.iter().map(|r| r.id).collect();
        assert_eq!(report.records.len(), 4);
        assert!(!ids.contains(&3));
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.stats.requests.requests_succeeded, 4);
        assert_eq!(report.stats.requests.requests_failed, 1);
    }

    #[tokio::test]
    async fn known_ids_are_skipped_without_fetch() {
        tokio::time::pause();
        let source = FakeSource::new(&[]);
        let stored = Stored([2, 4].into_iter().collect());
        let report = ingestor(source.clone())
            .run(IdRange::new(1, 5), Some(&stored), |_| {})
            .await
            .unwrap();
        assert_eq!(report.stats.skipped_existing, 2);
        assert_eq!(report.stats.dispatched, 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn storage_error_aborts_run() {
        tokio::time::pause();
        let result = ingestor(FakeSource::new(&[]))
            .run(IdRange::new(1, 5), Some(&BrokenStore), |_| {})
            .await;
        assert!(matches!(result, Err(DbError::Sqlite(_))));
    }

    #[tokio::test]
    async fn cooldown_only_between_batches() {
        tokio::time::pause();
        let start = Instant::now();
        let report = ingestor(FakeSource::new(&[]))
            .run(IdRange::new(1, 20), None, |_| {})
            .await
            .unwrap();
        let elapsed = start.elapsed();
        assert_eq!(report.stats.batches, 2);
        assert_eq!(report.stats.requests.total_cooldown_secs, 1.0);
        // 9 gaps in batch one, cooldown, 9 gaps in batch two.
        assert!(elapsed >= Duration::from_millis(2800), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(3800), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn fetches_in_a_batch_overlap() {
        tokio::time::pause();
        let source = Arc::new(SlowSource {
            latency: Duration::from_millis(500),
        });
        let start = Instant::now();
        let report = BatchIngestor::new(source, IngestSettings::default())
            .run(IdRange::new(1, 10), None, |_| {})
            .await
            .unwrap();
        let elapsed = start.elapsed();
        assert_eq!(report.records.len(), 10);
        // last dispatch at 900 ms, answered 500 ms later
        assert!(elapsed >= Duration::from_millis(1400), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(2000), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn empty_range_does_nothing() {
        let report = ingestor(FakeSource::new(&[]))
            .run(IdRange::new(11, 10), None, |_| panic!("no batches expected"))
            .await
            .unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.stats.batches, 0);
    }
}
