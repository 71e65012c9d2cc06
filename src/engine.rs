// Aggregation engine: cached fetch → ingest → aggregate.
//
// `load()` surfaces a typed `DataError` so callers can decide their own
// fallback; `load_or_empty()` reproduces the dashboard contract where any
// failure collapses to three empty tables.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::aggregate::{self, PlayerAggregate, TeamAggregate};
use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::Config;
use crate::ingest::{self, IngestError, RawRecord, RowType};
use crate::source::{BoxScoreSource, FetchError, HttpSource};

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

/// The three derived views the presentation layer reads: per-player
/// season aggregates, the raw player rows for drill-down, and team
/// standings. Owned by the engine's output; callers get clones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub players: Vec<PlayerAggregate>,
    pub raw_players: Vec<RawRecord>,
    pub teams: Vec<TeamAggregate>,
}

impl Tables {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.raw_players.is_empty() && self.teams.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Everything that can make the box-score data unavailable.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("bad sheet data: {0}")]
    Ingest(#[from] IngestError),
}

// ---------------------------------------------------------------------------
// StatEngine
// ---------------------------------------------------------------------------

/// Owns the source, the TTL cache, and the clock the cache expires by.
pub struct StatEngine {
    source: Box<dyn BoxScoreSource>,
    clock: Box<dyn Clock>,
    cache: TtlCache<Tables>,
}

impl StatEngine {
    pub fn new(source: Box<dyn BoxScoreSource>, cache_ttl: Duration) -> Self {
        Self::with_clock(source, cache_ttl, Box::new(SystemClock))
    }

    /// Constructor with an injected clock, for tests that move time by hand.
    pub fn with_clock(
        source: Box<dyn BoxScoreSource>,
        cache_ttl: Duration,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            source,
            clock,
            cache: TtlCache::new(cache_ttl),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Box::new(HttpSource::from_config(config)), config.cache_ttl)
    }

    /// Produce the three derived tables, reusing the cached result when it
    /// is younger than the TTL. Only successful results are cached, so a
    /// transient failure does not pin the dashboard to empty for a whole
    /// cache window.
    pub async fn load(&mut self) -> Result<Tables, DataError> {
        let now = self.clock.now();
        if let Some(tables) = self.cache.get(now) {
            debug!("serving box scores from cache");
            return Ok(tables);
        }

        let csv_text = self.source.fetch_csv().await?;
        let records = ingest::parse_records(&csv_text)?;

        let tables = Tables {
            players: aggregate::player_aggregates(&records),
            teams: aggregate::team_aggregates(&records),
            raw_players: records
                .into_iter()
                .filter(|r| r.row_type == RowType::Player)
                .collect(),
        };

        info!(
            players = tables.players.len(),
            teams = tables.teams.len(),
            games_rows = tables.raw_players.len(),
            "box scores refreshed"
        );

        self.cache.put(tables.clone(), self.clock.now());
        Ok(tables)
    }

    /// The blanket policy the dashboard renders against: any failure
    /// becomes three empty tables, logged but not surfaced.
    pub async fn load_or_empty(&mut self) -> Tables {
        match self.load().await {
            Ok(tables) => tables,
            Err(e) => {
                warn!("box-score load failed, rendering empty: {e}");
                Tables::default()
            }
        }
    }

    /// Drop the cached slot so the next load re-fetches regardless of age.
    pub fn refresh(&mut self) {
        self.cache.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    const SHEET: &str = "\
Type,Player/Team,Team Name,Game_ID,PTS,REB,AST,STL,BLK,FGA,Win
player,A,X,1,10,5,2,1,0,8,0
player,A,X,2,20,3,4,0,1,10,0
team,X,X,1,61,30,12,6,2,55,1
team,X,X,2,48,25,9,4,1,50,0";

    /// Source test double: hands out scripted responses and counts calls.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<String, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<String, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn fetch_error() -> FetchError {
            FetchError::Status {
                url: "https://example.com/export.csv".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            }
        }
    }

    #[async_trait]
    impl BoxScoreSource for Arc<ScriptedSource> {
        async fn fetch_csv(&self) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ScriptedSource::fetch_error()))
        }
    }

    /// Clock test double backed by a shared, manually advanced instant.
    #[derive(Clone)]
    struct ManualClock(Arc<Mutex<Instant>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Arc::new(Mutex::new(Instant::now())))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock().unwrap()
        }
    }

    fn engine_with(
        responses: Vec<Result<String, FetchError>>,
    ) -> (StatEngine, Arc<ScriptedSource>, ManualClock) {
        let source = ScriptedSource::new(responses);
        let clock = ManualClock::new();
        let engine = StatEngine::with_clock(
            Box::new(source.clone()),
            Duration::from_secs(60),
            Box::new(clock.clone()),
        );
        (engine, source, clock)
    }

    // -- End-to-end load --

    #[tokio::test]
    async fn load_produces_all_three_tables() {
        let (mut engine, _, _) = engine_with(vec![Ok(SHEET.to_string())]);

        let tables = engine.load().await.unwrap();

        assert_eq!(tables.players.len(), 1);
        let a = &tables.players[0];
        assert_eq!(a.gp, 2);
        assert!((a.pts - 30.0).abs() < f64::EPSILON);
        assert!((a.pts_pg - 15.0).abs() < f64::EPSILON);
        assert!((a.pie - 37.0).abs() < f64::EPSILON);

        assert_eq!(tables.raw_players.len(), 2);
        assert!(tables
            .raw_players
            .iter()
            .all(|r| r.row_type == RowType::Player));

        assert_eq!(tables.teams.len(), 1);
        assert_eq!(tables.teams[0].record, "1-1");
    }

    // -- Cache behavior --

    #[tokio::test]
    async fn second_load_within_ttl_reuses_cache() {
        let (mut engine, source, _) = engine_with(vec![Ok(SHEET.to_string())]);

        let first = engine.load().await.unwrap();
        let second = engine.load().await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn load_after_ttl_refetches() {
        let (mut engine, source, clock) =
            engine_with(vec![Ok(SHEET.to_string()), Ok(SHEET.to_string())]);

        engine.load().await.unwrap();
        clock.advance(Duration::from_secs(60));
        engine.load().await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn refresh_forces_refetch_within_ttl() {
        let (mut engine, source, _) =
            engine_with(vec![Ok(SHEET.to_string()), Ok(SHEET.to_string())]);

        engine.load().await.unwrap();
        engine.refresh();
        engine.load().await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let (mut engine, source, _) = engine_with(vec![
            Err(ScriptedSource::fetch_error()),
            Ok(SHEET.to_string()),
        ]);

        assert!(engine.load().await.is_err());
        // Still inside the TTL window; the failure must not occupy the slot.
        let tables = engine.load().await.unwrap();
        assert_eq!(source.calls(), 2);
        assert!(!tables.is_empty());
    }

    // -- Error taxonomy --

    #[tokio::test]
    async fn fetch_failure_is_a_fetch_error() {
        let (mut engine, _, _) = engine_with(vec![Err(ScriptedSource::fetch_error())]);

        let err = engine.load().await.unwrap_err();
        assert!(matches!(err, DataError::Fetch(_)));
    }

    #[tokio::test]
    async fn missing_identity_column_is_an_ingest_error() {
        let sheet = "Player/Team,Team Name,PTS\nA,X,10";
        let (mut engine, _, _) = engine_with(vec![Ok(sheet.to_string())]);

        let err = engine.load().await.unwrap_err();
        assert!(matches!(err, DataError::Ingest(_)));
    }

    // -- Core columns synthesized through the full pipeline --

    #[tokio::test]
    async fn missing_core_columns_yield_zero_aggregates() {
        let sheet = "\
Type,Player/Team,Team Name
player,A,X
team,X,X";
        let (mut engine, _, _) = engine_with(vec![Ok(sheet.to_string())]);

        let tables = engine.load().await.unwrap();
        let a = &tables.players[0];
        assert_eq!(a.pts, 0.0);
        assert_eq!(a.pts_pg, 0.0);
        assert_eq!(a.pie, 0.0);

        let x = &tables.teams[0];
        assert_eq!(x.wins, 0);
        assert_eq!(x.games, 1);
        assert_eq!(x.record, "0-1");
    }

    // -- Blanket policy --

    #[tokio::test]
    async fn load_or_empty_collapses_failure_to_empty_tables() {
        let (mut engine, _, _) = engine_with(vec![Err(ScriptedSource::fetch_error())]);

        let tables = engine.load_or_empty().await;
        assert!(tables.is_empty());
    }

    #[tokio::test]
    async fn load_or_empty_passes_through_success() {
        let (mut engine, _, _) = engine_with(vec![Ok(SHEET.to_string())]);

        let tables = engine.load_or_empty().await;
        assert!(!tables.is_empty());
    }
}
