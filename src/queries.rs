// Stateless queries over the aggregate tables: leaderboards, the
// single-game record book, head-to-head comparisons, and the ticker.
// These only read the engine's outputs; nothing here mutates state.

use crate::aggregate::{PlayerAggregate, TeamAggregate};
use crate::ingest::RawRecord;

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

/// The rate categories (plus PIE) a leaderboard can rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatCategory {
    PtsPerGame,
    RebPerGame,
    AstPerGame,
    StlPerGame,
    BlkPerGame,
    Pie,
}

impl StatCategory {
    pub const ALL: [StatCategory; 6] = [
        StatCategory::PtsPerGame,
        StatCategory::RebPerGame,
        StatCategory::AstPerGame,
        StatCategory::StlPerGame,
        StatCategory::BlkPerGame,
        StatCategory::Pie,
    ];

    /// The rate categories that feed the ticker (PIE excluded).
    pub const RATES: [StatCategory; 5] = [
        StatCategory::PtsPerGame,
        StatCategory::AstPerGame,
        StatCategory::RebPerGame,
        StatCategory::StlPerGame,
        StatCategory::BlkPerGame,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatCategory::PtsPerGame => "PTS/G",
            StatCategory::RebPerGame => "REB/G",
            StatCategory::AstPerGame => "AST/G",
            StatCategory::StlPerGame => "STL/G",
            StatCategory::BlkPerGame => "BLK/G",
            StatCategory::Pie => "PIE",
        }
    }

    pub fn value(self, player: &PlayerAggregate) -> f64 {
        match self {
            StatCategory::PtsPerGame => player.pts_pg,
            StatCategory::RebPerGame => player.reb_pg,
            StatCategory::AstPerGame => player.ast_pg,
            StatCategory::StlPerGame => player.stl_pg,
            StatCategory::BlkPerGame => player.blk_pg,
            StatCategory::Pie => player.pie,
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderRow {
    pub name: String,
    pub team: String,
    pub value: f64,
}

/// Top `k` players by `category`, descending. Fewer than `k` rows come
/// back when the table is smaller than `k`.
pub fn leaders(players: &[PlayerAggregate], category: StatCategory, k: usize) -> Vec<LeaderRow> {
    let mut ranked: Vec<&PlayerAggregate> = players.iter().collect();
    ranked.sort_by(|a, b| category.value(b).total_cmp(&category.value(a)));
    ranked
        .into_iter()
        .take(k)
        .map(|p| LeaderRow {
            name: p.name.clone(),
            team: p.team.clone(),
            value: category.value(p),
        })
        .collect()
}

/// One line per rate category naming its leader, for the ticker strip.
pub fn ticker_lines(players: &[PlayerAggregate]) -> Vec<String> {
    StatCategory::RATES
        .iter()
        .filter_map(|&cat| {
            let top = leaders(players, cat, 1);
            top.first()
                .map(|l| format!("{}: {} ({})", cat.label(), l.name, l.value))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Record book
// ---------------------------------------------------------------------------

/// A single-game league record: who and how many.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub name: String,
    pub value: f64,
}

/// Best single-game marks across the raw player rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBook {
    pub pts: StatRecord,
    pub reb: StatRecord,
    pub stl: StatRecord,
    pub blk: StatRecord,
}

fn max_row<'a>(rows: &'a [RawRecord], stat: impl Fn(&RawRecord) -> f64) -> Option<&'a RawRecord> {
    rows.iter().max_by(|a, b| stat(a).total_cmp(&stat(b)))
}

/// The record book, or `None` when there are no player rows at all.
pub fn record_book(raw_players: &[RawRecord]) -> Option<RecordBook> {
    let record = |stat: fn(&RawRecord) -> f64| {
        max_row(raw_players, stat).map(|r| StatRecord {
            name: r.name.clone(),
            value: stat(r),
        })
    };

    Some(RecordBook {
        pts: record(|r| r.pts)?,
        reb: record(|r| r.reb)?,
        stl: record(|r| r.stl)?,
        blk: record(|r| r.blk)?,
    })
}

/// A player's game log, most recent game first.
pub fn player_history(raw_players: &[RawRecord], name: &str) -> Vec<RawRecord> {
    let mut rows: Vec<RawRecord> = raw_players
        .iter()
        .filter(|r| r.name == name)
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.game_id.cmp(&a.game_id));
    rows
}

// ---------------------------------------------------------------------------
// Head-to-head comparisons
// ---------------------------------------------------------------------------

/// One stat line of a comparison: each side's value plus the signed edge
/// for side A, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatDelta {
    pub a: f64,
    pub b: f64,
    pub delta: f64,
}

fn delta(a: f64, b: f64) -> StatDelta {
    StatDelta {
        a,
        b,
        delta: ((a - b) * 10.0).round() / 10.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerComparison {
    pub pts_pg: StatDelta,
    pub reb_pg: StatDelta,
    pub ast_pg: StatDelta,
    pub pie: StatDelta,
}

pub fn compare_players(a: &PlayerAggregate, b: &PlayerAggregate) -> PlayerComparison {
    PlayerComparison {
        pts_pg: delta(a.pts_pg, b.pts_pg),
        reb_pg: delta(a.reb_pg, b.reb_pg),
        ast_pg: delta(a.ast_pg, b.ast_pg),
        pie: delta(a.pie, b.pie),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamComparison {
    pub pts_avg: StatDelta,
    pub reb_avg: StatDelta,
    pub ast_avg: StatDelta,
}

pub fn compare_teams(a: &TeamAggregate, b: &TeamAggregate) -> TeamComparison {
    TeamComparison {
        pts_avg: delta(a.pts_avg, b.pts_avg),
        reb_avg: delta(a.reb_avg, b.reb_avg),
        ast_avg: delta(a.ast_avg, b.ast_avg),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
