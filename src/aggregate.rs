// Season aggregation over per-game records: player averages and team
// standings. Recomputed in full on every refresh, never incrementally.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::ingest::{RawRecord, RowType};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One row per unique (player, team) pair: season totals plus per-game
/// rates. Rates are rounded to one decimal for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAggregate {
    pub name: String,
    pub team: String,
    /// Games played: distinct game count across the player's rows.
    pub gp: u32,
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub fga: f64,
    pub pie: f64,
    pub pts_pg: f64,
    pub reb_pg: f64,
    pub ast_pg: f64,
    pub stl_pg: f64,
    pub blk_pg: f64,
}

/// One row per team: win/loss record plus season totals and per-game
/// averages.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamAggregate {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    /// Team-row count, which doubles as games played.
    pub games: u32,
    /// Display form "W-L".
    pub record: String,
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub pts_avg: f64,
    pub reb_avg: f64,
    pub ast_avg: f64,
    pub stl_avg: f64,
    pub blk_avg: f64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round to one decimal place for display-grade rates.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-game rate with the zero-games guard: a player with no counted
/// games gets a 0.0 rate rather than a division fault.
fn per_game(sum: f64, games: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }
    round1(sum / games as f64)
}

#[derive(Debug, Clone, Copy, Default)]
struct StatSums {
    pts: f64,
    reb: f64,
    ast: f64,
    stl: f64,
    blk: f64,
    fga: f64,
    win: f64,
    pie: f64,
}

impl StatSums {
    fn add(&mut self, r: &RawRecord) {
        self.pts += r.pts;
        self.reb += r.reb;
        self.ast += r.ast;
        self.stl += r.stl;
        self.blk += r.blk;
        self.fga += r.fga;
        self.win += r.win;
        self.pie += r.pie;
    }
}

// ---------------------------------------------------------------------------
// Player aggregation
// ---------------------------------------------------------------------------

/// Aggregate the player subset of `records` into per-player season rows.
///
/// Games played is a distinct-game count keyed by player name alone, so a
/// player who changed teams mid-season shows the same overall GP on each
/// of their (player, team) rows. Output is sorted by (name, team).
pub fn player_aggregates(records: &[RawRecord]) -> Vec<PlayerAggregate> {
    let players = records.iter().filter(|r| r.row_type == RowType::Player);

    let mut games_by_name: HashMap<&str, HashSet<i64>> = HashMap::new();
    let mut sums: BTreeMap<(String, String), StatSums> = BTreeMap::new();

    for r in players {
        games_by_name
            .entry(r.name.as_str())
            .or_default()
            .insert(r.game_id);
        sums.entry((r.name.clone(), r.team.clone()))
            .or_default()
            .add(r);
    }

    sums.into_iter()
        .map(|((name, team), s)| {
            let gp = games_by_name
                .get(name.as_str())
                .map(|g| g.len() as u32)
                .unwrap_or(0);
            PlayerAggregate {
                pts_pg: per_game(s.pts, gp),
                reb_pg: per_game(s.reb, gp),
                ast_pg: per_game(s.ast, gp),
                stl_pg: per_game(s.stl, gp),
                blk_pg: per_game(s.blk, gp),
                name,
                team,
                gp,
                pts: s.pts,
                reb: s.reb,
                ast: s.ast,
                stl: s.stl,
                blk: s.blk,
                fga: s.fga,
                pie: s.pie,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Team aggregation
// ---------------------------------------------------------------------------

/// Aggregate the team subset of `records` into standings rows.
///
/// Wins are clamped to the row count so the record string never shows a
/// negative loss column on malformed data. Output is sorted by team name.
pub fn team_aggregates(records: &[RawRecord]) -> Vec<TeamAggregate> {
    let teams = records.iter().filter(|r| r.row_type == RowType::Team);

    let mut sums: BTreeMap<String, (u32, StatSums)> = BTreeMap::new();

    for r in teams {
        let entry = sums.entry(r.team.clone()).or_default();
        entry.0 += 1;
        entry.1.add(r);
    }

    sums.into_iter()
        .map(|(team, (games, s))| {
            let wins = (s.win.round().max(0.0) as u32).min(games);
            let losses = games - wins;
            TeamAggregate {
                record: format!("{wins}-{losses}"),
                pts_avg: per_game(s.pts, games),
                reb_avg: per_game(s.reb, games),
                ast_avg: per_game(s.ast, games),
                stl_avg: per_game(s.stl, games),
                blk_avg: per_game(s.blk, games),
                team,
                wins,
                losses,
                games,
                pts: s.pts,
                reb: s.reb,
                ast: s.ast,
                stl: s.stl,
                blk: s.blk,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
