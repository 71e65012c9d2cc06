// Box-score ingestion: raw sheet CSV → typed per-game records.
//
// The sheet is maintained by hand, so the parser is deliberately forgiving
// about the numeric columns: a core stat column that is absent reads as
// all-zero, and an unparseable cell reads as zero. The identity columns
// (Type, Player/Team, Team Name) are the only hard requirements — without
// them the rows cannot be grouped at all.

use std::collections::HashMap;
use tracing::debug;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Whether a row records a player's game or a team's game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowType {
    Player,
    Team,
}

/// One row of the source sheet: a single player's or team's line for a
/// single game, with `pie` derived at ingest so aggregation can sum it
/// like any other stat.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub row_type: RowType,
    /// Player name for player rows, team name for team rows.
    pub name: String,
    /// Team affiliation, present on both row types.
    pub team: String,
    pub game_id: i64,
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub fga: f64,
    /// 1.0 for a win, 0.0 otherwise; only meaningful on team rows.
    pub win: f64,
    /// Production efficiency: PTS+REB+AST+STL+BLK − 0.5·FGA.
    pub pie: f64,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("missing required column `{name}`")]
    MissingColumn { name: String },
}

// ---------------------------------------------------------------------------
// Column lookup
// ---------------------------------------------------------------------------

/// Header-name → index map built from trimmed header cells.
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();
        Self { index }
    }

    /// Index of an optional (core numeric) column.
    fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Index of a required (identity) column.
    fn require(&self, name: &str) -> Result<usize, IngestError> {
        self.get(name).ok_or_else(|| IngestError::MissingColumn {
            name: name.to_string(),
        })
    }
}

/// Read a numeric cell, coercing anything unparseable (or a missing
/// column/cell) to zero. Non-finite values also read as zero.
fn numeric_cell(record: &csv::StringRecord, col: Option<usize>) -> f64 {
    let Some(idx) = col else { return 0.0 };
    let Some(cell) = record.get(idx) else {
        return 0.0;
    };
    match cell.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn text_cell(record: &csv::StringRecord, col: usize) -> &str {
    record.get(col).unwrap_or("").trim()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the sheet's CSV export into typed records.
///
/// Rows whose `Type` is neither "player" nor "team" (case-insensitive)
/// belong to no subset and are dropped. Every returned record has all
/// core stats populated (zero where the sheet had nothing usable) and
/// `pie` precomputed.
pub fn parse_records(csv_text: &str) -> Result<Vec<RawRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let columns = Columns::from_headers(reader.headers()?);

    let type_col = columns.require("Type")?;
    let name_col = columns.require("Player/Team")?;
    let team_col = columns.require("Team Name")?;

    let pts_col = columns.get("PTS");
    let reb_col = columns.get("REB");
    let ast_col = columns.get("AST");
    let stl_col = columns.get("STL");
    let blk_col = columns.get("BLK");
    let fga_col = columns.get("FGA");
    let game_col = columns.get("Game_ID");
    let win_col = columns.get("Win");

    let mut records = Vec::new();

    for result in reader.records() {
        let record = result?;

        let type_text = text_cell(&record, type_col);
        let row_type = if type_text.eq_ignore_ascii_case("player") {
            RowType::Player
        } else if type_text.eq_ignore_ascii_case("team") {
            RowType::Team
        } else {
            debug!("dropping row with type '{}'", type_text);
            continue;
        };

        let pts = numeric_cell(&record, pts_col);
        let reb = numeric_cell(&record, reb_col);
        let ast = numeric_cell(&record, ast_col);
        let stl = numeric_cell(&record, stl_col);
        let blk = numeric_cell(&record, blk_col);
        let fga = numeric_cell(&record, fga_col);

        records.push(RawRecord {
            row_type,
            name: text_cell(&record, name_col).to_string(),
            team: text_cell(&record, team_col).to_string(),
            game_id: numeric_cell(&record, game_col).round() as i64,
            pts,
            reb,
            ast,
            stl,
            blk,
            fga,
            win: numeric_cell(&record, win_col),
            pie: pts + reb + ast + stl + blk - 0.5 * fga,
        });
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Full sheet round-trip --

    #[test]
    fn parses_player_and_team_rows() {
        let csv_data = "\
Type,Player/Team,Team Name,Game_ID,PTS,REB,AST,STL,BLK,FGA,Win
player,Ayo Dosunmu,Hoopers,1,10,5,2,1,0,8,0
team,Hoopers,Hoopers,1,61,30,12,6,2,55,1";

        let records = parse_records(csv_data).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].row_type, RowType::Player);
        assert_eq!(records[0].name, "Ayo Dosunmu");
        assert_eq!(records[0].team, "Hoopers");
        assert_eq!(records[0].game_id, 1);
        assert!((records[0].pts - 10.0).abs() < f64::EPSILON);
        assert!((records[0].pie - 14.0).abs() < f64::EPSILON);

        assert_eq!(records[1].row_type, RowType::Team);
        assert!((records[1].win - 1.0).abs() < f64::EPSILON);
    }

    // -- PIE derived per row --

    #[test]
    fn pie_is_stats_minus_half_fga() {
        let csv_data = "\
Type,Player/Team,Team Name,Game_ID,PTS,REB,AST,STL,BLK,FGA,Win
player,A,X,2,20,3,4,0,1,10,0";

        let records = parse_records(csv_data).unwrap();
        // 20+3+4+0+1 - 0.5*10 = 23
        assert!((records[0].pie - 23.0).abs() < f64::EPSILON);
    }

    // -- Missing core columns synthesize as zero --

    #[test]
    fn missing_core_columns_read_as_zero() {
        let csv_data = "\
Type,Player/Team,Team Name
player,A,X";

        let records = parse_records(csv_data).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].game_id, 0);
        assert_eq!(records[0].pts, 0.0);
        assert_eq!(records[0].reb, 0.0);
        assert_eq!(records[0].fga, 0.0);
        assert_eq!(records[0].win, 0.0);
        assert_eq!(records[0].pie, 0.0);
    }

    // -- Unparseable numerics coerce to zero --

    #[test]
    fn unparseable_cells_coerce_to_zero() {
        let csv_data = "\
Type,Player/Team,Team Name,Game_ID,PTS,REB,AST,STL,BLK,FGA,Win
player,A,X,1,DNP,5,--,1,0,8,";

        let records = parse_records(csv_data).unwrap();
        assert_eq!(records[0].pts, 0.0);
        assert_eq!(records[0].ast, 0.0);
        assert!((records[0].reb - 5.0).abs() < f64::EPSILON);
        // PIE uses the coerced values: 0+5+0+1+0 - 4 = 2
        assert!((records[0].pie - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_cells_coerce_to_zero() {
        let csv_data = "\
Type,Player/Team,Team Name,Game_ID,PTS,REB,AST,STL,BLK,FGA,Win
player,A,X,1,NaN,inf,2,1,0,8,0";

        let records = parse_records(csv_data).unwrap();
        assert_eq!(records[0].pts, 0.0);
        assert_eq!(records[0].reb, 0.0);
    }

    // -- Header whitespace trimmed --

    #[test]
    fn header_whitespace_is_trimmed() {
        let csv_data = "\
 Type , Player/Team ,Team Name, PTS ,REB,AST,STL,BLK,FGA,Game_ID,Win
player,A,X,10,5,2,1,0,8,1,0";

        let records = parse_records(csv_data).unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0].pts - 10.0).abs() < f64::EPSILON);
    }

    // -- Name and team cells trimmed --

    #[test]
    fn name_cells_are_trimmed() {
        let csv_data = "\
Type,Player/Team,Team Name,PTS
player,  Ayo Dosunmu  , Hoopers ,10";

        let records = parse_records(csv_data).unwrap();
        assert_eq!(records[0].name, "Ayo Dosunmu");
        assert_eq!(records[0].team, "Hoopers");
    }

    // -- Unknown row types dropped --

    #[test]
    fn unknown_row_types_are_dropped() {
        let csv_data = "\
Type,Player/Team,Team Name,PTS
player,A,X,10
referee,Z,X,0
PLAYER,B,X,12
Team,X,X,22";

        let records = parse_records(csv_data).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[1].name, "B");
        assert_eq!(records[2].row_type, RowType::Team);
    }

    // -- Missing identity columns are hard errors --

    #[test]
    fn missing_type_column_is_an_error() {
        let csv_data = "\
Player/Team,Team Name,PTS
A,X,10";

        let err = parse_records(csv_data).unwrap_err();
        match &err {
            IngestError::MissingColumn { name } => assert_eq!(name, "Type"),
            other => panic!("expected MissingColumn, got: {other}"),
        }
    }

    #[test]
    fn missing_name_column_is_an_error() {
        let csv_data = "\
Type,Team Name,PTS
player,X,10";

        let err = parse_records(csv_data).unwrap_err();
        match &err {
            IngestError::MissingColumn { name } => assert_eq!(name, "Player/Team"),
            other => panic!("expected MissingColumn, got: {other}"),
        }
    }

    #[test]
    fn missing_team_column_is_an_error() {
        let csv_data = "\
Type,Player/Team,PTS
player,A,10";

        let err = parse_records(csv_data).unwrap_err();
        match &err {
            IngestError::MissingColumn { name } => assert_eq!(name, "Team Name"),
            other => panic!("expected MissingColumn, got: {other}"),
        }
    }

    // -- Header-only sheet --

    #[test]
    fn header_only_sheet_yields_no_records() {
        let csv_data = "Type,Player/Team,Team Name,PTS,REB,AST,STL,BLK,FGA,Game_ID,Win";
        let records = parse_records(csv_data).unwrap();
        assert!(records.is_empty());
    }

    // -- Ragged rows tolerated --

    #[test]
    fn short_rows_read_missing_cells_as_zero() {
        let csv_data = "\
Type,Player/Team,Team Name,Game_ID,PTS,REB
player,A,X,1,10";

        let records = parse_records(csv_data).unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0].pts - 10.0).abs() < f64::EPSILON);
        assert_eq!(records[0].reb, 0.0);
    }
}
