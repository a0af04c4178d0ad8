use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::RowAccessor;
use rusqlite::Connection;

use crate::warehouse::{PlayerGameRow, TeamGameRow, upsert_game, upsert_player_game, upsert_team_game};

/// Column order expected in team game parquet files:
/// game_id, season, game_date, game_type, team_name, team_abbreviation,
/// points, total_rebounds, assists, win_loss, is_home_game,
/// field_goal_percentage.
pub const TEAM_GAME_COLUMNS: usize = 12;

/// Column order expected in player game parquet files:
/// game_id, season, game_date, game_type, player_name, position, minutes,
/// points, rebounds, assists, steals, blocks, turnovers, personal_fouls,
/// plus_minus, field_goals_made, field_goals_attempted,
/// three_pointers_made, three_pointers_attempted, free_throws_made,
/// free_throws_attempted.
pub const PLAYER_GAME_COLUMNS: usize = 21;

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub file: PathBuf,
    pub rows_upserted: usize,
    pub rows_skipped: usize,
}

pub fn ingest_team_games(conn: &mut Connection, path: &Path) -> Result<IngestReport> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = SerializedFileReader::new(file).context("open parquet reader team games")?;
    let iter = reader.get_row_iter(None).context("iterate team game rows")?;

    let mut upserted = 0usize;
    let mut skipped = 0usize;

    let tx = conn.transaction().context("begin team ingest transaction")?;
    for row in iter {
        let Ok(row) = row else {
            skipped += 1;
            continue;
        };
        let game_id = read_cell(&row, 0);
        let season = read_cell(&row, 1);
        let game_date = read_cell(&row, 2);
        let team_name = read_cell(&row, 4);
        if game_id.is_empty() || game_date.is_empty() || team_name.is_empty() {
            skipped += 1;
            continue;
        }
        let game_type = non_empty_or(read_cell(&row, 3), "Regular Season");
        upsert_game(&tx, &game_id, &season, &game_date, &game_type)?;

        let win_loss = read_cell(&row, 9)
            .chars()
            .next()
            .unwrap_or('L')
            .to_ascii_uppercase();
        upsert_team_game(
            &tx,
            &TeamGameRow {
                game_id,
                season,
                game_date,
                team_name,
                team_abbreviation: read_cell(&row, 5),
                points: read_num(&row, 6) as i64,
                total_rebounds: read_num(&row, 7) as i64,
                assists: read_num(&row, 8) as i64,
                win_loss,
                is_home_game: read_flag(&row, 10),
                field_goal_percentage: read_num(&row, 11),
            },
        )?;
        upserted += 1;
    }
    tx.commit().context("commit team ingest transaction")?;

    Ok(IngestReport {
        file: path.to_path_buf(),
        rows_upserted: upserted,
        rows_skipped: skipped,
    })
}

pub fn ingest_player_games(conn: &mut Connection, path: &Path) -> Result<IngestReport> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = SerializedFileReader::new(file).context("open parquet reader player games")?;
    let iter = reader.get_row_iter(None).context("iterate player game rows")?;

    let mut upserted = 0usize;
    let mut skipped = 0usize;

    let tx = conn.transaction().context("begin player ingest transaction")?;
    for row in iter {
        let Ok(row) = row else {
            skipped += 1;
            continue;
        };
        let game_id = read_cell(&row, 0);
        let season = read_cell(&row, 1);
        let game_date = read_cell(&row, 2);
        let player_name = read_cell(&row, 4);
        if game_id.is_empty() || game_date.is_empty() || player_name.is_empty() {
            skipped += 1;
            continue;
        }
        let game_type = non_empty_or(read_cell(&row, 3), "Regular Season");
        upsert_game(&tx, &game_id, &season, &game_date, &game_type)?;

        // Stat cells stay textual: the query layer owns coercion, exactly as
        // it does for rows that arrive through the demo seeder.
        upsert_player_game(
            &tx,
            &PlayerGameRow {
                game_id,
                season,
                game_date,
                player_name,
                position: read_cell(&row, 5),
                minutes: read_cell(&row, 6),
                points: read_cell(&row, 7),
                rebounds: read_cell(&row, 8),
                assists: read_cell(&row, 9),
                steals: read_cell(&row, 10),
                blocks: read_cell(&row, 11),
                turnovers: read_cell(&row, 12),
                personal_fouls: read_cell(&row, 13),
                plus_minus: read_cell(&row, 14),
                field_goals_made: read_cell(&row, 15),
                field_goals_attempted: read_cell(&row, 16),
                three_pointers_made: read_cell(&row, 17),
                three_pointers_attempted: read_cell(&row, 18),
                free_throws_made: read_cell(&row, 19),
                free_throws_attempted: read_cell(&row, 20),
            },
        )?;
        upserted += 1;
    }
    tx.commit().context("commit player ingest transaction")?;

    Ok(IngestReport {
        file: path.to_path_buf(),
        rows_upserted: upserted,
        rows_skipped: skipped,
    })
}

fn read_cell(row: &parquet::record::Row, idx: usize) -> String {
    if let Ok(v) = row.get_string(idx) {
        return v.trim().to_string();
    }
    if let Ok(v) = row.get_long(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.get_int(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.get_double(idx) {
        return v.to_string();
    }
    String::new()
}

fn read_num(row: &parquet::record::Row, idx: usize) -> f64 {
    if let Ok(v) = row.get_double(idx) {
        return v;
    }
    if let Ok(v) = row.get_long(idx) {
        return v as f64;
    }
    if let Ok(v) = row.get_int(idx) {
        return v as f64;
    }
    if let Ok(v) = row.get_string(idx) {
        return v.trim().parse::<f64>().unwrap_or(0.0);
    }
    0.0
}

fn read_flag(row: &parquet::record::Row, idx: usize) -> bool {
    if let Ok(v) = row.get_bool(idx) {
        return v;
    }
    read_num(row, idx) != 0.0
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
