use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::query_cache::app_cache_dir;

/// One team's line for one game.
#[derive(Debug, Clone)]
pub struct TeamGameRow {
    pub game_id: String,
    pub season: String,
    pub game_date: String,
    pub team_name: String,
    pub team_abbreviation: String,
    pub points: i64,
    pub total_rebounds: i64,
    pub assists: i64,
    pub win_loss: char,
    pub is_home_game: bool,
    pub field_goal_percentage: f64,
}

/// One player's line for one game. Stat cells are TEXT in the warehouse, as
/// in the upstream export; the query layer coerces them to numbers.
#[derive(Debug, Clone, Default)]
pub struct PlayerGameRow {
    pub game_id: String,
    pub season: String,
    pub game_date: String,
    pub player_name: String,
    pub position: String,
    pub minutes: String,
    pub points: String,
    pub rebounds: String,
    pub assists: String,
    pub steals: String,
    pub blocks: String,
    pub turnovers: String,
    pub personal_fouls: String,
    pub plus_minus: String,
    pub field_goals_made: String,
    pub field_goals_attempted: String,
    pub three_pointers_made: String,
    pub three_pointers_attempted: String,
    pub free_throws_made: String,
    pub free_throws_attempted: String,
}

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("HOOPS_DB") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    app_cache_dir().map(|dir| dir.join("hoops_warehouse.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS dim_games (
            game_id TEXT PRIMARY KEY,
            season TEXT NOT NULL,
            game_date TEXT NOT NULL,
            game_type TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_dim_games_season ON dim_games(season);
        CREATE INDEX IF NOT EXISTS idx_dim_games_type ON dim_games(game_type);

        CREATE TABLE IF NOT EXISTS fact_game_stats (
            game_id TEXT NOT NULL,
            season TEXT NOT NULL,
            game_date TEXT NOT NULL,
            team_name TEXT NOT NULL,
            team_abbreviation TEXT NOT NULL,
            points INTEGER NOT NULL,
            total_rebounds INTEGER NOT NULL,
            assists INTEGER NOT NULL,
            win_loss TEXT NOT NULL,
            is_home_game INTEGER NOT NULL,
            field_goal_percentage REAL NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (game_id, team_name)
        );
        CREATE INDEX IF NOT EXISTS idx_game_stats_team ON fact_game_stats(team_name);
        CREATE INDEX IF NOT EXISTS idx_game_stats_season ON fact_game_stats(season);
        CREATE INDEX IF NOT EXISTS idx_game_stats_date ON fact_game_stats(game_date);

        CREATE TABLE IF NOT EXISTS fact_player_stats (
            game_id TEXT NOT NULL,
            season TEXT NOT NULL,
            game_date TEXT NOT NULL,
            player_name TEXT NOT NULL,
            position TEXT NOT NULL,
            minutes TEXT NOT NULL,
            points TEXT NOT NULL,
            rebounds TEXT NOT NULL,
            assists TEXT NOT NULL,
            steals TEXT NOT NULL,
            blocks TEXT NOT NULL,
            turnovers TEXT NOT NULL,
            personal_fouls TEXT NOT NULL,
            plus_minus TEXT NOT NULL,
            field_goals_made TEXT NOT NULL,
            field_goals_attempted TEXT NOT NULL,
            three_pointers_made TEXT NOT NULL,
            three_pointers_attempted TEXT NOT NULL,
            free_throws_made TEXT NOT NULL,
            free_throws_attempted TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (game_id, player_name)
        );
        CREATE INDEX IF NOT EXISTS idx_player_stats_name ON fact_player_stats(player_name);
        CREATE INDEX IF NOT EXISTS idx_player_stats_season ON fact_player_stats(season);
        CREATE INDEX IF NOT EXISTS idx_player_stats_date ON fact_player_stats(game_date);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn upsert_game(
    tx: &rusqlite::Transaction<'_>,
    game_id: &str,
    season: &str,
    game_date: &str,
    game_type: &str,
) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO dim_games (game_id, season, game_date, game_type, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(game_id) DO UPDATE SET
            season = excluded.season,
            game_date = excluded.game_date,
            game_type = excluded.game_type,
            updated_at = excluded.updated_at
        "#,
        params![game_id, season, game_date, game_type, Utc::now().to_rfc3339()],
    )
    .context("upsert dim_games row")?;
    Ok(())
}

pub fn upsert_team_game(tx: &rusqlite::Transaction<'_>, row: &TeamGameRow) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO fact_game_stats (
            game_id, season, game_date, team_name, team_abbreviation,
            points, total_rebounds, assists, win_loss, is_home_game,
            field_goal_percentage, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(game_id, team_name) DO UPDATE SET
            season = excluded.season,
            game_date = excluded.game_date,
            team_abbreviation = excluded.team_abbreviation,
            points = excluded.points,
            total_rebounds = excluded.total_rebounds,
            assists = excluded.assists,
            win_loss = excluded.win_loss,
            is_home_game = excluded.is_home_game,
            field_goal_percentage = excluded.field_goal_percentage,
            updated_at = excluded.updated_at
        "#,
        params![
            row.game_id,
            row.season,
            row.game_date,
            row.team_name,
            row.team_abbreviation,
            row.points,
            row.total_rebounds,
            row.assists,
            row.win_loss.to_string(),
            row.is_home_game as i64,
            row.field_goal_percentage,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert fact_game_stats row")?;
    Ok(())
}

pub fn upsert_player_game(tx: &rusqlite::Transaction<'_>, row: &PlayerGameRow) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO fact_player_stats (
            game_id, season, game_date, player_name, position, minutes,
            points, rebounds, assists, steals, blocks, turnovers,
            personal_fouls, plus_minus,
            field_goals_made, field_goals_attempted,
            three_pointers_made, three_pointers_attempted,
            free_throws_made, free_throws_attempted, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11, ?12,
            ?13, ?14,
            ?15, ?16, ?17, ?18, ?19, ?20, ?21
        )
        ON CONFLICT(game_id, player_name) DO UPDATE SET
            season = excluded.season,
            game_date = excluded.game_date,
            position = excluded.position,
            minutes = excluded.minutes,
            points = excluded.points,
            rebounds = excluded.rebounds,
            assists = excluded.assists,
            steals = excluded.steals,
            blocks = excluded.blocks,
            turnovers = excluded.turnovers,
            personal_fouls = excluded.personal_fouls,
            plus_minus = excluded.plus_minus,
            field_goals_made = excluded.field_goals_made,
            field_goals_attempted = excluded.field_goals_attempted,
            three_pointers_made = excluded.three_pointers_made,
            three_pointers_attempted = excluded.three_pointers_attempted,
            free_throws_made = excluded.free_throws_made,
            free_throws_attempted = excluded.free_throws_attempted,
            updated_at = excluded.updated_at
        "#,
        params![
            row.game_id,
            row.season,
            row.game_date,
            row.player_name,
            row.position,
            row.minutes,
            row.points,
            row.rebounds,
            row.assists,
            row.steals,
            row.blocks,
            row.turnovers,
            row.personal_fouls,
            row.plus_minus,
            row.field_goals_made,
            row.field_goals_attempted,
            row.three_pointers_made,
            row.three_pointers_attempted,
            row.free_throws_made,
            row.free_throws_attempted,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert fact_player_stats row")?;
    Ok(())
}
