use anyhow::{Context, Result};
use chrono::NaiveDate;
use rayon::prelude::*;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::rolling::GameRecord;

/// One aggregated standings line per team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team_name: String,
    pub team_abbreviation: String,
    pub games_played: i64,
    pub wins: i64,
    pub losses: i64,
    pub win_percentage: f64,
    pub avg_points: f64,
    pub avg_rebounds: f64,
    pub avg_assists: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeAwayRow {
    pub game_location: String,
    pub games: i64,
    pub wins: i64,
    pub win_percentage: f64,
    pub avg_points: f64,
    pub avg_fg_pct: f64,
}

/// One team game for the performance-over-time view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamGamePoint {
    pub team_name: String,
    pub game_date: NaiveDate,
    pub points: i64,
    pub total_rebounds: i64,
    pub assists: i64,
    pub win_numeric: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeWinsSeries {
    pub team_name: String,
    pub points: Vec<(NaiveDate, u32)>,
}

/// One player game log line: the engine-facing record plus display-only
/// columns and the three per-game shooting percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerGameLogRow {
    pub record: GameRecord,
    pub season: String,
    pub position: String,
    pub minutes: String,
    pub personal_fouls: f64,
    pub plus_minus: f64,
    pub fg_percentage: f64,
    pub three_pt_percentage: f64,
    pub ft_percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub games: usize,
    pub avg_points: f64,
    pub avg_rebounds: f64,
    pub avg_assists: f64,
    pub avg_fg_pct: f64,
}

fn season_placeholders(count: usize, offset: usize) -> String {
    (0..count)
        .map(|i| format!("?{}", i + offset + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bind_values<'a>(seasons: &'a [String], game_type: &'a str) -> Vec<&'a str> {
    let mut out: Vec<&str> = seasons.iter().map(|s| s.as_str()).collect();
    out.push(game_type);
    out
}

pub fn team_standings(
    conn: &Connection,
    seasons: &[String],
    game_type: &str,
) -> Result<Vec<StandingsRow>> {
    if seasons.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        SELECT
            fgs.team_name,
            fgs.team_abbreviation,
            COUNT(*) AS games_played,
            SUM(CASE WHEN fgs.win_loss = 'W' THEN 1 ELSE 0 END) AS wins,
            SUM(CASE WHEN fgs.win_loss = 'L' THEN 1 ELSE 0 END) AS losses,
            ROUND(
                CAST(SUM(CASE WHEN fgs.win_loss = 'W' THEN 1 ELSE 0 END) AS REAL) / COUNT(*) * 100,
                1
            ) AS win_percentage,
            ROUND(AVG(CAST(fgs.points AS REAL)), 1) AS avg_points,
            ROUND(AVG(CAST(fgs.total_rebounds AS REAL)), 1) AS avg_rebounds,
            ROUND(AVG(CAST(fgs.assists AS REAL)), 1) AS avg_assists
        FROM fact_game_stats fgs
        JOIN dim_games dg ON fgs.game_id = dg.game_id
        WHERE fgs.season IN ({placeholders})
            AND dg.game_type = ?{gt}
        GROUP BY fgs.team_name, fgs.team_abbreviation
        ORDER BY win_percentage DESC, wins DESC
        "#,
        placeholders = season_placeholders(seasons.len(), 0),
        gt = seasons.len() + 1,
    );

    let mut stmt = conn.prepare(&sql).context("prepare standings query")?;
    let rows = stmt
        .query_map(
            rusqlite::params_from_iter(bind_values(seasons, game_type)),
            |row| {
                Ok(StandingsRow {
                    team_name: row.get(0)?,
                    team_abbreviation: row.get(1)?,
                    games_played: row.get(2)?,
                    wins: row.get(3)?,
                    losses: row.get(4)?,
                    win_percentage: row.get(5)?,
                    avg_points: row.get(6)?,
                    avg_rebounds: row.get(7)?,
                    avg_assists: row.get(8)?,
                })
            },
        )
        .context("query standings")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode standings row")?);
    }
    Ok(out)
}

pub fn home_away_splits(
    conn: &Connection,
    seasons: &[String],
    game_type: &str,
) -> Result<Vec<HomeAwayRow>> {
    if seasons.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        SELECT
            CASE WHEN fgs.is_home_game = 1 THEN 'Home' ELSE 'Away' END AS game_location,
            COUNT(*) AS games,
            SUM(CASE WHEN fgs.win_loss = 'W' THEN 1 ELSE 0 END) AS wins,
            ROUND(
                CAST(SUM(CASE WHEN fgs.win_loss = 'W' THEN 1 ELSE 0 END) AS REAL) / COUNT(*) * 100,
                1
            ) AS win_percentage,
            ROUND(AVG(CAST(fgs.points AS REAL)), 1) AS avg_points,
            ROUND(AVG(CAST(fgs.field_goal_percentage AS REAL)), 3) AS avg_fg_pct
        FROM fact_game_stats fgs
        JOIN dim_games dg ON fgs.game_id = dg.game_id
        WHERE fgs.season IN ({placeholders})
            AND dg.game_type = ?{gt}
        GROUP BY fgs.is_home_game
        ORDER BY game_location
        "#,
        placeholders = season_placeholders(seasons.len(), 0),
        gt = seasons.len() + 1,
    );

    let mut stmt = conn.prepare(&sql).context("prepare home/away query")?;
    let rows = stmt
        .query_map(
            rusqlite::params_from_iter(bind_values(seasons, game_type)),
            |row| {
                Ok(HomeAwayRow {
                    game_location: row.get(0)?,
                    games: row.get(1)?,
                    wins: row.get(2)?,
                    win_percentage: row.get(3)?,
                    avg_points: row.get(4)?,
                    avg_fg_pct: row.get(5)?,
                })
            },
        )
        .context("query home/away splits")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode home/away row")?);
    }
    Ok(out)
}

pub fn available_seasons(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT season FROM dim_games ORDER BY season ASC")
        .context("prepare seasons query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query seasons")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode season row")?);
    }
    Ok(out)
}

pub fn player_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT DISTINCT player_name
            FROM fact_player_stats
            WHERE player_name IS NOT NULL AND TRIM(player_name) <> ''
            ORDER BY player_name
            "#,
        )
        .context("prepare player names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query player names")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player name row")?);
    }
    Ok(out)
}

pub fn team_performance(
    conn: &Connection,
    teams: &[String],
    seasons: &[String],
    game_type: &str,
) -> Result<Vec<TeamGamePoint>> {
    if teams.is_empty() || seasons.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        SELECT
            fgs.team_name,
            fgs.game_date,
            fgs.points,
            fgs.total_rebounds,
            fgs.assists,
            CASE WHEN fgs.win_loss = 'W' THEN 1 ELSE 0 END AS win_numeric
        FROM fact_game_stats fgs
        JOIN dim_games dg ON fgs.game_id = dg.game_id
        WHERE fgs.season IN ({season_ph})
            AND fgs.team_name IN ({team_ph})
            AND dg.game_type = ?{gt}
        ORDER BY fgs.team_name, fgs.game_date
        "#,
        season_ph = season_placeholders(seasons.len(), 0),
        team_ph = season_placeholders(teams.len(), seasons.len()),
        gt = seasons.len() + teams.len() + 1,
    );

    let mut binds: Vec<&str> = seasons.iter().map(|s| s.as_str()).collect();
    binds.extend(teams.iter().map(|s| s.as_str()));
    binds.push(game_type);

    let mut stmt = conn.prepare(&sql).context("prepare team performance query")?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(binds), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })
        .context("query team performance")?;

    let mut out = Vec::new();
    for row in rows {
        let (team_name, date_raw, points, total_rebounds, assists, win_numeric) =
            row.context("decode team performance row")?;
        let Ok(game_date) = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d") else {
            continue;
        };
        out.push(TeamGamePoint {
            team_name,
            game_date,
            points,
            total_rebounds,
            assists,
            win_numeric,
        });
    }
    Ok(out)
}

/// Cumulative wins per team over its date-ordered games. Teams are
/// independent, so the fold runs per team in parallel.
pub fn cumulative_wins(points: &[TeamGamePoint]) -> Vec<CumulativeWinsSeries> {
    let mut team_names: Vec<&str> = points.iter().map(|p| p.team_name.as_str()).collect();
    team_names.sort_unstable();
    team_names.dedup();

    let mut series: Vec<CumulativeWinsSeries> = team_names
        .par_iter()
        .map(|team| {
            let mut games: Vec<&TeamGamePoint> = points
                .iter()
                .filter(|p| p.team_name == *team)
                .collect();
            games.sort_by(|a, b| a.game_date.cmp(&b.game_date));
            let mut total = 0u32;
            let points = games
                .iter()
                .map(|g| {
                    total += g.win_numeric as u32;
                    (g.game_date, total)
                })
                .collect();
            CumulativeWinsSeries {
                team_name: (*team).to_string(),
                points,
            }
        })
        .collect();
    series.sort_by(|a, b| a.team_name.cmp(&b.team_name));
    series
}

/// Player game log filtered by case-insensitive substring match on the
/// player name. Warehouse stat cells are TEXT; anything unparseable is
/// coerced to 0 before the rows reach the rolling engine.
pub fn player_game_log(
    conn: &Connection,
    player_name: &str,
    seasons: &[String],
    game_type: &str,
) -> Result<Vec<PlayerGameLogRow>> {
    if player_name.trim().is_empty() || seasons.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        SELECT
            fps.game_date,
            fps.player_name,
            fps.position,
            fps.minutes,
            fps.points,
            fps.rebounds,
            fps.assists,
            fps.steals,
            fps.blocks,
            fps.field_goals_made,
            fps.field_goals_attempted,
            fps.three_pointers_made,
            fps.three_pointers_attempted,
            fps.free_throws_made,
            fps.free_throws_attempted,
            fps.turnovers,
            fps.personal_fouls,
            fps.plus_minus,
            fps.season
        FROM fact_player_stats fps
        JOIN dim_games dg ON fps.game_id = dg.game_id
        WHERE INSTR(LOWER(fps.player_name), LOWER(?{name})) > 0
            AND fps.season IN ({placeholders})
            AND dg.game_type = ?{gt}
        ORDER BY fps.game_date DESC, fps.rowid DESC
        "#,
        placeholders = season_placeholders(seasons.len(), 1),
        name = 1,
        gt = seasons.len() + 2,
    );

    let mut binds: Vec<&str> = vec![player_name];
    binds.extend(seasons.iter().map(|s| s.as_str()));
    binds.push(game_type);

    let mut stmt = conn.prepare(&sql).context("prepare player log query")?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(binds), |row| {
            let mut cells: Vec<String> = Vec::with_capacity(19);
            for idx in 0..19 {
                cells.push(row.get::<_, String>(idx)?);
            }
            Ok(cells)
        })
        .context("query player log")?;

    let mut out = Vec::new();
    for row in rows {
        let cells = row.context("decode player log row")?;
        let Ok(game_date) = NaiveDate::parse_from_str(&cells[0], "%Y-%m-%d") else {
            continue;
        };
        let record = GameRecord {
            game_date,
            subject_name: cells[1].clone(),
            points: coerce_stat(&cells[4]),
            rebounds: coerce_stat(&cells[5]),
            assists: coerce_stat(&cells[6]),
            steals: coerce_stat(&cells[7]),
            blocks: coerce_stat(&cells[8]),
            field_goals_made: coerce_stat(&cells[9]),
            field_goals_attempted: coerce_stat(&cells[10]),
            three_pointers_made: coerce_stat(&cells[11]),
            three_pointers_attempted: coerce_stat(&cells[12]),
            free_throws_made: coerce_stat(&cells[13]),
            free_throws_attempted: coerce_stat(&cells[14]),
            turnovers: coerce_stat(&cells[15]),
        };
        let [fg_percentage, three_pt_percentage, ft_percentage] = record.ratio_pcts();
        out.push(PlayerGameLogRow {
            record,
            season: cells[18].clone(),
            position: cells[2].clone(),
            minutes: cells[3].clone(),
            personal_fouls: coerce_stat(&cells[16]),
            plus_minus: coerce_stat(&cells[17]),
            fg_percentage,
            three_pt_percentage,
            ft_percentage,
        });
    }
    Ok(out)
}

/// Season-to-date summary tiles. The FG% tile averages the per-game
/// percentages, matching the summary header; the rolling view derives its
/// percentages from window means instead.
pub fn game_log_summary(rows: &[PlayerGameLogRow]) -> PlayerSummary {
    if rows.is_empty() {
        return PlayerSummary::default();
    }
    let n = rows.len() as f64;
    PlayerSummary {
        games: rows.len(),
        avg_points: rows.iter().map(|r| r.record.points).sum::<f64>() / n,
        avg_rebounds: rows.iter().map(|r| r.record.rebounds).sum::<f64>() / n,
        avg_assists: rows.iter().map(|r| r.record.assists).sum::<f64>() / n,
        avg_fg_pct: rows.iter().map(|r| r.fg_percentage).sum::<f64>() / n,
    }
}

/// Warehouse stat cells are strings; empty or malformed cells count as 0.
fn coerce_stat(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_stat_handles_malformed_cells() {
        assert_eq!(coerce_stat("12"), 12.0);
        assert_eq!(coerce_stat(" 7 "), 7.0);
        assert_eq!(coerce_stat(""), 0.0);
        assert_eq!(coerce_stat("-"), 0.0);
        assert_eq!(coerce_stat("DNP"), 0.0);
    }

    #[test]
    fn cumulative_wins_accumulate_per_team() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        let point = |team: &str, day, win| TeamGamePoint {
            team_name: team.to_string(),
            game_date: d(day),
            points: 100,
            total_rebounds: 40,
            assists: 25,
            win_numeric: win,
        };
        let points = vec![
            point("Nuggets", 3, 1),
            point("Nuggets", 1, 1),
            point("Lakers", 2, 0),
            point("Nuggets", 2, 0),
            point("Lakers", 1, 1),
        ];
        let series = cumulative_wins(&points);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].team_name, "Lakers");
        assert_eq!(series[0].points, vec![(d(1), 1), (d(2), 1)]);
        assert_eq!(series[1].points, vec![(d(1), 1), (d(2), 1), (d(3), 2)]);
    }
}
