use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

use crate::warehouse::{PlayerGameRow, TeamGameRow, upsert_game, upsert_player_game, upsert_team_game};

const TEAMS: [(&str, &str); 10] = [
    ("Denver Nuggets", "DEN"),
    ("Los Angeles Lakers", "LAL"),
    ("Boston Celtics", "BOS"),
    ("Golden State Warriors", "GSW"),
    ("Milwaukee Bucks", "MIL"),
    ("Phoenix Suns", "PHX"),
    ("Miami Heat", "MIA"),
    ("Dallas Mavericks", "DAL"),
    ("New York Knicks", "NYK"),
    ("Oklahoma City Thunder", "OKC"),
];

// Two rotation players per team keeps the player screens populated without
// ballooning the demo database.
const PLAYERS: [(&str, &str, &str); 20] = [
    ("Denver Nuggets", "Nikola Jovanovic", "C"),
    ("Denver Nuggets", "Jalen Rivers", "PG"),
    ("Los Angeles Lakers", "Marcus Delaney", "SF"),
    ("Los Angeles Lakers", "Theo Branch", "PF"),
    ("Boston Celtics", "Casey Whitfield", "SG"),
    ("Boston Celtics", "Dario Lennox", "PF"),
    ("Golden State Warriors", "Wes Calloway", "PG"),
    ("Golden State Warriors", "Ibrahim Sall", "C"),
    ("Milwaukee Bucks", "Yannis Adeyemi", "PF"),
    ("Milwaukee Bucks", "Grant Kowalski", "SG"),
    ("Phoenix Suns", "Devon Marsh", "SF"),
    ("Phoenix Suns", "Luka Petrov", "PG"),
    ("Miami Heat", "Andre Boyette", "C"),
    ("Miami Heat", "Silas Crane", "SG"),
    ("Dallas Mavericks", "Rohan Iyer", "PG"),
    ("Dallas Mavericks", "Tomas Vesely", "C"),
    ("New York Knicks", "Elijah Brantley", "SF"),
    ("New York Knicks", "Moses Okafor", "PF"),
    ("Oklahoma City Thunder", "Shane Gilchrist", "SG"),
    ("Oklahoma City Thunder", "Keon Whitaker", "PG"),
];

const SEASONS: [(&str, i32); 2] = [("2022-23", 2022), ("2023-24", 2023)];

#[derive(Debug, Clone, Copy, Default)]
pub struct SeedSummary {
    pub games: usize,
    pub team_rows: usize,
    pub player_rows: usize,
}

/// Fill the warehouse with a plausible two-season league. Deterministic for
/// a given seed, so repeat runs produce the same dashboard.
pub fn seed_demo_warehouse(conn: &mut Connection, seed: u64) -> Result<SeedSummary> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut summary = SeedSummary::default();

    let tx = conn.transaction().context("begin seed transaction")?;
    for (season, start_year) in SEASONS {
        let opening_night = NaiveDate::from_ymd_opt(start_year, 10, 24)
            .context("demo schedule start date")?;
        let mut game_no = 0usize;

        // Double round robin: every pairing twice, home and away.
        for (home_idx, home) in TEAMS.iter().enumerate() {
            for (away_idx, away) in TEAMS.iter().enumerate() {
                if home_idx == away_idx {
                    continue;
                }
                let date = opening_night + ChronoDuration::days((game_no as i64) * 2);
                let game_id = format!("{season}-{:04}", game_no);
                write_game(
                    &tx,
                    &mut rng,
                    &mut summary,
                    &game_id,
                    season,
                    date,
                    "Regular Season",
                    home,
                    away,
                )?;
                game_no += 1;
            }
        }

        // A short playoff round between the first four franchises.
        let spring = NaiveDate::from_ymd_opt(start_year + 1, 4, 20)
            .context("demo playoff start date")?;
        for series_game in 0..4 {
            for pair in [(0usize, 3usize), (1, 2)] {
                let date = spring + ChronoDuration::days(series_game as i64 * 2);
                let game_id = format!("{season}-po-{}-{series_game}", pair.0);
                let (home, away) = if series_game % 2 == 0 {
                    (&TEAMS[pair.0], &TEAMS[pair.1])
                } else {
                    (&TEAMS[pair.1], &TEAMS[pair.0])
                };
                write_game(
                    &tx,
                    &mut rng,
                    &mut summary,
                    &game_id,
                    season,
                    date,
                    "Playoffs",
                    home,
                    away,
                )?;
            }
        }
    }
    tx.commit().context("commit seed transaction")?;

    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
fn write_game(
    tx: &rusqlite::Transaction<'_>,
    rng: &mut StdRng,
    summary: &mut SeedSummary,
    game_id: &str,
    season: &str,
    date: NaiveDate,
    game_type: &str,
    home: &(&str, &str),
    away: &(&str, &str),
) -> Result<()> {
    let date_str = date.format("%Y-%m-%d").to_string();
    upsert_game(tx, game_id, season, &date_str, game_type)?;
    summary.games += 1;

    let home_points = rng.gen_range(94..=128) + 2; // mild home edge
    let mut away_points = rng.gen_range(94..=128);
    if away_points == home_points {
        away_points -= 1;
    }

    for (team, points, is_home) in [(home, home_points, true), (away, away_points, false)] {
        let won = if is_home {
            points > away_points
        } else {
            points > home_points
        };
        upsert_team_game(
            tx,
            &TeamGameRow {
                game_id: game_id.to_string(),
                season: season.to_string(),
                game_date: date_str.clone(),
                team_name: team.0.to_string(),
                team_abbreviation: team.1.to_string(),
                points: points as i64,
                total_rebounds: rng.gen_range(34..=54),
                assists: rng.gen_range(18..=34),
                win_loss: if won { 'W' } else { 'L' },
                is_home_game: is_home,
                field_goal_percentage: rng.gen_range(0.42..0.55),
            },
        )?;
        summary.team_rows += 1;

        for (player_team, player_name, position) in PLAYERS {
            if player_team != team.0 {
                continue;
            }
            let row = player_line(rng, game_id, season, &date_str, player_name, position);
            upsert_player_game(tx, &row)?;
            summary.player_rows += 1;
        }
    }
    Ok(())
}

fn player_line(
    rng: &mut StdRng,
    game_id: &str,
    season: &str,
    date_str: &str,
    player_name: &str,
    position: &str,
) -> PlayerGameRow {
    let fga: i64 = rng.gen_range(8..=24);
    let fgm: i64 = rng.gen_range((fga * 3 / 10)..=(fga * 6 / 10).max(fga * 3 / 10 + 1));
    let tpa: i64 = rng.gen_range(0..=(fga / 2));
    let tpm: i64 = if tpa > 0 { rng.gen_range(0..=(tpa * 2 / 3).max(1).min(tpa)) } else { 0 };
    let tpm = tpm.min(fgm);
    let fta: i64 = rng.gen_range(0..=12);
    let ftm: i64 = if fta > 0 { rng.gen_range((fta / 2)..=fta) } else { 0 };
    let points = 2 * (fgm - tpm) + 3 * tpm + ftm;

    PlayerGameRow {
        game_id: game_id.to_string(),
        season: season.to_string(),
        game_date: date_str.to_string(),
        player_name: player_name.to_string(),
        position: position.to_string(),
        minutes: format!("{}:{:02}", rng.gen_range(22..=40), rng.gen_range(0..60)),
        points: points.to_string(),
        rebounds: rng.gen_range(1..=14i64).to_string(),
        assists: rng.gen_range(0..=12i64).to_string(),
        steals: rng.gen_range(0..=4i64).to_string(),
        blocks: rng.gen_range(0..=4i64).to_string(),
        turnovers: rng.gen_range(0..=6i64).to_string(),
        personal_fouls: rng.gen_range(0..=6i64).to_string(),
        plus_minus: rng.gen_range(-18..=18i64).to_string(),
        field_goals_made: fgm.to_string(),
        field_goals_attempted: fga.to_string(),
        three_pointers_made: tpm.to_string(),
        three_pointers_attempted: tpa.to_string(),
        free_throws_made: ftm.to_string(),
        free_throws_attempted: fta.to_string(),
    }
}
