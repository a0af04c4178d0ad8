use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use hoops_terminal::ingest;
use hoops_terminal::warehouse;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let (db_arg, team_files, player_files) = parse_args();
    if team_files.is_empty() && player_files.is_empty() {
        return Err(anyhow!(
            "usage: ingest [--db <sqlite>] [--teams <parquet>]... [--players <parquet>]..."
        ));
    }

    let db_path = db_arg
        .or_else(warehouse::default_db_path)
        .context("unable to resolve sqlite path")?;
    let mut conn = warehouse::open_db(&db_path)?;

    println!("Warehouse ingest");
    println!("DB: {}", db_path.display());

    for file in &team_files {
        let report = ingest::ingest_team_games(&mut conn, file)?;
        println!(
            "teams {}: upserted={} skipped={}",
            report.file.display(),
            report.rows_upserted,
            report.rows_skipped
        );
    }
    for file in &player_files {
        let report = ingest::ingest_player_games(&mut conn, file)?;
        println!(
            "players {}: upserted={} skipped={}",
            report.file.display(),
            report.rows_upserted,
            report.rows_skipped
        );
    }

    Ok(())
}

fn parse_args() -> (Option<PathBuf>, Vec<PathBuf>, Vec<PathBuf>) {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut db = None;
    let mut teams = Vec::new();
    let mut players = Vec::new();

    let mut idx = 0;
    while idx < args.len() {
        match args[idx].as_str() {
            "--db" => {
                if let Some(next) = args.get(idx + 1) {
                    db = Some(PathBuf::from(next));
                    idx += 1;
                }
            }
            "--teams" => {
                if let Some(next) = args.get(idx + 1) {
                    teams.push(PathBuf::from(next));
                    idx += 1;
                }
            }
            "--players" => {
                if let Some(next) = args.get(idx + 1) {
                    players.push(PathBuf::from(next));
                    idx += 1;
                }
            }
            other => {
                if let Some(v) = other.strip_prefix("--db=") {
                    db = Some(PathBuf::from(v));
                } else if let Some(v) = other.strip_prefix("--teams=") {
                    teams.push(PathBuf::from(v));
                } else if let Some(v) = other.strip_prefix("--players=") {
                    players.push(PathBuf::from(v));
                }
            }
        }
        idx += 1;
    }
    (db, teams, players)
}
