use std::path::PathBuf;

use anyhow::{Context, Result};

use hoops_terminal::sample_data;
use hoops_terminal::warehouse;

const DEFAULT_SEED: u64 = 7;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let (db_arg, seed) = parse_args();
    let db_path = db_arg
        .or_else(warehouse::default_db_path)
        .context("unable to resolve sqlite path")?;

    let mut conn = warehouse::open_db(&db_path)?;
    let summary = sample_data::seed_demo_warehouse(&mut conn, seed)?;

    println!("Demo season seeded (seed={seed})");
    println!("DB: {}", db_path.display());
    println!(
        "games={} team_rows={} player_rows={}",
        summary.games, summary.team_rows, summary.player_rows
    );
    Ok(())
}

fn parse_args() -> (Option<PathBuf>, u64) {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut db = None;
    let mut seed = DEFAULT_SEED;

    let mut idx = 0;
    while idx < args.len() {
        match args[idx].as_str() {
            "--db" => {
                if let Some(next) = args.get(idx + 1) {
                    db = Some(PathBuf::from(next));
                    idx += 1;
                }
            }
            "--seed" => {
                if let Some(next) = args.get(idx + 1) {
                    seed = next.parse().unwrap_or(DEFAULT_SEED);
                    idx += 1;
                }
            }
            other => {
                if let Some(v) = other.strip_prefix("--db=") {
                    db = Some(PathBuf::from(v));
                } else if let Some(v) = other.strip_prefix("--seed=") {
                    seed = v.parse().unwrap_or(DEFAULT_SEED);
                }
            }
        }
        idx += 1;
    }
    (db, seed)
}
