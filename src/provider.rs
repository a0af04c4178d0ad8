use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

use crate::queries;
use crate::query_cache;
use crate::state::{Delta, GameType, ProviderCommand};
use crate::warehouse;

/// Spawn the warehouse worker. It owns the SQLite connection and the query
/// cache; the UI thread talks to it purely through commands and deltas.
pub fn spawn_warehouse_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let conn = match open_warehouse() {
            Ok(conn) => conn,
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[ERROR] Warehouse unavailable: {err:#}")));
                return;
            }
        };

        while let Ok(cmd) = cmd_rx.recv() {
            if let Err(err) = handle_command(&conn, &tx, cmd) {
                let _ = tx.send(Delta::Log(format!("[WARN] Query failed: {err:#}")));
            }
        }
    });
}

fn open_warehouse() -> Result<Connection> {
    let path = warehouse::default_db_path()
        .ok_or_else(|| anyhow!("no HOOPS_DB and no resolvable cache dir"))?;
    warehouse::open_db(&path).with_context(|| format!("open warehouse {}", path.display()))
}

fn handle_command(conn: &Connection, tx: &Sender<Delta>, cmd: ProviderCommand) -> Result<()> {
    match cmd {
        ProviderCommand::FetchBootstrap => {
            let seasons = query_cache::cached(
                &query_cache::cache_key("available_seasons", &[]),
                query_cache::query_ttl(),
                || queries::available_seasons(conn),
            )?;
            if seasons.is_empty() {
                let _ = tx.send(Delta::Log(
                    "[WARN] Warehouse is empty; run seed_demo or ingest first".to_string(),
                ));
            }
            let _ = tx.send(Delta::Seasons(seasons));

            let names = query_cache::cached(
                &query_cache::cache_key("player_names", &[]),
                query_cache::player_names_ttl(),
                || queries::player_names(conn),
            )?;
            let _ = tx.send(Delta::Log(format!("[INFO] Loaded {} player names", names.len())));
            let _ = tx.send(Delta::PlayerNames(names));
        }
        ProviderCommand::FetchStandings { seasons, game_type } => {
            let parts = key_parts(&seasons, game_type);
            let refs: Vec<&str> = parts.iter().map(|s| s.as_str()).collect();
            let rows = query_cache::cached(
                &query_cache::cache_key("team_standings", &refs),
                query_cache::query_ttl(),
                || queries::team_standings(conn, &seasons, game_type.label()),
            )?;
            let splits = query_cache::cached(
                &query_cache::cache_key("home_away_splits", &refs),
                query_cache::query_ttl(),
                || queries::home_away_splits(conn, &seasons, game_type.label()),
            )?;
            if rows.is_empty() {
                let _ = tx.send(Delta::Log("[WARN] No data found for the current filters".to_string()));
            }
            let _ = tx.send(Delta::Standings { rows, splits });
        }
        ProviderCommand::FetchPerformance {
            teams,
            seasons,
            game_type,
        } => {
            let mut parts = teams.clone();
            parts.extend(key_parts(&seasons, game_type));
            let refs: Vec<&str> = parts.iter().map(|s| s.as_str()).collect();
            let points = query_cache::cached(
                &query_cache::cache_key("team_performance", &refs),
                query_cache::query_ttl(),
                || queries::team_performance(conn, &teams, &seasons, game_type.label()),
            )?;
            let series = queries::cumulative_wins(&points);
            let _ = tx.send(Delta::Performance(series));
        }
        ProviderCommand::FetchPlayerLog {
            player,
            seasons,
            game_type,
        } => {
            let mut parts = vec![player.clone()];
            parts.extend(key_parts(&seasons, game_type));
            let refs: Vec<&str> = parts.iter().map(|s| s.as_str()).collect();
            let rows = query_cache::cached(
                &query_cache::cache_key("player_game_log", &refs),
                query_cache::query_ttl(),
                || queries::player_game_log(conn, &player, &seasons, game_type.label()),
            )?;
            let _ = tx.send(Delta::Log(format!(
                "[INFO] Loaded {} games for {player}",
                rows.len()
            )));
            let _ = tx.send(Delta::PlayerLog { player, rows });
        }
        ProviderCommand::ClearCache => {
            query_cache::clear();
            let _ = tx.send(Delta::Log("[INFO] Query cache cleared".to_string()));
        }
    }
    Ok(())
}

fn key_parts(seasons: &[String], game_type: GameType) -> Vec<String> {
    let mut parts = seasons.to_vec();
    parts.push(game_type.label().to_string());
    parts
}
