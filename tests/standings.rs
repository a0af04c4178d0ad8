use rusqlite::Connection;

use hoops_terminal::queries;
use hoops_terminal::warehouse::{
    self, PlayerGameRow, TeamGameRow, upsert_game, upsert_player_game, upsert_team_game,
};

fn seasons(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn add_team_game(
    conn: &mut Connection,
    game_id: &str,
    season: &str,
    game_date: &str,
    game_type: &str,
    team: (&str, &str),
    points: i64,
    won: bool,
    home: bool,
) {
    let tx = conn.transaction().unwrap();
    upsert_game(&tx, game_id, season, game_date, game_type).unwrap();
    upsert_team_game(
        &tx,
        &TeamGameRow {
            game_id: game_id.to_string(),
            season: season.to_string(),
            game_date: game_date.to_string(),
            team_name: team.0.to_string(),
            team_abbreviation: team.1.to_string(),
            points,
            total_rebounds: 40,
            assists: 25,
            win_loss: if won { 'W' } else { 'L' },
            is_home_game: home,
            field_goal_percentage: 0.480,
        },
    )
    .unwrap();
    tx.commit().unwrap();
}

fn add_player_game(
    conn: &mut Connection,
    game_id: &str,
    season: &str,
    game_date: &str,
    game_type: &str,
    player: &str,
    cells: &[(&str, &str)],
) {
    let tx = conn.transaction().unwrap();
    upsert_game(&tx, game_id, season, game_date, game_type).unwrap();
    let mut row = PlayerGameRow {
        game_id: game_id.to_string(),
        season: season.to_string(),
        game_date: game_date.to_string(),
        player_name: player.to_string(),
        position: "C".to_string(),
        minutes: "34:10".to_string(),
        ..Default::default()
    };
    for (column, value) in cells {
        let value = value.to_string();
        match *column {
            "points" => row.points = value,
            "rebounds" => row.rebounds = value,
            "assists" => row.assists = value,
            "steals" => row.steals = value,
            "blocks" => row.blocks = value,
            "turnovers" => row.turnovers = value,
            "personal_fouls" => row.personal_fouls = value,
            "plus_minus" => row.plus_minus = value,
            "field_goals_made" => row.field_goals_made = value,
            "field_goals_attempted" => row.field_goals_attempted = value,
            "three_pointers_made" => row.three_pointers_made = value,
            "three_pointers_attempted" => row.three_pointers_attempted = value,
            "free_throws_made" => row.free_throws_made = value,
            "free_throws_attempted" => row.free_throws_attempted = value,
            other => panic!("unknown stat column {other}"),
        }
    }
    upsert_player_game(&tx, &row).unwrap();
    tx.commit().unwrap();
}

#[test]
fn standings_aggregate_wins_and_averages() {
    let mut conn = warehouse::open_in_memory().unwrap();
    add_team_game(&mut conn, "g1", "2023-24", "2023-11-01", "Regular Season", ("Denver Nuggets", "DEN"), 110, true, true);
    add_team_game(&mut conn, "g2", "2023-24", "2023-11-03", "Regular Season", ("Denver Nuggets", "DEN"), 120, true, false);
    add_team_game(&mut conn, "g3", "2023-24", "2023-11-05", "Regular Season", ("Denver Nuggets", "DEN"), 100, false, true);
    add_team_game(&mut conn, "g1", "2023-24", "2023-11-01", "Regular Season", ("Miami Heat", "MIA"), 104, false, false);
    add_team_game(&mut conn, "g3", "2023-24", "2023-11-05", "Regular Season", ("Miami Heat", "MIA"), 108, true, false);

    let rows =
        queries::team_standings(&conn, &seasons(&["2023-24"]), "Regular Season").unwrap();
    assert_eq!(rows.len(), 2);

    // Denver: 2-1 at 66.7%, leading the table.
    assert_eq!(rows[0].team_name, "Denver Nuggets");
    assert_eq!(rows[0].games_played, 3);
    assert_eq!(rows[0].wins, 2);
    assert_eq!(rows[0].losses, 1);
    assert_eq!(rows[0].win_percentage, 66.7);
    assert_eq!(rows[0].avg_points, 110.0);

    assert_eq!(rows[1].team_name, "Miami Heat");
    assert_eq!(rows[1].win_percentage, 50.0);
    assert_eq!(rows[1].avg_points, 106.0);
}

#[test]
fn standings_respect_game_type_and_season_filters() {
    let mut conn = warehouse::open_in_memory().unwrap();
    add_team_game(&mut conn, "r1", "2022-23", "2022-11-01", "Regular Season", ("Boston Celtics", "BOS"), 112, true, true);
    add_team_game(&mut conn, "r2", "2023-24", "2023-11-01", "Regular Season", ("Boston Celtics", "BOS"), 96, false, true);
    add_team_game(&mut conn, "p1", "2023-24", "2024-04-21", "Playoffs", ("Boston Celtics", "BOS"), 130, true, true);

    let regular =
        queries::team_standings(&conn, &seasons(&["2023-24"]), "Regular Season").unwrap();
    assert_eq!(regular.len(), 1);
    assert_eq!(regular[0].games_played, 1);
    assert_eq!(regular[0].wins, 0);

    let playoffs = queries::team_standings(&conn, &seasons(&["2023-24"]), "Playoffs").unwrap();
    assert_eq!(playoffs[0].games_played, 1);
    assert_eq!(playoffs[0].wins, 1);

    let both = queries::team_standings(
        &conn,
        &seasons(&["2022-23", "2023-24"]),
        "Regular Season",
    )
    .unwrap();
    assert_eq!(both[0].games_played, 2);
    assert_eq!(both[0].win_percentage, 50.0);
}

#[test]
fn home_away_splits_partition_games() {
    let mut conn = warehouse::open_in_memory().unwrap();
    add_team_game(&mut conn, "g1", "2023-24", "2023-11-01", "Regular Season", ("Phoenix Suns", "PHX"), 115, true, true);
    add_team_game(&mut conn, "g2", "2023-24", "2023-11-02", "Regular Season", ("Phoenix Suns", "PHX"), 105, true, true);
    add_team_game(&mut conn, "g3", "2023-24", "2023-11-04", "Regular Season", ("Phoenix Suns", "PHX"), 95, false, false);

    let splits =
        queries::home_away_splits(&conn, &seasons(&["2023-24"]), "Regular Season").unwrap();
    assert_eq!(splits.len(), 2);
    let away = splits.iter().find(|r| r.game_location == "Away").unwrap();
    let home = splits.iter().find(|r| r.game_location == "Home").unwrap();
    assert_eq!(home.games, 2);
    assert_eq!(home.wins, 2);
    assert_eq!(home.win_percentage, 100.0);
    assert_eq!(home.avg_points, 110.0);
    assert_eq!(away.games, 1);
    assert_eq!(away.win_percentage, 0.0);
}

#[test]
fn player_log_matches_substring_and_coerces_cells() {
    let mut conn = warehouse::open_in_memory().unwrap();
    add_player_game(
        &mut conn,
        "g1",
        "2023-24",
        "2023-11-01",
        "Regular Season",
        "Nikola Jovanovic",
        &[
            ("points", "28"),
            ("rebounds", "12"),
            ("field_goals_made", "11"),
            ("field_goals_attempted", "20"),
            ("free_throws_made", "6"),
            ("free_throws_attempted", "8"),
        ],
    );
    add_player_game(
        &mut conn,
        "g2",
        "2023-24",
        "2023-11-03",
        "Regular Season",
        "Nikola Jovanovic",
        &[
            ("points", "DNP"),
            ("rebounds", ""),
            ("field_goals_attempted", "0"),
        ],
    );

    // Case-insensitive substring match, newest game first.
    let rows = queries::player_game_log(&conn, "jovan", &seasons(&["2023-24"]), "Regular Season")
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].record.game_date.to_string(), "2023-11-03");

    // Malformed cells land as zero, and a zero-attempt game shows 0%.
    assert_eq!(rows[0].record.points, 0.0);
    assert_eq!(rows[0].record.rebounds, 0.0);
    assert_eq!(rows[0].fg_percentage, 0.0);

    // Clean cells keep their values; percentages derive from made/attempted.
    assert_eq!(rows[1].record.points, 28.0);
    assert_eq!(rows[1].fg_percentage, 55.0);
    assert_eq!(rows[1].ft_percentage, 75.0);

    let none = queries::player_game_log(&conn, "nobody", &seasons(&["2023-24"]), "Regular Season")
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn seasons_and_player_names_are_distinct_and_sorted() {
    let mut conn = warehouse::open_in_memory().unwrap();
    add_player_game(&mut conn, "g1", "2023-24", "2023-11-01", "Regular Season", "Wes Calloway", &[]);
    add_player_game(&mut conn, "g2", "2022-23", "2022-11-01", "Regular Season", "Andre Boyette", &[]);
    add_player_game(&mut conn, "g3", "2023-24", "2023-11-02", "Regular Season", "Andre Boyette", &[]);

    assert_eq!(
        queries::available_seasons(&conn).unwrap(),
        vec!["2022-23".to_string(), "2023-24".to_string()]
    );
    assert_eq!(
        queries::player_names(&conn).unwrap(),
        vec!["Andre Boyette".to_string(), "Wes Calloway".to_string()]
    );
}

#[test]
fn empty_filters_short_circuit() {
    let conn = warehouse::open_in_memory().unwrap();
    assert!(queries::team_standings(&conn, &[], "Regular Season").unwrap().is_empty());
    assert!(
        queries::player_game_log(&conn, "", &seasons(&["2023-24"]), "Regular Season")
            .unwrap()
            .is_empty()
    );
    assert!(
        queries::team_performance(&conn, &[], &seasons(&["2023-24"]), "Regular Season")
            .unwrap()
            .is_empty()
    );
}
