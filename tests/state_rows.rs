use chrono::NaiveDate;

use hoops_terminal::queries::{HomeAwayRow, PlayerGameLogRow, StandingsRow};
use hoops_terminal::rolling::GameRecord;
use hoops_terminal::state::{
    AppState, Delta, MAX_ROLLING_WINDOW, MAX_SELECTED_TEAMS, MIN_ROLLING_WINDOW, TrendStat,
    apply_delta,
};

fn standings_row(team: &str, win_percentage: f64, avg_points: f64) -> StandingsRow {
    StandingsRow {
        team_name: team.to_string(),
        team_abbreviation: team[..3].to_uppercase(),
        games_played: 10,
        wins: 5,
        losses: 5,
        win_percentage,
        avg_points,
        avg_rebounds: 44.0,
        avg_assists: 26.0,
    }
}

fn log_row(day: u32, points: f64) -> PlayerGameLogRow {
    let record = GameRecord {
        game_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        subject_name: "Silas Crane".to_string(),
        points,
        rebounds: 6.0,
        assists: 4.0,
        steals: 1.0,
        blocks: 0.0,
        turnovers: 2.0,
        field_goals_made: 8.0,
        field_goals_attempted: 16.0,
        three_pointers_made: 2.0,
        three_pointers_attempted: 6.0,
        free_throws_made: 4.0,
        free_throws_attempted: 5.0,
    };
    let [fg_percentage, three_pt_percentage, ft_percentage] = record.ratio_pcts();
    PlayerGameLogRow {
        record,
        season: "2023-24".to_string(),
        position: "SG".to_string(),
        minutes: "33:00".to_string(),
        personal_fouls: 3.0,
        plus_minus: 5.0,
        fg_percentage,
        three_pt_percentage,
        ft_percentage,
    }
}

#[test]
fn first_standings_load_selects_top_three_teams() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::Standings {
            rows: vec![
                standings_row("Denver Nuggets", 70.0, 115.0),
                standings_row("Boston Celtics", 65.0, 118.0),
                standings_row("Miami Heat", 55.0, 108.0),
                standings_row("Dallas Mavericks", 50.0, 112.0),
            ],
            splits: Vec::new(),
        },
    );
    assert_eq!(
        state.selected_teams,
        vec!["Denver Nuggets", "Boston Celtics", "Miami Heat"]
    );

    // A reload must not clobber an existing selection.
    state.selected_teams = vec!["Dallas Mavericks".to_string()];
    apply_delta(
        &mut state,
        Delta::Standings {
            rows: vec![standings_row("Denver Nuggets", 70.0, 115.0)],
            splits: Vec::new(),
        },
    );
    assert_eq!(state.selected_teams, vec!["Dallas Mavericks"]);
}

#[test]
fn toggle_team_enforces_the_cap() {
    let mut state = AppState::new();
    for idx in 0..MAX_SELECTED_TEAMS {
        assert!(state.toggle_team(&format!("Team {idx}")));
    }
    assert!(!state.toggle_team("One Too Many"));
    assert_eq!(state.selected_teams.len(), MAX_SELECTED_TEAMS);

    // Removing one makes room again.
    assert!(state.toggle_team("Team 0"));
    assert!(state.toggle_team("One Too Many"));
}

#[test]
fn season_range_is_inclusive() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::Seasons(vec![
            "2021-22".to_string(),
            "2022-23".to_string(),
            "2023-24".to_string(),
        ]),
    );
    // Defaults to the latest season only.
    assert_eq!(state.selected_seasons(), vec!["2023-24"]);

    state.start_season = 0;
    state.end_season = 2;
    assert_eq!(
        state.selected_seasons(),
        vec!["2021-22", "2022-23", "2023-24"]
    );
    assert_eq!(state.season_display(), "2021-22 to 2023-24");
}

#[test]
fn window_adjustment_clamps_and_recomputes() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::PlayerLog {
            player: "Silas Crane".to_string(),
            rows: (1..=10).map(|d| log_row(d, 20.0 + d as f64)).collect(),
        },
    );
    assert_eq!(state.rolling_rows.len(), 10 - state.rolling_window + 1);

    for _ in 0..40 {
        state.adjust_window(1);
    }
    assert_eq!(state.rolling_window, MAX_ROLLING_WINDOW);
    // 10 games cannot fill a 20-game window.
    assert!(state.rolling_rows.is_empty());

    for _ in 0..40 {
        state.adjust_window(-1);
    }
    assert_eq!(state.rolling_window, MIN_ROLLING_WINDOW);
    assert_eq!(state.rolling_rows.len(), 10 - MIN_ROLLING_WINDOW + 1);
}

#[test]
fn player_filter_is_case_insensitive() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::PlayerNames(vec![
            "Andre Boyette".to_string(),
            "Nikola Jovanovic".to_string(),
            "Silas Crane".to_string(),
        ]),
    );
    state.player_search = "JOVAN".to_string();
    assert_eq!(state.filtered_player_names(), vec!["Nikola Jovanovic"]);
    assert_eq!(state.picked_player().as_deref(), Some("Nikola Jovanovic"));

    state.player_search = "zzz".to_string();
    assert!(state.picked_player().is_none());
}

#[test]
fn trend_stats_resolve_rolling_overlay_through_ratio_table() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::PlayerLog {
            player: "Silas Crane".to_string(),
            rows: (1..=8).map(|d| log_row(d, 20.0)).collect(),
        },
    );
    let window = state.latest_rolling().expect("rolling rows expected");

    // Each game is 8-of-16 from the field, so the overlay is exactly 50%.
    let fg = TrendStat::Ratio(0);
    assert_eq!(fg.rolling_value(window), Some(50.0));
    assert_eq!(fg.per_game_value(&state.player_log[0]), 50.0);

    // Plus/minus charts per game only; there is no rolling counterpart.
    assert_eq!(TrendStat::PlusMinus.rolling_value(window), None);
    assert_eq!(TrendStat::PlusMinus.per_game_value(&state.player_log[0]), 5.0);
}

#[test]
fn sorted_standings_follow_the_active_sort_mode() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::Standings {
            rows: vec![
                standings_row("Miami Heat", 55.0, 108.0),
                standings_row("Boston Celtics", 65.0, 118.0),
                standings_row("Denver Nuggets", 70.0, 115.0),
            ],
            splits: vec![HomeAwayRow {
                game_location: "Home".to_string(),
                games: 10,
                wins: 7,
                win_percentage: 70.0,
                avg_points: 113.0,
                avg_fg_pct: 0.492,
            }],
        },
    );

    let by_win: Vec<&str> = state
        .sorted_standings()
        .iter()
        .map(|r| r.team_name.as_str())
        .collect();
    assert_eq!(by_win, vec!["Denver Nuggets", "Boston Celtics", "Miami Heat"]);

    state.standings_sort = state.standings_sort.next(); // points
    let by_points: Vec<&str> = state
        .sorted_standings()
        .iter()
        .map(|r| r.team_name.as_str())
        .collect();
    assert_eq!(
        by_points,
        vec!["Boston Celtics", "Denver Nuggets", "Miami Heat"]
    );
}
