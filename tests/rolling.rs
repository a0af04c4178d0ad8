use chrono::NaiveDate;

use hoops_terminal::rolling::{CountingStat, GameRecord, compute_rolling_windows};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn record(day: u32, points: f64, rebounds: f64) -> GameRecord {
    GameRecord {
        game_date: date(day),
        subject_name: "Nikola Jovanovic".to_string(),
        points,
        rebounds,
        assists: 0.0,
        steals: 0.0,
        blocks: 0.0,
        turnovers: 0.0,
        field_goals_made: 0.0,
        field_goals_attempted: 0.0,
        three_pointers_made: 0.0,
        three_pointers_attempted: 0.0,
        free_throws_made: 0.0,
        free_throws_attempted: 0.0,
    }
}

#[test]
fn empty_and_short_inputs_are_not_errors() {
    for window in 1..=6 {
        assert!(compute_rolling_windows(&[], window).is_empty());
    }
    let records: Vec<GameRecord> = (1..=4).map(|d| record(d, 10.0, 5.0)).collect();
    assert!(compute_rolling_windows(&records, 5).is_empty());
    assert!(compute_rolling_windows(&records, 20).is_empty());
}

#[test]
fn window_count_law_holds_across_sizes() {
    let records: Vec<GameRecord> = (1..=15).map(|d| record(d, d as f64, 5.0)).collect();
    for window in 1..=15 {
        let out = compute_rolling_windows(&records, window);
        assert_eq!(out.len(), records.len() - window + 1, "window {window}");
    }
}

#[test]
fn shuffled_input_matches_sorted_input() {
    let sorted: Vec<GameRecord> = (1..=12).map(|d| record(d, (d * 3) as f64, d as f64)).collect();
    // A fixed scramble; the engine must sort by date internally.
    let order = [7usize, 0, 11, 3, 9, 1, 5, 10, 2, 8, 4, 6];
    let shuffled: Vec<GameRecord> = order.iter().map(|i| sorted[*i].clone()).collect();

    for window in [1, 3, 5, 12] {
        assert_eq!(
            compute_rolling_windows(&shuffled, window),
            compute_rolling_windows(&sorted, window),
            "window {window}"
        );
    }
}

#[test]
fn same_date_records_keep_input_order() {
    // Two games on the same date: stable sort keeps them in input order, so
    // the first emitted window always covers the first-listed record.
    let mut a = record(5, 10.0, 0.0);
    let b = record(5, 30.0, 0.0);
    a.subject_name = "first".to_string();
    let out = compute_rolling_windows(&[a.clone(), b.clone()], 1);
    assert_eq!(out[0].subject_name, "first");
    assert_eq!(out[0].average(CountingStat::Points), 10.0);
    assert_eq!(out[1].average(CountingStat::Points), 30.0);
}

#[test]
fn windows_are_emitted_in_ascending_end_date_order() {
    let records = vec![record(9, 12.0, 3.0), record(2, 8.0, 4.0), record(5, 20.0, 6.0)];
    let out = compute_rolling_windows(&records, 2);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].window_end_date, date(5));
    assert_eq!(out[1].window_end_date, date(9));
    assert_eq!(out[0].average(CountingStat::Points), 14.0);
    assert_eq!(out[1].average(CountingStat::Points), 16.0);
}

#[test]
fn zero_attempt_windows_fall_back_to_zero_for_every_ratio() {
    let records: Vec<GameRecord> = (1..=3).map(|d| record(d, 6.0, 2.0)).collect();
    let out = compute_rolling_windows(&records, 3);
    assert_eq!(out.len(), 1);
    for idx in 0..3 {
        assert_eq!(out[0].ratio_pct(idx), 0.0);
    }
}

#[test]
fn mixed_attempt_volume_uses_ratio_of_means() {
    // Game one: 10-of-20. Game two: 0-of-0. The rolling FG% is 5/10 = 50%,
    // not the 25% a mean of per-game percentages would give with the
    // zero-attempt game counted as 0.
    let mut a = record(1, 20.0, 0.0);
    a.field_goals_made = 10.0;
    a.field_goals_attempted = 20.0;
    let b = record(2, 0.0, 0.0);
    let out = compute_rolling_windows(&[a, b], 2);
    assert_eq!(out[0].ratio_pct(0), 50.0);
}

#[test]
fn averages_are_rounded_to_one_decimal() {
    let records = vec![record(1, 11.0, 7.0), record(2, 12.0, 8.0), record(3, 12.0, 8.0)];
    let out = compute_rolling_windows(&records, 3);
    // 35/3 = 11.666.. -> 11.7, 23/3 = 7.666.. -> 7.7
    assert_eq!(out[0].average(CountingStat::Points), 11.7);
    assert_eq!(out[0].average(CountingStat::Rebounds), 7.7);
}

#[test]
fn caller_records_are_not_mutated() {
    let records = vec![record(3, 1.0, 1.0), record(1, 2.0, 2.0), record(2, 3.0, 3.0)];
    let before = records.clone();
    let _ = compute_rolling_windows(&records, 2);
    assert_eq!(records, before);
}
