use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The counting stats tracked per game. Order matters: it is the index into
/// the per-window average arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountingStat {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    FieldGoalsMade,
    FieldGoalsAttempted,
    ThreePointersMade,
    ThreePointersAttempted,
    FreeThrowsMade,
    FreeThrowsAttempted,
}

pub const COUNTING_STATS: [CountingStat; 12] = [
    CountingStat::Points,
    CountingStat::Rebounds,
    CountingStat::Assists,
    CountingStat::Steals,
    CountingStat::Blocks,
    CountingStat::Turnovers,
    CountingStat::FieldGoalsMade,
    CountingStat::FieldGoalsAttempted,
    CountingStat::ThreePointersMade,
    CountingStat::ThreePointersAttempted,
    CountingStat::FreeThrowsMade,
    CountingStat::FreeThrowsAttempted,
];

impl CountingStat {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column(self) -> &'static str {
        match self {
            CountingStat::Points => "points",
            CountingStat::Rebounds => "rebounds",
            CountingStat::Assists => "assists",
            CountingStat::Steals => "steals",
            CountingStat::Blocks => "blocks",
            CountingStat::Turnovers => "turnovers",
            CountingStat::FieldGoalsMade => "field_goals_made",
            CountingStat::FieldGoalsAttempted => "field_goals_attempted",
            CountingStat::ThreePointersMade => "three_pointers_made",
            CountingStat::ThreePointersAttempted => "three_pointers_attempted",
            CountingStat::FreeThrowsMade => "free_throws_made",
            CountingStat::FreeThrowsAttempted => "free_throws_attempted",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            CountingStat::Points => "PTS",
            CountingStat::Rebounds => "REB",
            CountingStat::Assists => "AST",
            CountingStat::Steals => "STL",
            CountingStat::Blocks => "BLK",
            CountingStat::Turnovers => "TO",
            CountingStat::FieldGoalsMade => "FGM",
            CountingStat::FieldGoalsAttempted => "FGA",
            CountingStat::ThreePointersMade => "3PM",
            CountingStat::ThreePointersAttempted => "3PA",
            CountingStat::FreeThrowsMade => "FTM",
            CountingStat::FreeThrowsAttempted => "FTA",
        }
    }
}

/// A displayed percentage defined by a made/attempted pair. Both the
/// per-game and the rolling derivation resolve through this table, so the
/// two paths cannot drift apart.
#[derive(Debug, Clone, Copy)]
pub struct RatioSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub made: CountingStat,
    pub attempted: CountingStat,
}

pub const RATIO_SPECS: [RatioSpec; 3] = [
    RatioSpec {
        key: "fg",
        label: "FG%",
        made: CountingStat::FieldGoalsMade,
        attempted: CountingStat::FieldGoalsAttempted,
    },
    RatioSpec {
        key: "3pt",
        label: "3P%",
        made: CountingStat::ThreePointersMade,
        attempted: CountingStat::ThreePointersAttempted,
    },
    RatioSpec {
        key: "ft",
        label: "FT%",
        made: CountingStat::FreeThrowsMade,
        attempted: CountingStat::FreeThrowsAttempted,
    },
];

/// One row per game for a subject (player or team). Stat values are
/// integer-valued; the query layer coerces anything unparseable to 0 before
/// records reach the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_date: NaiveDate,
    pub subject_name: String,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub turnovers: f64,
    pub field_goals_made: f64,
    pub field_goals_attempted: f64,
    pub three_pointers_made: f64,
    pub three_pointers_attempted: f64,
    pub free_throws_made: f64,
    pub free_throws_attempted: f64,
}

impl GameRecord {
    pub fn stat(&self, stat: CountingStat) -> f64 {
        match stat {
            CountingStat::Points => self.points,
            CountingStat::Rebounds => self.rebounds,
            CountingStat::Assists => self.assists,
            CountingStat::Steals => self.steals,
            CountingStat::Blocks => self.blocks,
            CountingStat::Turnovers => self.turnovers,
            CountingStat::FieldGoalsMade => self.field_goals_made,
            CountingStat::FieldGoalsAttempted => self.field_goals_attempted,
            CountingStat::ThreePointersMade => self.three_pointers_made,
            CountingStat::ThreePointersAttempted => self.three_pointers_attempted,
            CountingStat::FreeThrowsMade => self.free_throws_made,
            CountingStat::FreeThrowsAttempted => self.free_throws_attempted,
        }
    }

    /// Per-game shooting percentage for one ratio stat. Zero attempts map to
    /// 0, never to NaN.
    pub fn ratio_pct(&self, spec: &RatioSpec) -> f64 {
        let attempted = self.stat(spec.attempted);
        if attempted > 0.0 {
            round1(100.0 * self.stat(spec.made) / attempted)
        } else {
            0.0
        }
    }

    /// All three per-game percentages, aligned with RATIO_SPECS.
    pub fn ratio_pcts(&self) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (slot, spec) in out.iter_mut().zip(RATIO_SPECS.iter()) {
            *slot = self.ratio_pct(spec);
        }
        out
    }
}

/// Fixed-window aggregate ending at `window_end_date`. Averages are rounded
/// to one decimal; ratios are derived from the unrounded made/attempted
/// means, then rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingWindowResult {
    pub window_end_date: NaiveDate,
    pub subject_name: String,
    pub games_in_window: usize,
    averages: [f64; 12],
    ratios: [f64; 3],
}

impl RollingWindowResult {
    pub fn average(&self, stat: CountingStat) -> f64 {
        self.averages[stat.index()]
    }

    pub fn ratio_pct(&self, ratio_idx: usize) -> f64 {
        self.ratios[ratio_idx]
    }
}

/// Round to one decimal place, ties to even. The original warehouse queries
/// rounded through numpy, which uses the same rule; pinning it here keeps
/// `.x5` boundaries stable across platforms. Non-finite input maps to 0.
pub fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round_ties_even() / 10.0
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Sliding-window averages over a subject's game history.
///
/// Records are stable-sorted ascending by date before windowing, so callers
/// may pass rows in any order; same-date rows keep their input order. Fewer
/// records than `window` is not an error: the output is simply empty, since
/// no full window exists. A zero window is a caller bug.
pub fn compute_rolling_windows(records: &[GameRecord], window: usize) -> Vec<RollingWindowResult> {
    assert!(window >= 1, "rolling window must cover at least one game");
    if records.len() < window {
        return Vec::new();
    }

    let mut sorted: Vec<&GameRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.game_date.cmp(&b.game_date));

    let mut sums = [0.0f64; 12];
    let mut out = Vec::with_capacity(sorted.len() - window + 1);

    for (i, record) in sorted.iter().enumerate() {
        for stat in COUNTING_STATS {
            sums[stat.index()] += record.stat(stat);
        }
        if i + 1 > window {
            let leaving = sorted[i - window];
            for stat in COUNTING_STATS {
                sums[stat.index()] -= leaving.stat(stat);
            }
        }
        if i + 1 < window {
            continue;
        }

        let mut means = [0.0f64; 12];
        for stat in COUNTING_STATS {
            means[stat.index()] = finite_or_zero(sums[stat.index()] / window as f64);
        }

        // Ratio of means, not mean of per-game ratios: recompute each
        // percentage from the unrounded made/attempted window means.
        let mut ratios = [0.0f64; 3];
        for (slot, spec) in ratios.iter_mut().zip(RATIO_SPECS.iter()) {
            let attempted = means[spec.attempted.index()];
            if attempted > 0.0 {
                *slot = round1(100.0 * means[spec.made.index()] / attempted);
            }
        }

        let mut averages = [0.0f64; 12];
        for stat in COUNTING_STATS {
            averages[stat.index()] = round1(means[stat.index()]);
        }

        out.push(RollingWindowResult {
            window_end_date: record.game_date,
            subject_name: record.subject_name.clone(),
            games_in_window: window,
            averages,
            ratios,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, points: f64) -> GameRecord {
        GameRecord {
            game_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            subject_name: "Test Player".to_string(),
            points,
            rebounds: 0.0,
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
    fn short_input_yields_no_windows() {
        assert!(compute_rolling_windows(&[], 1).is_empty());
        let records = vec![record(1, 10.0), record(2, 20.0)];
        assert!(compute_rolling_windows(&records, 3).is_empty());
    }

    #[test]
    fn window_count_matches_records_minus_window_plus_one() {
        let records: Vec<GameRecord> = (1..=8).map(|d| record(d, d as f64)).collect();
        for w in 1..=8 {
            assert_eq!(compute_rolling_windows(&records, w).len(), 8 - w + 1);
        }
    }

    #[test]
    fn five_game_scenario_with_window_three() {
        let records = vec![
            record(1, 10.0),
            record(2, 20.0),
            record(3, 30.0),
            record(4, 40.0),
            record(5, 50.0),
        ];
        let windows = compute_rolling_windows(&records, 3);
        assert_eq!(windows.len(), 3);
        let averages: Vec<f64> = windows
            .iter()
            .map(|w| w.average(CountingStat::Points))
            .collect();
        assert_eq!(averages, vec![20.0, 30.0, 40.0]);
        let end_days: Vec<u32> = windows
            .iter()
            .map(|w| {
                use chrono::Datelike;
                w.window_end_date.day()
            })
            .collect();
        assert_eq!(end_days, vec![3, 4, 5]);
        assert!(windows.iter().all(|w| w.games_in_window == 3));
    }

    #[test]
    fn input_order_does_not_change_output() {
        let records = vec![
            record(3, 30.0),
            record(1, 10.0),
            record(5, 50.0),
            record(2, 20.0),
            record(4, 40.0),
        ];
        let mut sorted = records.clone();
        sorted.sort_by(|a, b| a.game_date.cmp(&b.game_date));
        assert_eq!(
            compute_rolling_windows(&records, 3),
            compute_rolling_windows(&sorted, 3)
        );
    }

    #[test]
    fn zero_attempts_window_yields_zero_pct() {
        let mut a = record(1, 0.0);
        let mut b = record(2, 0.0);
        a.field_goals_attempted = 0.0;
        b.field_goals_attempted = 0.0;
        let windows = compute_rolling_windows(&[a, b], 2);
        assert_eq!(windows[0].ratio_pct(0), 0.0);
    }

    #[test]
    fn ratio_of_means_not_mean_of_ratios() {
        let mut a = record(1, 0.0);
        a.field_goals_made = 10.0;
        a.field_goals_attempted = 20.0;
        let b = record(2, 0.0); // 0-of-0 game
        let windows = compute_rolling_windows(&[a, b], 2);
        // mean made 5 / mean attempted 10, not avg(50%, undefined).
        assert_eq!(windows[0].ratio_pct(0), 50.0);
    }

    #[test]
    fn rolling_pct_uses_unrounded_means() {
        // Window means: made 4.5, attempted 13.5 -> 33.333..%, which must not
        // be computed from the rounded display means.
        let mut a = record(1, 0.0);
        a.free_throws_made = 4.0;
        a.free_throws_attempted = 13.0;
        let mut b = record(2, 0.0);
        b.free_throws_made = 5.0;
        b.free_throws_attempted = 14.0;
        let windows = compute_rolling_windows(&[a, b], 2);
        assert_eq!(windows[0].ratio_pct(2), 33.3);
    }

    #[test]
    fn rounding_is_half_to_even_at_one_decimal() {
        // Quarter values are exact in f64, so these are true ties.
        assert_eq!(round1(16.25), 16.2);
        assert_eq!(round1(16.75), 16.8);
        assert_eq!(round1(-16.25), -16.2);
        let records = vec![
            record(1, 16.0),
            record(2, 16.0),
            record(3, 16.0),
            record(4, 17.0),
        ];
        let windows = compute_rolling_windows(&records, 4);
        assert_eq!(windows[0].average(CountingStat::Points), 16.2);
    }

    #[test]
    fn twenty_game_tie_rounds_the_same_on_every_platform() {
        // 667 points over a 20-game window: the mean scales to exactly 333.5,
        // a true tie, which half-to-even settles at 33.4.
        let mut records: Vec<GameRecord> = (1..=20).map(|d| record(d, 33.0)).collect();
        records[0].points = 40.0;
        let windows = compute_rolling_windows(&records, 20);
        assert_eq!(windows[0].average(CountingStat::Points), 33.4);
    }

    #[test]
    fn non_finite_round_input_maps_to_zero() {
        assert_eq!(round1(f64::NAN), 0.0);
        assert_eq!(round1(f64::INFINITY), 0.0);
        assert_eq!(round1(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn per_game_pct_matches_made_over_attempted() {
        let mut r = record(1, 0.0);
        r.field_goals_made = 7.0;
        r.field_goals_attempted = 15.0;
        r.three_pointers_attempted = 0.0;
        let pcts = r.ratio_pcts();
        assert_eq!(pcts[0], 46.7);
        assert_eq!(pcts[1], 0.0);
    }

    #[test]
    #[should_panic(expected = "at least one game")]
    fn zero_window_is_a_contract_violation() {
        compute_rolling_windows(&[record(1, 1.0)], 0);
    }
}
