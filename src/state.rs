use std::collections::VecDeque;

use crate::queries::{
    CumulativeWinsSeries, HomeAwayRow, PlayerGameLogRow, PlayerSummary, StandingsRow,
    game_log_summary,
};
use crate::rolling::{CountingStat, RATIO_SPECS, RollingWindowResult, compute_rolling_windows};

pub const MIN_ROLLING_WINDOW: usize = 3;
pub const MAX_ROLLING_WINDOW: usize = 20;
pub const DEFAULT_ROLLING_WINDOW: usize = 5;
pub const MAX_SELECTED_TEAMS: usize = 5;
const LOG_CAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Standings,
    Teams,
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameType {
    RegularSeason,
    Playoffs,
}

impl GameType {
    pub fn label(self) -> &'static str {
        match self {
            GameType::RegularSeason => "Regular Season",
            GameType::Playoffs => "Playoffs",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            GameType::RegularSeason => GameType::Playoffs,
            GameType::Playoffs => GameType::RegularSeason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingsSort {
    WinPct,
    Points,
    Rebounds,
    Assists,
}

impl StandingsSort {
    pub fn next(self) -> Self {
        match self {
            StandingsSort::WinPct => StandingsSort::Points,
            StandingsSort::Points => StandingsSort::Rebounds,
            StandingsSort::Rebounds => StandingsSort::Assists,
            StandingsSort::Assists => StandingsSort::WinPct,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StandingsSort::WinPct => "WIN%",
            StandingsSort::Points => "PTS",
            StandingsSort::Rebounds => "REB",
            StandingsSort::Assists => "AST",
        }
    }
}

/// Stats offered by the trend chart. Ratio entries resolve their rolling
/// overlay through RATIO_SPECS; plus/minus has no rolling counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendStat {
    Counting(CountingStat),
    Ratio(usize),
    PlusMinus,
}

pub const TREND_STATS: [TrendStat; 10] = [
    TrendStat::Counting(CountingStat::Points),
    TrendStat::Counting(CountingStat::Rebounds),
    TrendStat::Counting(CountingStat::Assists),
    TrendStat::Counting(CountingStat::Steals),
    TrendStat::Counting(CountingStat::Blocks),
    TrendStat::Ratio(0),
    TrendStat::Ratio(1),
    TrendStat::Ratio(2),
    TrendStat::Counting(CountingStat::Turnovers),
    TrendStat::PlusMinus,
];

impl TrendStat {
    pub fn label(self) -> &'static str {
        match self {
            TrendStat::Counting(CountingStat::Points) => "Points",
            TrendStat::Counting(CountingStat::Rebounds) => "Rebounds",
            TrendStat::Counting(CountingStat::Assists) => "Assists",
            TrendStat::Counting(CountingStat::Steals) => "Steals",
            TrendStat::Counting(CountingStat::Blocks) => "Blocks",
            TrendStat::Counting(CountingStat::Turnovers) => "Turnovers",
            TrendStat::Counting(stat) => stat.short_label(),
            TrendStat::Ratio(idx) => match idx {
                0 => "Field Goal %",
                1 => "3-Point %",
                _ => "Free Throw %",
            },
            TrendStat::PlusMinus => "Plus/Minus",
        }
    }

    pub fn per_game_value(self, row: &PlayerGameLogRow) -> f64 {
        match self {
            TrendStat::Counting(stat) => row.record.stat(stat),
            TrendStat::Ratio(idx) => match idx {
                0 => row.fg_percentage,
                1 => row.three_pt_percentage,
                _ => row.ft_percentage,
            },
            TrendStat::PlusMinus => row.plus_minus,
        }
    }

    pub fn rolling_value(self, window: &RollingWindowResult) -> Option<f64> {
        match self {
            TrendStat::Counting(stat) => Some(window.average(stat)),
            TrendStat::Ratio(idx) if idx < RATIO_SPECS.len() => Some(window.ratio_pct(idx)),
            _ => None,
        }
    }

    pub fn is_percentage(self) -> bool {
        matches!(self, TrendStat::Ratio(_))
    }
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchBootstrap,
    FetchStandings {
        seasons: Vec<String>,
        game_type: GameType,
    },
    FetchPerformance {
        teams: Vec<String>,
        seasons: Vec<String>,
        game_type: GameType,
    },
    FetchPlayerLog {
        player: String,
        seasons: Vec<String>,
        game_type: GameType,
    },
    ClearCache,
}

#[derive(Debug, Clone)]
pub enum Delta {
    Seasons(Vec<String>),
    PlayerNames(Vec<String>),
    Standings {
        rows: Vec<StandingsRow>,
        splits: Vec<HomeAwayRow>,
    },
    Performance(Vec<CumulativeWinsSeries>),
    PlayerLog {
        player: String,
        rows: Vec<PlayerGameLogRow>,
    },
    Log(String),
}

pub struct AppState {
    pub screen: Screen,

    pub available_seasons: Vec<String>,
    pub start_season: usize,
    pub end_season: usize,
    pub game_type: GameType,
    pub rolling_window: usize,

    pub standings: Vec<StandingsRow>,
    pub standings_loading: bool,
    pub standings_selected: usize,
    pub standings_sort: StandingsSort,
    pub home_away: Vec<HomeAwayRow>,

    pub selected_teams: Vec<String>,
    pub performance: Vec<CumulativeWinsSeries>,

    pub player_names: Vec<String>,
    pub player_picker: usize,
    pub player_search: String,
    pub search_mode: bool,
    pub active_player: Option<String>,
    pub player_log: Vec<PlayerGameLogRow>,
    pub player_loading: bool,
    pub rolling_rows: Vec<RollingWindowResult>,
    pub trend_idx: usize,

    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Standings,
            available_seasons: Vec::new(),
            start_season: 0,
            end_season: 0,
            game_type: GameType::RegularSeason,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            standings: Vec::new(),
            standings_loading: true,
            standings_selected: 0,
            standings_sort: StandingsSort::WinPct,
            home_away: Vec::new(),
            selected_teams: Vec::new(),
            performance: Vec::new(),
            player_names: Vec::new(),
            player_picker: 0,
            player_search: String::new(),
            search_mode: false,
            active_player: None,
            player_log: Vec::new(),
            player_loading: false,
            rolling_rows: Vec::new(),
            trend_idx: 0,
            help_overlay: false,
            logs: VecDeque::new(),
        }
    }

    /// Inclusive season range, start through end.
    pub fn selected_seasons(&self) -> Vec<String> {
        if self.available_seasons.is_empty() {
            return Vec::new();
        }
        let start = self.start_season.min(self.available_seasons.len() - 1);
        let end = self.end_season.clamp(start, self.available_seasons.len() - 1);
        self.available_seasons[start..=end].to_vec()
    }

    pub fn season_display(&self) -> String {
        let seasons = self.selected_seasons();
        match seasons.as_slice() {
            [] => "no seasons".to_string(),
            [only] => only.clone(),
            [first, .., last] => format!("{first} to {last}"),
        }
    }

    pub fn sorted_standings(&self) -> Vec<&StandingsRow> {
        let mut rows: Vec<&StandingsRow> = self.standings.iter().collect();
        match self.standings_sort {
            StandingsSort::WinPct => rows.sort_by(|a, b| {
                b.win_percentage
                    .total_cmp(&a.win_percentage)
                    .then(b.wins.cmp(&a.wins))
            }),
            StandingsSort::Points => rows.sort_by(|a, b| b.avg_points.total_cmp(&a.avg_points)),
            StandingsSort::Rebounds => {
                rows.sort_by(|a, b| b.avg_rebounds.total_cmp(&a.avg_rebounds))
            }
            StandingsSort::Assists => rows.sort_by(|a, b| b.avg_assists.total_cmp(&a.avg_assists)),
        }
        rows
    }

    pub fn selected_standings_team(&self) -> Option<String> {
        self.sorted_standings()
            .get(self.standings_selected)
            .map(|row| row.team_name.clone())
    }

    /// Toggle a team in the comparison set, capped at MAX_SELECTED_TEAMS.
    /// Returns false when the cap blocks an add.
    pub fn toggle_team(&mut self, team: &str) -> bool {
        if let Some(pos) = self.selected_teams.iter().position(|t| t == team) {
            self.selected_teams.remove(pos);
            return true;
        }
        if self.selected_teams.len() >= MAX_SELECTED_TEAMS {
            return false;
        }
        self.selected_teams.push(team.to_string());
        true
    }

    pub fn select_next(&mut self) {
        if !self.standings.is_empty() {
            self.standings_selected = (self.standings_selected + 1).min(self.standings.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.standings_selected = self.standings_selected.saturating_sub(1);
    }

    /// Player names matching the current search, in picker order.
    pub fn filtered_player_names(&self) -> Vec<&str> {
        let needle = self.player_search.to_lowercase();
        self.player_names
            .iter()
            .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
            .map(|name| name.as_str())
            .collect()
    }

    pub fn picked_player(&self) -> Option<String> {
        self.filtered_player_names()
            .get(self.player_picker)
            .map(|name| (*name).to_string())
    }

    pub fn adjust_window(&mut self, delta: i64) {
        let next = self.rolling_window as i64 + delta;
        self.rolling_window =
            next.clamp(MIN_ROLLING_WINDOW as i64, MAX_ROLLING_WINDOW as i64) as usize;
        self.recompute_rolling();
    }

    pub fn cycle_trend_stat(&mut self) {
        self.trend_idx = (self.trend_idx + 1) % TREND_STATS.len();
    }

    pub fn trend_stat(&self) -> TrendStat {
        TREND_STATS[self.trend_idx % TREND_STATS.len()]
    }

    pub fn player_summary(&self) -> PlayerSummary {
        game_log_summary(&self.player_log)
    }

    pub fn recompute_rolling(&mut self) {
        if self.player_log.len() < self.rolling_window {
            self.rolling_rows.clear();
            return;
        }
        let records: Vec<_> = self
            .player_log
            .iter()
            .map(|row| row.record.clone())
            .collect();
        self.rolling_rows = compute_rolling_windows(&records, self.rolling_window);
    }

    /// Most recent full window, if any.
    pub fn latest_rolling(&self) -> Option<&RollingWindowResult> {
        self.rolling_rows.last()
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push_back(line.into());
        while self.logs.len() > LOG_CAP {
            self.logs.pop_front();
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Seasons(seasons) => {
            if !seasons.is_empty() {
                // Default to the most recent season.
                state.start_season = seasons.len() - 1;
                state.end_season = seasons.len() - 1;
            }
            state.available_seasons = seasons;
        }
        Delta::PlayerNames(names) => {
            state.player_names = names;
            state.player_picker = 0;
        }
        Delta::Standings { rows, splits } => {
            state.standings_loading = false;
            if state.standings_selected >= rows.len() {
                state.standings_selected = rows.len().saturating_sub(1);
            }
            // First load: compare the top three teams, as the dashboard did.
            if state.selected_teams.is_empty() {
                state.selected_teams = rows
                    .iter()
                    .take(3)
                    .map(|row| row.team_name.clone())
                    .collect();
            }
            state.standings = rows;
            state.home_away = splits;
        }
        Delta::Performance(series) => {
            state.performance = series;
        }
        Delta::PlayerLog { player, rows } => {
            state.player_loading = false;
            state.active_player = Some(player);
            state.player_log = rows;
            state.recompute_rolling();
        }
        Delta::Log(line) => state.push_log(line),
    }
}
