use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use once_cell::sync::Lazy;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph};

use hoops_terminal::export;
use hoops_terminal::provider::spawn_warehouse_provider;
use hoops_terminal::rolling::CountingStat;
use hoops_terminal::state::{AppState, Delta, ProviderCommand, Screen, apply_delta};

static TEAM_COLORS: Lazy<HashMap<&'static str, Color>> = Lazy::new(|| {
    HashMap::from([
        ("Denver Nuggets", Color::Yellow),
        ("Los Angeles Lakers", Color::Magenta),
        ("Boston Celtics", Color::Green),
        ("Golden State Warriors", Color::Blue),
        ("Milwaukee Bucks", Color::LightGreen),
        ("Phoenix Suns", Color::LightRed),
        ("Miami Heat", Color::Red),
        ("Dallas Mavericks", Color::Cyan),
        ("New York Knicks", Color::LightBlue),
        ("Oklahoma City Thunder", Color::LightCyan),
    ])
});

const FALLBACK_COLORS: [Color; 5] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Red,
];

fn team_color(team: &str, idx: usize) -> Color {
    TEAM_COLORS
        .get(team)
        .copied()
        .unwrap_or(FALLBACK_COLORS[idx % FALLBACK_COLORS.len()])
}

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_mode {
            self.on_search_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Standings,
            KeyCode::Char('2') => self.state.screen = Screen::Teams,
            KeyCode::Char('3') => self.state.screen = Screen::Player,
            KeyCode::Char('g') => {
                self.state.game_type = self.state.game_type.toggled();
                self.refetch_all(true);
            }
            KeyCode::Char('[') => self.shift_season_start(-1),
            KeyCode::Char(']') => self.shift_season_start(1),
            KeyCode::Char('{') => self.shift_season_end(-1),
            KeyCode::Char('}') => self.shift_season_end(1),
            KeyCode::Char('r') => {
                let _ = self.cmd_tx.send(ProviderCommand::ClearCache);
                self.refetch_all(true);
            }
            KeyCode::Char('e') => self.export_workbook(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => self.on_screen_key(key),
        }
    }

    fn on_screen_key(&mut self, key: KeyEvent) {
        match self.state.screen {
            Screen::Standings => match key.code {
                KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
                KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
                KeyCode::Char('s') => {
                    self.state.standings_sort = self.state.standings_sort.next();
                }
                KeyCode::Char(' ') => {
                    if let Some(team) = self.state.selected_standings_team() {
                        if self.state.toggle_team(&team) {
                            self.request_performance(false);
                        } else {
                            self.state.push_log(format!(
                                "[WARN] Compare list is full; deselect a team before adding {team}"
                            ));
                        }
                    }
                }
                _ => {}
            },
            Screen::Teams => {}
            Screen::Player => match key.code {
                KeyCode::Char('/') => {
                    self.state.search_mode = true;
                    self.state.player_picker = 0;
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    let total = self.state.filtered_player_names().len();
                    if total > 0 {
                        self.state.player_picker = (self.state.player_picker + 1).min(total - 1);
                    }
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.state.player_picker = self.state.player_picker.saturating_sub(1);
                }
                KeyCode::Enter => self.pick_player(),
                KeyCode::Char('s') => self.state.cycle_trend_stat(),
                KeyCode::Char('+') | KeyCode::Char('=') => self.state.adjust_window(1),
                KeyCode::Char('-') => self.state.adjust_window(-1),
                _ => {}
            },
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.search_mode = false;
                self.state.player_search.clear();
            }
            KeyCode::Enter => {
                self.state.search_mode = false;
                self.pick_player();
            }
            KeyCode::Backspace => {
                self.state.player_search.pop();
                self.state.player_picker = 0;
            }
            KeyCode::Down => {
                let total = self.state.filtered_player_names().len();
                if total > 0 {
                    self.state.player_picker = (self.state.player_picker + 1).min(total - 1);
                }
            }
            KeyCode::Up => {
                self.state.player_picker = self.state.player_picker.saturating_sub(1);
            }
            KeyCode::Char(c) => {
                self.state.player_search.push(c);
                self.state.player_picker = 0;
            }
            _ => {}
        }
    }

    fn pick_player(&mut self) {
        let Some(player) = self.state.picked_player() else {
            self.state.push_log("[INFO] No player matches the search");
            return;
        };
        self.request_player_log(&player, true);
    }

    fn shift_season_start(&mut self, delta: i64) {
        if self.state.available_seasons.is_empty() {
            return;
        }
        let max = self.state.available_seasons.len() as i64 - 1;
        let next = (self.state.start_season as i64 + delta).clamp(0, max);
        self.state.start_season = next as usize;
        if self.state.end_season < self.state.start_season {
            self.state.end_season = self.state.start_season;
        }
        self.refetch_all(false);
    }

    fn shift_season_end(&mut self, delta: i64) {
        if self.state.available_seasons.is_empty() {
            return;
        }
        let max = self.state.available_seasons.len() as i64 - 1;
        let next = (self.state.end_season as i64 + delta).clamp(0, max);
        self.state.end_season = next.max(self.state.start_season as i64) as usize;
        self.refetch_all(false);
    }

    fn request_standings(&mut self, announce: bool) {
        let seasons = self.state.selected_seasons();
        if seasons.is_empty() {
            return;
        }
        self.state.standings_loading = true;
        if self
            .cmd_tx
            .send(ProviderCommand::FetchStandings {
                seasons,
                game_type: self.state.game_type,
            })
            .is_err()
        {
            self.state.push_log("[WARN] Standings request failed");
        } else if announce {
            self.state.push_log("[INFO] Standings request sent");
        }
    }

    fn request_performance(&mut self, announce: bool) {
        let seasons = self.state.selected_seasons();
        if seasons.is_empty() || self.state.selected_teams.is_empty() {
            self.state.performance.clear();
            return;
        }
        if self
            .cmd_tx
            .send(ProviderCommand::FetchPerformance {
                teams: self.state.selected_teams.clone(),
                seasons,
                game_type: self.state.game_type,
            })
            .is_err()
        {
            self.state.push_log("[WARN] Performance request failed");
        } else if announce {
            self.state.push_log("[INFO] Performance request sent");
        }
    }

    fn request_player_log(&mut self, player: &str, announce: bool) {
        let seasons = self.state.selected_seasons();
        if seasons.is_empty() {
            return;
        }
        self.state.player_loading = true;
        if self
            .cmd_tx
            .send(ProviderCommand::FetchPlayerLog {
                player: player.to_string(),
                seasons,
                game_type: self.state.game_type,
            })
            .is_err()
        {
            self.state.push_log("[WARN] Player log request failed");
        } else if announce {
            self.state.push_log(format!("[INFO] Loading stats for {player}"));
        }
    }

    fn refetch_all(&mut self, announce: bool) {
        self.request_standings(announce);
        self.request_performance(false);
        if let Some(player) = self.state.active_player.clone() {
            self.request_player_log(&player, false);
        }
    }

    fn export_workbook(&mut self) {
        let path = std::env::var("HOOPS_EXPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("hoops_export.xlsx"));
        match export::export_dashboard(
            &path,
            &self.state.standings,
            &self.state.player_log,
            &self.state.rolling_rows,
        ) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} ({} standings, {} games, {} windows)",
                path.display(),
                report.standings_rows,
                report.game_log_rows,
                report.rolling_rows
            )),
            Err(err) => self
                .state
                .push_log(format!("[ERROR] Export failed: {err:#}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_warehouse_provider(tx, cmd_rx);
    let _ = cmd_tx.send(ProviderCommand::FetchBootstrap);

    let mut app = App::new(cmd_tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            let seasons_arrived = matches!(&delta, Delta::Seasons(s) if !s.is_empty());
            let standings_arrived = matches!(&delta, Delta::Standings { .. });
            apply_delta(&mut app.state, delta);
            if seasons_arrived {
                app.request_standings(false);
            }
            if standings_arrived {
                app.request_performance(false);
            }
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Standings => render_standings(frame, chunks[1], &app.state),
        Screen::Teams => render_teams(frame, chunks[1], &app.state),
        Screen::Player => render_player(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Standings => "STANDINGS",
        Screen::Teams => "TEAMS",
        Screen::Player => "PLAYER",
    };
    let line1 = format!(
        "  ()  HOOPS TERMINAL | {screen} | {} | {} | Window: {}",
        state.season_display(),
        state.game_type.label(),
        state.rolling_window
    );
    let line2 = " (__)".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    let common = "1/2/3 Screens | [/] Start {/} End Season | g Game Type | r Refresh | e Export | ? Help | q Quit";
    match state.screen {
        Screen::Standings => {
            format!("j/k Move | Space Compare | s Sort | {common}")
        }
        Screen::Teams => common.to_string(),
        Screen::Player => {
            format!("/ Search | Enter Pick | s Stat | +/- Window | {common}")
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(60), Constraint::Length(34)])
        .split(area);

    render_standings_table(frame, columns[0], state);
    render_home_away(frame, columns[1], state);
}

fn standings_columns() -> [Constraint; 10] {
    [
        Constraint::Length(5),
        Constraint::Min(22),
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
    ]
}

fn render_standings_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(format!(
            "Team Standings ({}) [sort: {}]",
            state.season_display(),
            state.standings_sort.label()
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.standings_loading {
        frame.render_widget(Paragraph::new("Loading standings..."), inner);
        return;
    }
    if state.standings.is_empty() {
        let empty = Paragraph::new("No data found; run seed_demo or ingest")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let widths = standings_columns();
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    for (idx, title) in ["Rank", "Team", "Abbr", "GP", "W", "L", "Win%", "PTS", "REB", "AST"]
        .iter()
        .enumerate()
    {
        frame.render_widget(Paragraph::new(*title).style(bold), header_cols[idx]);
    }

    let rows = state.sorted_standings();
    let list_area = sections[1];
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.standings_selected, rows.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let row = rows[idx];
        let selected = idx == state.standings_selected;
        let compared = state.selected_teams.iter().any(|t| t == &row.team_name);

        let mut style = Style::default();
        if selected {
            style = style.fg(Color::White).bg(Color::DarkGray);
        } else if compared {
            style = style.fg(team_color(&row.team_name, idx));
        }
        if selected {
            frame.render_widget(Block::default().style(style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let mark = if compared { "*" } else { " " };
        let cells = [
            format!("{mark}{:>3}", idx + 1),
            row.team_name.clone(),
            row.team_abbreviation.clone(),
            row.games_played.to_string(),
            row.wins.to_string(),
            row.losses.to_string(),
            format!("{:.1}", row.win_percentage),
            format!("{:.1}", row.avg_points),
            format!("{:.1}", row.avg_rebounds),
            format!("{:.1}", row.avg_assists),
        ];
        for (col, cell) in cells.iter().enumerate() {
            frame.render_widget(Paragraph::new(cell.as_str()).style(style), cols[col]);
        }
    }
}

fn render_home_away(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Home vs Away")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.home_away.is_empty() {
        let empty =
            Paragraph::new("No split data").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)])
        .split(inner);

    let bars: Vec<Bar> = state
        .home_away
        .iter()
        .map(|row| {
            let color = if row.game_location == "Home" {
                Color::Green
            } else {
                Color::Red
            };
            Bar::default()
                .value(row.win_percentage.round() as u64)
                .label(row.game_location.clone().into())
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(2)
        .max(100);
    frame.render_widget(chart, sections[0]);

    let lines: Vec<String> = state
        .home_away
        .iter()
        .map(|row| {
            format!(
                "{:<5} {:>3} G  {:>2} W  {:>5.1}%  {:>5.1} PTS  FG {:.3}",
                row.game_location, row.games, row.wins, row.win_percentage, row.avg_points,
                row.avg_fg_pct
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(lines.join("\n")), sections[1]);
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Cumulative Wins Over Season")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.selected_teams.is_empty() {
        let empty = Paragraph::new("Select teams on the Standings screen (Space)")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }
    if state.performance.is_empty() {
        let empty =
            Paragraph::new("No performance data yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_max = 1.0f64;
    let mut series_points: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
    for series in &state.performance {
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|(date, wins)| (date_to_x(*date), *wins as f64))
            .collect();
        for (x, y) in &points {
            x_min = x_min.min(*x);
            x_max = x_max.max(*x);
            y_max = y_max.max(*y);
        }
        series_points.push((series.team_name.clone(), points));
    }
    if x_min >= x_max {
        x_max = x_min + 1.0;
    }

    let datasets: Vec<Dataset> = series_points
        .iter()
        .enumerate()
        .map(|(idx, (team, points))| {
            Dataset::default()
                .name(team.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(team_color(team, idx)))
                .data(points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("Game Date")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([x_min, x_max])
                .labels(date_axis_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .title("Total Wins")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, y_max + 1.0])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", (y_max + 1.0) / 2.0)),
                    Span::raw(format!("{:.0}", y_max + 1.0)),
                ]),
        );
    frame.render_widget(chart, inner);
}

fn render_player(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(40)])
        .split(area);

    render_player_picker(frame, columns[0], state);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(10),
        ])
        .split(columns[1]);

    render_player_summary(frame, rows[0], state);

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    render_game_log(frame, tables[0], state);
    render_rolling_table(frame, tables[1], state);

    render_trend_chart(frame, rows[2], state);
}

fn render_player_picker(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = if state.search_mode {
        format!("Players /{}", state.player_search)
    } else if state.player_search.is_empty() {
        "Players".to_string()
    } else {
        format!("Players ({})", state.player_search)
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let names = state.filtered_player_names();
    if names.is_empty() {
        let empty =
            Paragraph::new("No players found").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.player_picker, names.len(), visible);
    let mut lines = Vec::new();
    for idx in start..end {
        let prefix = if idx == state.player_picker { "> " } else { "  " };
        let active = state
            .active_player
            .as_deref()
            .is_some_and(|p| p == names[idx]);
        let marker = if active { "*" } else { " " };
        lines.push(format!("{prefix}{marker}{}", names[idx]));
    }
    frame.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn render_player_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match &state.active_player {
        Some(player) => format!("Player Analysis: {player}"),
        None => "Player Analysis".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.player_loading {
        frame.render_widget(Paragraph::new("Loading player stats..."), inner);
        return;
    }
    if state.player_log.is_empty() {
        let msg = match &state.active_player {
            Some(player) => format!("No stats found for '{player}' in the selected season(s)"),
            None => "Pick a player (Enter) to load a game log".to_string(),
        };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let summary = state.player_summary();
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(inner);

    let mut cells = vec![
        format!("Avg Points\n{:.1}", summary.avg_points),
        format!("Avg Rebounds\n{:.1}", summary.avg_rebounds),
        format!("Avg Assists\n{:.1}", summary.avg_assists),
        format!("Avg FG%\n{:.1}%", summary.avg_fg_pct),
    ];
    if let Some(latest) = state.latest_rolling() {
        cells[0] = format!(
            "Avg Points (roll {})\n{:.1}",
            latest.games_in_window,
            latest.average(CountingStat::Points)
        );
        cells[3] = format!(
            "Rolling FG% ({})\n{:.1}%",
            latest.games_in_window,
            latest.ratio_pct(0)
        );
    }
    for (idx, cell) in cells.iter().enumerate() {
        frame.render_widget(Paragraph::new(cell.as_str()), tiles[idx]);
    }
}

fn render_game_log(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Game-by-Game Stats")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.player_log.is_empty() {
        return;
    }

    let mut lines = vec![format!(
        "{:<11}{:>4}{:>4}{:>4}{:>7}{:>7}{:>7}{:>4}{:>4}",
        "Date", "PTS", "REB", "AST", "FG%", "3P%", "FT%", "TO", "+/-"
    )];
    for row in state.player_log.iter().take(inner.height.saturating_sub(1) as usize) {
        lines.push(format!(
            "{:<11}{:>4.0}{:>4.0}{:>4.0}{:>7.1}{:>7.1}{:>7.1}{:>4.0}{:>+4.0}",
            row.record.game_date.format("%Y-%m-%d"),
            row.record.points,
            row.record.rebounds,
            row.record.assists,
            row.fg_percentage,
            row.three_pt_percentage,
            row.ft_percentage,
            row.record.turnovers,
            row.plus_minus,
        ));
    }
    frame.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn render_rolling_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(format!("Rolling {}-Game Averages", state.rolling_window))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.rolling_rows.is_empty() {
        let msg = if state.player_log.is_empty() {
            "No game log loaded".to_string()
        } else {
            format!(
                "Need at least {} games ({} loaded)",
                state.rolling_window,
                state.player_log.len()
            )
        };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let mut lines = vec![format!(
        "{:<11}{:>6}{:>6}{:>6}{:>7}{:>7}{:>7}",
        "Through", "PTS", "REB", "AST", "FG%", "3P%", "FT%"
    )];
    // Ten most recent windows, newest first.
    for window in state.rolling_rows.iter().rev().take(10) {
        lines.push(format!(
            "{:<11}{:>6.1}{:>6.1}{:>6.1}{:>7.1}{:>7.1}{:>7.1}",
            window.window_end_date.format("%Y-%m-%d"),
            window.average(CountingStat::Points),
            window.average(CountingStat::Rebounds),
            window.average(CountingStat::Assists),
            window.ratio_pct(0),
            window.ratio_pct(1),
            window.ratio_pct(2),
        ));
    }
    frame.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn render_trend_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let stat = state.trend_stat();
    let block = Block::default()
        .title(format!(
            "Performance Trends: {} (s to cycle)",
            stat.label()
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.player_log.len() < 2 {
        let empty = Paragraph::new("Need at least two games for a trend")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let mut game_points: Vec<(f64, f64)> = state
        .player_log
        .iter()
        .map(|row| (date_to_x(row.record.game_date), stat.per_game_value(row)))
        .collect();
    game_points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let rolling_points: Vec<(f64, f64)> = state
        .rolling_rows
        .iter()
        .filter_map(|window| {
            stat.rolling_value(window)
                .map(|value| (date_to_x(window.window_end_date), value))
        })
        .collect();

    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;
    for (x, y) in game_points.iter().chain(rolling_points.iter()) {
        x_min = x_min.min(*x);
        x_max = x_max.max(*x);
        y_min = y_min.min(*y);
        y_max = y_max.max(*y);
    }
    if x_min >= x_max {
        x_max = x_min + 1.0;
    }
    if y_min >= y_max {
        y_max = y_min + 1.0;
    }
    let pad = (y_max - y_min) * 0.1;
    let y_lo = (y_min - pad).min(0.0);
    let y_hi = y_max + pad;

    let mut datasets = vec![
        Dataset::default()
            .name(format!("Game {}", stat.label()))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::LightBlue))
            .data(&game_points),
    ];
    if !rolling_points.is_empty() {
        datasets.push(
            Dataset::default()
                .name(format!("{}-Game Rolling Avg", state.rolling_window))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Red))
                .data(&rolling_points),
        );
    }

    let y_unit = if stat.is_percentage() { "%" } else { "" };
    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("Game Date")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([x_min, x_max])
                .labels(date_axis_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .title(format!("{}{y_unit}", stat.label()))
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y_lo, y_hi])
                .labels(vec![
                    Span::raw(format!("{y_lo:.0}")),
                    Span::raw(format!("{:.0}", (y_lo + y_hi) / 2.0)),
                    Span::raw(format!("{y_hi:.0}")),
                ]),
        );
    frame.render_widget(chart, inner);
}

/// Chart x coordinate for a date: days since the epoch.
fn date_to_x(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp() as f64 / 86_400.0)
        .unwrap_or(0.0)
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp((x * 86_400.0) as i64, 0).map(|dt| dt.date_naive())
}

fn date_axis_labels(x_min: f64, x_max: f64) -> Vec<Span<'static>> {
    let fmt = |x: f64| {
        x_to_date(x)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    vec![
        Span::raw(fmt(x_min)),
        Span::raw(fmt((x_min + x_max) / 2.0)),
        Span::raw(fmt(x_max)),
    ]
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Hoops Terminal - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Standings / Teams / Player",
        "  [ / ]        Shift start season",
        "  { / }        Shift end season",
        "  g            Toggle Regular Season / Playoffs",
        "  r            Clear cache and refresh",
        "  e            Export workbook",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Standings:",
        "  j/k or up/down   Move",
        "  Space            Toggle team in compare set (max 5)",
        "  s                Cycle sort column",
        "",
        "Player:",
        "  /            Search players",
        "  Enter        Load game log",
        "  s            Cycle trend stat",
        "  + / -        Rolling window size (3-20)",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
