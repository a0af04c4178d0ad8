use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::queries::{PlayerGameLogRow, StandingsRow};
use crate::rolling::{COUNTING_STATS, RATIO_SPECS, RollingWindowResult};

pub struct ExportReport {
    pub standings_rows: usize,
    pub game_log_rows: usize,
    pub rolling_rows: usize,
}

/// Write the currently loaded dashboard data to an xlsx workbook: one sheet
/// per view, first row is the header.
pub fn export_dashboard(
    path: &Path,
    standings: &[StandingsRow],
    game_log: &[PlayerGameLogRow],
    rolling: &[RollingWindowResult],
) -> Result<ExportReport> {
    let mut workbook = Workbook::new();

    let standings_rows = standings_matrix(standings);
    let sheet = workbook.add_worksheet();
    sheet.set_name("Standings").context("name standings sheet")?;
    write_rows(sheet, &standings_rows)?;

    let log_rows = game_log_matrix(game_log);
    let sheet = workbook.add_worksheet();
    sheet.set_name("Game Log").context("name game log sheet")?;
    write_rows(sheet, &log_rows)?;

    let rolling_rows = rolling_matrix(rolling);
    let sheet = workbook.add_worksheet();
    sheet.set_name("Rolling").context("name rolling sheet")?;
    write_rows(sheet, &rolling_rows)?;

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        standings_rows: standings_rows.len().saturating_sub(1),
        game_log_rows: log_rows.len().saturating_sub(1),
        rolling_rows: rolling_rows.len().saturating_sub(1),
    })
}

fn standings_matrix(standings: &[StandingsRow]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Rank".to_string(),
        "Team".to_string(),
        "Abbr".to_string(),
        "GP".to_string(),
        "W".to_string(),
        "L".to_string(),
        "Win %".to_string(),
        "Avg Points".to_string(),
        "Avg Rebounds".to_string(),
        "Avg Assists".to_string(),
    ]];
    for (idx, row) in standings.iter().enumerate() {
        rows.push(vec![
            (idx + 1).to_string(),
            row.team_name.clone(),
            row.team_abbreviation.clone(),
            row.games_played.to_string(),
            row.wins.to_string(),
            row.losses.to_string(),
            format!("{:.1}", row.win_percentage),
            format!("{:.1}", row.avg_points),
            format!("{:.1}", row.avg_rebounds),
            format!("{:.1}", row.avg_assists),
        ]);
    }
    rows
}

fn game_log_matrix(game_log: &[PlayerGameLogRow]) -> Vec<Vec<String>> {
    let mut header = vec![
        "Date".to_string(),
        "Player".to_string(),
        "Season".to_string(),
        "Pos".to_string(),
        "Min".to_string(),
    ];
    header.extend(COUNTING_STATS.iter().map(|s| s.short_label().to_string()));
    header.extend(RATIO_SPECS.iter().map(|s| s.label.to_string()));
    header.push("PF".to_string());
    header.push("+/-".to_string());

    let mut rows = vec![header];
    for row in game_log {
        let mut cells = vec![
            row.record.game_date.format("%Y-%m-%d").to_string(),
            row.record.subject_name.clone(),
            row.season.clone(),
            row.position.clone(),
            row.minutes.clone(),
        ];
        cells.extend(
            COUNTING_STATS
                .iter()
                .map(|s| format!("{:.0}", row.record.stat(*s))),
        );
        cells.extend(
            row.record
                .ratio_pcts()
                .iter()
                .map(|pct| format!("{pct:.1}")),
        );
        cells.push(format!("{:.0}", row.personal_fouls));
        cells.push(format!("{:+.0}", row.plus_minus));
        rows.push(cells);
    }
    rows
}

fn rolling_matrix(rolling: &[RollingWindowResult]) -> Vec<Vec<String>> {
    let mut header = vec![
        "Through Date".to_string(),
        "Player".to_string(),
        "Window".to_string(),
    ];
    header.extend(
        COUNTING_STATS
            .iter()
            .map(|s| format!("Avg {}", s.short_label())),
    );
    header.extend(RATIO_SPECS.iter().map(|s| format!("Avg {}", s.label)));

    let mut rows = vec![header];
    for window in rolling {
        let mut cells = vec![
            window.window_end_date.format("%Y-%m-%d").to_string(),
            window.subject_name.clone(),
            window.games_in_window.to_string(),
        ];
        cells.extend(
            COUNTING_STATS
                .iter()
                .map(|s| format!("{:.1}", window.average(*s))),
        );
        cells.extend((0..RATIO_SPECS.len()).map(|i| format!("{:.1}", window.ratio_pct(i))));
        rows.push(cells);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
