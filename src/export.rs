use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::metric_table::{Cell, Direction};
use crate::report::TeamReport;

pub struct ExportSummary {
    pub metrics: usize,
    pub radar_axes: usize,
}

/// Writes `report` as a workbook with `Summary`, `Percentiles` and `Radar`
/// sheets.
pub fn export_team_report(path: &Path, report: &TeamReport) -> Result<ExportSummary> {
    let summary_rows = vec![
        header(&["Field", "Value"]),
        vec![Cell::from("Team ID"), Cell::from(report.team_id)],
        vec![Cell::from("Team"), Cell::from(report.team_name.clone())],
        vec![Cell::from("Category"), Cell::from(report.stat_type.as_str())],
        vec![
            Cell::from("Teams in population"),
            Cell::from(report.population_size as i64),
        ],
    ];

    let mut percentile_rows = vec![header(&[
        "Metric",
        "Direction",
        "Value",
        "League Avg",
        "Percentile",
    ])];
    for line in &report.metrics {
        percentile_rows.push(vec![
            Cell::from(line.metric.as_str()),
            Cell::from(direction_label(line.direction)),
            Cell::from(line.value),
            Cell::from(line.league_average),
            Cell::from(line.percentile),
        ]);
    }

    let mut radar_rows = vec![header(&[
        "Axis",
        "Metric",
        "Team",
        "League Avg",
        "Team (plotted)",
        "League (plotted)",
    ])];
    for axis in &report.radar {
        radar_rows.push(vec![
            Cell::from(axis.label.as_str()),
            Cell::from(axis.metric.as_str()),
            Cell::from(axis.team_value),
            Cell::from(axis.league_value),
            Cell::from(axis.team_radius),
            Cell::from(axis.league_radius),
        ]);
    }

    let mut workbook = Workbook::new();
    for (name, rows) in [
        ("Summary", &summary_rows),
        ("Percentiles", &percentile_rows),
        ("Radar", &radar_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_rows(sheet, rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        metrics: percentile_rows.len().saturating_sub(1),
        radar_axes: radar_rows.len().saturating_sub(1),
    })
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles.iter().map(|t| Cell::from(*t)).collect()
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::HigherIsBetter => "higher",
        Direction::LowerIsBetter => "lower",
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match value {
                Cell::Number(v) if v.is_finite() => worksheet.write_number(r, c, *v),
                Cell::Text(s) => worksheet.write_string(r, c, s),
                _ => continue,
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
