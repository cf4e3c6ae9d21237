use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::debug;

use crate::match_metrics::{
    CleanSheetTally, GoalMatrix, ResultCounts, TeamAccuracy, TeamGoalsOnDate,
};
use crate::pipeline::GoalsAnalysis;
use crate::team_stats::{RankMetric, SeasonSummary, TeamAggregate};

pub const WORKBOOK_FILE: &str = "goals_analysis.xlsx";

/// Writes every CSV table plus the summary workbook. Returns written paths.
pub fn write_tables(
    analysis: &GoalsAnalysis,
    out_dir: &Path,
    plots_dir: &Path,
) -> Result<Vec<PathBuf>> {
    ensure_dir(out_dir)?;
    ensure_dir(plots_dir)?;

    let mut written = Vec::new();
    let mut emit = |path: PathBuf, rows: &[Vec<String>]| -> Result<()> {
        write_csv(&path, rows)?;
        written.push(path);
        Ok(())
    };

    let season_goals = season_goals_rows(&analysis.seasons);
    let scorers = by_season_rows(&analysis.seasons, RankMetric::GoalsScored);
    let conceders = by_season_rows(&analysis.seasons, RankMetric::GoalsConceded);
    let overall_scorers = overall_rows(&analysis.overall.top_scorers);
    let overall_conceders = overall_rows(&analysis.overall.top_conceders);
    let clean = clean_sheet_rows(&analysis.clean_sheets);
    let results = result_count_rows(&analysis.result_counts);
    let accuracy = accuracy_rows(&analysis.shot_accuracy);
    let over_time = goals_over_time_rows(&analysis.goals_over_time);
    let matrix = goal_matrix_rows(&analysis.goal_matrix);

    emit(out_dir.join("top_10_scorers_by_season.csv"), &scorers)?;
    emit(out_dir.join("top_10_conceders_by_season.csv"), &conceders)?;
    emit(out_dir.join("season_goals_comparison.csv"), &season_goals)?;
    emit(out_dir.join("goals_comparison_by_season.csv"), &season_goals)?;
    emit(out_dir.join("top_10_scorers_overall.csv"), &overall_scorers)?;
    emit(out_dir.join("top_10_conceders_overall.csv"), &overall_conceders)?;
    emit(out_dir.join("clean_sheets.csv"), &clean)?;
    emit(out_dir.join("result_counts.csv"), &results)?;
    emit(out_dir.join("shot_accuracy_by_team.csv"), &accuracy)?;
    emit(out_dir.join("goals_over_time.csv"), &over_time)?;
    emit(out_dir.join("goal_matrix.csv"), &matrix)?;

    for season in &analysis.seasons {
        emit(
            plots_dir.join(format!("{}_top_scorers.csv", season_file_stem(&season.season))),
            &team_metric_rows(&season.top_scorers, RankMetric::GoalsScored),
        )?;
        emit(
            plots_dir.join(format!("{}_top_conceders.csv", season_file_stem(&season.season))),
            &team_metric_rows(&season.top_conceders, RankMetric::GoalsConceded),
        )?;
    }

    let workbook_path = out_dir.join(WORKBOOK_FILE);
    write_workbook(
        &workbook_path,
        &[
            ("SeasonGoals", &season_goals),
            ("TopScorers", &scorers),
            ("TopConceders", &conceders),
            ("OverallScorers", &overall_scorers),
            ("OverallConceders", &overall_conceders),
            ("CleanSheets", &clean),
            ("Results", &results),
            ("ShotAccuracy", &accuracy),
            ("GoalMatrix", &matrix),
        ],
    )?;
    written.push(workbook_path);

    Ok(written)
}

/// Season label as a single file-name component: anything outside
/// `[A-Za-z0-9._-]` becomes `_`.
pub fn season_file_stem(label: &str) -> String {
    let stem = label
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect::<String>();
    if stem.is_empty() || stem.chars().all(|ch| ch == '.') {
        "season".to_string()
    } else {
        stem
    }
}

pub fn season_goals_rows(seasons: &[SeasonSummary]) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["Season".to_string(), "TotalGoals".to_string()]];
    rows.extend(
        seasons
            .iter()
            .map(|s| vec![s.season.clone(), s.total_goals.to_string()]),
    );
    rows
}

/// Top-N per season stacked into one table, with a trailing Season column.
pub fn by_season_rows(seasons: &[SeasonSummary], metric: RankMetric) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Team".to_string(),
        metric.column().to_string(),
        "Season".to_string(),
    ]];
    for season in seasons {
        let top = match metric {
            RankMetric::GoalsScored => &season.top_scorers,
            RankMetric::GoalsConceded => &season.top_conceders,
        };
        rows.extend(top.iter().map(|t| {
            vec![
                t.team.clone(),
                t.metric(metric).to_string(),
                season.season.clone(),
            ]
        }));
    }
    rows
}

pub fn team_metric_rows(teams: &[TeamAggregate], metric: RankMetric) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["Team".to_string(), metric.column().to_string()]];
    rows.extend(
        teams
            .iter()
            .map(|t| vec![t.team.clone(), t.metric(metric).to_string()]),
    );
    rows
}

fn overall_rows(teams: &[TeamAggregate]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Team".to_string(),
        "GoalsScored".to_string(),
        "GoalsConceded".to_string(),
    ]];
    rows.extend(teams.iter().map(|t| {
        vec![
            t.team.clone(),
            t.goals_scored.to_string(),
            t.goals_conceded.to_string(),
        ]
    }));
    rows
}

fn clean_sheet_rows(tally: &CleanSheetTally) -> Vec<Vec<String>> {
    vec![
        vec!["Side".to_string(), "CleanSheets".to_string()],
        vec!["Home".to_string(), tally.home.to_string()],
        vec!["Away".to_string(), tally.away.to_string()],
    ]
}

fn result_count_rows(counts: &ResultCounts) -> Vec<Vec<String>> {
    vec![
        vec!["FTR".to_string(), "Count".to_string()],
        vec!["H".to_string(), counts.home_wins.to_string()],
        vec!["D".to_string(), counts.draws.to_string()],
        vec!["A".to_string(), counts.away_wins.to_string()],
    ]
}

fn accuracy_rows(rows_in: &[TeamAccuracy]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Team".to_string(),
        "Matches".to_string(),
        "Accuracy".to_string(),
        "Goals".to_string(),
    ]];
    rows.extend(rows_in.iter().map(|r| {
        vec![
            r.team.clone(),
            r.matches.to_string(),
            format!("{:.4}", r.accuracy),
            format!("{:.4}", r.goals),
        ]
    }));
    rows
}

fn goals_over_time_rows(rows_in: &[TeamGoalsOnDate]) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["Date".to_string(), "Team".to_string(), "Goals".to_string()]];
    rows.extend(rows_in.iter().map(|r| {
        vec![
            r.date.format("%Y-%m-%d").to_string(),
            r.team.clone(),
            r.goals.to_string(),
        ]
    }));
    rows
}

pub fn goal_matrix_rows(matrix: &GoalMatrix) -> Vec<Vec<String>> {
    let mut header = vec!["HomeTeam".to_string()];
    header.extend(matrix.teams.iter().cloned());
    let mut rows = vec![header];
    for (team, cells) in matrix.teams.iter().zip(&matrix.cells) {
        let mut row = vec![team.clone()];
        row.extend(cells.iter().map(|v| v.to_string()));
        rows.push(row);
    }
    rows
}

fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create table {}", path.display()))?;
    for row in rows {
        writer
            .write_record(row)
            .with_context(|| format!("write table {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush table {}", path.display()))?;
    debug!(path = %path.display(), rows = rows.len().saturating_sub(1), "table written");
    Ok(())
}

fn write_workbook(path: &Path, sheets: &[(&str, &Vec<Vec<String>>)]) -> Result<()> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        write_rows(sheet, rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            // Header row and the label column stay text.
            let written = match value.parse::<f64>() {
                Ok(n) if row_idx > 0 && col_idx > 0 && n.is_finite() => {
                    worksheet.write_number(r, c, n)
                }
                _ => worksheet.write_string(r, c, value),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_file_stem_stays_in_one_directory() {
        assert_eq!(season_file_stem("2020-2021"), "2020-2021");
        assert_eq!(season_file_stem("EPL 20/21"), "EPL_20_21");
        assert_eq!(season_file_stem("..\\x"), ".._x");
        assert_eq!(season_file_stem(".."), "season");
        assert_eq!(season_file_stem("  "), "season");
    }
}
