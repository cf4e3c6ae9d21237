use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::charts;
use crate::config::RunConfig;
use crate::match_dataset::{self, MatchRecord, SeasonMatches};
use crate::match_metrics::{
    self, CleanSheetTally, GoalMatrix, ResultCounts, TeamAccuracy, TeamGoalsOnDate,
};
use crate::report_tables;
use crate::team_stats::{self, OverallSummary, SeasonSummary};

pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Everything the reporters need, computed in one pass over the inputs.
#[derive(Debug, Clone)]
pub struct GoalsAnalysis {
    pub seasons: Vec<SeasonSummary>,
    pub overall: OverallSummary,
    pub clean_sheets: CleanSheetTally,
    pub result_counts: ResultCounts,
    pub goal_matrix: GoalMatrix,
    pub shot_accuracy: Vec<TeamAccuracy>,
    pub goals_over_time: Vec<TeamGoalsOnDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonTotal {
    pub season: String,
    pub matches: usize,
    pub total_goals: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub data_dir: PathBuf,
    pub input_files: Vec<PathBuf>,
    pub matches: usize,
    pub teams: usize,
    pub total_goals: u32,
    pub seasons: Vec<SeasonTotal>,
    pub clean_sheets: CleanSheetTally,
    pub result_counts: ResultCounts,
    pub tables: Vec<PathBuf>,
    pub charts: Vec<PathBuf>,
}

/// `seasons` drives the per-season reports, `combined` everything else.
pub fn analyze(
    seasons: &[SeasonMatches],
    combined: &[MatchRecord],
    top_n: usize,
) -> GoalsAnalysis {
    GoalsAnalysis {
        seasons: team_stats::summarize_seasons(seasons, top_n),
        overall: team_stats::summarize_overall(combined, top_n),
        clean_sheets: match_metrics::clean_sheets(combined),
        result_counts: match_metrics::result_counts(combined),
        goal_matrix: match_metrics::goal_matrix(combined),
        shot_accuracy: match_metrics::shot_accuracy_by_team(combined),
        goals_over_time: match_metrics::goals_over_time(combined),
    }
}

/// load -> aggregate -> rank -> render.
pub fn run(cfg: &RunConfig) -> Result<RunSummary> {
    info!(data_dir = %cfg.data_dir.display(), "loading match files");
    let dataset = match_dataset::load_data_folder(&cfg.data_dir, &cfg.manifest)?;
    let seasons = match_dataset::group_by_season(&dataset.matches, &cfg.manifest);

    let analysis = analyze(&seasons, &dataset.matches, cfg.top_n);
    info!(
        seasons = analysis.seasons.len(),
        teams = analysis.overall.teams.len(),
        total_goals = analysis.overall.total_goals,
        "aggregation complete"
    );

    let tables = report_tables::write_tables(&analysis, &cfg.output_dir, &cfg.plots_dir)?;
    let charts = if cfg.render_charts {
        charts::render_charts(&analysis, &cfg.output_dir, &cfg.plots_dir)?
    } else {
        info!("chart rendering disabled");
        Vec::new()
    };

    let summary = RunSummary {
        data_dir: cfg.data_dir.clone(),
        input_files: dataset.files,
        matches: analysis.overall.matches,
        teams: analysis.overall.teams.len(),
        total_goals: analysis.overall.total_goals,
        seasons: analysis
            .seasons
            .iter()
            .map(|s| SeasonTotal {
                season: s.season.clone(),
                matches: s.matches,
                total_goals: s.total_goals,
            })
            .collect(),
        clean_sheets: analysis.clean_sheets,
        result_counts: analysis.result_counts,
        tables,
        charts,
    };
    write_run_summary(&cfg.output_dir.join(RUN_SUMMARY_FILE), &summary)?;
    Ok(summary)
}

fn write_run_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("serialize run summary")?;
    fs::write(path, json).with_context(|| format!("write run summary {}", path.display()))?;
    Ok(())
}
