use std::process::ExitCode;

use anyhow::Result;

use epl_goals::config::RunConfig;
use epl_goals::logging;
use epl_goals::pipeline::{self, RunSummary};

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    if let Err(err) = logging::init_tracing() {
        eprintln!("warning: {err:#}");
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = RunConfig::from_env_and_args()?;
    let summary = pipeline::run(&cfg)?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Goals analysis complete");
    println!("Data: {}", summary.data_dir.display());
    println!(
        "Files: {}  Matches: {}  Teams: {}  Goals: {}",
        summary.input_files.len(),
        summary.matches,
        summary.teams,
        summary.total_goals
    );

    println!();
    println!("=== Season Goals Comparison ===");
    println!("{:<12} {:>8} {:>11}", "Season", "Matches", "TotalGoals");
    for season in &summary.seasons {
        println!(
            "{:<12} {:>8} {:>11}",
            season.season, season.matches, season.total_goals
        );
    }

    println!();
    println!(
        "Clean sheets: home {} / away {}",
        summary.clean_sheets.home, summary.clean_sheets.away
    );
    println!(
        "Results: H {} / D {} / A {}",
        summary.result_counts.home_wins,
        summary.result_counts.draws,
        summary.result_counts.away_wins
    );
    println!(
        "Wrote {} tables and {} charts",
        summary.tables.len(),
        summary.charts.len()
    );
}
