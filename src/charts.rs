use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::FontTransform;
use tracing::{info, warn};

use crate::match_metrics::{GoalMatrix, TeamAccuracy};
use crate::pipeline::GoalsAnalysis;
use crate::report_tables::season_file_stem;
use crate::team_stats::{RankMetric, TeamAggregate};

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const SCORER_GREEN: RGBColor = RGBColor(0, 128, 0);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
const POINT_BLUE: RGBColor = RGBColor(31, 119, 180);

/// Renders every chart. Returns the written image paths.
pub fn render_charts(
    analysis: &GoalsAnalysis,
    out_dir: &Path,
    plots_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;
    fs::create_dir_all(plots_dir)
        .with_context(|| format!("create plots dir {}", plots_dir.display()))?;

    let mut written = Vec::new();

    let seasons = analysis
        .seasons
        .iter()
        .map(|s| s.season.clone())
        .collect::<Vec<_>>();
    let totals = analysis.seasons.iter().map(|s| s.total_goals).collect::<Vec<_>>();
    let path = out_dir.join("total_goals_per_season.png");
    if draw_bar_chart(
        &path,
        &format!("Total Goals per Season ({})", season_span(&seasons)),
        "Season",
        "Total Goals",
        &seasons,
        &totals,
        SKY_BLUE,
    )? {
        written.push(path);
    }

    for season in &analysis.seasons {
        for (metric, teams, color, suffix) in [
            (RankMetric::GoalsScored, &season.top_scorers, SCORER_GREEN, "top_scorers"),
            (RankMetric::GoalsConceded, &season.top_conceders, LIGHT_CORAL, "top_conceders"),
        ] {
            let stem = season_file_stem(&season.season);
            let path = plots_dir.join(format!("{stem}_{suffix}.png"));
            if draw_top_teams(&path, &season.season, metric, teams, color)? {
                written.push(path);
            }
        }
    }

    let path = plots_dir.join("goal_heatmap.png");
    if draw_goal_heatmap(&path, &analysis.goal_matrix)? {
        written.push(path);
    }

    let path = plots_dir.join("accuracy_vs_goals.png");
    if draw_accuracy_scatter(&path, &analysis.shot_accuracy)? {
        written.push(path);
    }

    info!(charts = written.len(), "charts rendered");
    Ok(written)
}

fn draw_top_teams(
    path: &Path,
    season: &str,
    metric: RankMetric,
    teams: &[TeamAggregate],
    color: RGBColor,
) -> Result<bool> {
    let labels = teams.iter().map(|t| t.team.clone()).collect::<Vec<_>>();
    let values = teams.iter().map(|t| t.metric(metric)).collect::<Vec<_>>();
    draw_bar_chart(
        path,
        &format!("Top {} Teams by {} - {season}", teams.len(), metric.label()),
        "Team",
        metric.label(),
        &labels,
        &values,
        color,
    )
}

/// Returns `false` when there was nothing to plot.
fn draw_bar_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    values: &[u32],
    color: RGBColor,
) -> Result<bool> {
    if labels.is_empty() {
        warn!(chart = %path.display(), "no data, chart skipped");
        return Ok(false);
    }

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_top = padded_max(values.iter().copied().max().unwrap_or(0));
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(130)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..labels.len() as u32).into_segmented(), 0u32..y_top)?;

    let label_of = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(idx) => labels.get(*idx as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(labels.len())
        .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
        .x_label_formatter(&label_of)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(color.filled())
            .margin(12)
            .data(values.iter().enumerate().map(|(idx, v)| (idx as u32, *v))),
    )?;

    root.present()
        .with_context(|| format!("write chart {}", path.display()))?;
    Ok(true)
}

fn draw_goal_heatmap(path: &Path, matrix: &GoalMatrix) -> Result<bool> {
    let n = matrix.teams.len() as i32;
    if n == 0 {
        warn!(chart = %path.display(), "no data, chart skipped");
        return Ok(false);
    }

    let root = BitMapBackend::new(path, (1200, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let max = matrix.max_value();

    let mut chart = ChartBuilder::on(&root)
        .caption("Goals Scored vs. Opponent (Home Perspective)", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(150)
        .y_label_area_size(150)
        .build_cartesian_2d(0i32..n, 0i32..n)?;

    // Row 0 is drawn at the top.
    let column_team = |v: &i32| matrix.teams.get(*v as usize).cloned().unwrap_or_default();
    let row_team = |v: &i32| {
        matrix
            .teams
            .get((n - 1 - *v) as usize)
            .cloned()
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Away Team")
        .y_desc("Home Team")
        .x_labels(n as usize)
        .y_labels(n as usize)
        .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
        .y_label_style(("sans-serif", 12))
        .x_label_formatter(&column_team)
        .y_label_formatter(&row_team)
        .draw()?;

    chart.draw_series(matrix.cells.iter().enumerate().flat_map(|(row, cells)| {
        cells.iter().enumerate().map(move |(col, v)| {
            let (x, y) = (col as i32, n - 1 - row as i32);
            Rectangle::new([(x, y), (x + 1, y + 1)], heat_color(*v, max).filled())
        })
    }))?;

    root.present()
        .with_context(|| format!("write chart {}", path.display()))?;
    Ok(true)
}

fn draw_accuracy_scatter(path: &Path, rows: &[TeamAccuracy]) -> Result<bool> {
    if rows.is_empty() {
        warn!(chart = %path.display(), "no data, chart skipped");
        return Ok(false);
    }

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = axis_range(rows.iter().map(|r| r.accuracy), 0.02);
    let (y_lo, y_hi) = axis_range(rows.iter().map(|r| r.goals), 0.1);
    let mut chart = ChartBuilder::on(&root)
        .caption("Shot Accuracy vs. Goals", ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Average Shot Accuracy")
        .y_desc("Average Goals")
        .x_label_formatter(&|v| format!("{v:.2}"))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;

    chart.draw_series(rows.iter().map(|r| {
        EmptyElement::at((r.accuracy, r.goals))
            + Circle::new((0, 0), 5, POINT_BLUE.filled())
            + Text::new(r.team.clone(), (7, -7), ("sans-serif", 11).into_font())
    }))?;

    root.present()
        .with_context(|| format!("write chart {}", path.display()))?;
    Ok(true)
}

/// White at zero, deep red at `max`.
pub fn heat_color(value: u32, max: u32) -> RGBColor {
    if max == 0 {
        return RGBColor(255, 245, 240);
    }
    let t = (f64::from(value) / f64::from(max)).clamp(0.0, 1.0);
    let lerp = |from: f64, to: f64| (from + (to - from) * t).round() as u8;
    RGBColor(lerp(255.0, 103.0), lerp(245.0, 0.0), lerp(240.0, 13.0))
}

/// Data bounds widened by `pad`, floored at zero.
pub fn axis_range(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if (hi - lo).abs() < f64::EPSILON { pad.max(0.05) } else { pad };
    ((lo - pad).max(0.0), hi + pad)
}

fn padded_max(max: u32) -> u32 {
    max + max / 10 + 1
}

fn season_span(seasons: &[String]) -> String {
    let first = seasons.first().and_then(|s| s.split('-').next());
    let last = seasons.last().and_then(|s| s.rsplit('-').next());
    match (first, last) {
        (Some(a), Some(b)) => format!("{a}-{b}"),
        _ => String::new(),
    }
}
