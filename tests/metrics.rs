use std::path::PathBuf;

use chrono::NaiveDate;

use epl_goals::match_dataset::{MatchRecord, MatchResult, SeasonManifest, load_data_folder};
use epl_goals::match_metrics::{
    clean_sheet_flags, clean_sheets, goal_matrix, goals_over_time, result_counts,
    shot_accuracy_by_team,
};

fn fixture_matches() -> Vec<MatchRecord> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("data");
    load_data_folder(&path, &SeasonManifest::default())
        .expect("fixture folder should load")
        .matches
}

fn record(
    home: &str,
    away: &str,
    goals: (u32, u32),
    shots: (u32, u32),
    on_target: (u32, u32),
) -> MatchRecord {
    MatchRecord {
        date: NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
        season: "2020-2021".to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_goals: goals.0,
        away_goals: goals.1,
        result: MatchResult::from_score(goals.0, goals.1),
        home_shots: shots.0,
        away_shots: shots.1,
        home_shots_on_target: on_target.0,
        away_shots_on_target: on_target.1,
    }
}

#[test]
fn clean_sheets_by_side() {
    let m = record("A", "B", (2, 0), (10, 10), (5, 5));
    assert_eq!(clean_sheet_flags(&m), (true, false));
    let m = record("A", "B", (0, 0), (10, 10), (5, 5));
    assert_eq!(clean_sheet_flags(&m), (true, true));

    let tally = clean_sheets(&fixture_matches());
    assert_eq!(tally.home, 2);
    assert_eq!(tally.away, 3);
}

#[test]
fn result_counts_from_codes() {
    let counts = result_counts(&fixture_matches());
    assert_eq!(counts.home_wins, 4);
    assert_eq!(counts.draws, 3);
    assert_eq!(counts.away_wins, 3);
    assert_eq!(counts.total(), 10);
}

#[test]
fn goal_matrix_is_home_perspective_with_zero_fill() {
    let matches = fixture_matches();
    let matrix = goal_matrix(&matches);
    assert_eq!(
        matrix.teams,
        vec!["Arsenal", "Fulham", "Leeds", "Liverpool", "Norwich"]
    );
    assert_eq!(matrix.get("Liverpool", "Leeds"), Some(4));
    assert_eq!(matrix.get("Leeds", "Liverpool"), Some(0));
    assert_eq!(matrix.get("Liverpool", "Arsenal"), Some(2));
    assert_eq!(matrix.get("Arsenal", "Liverpool"), Some(1));
    // Never played at home against each other.
    assert_eq!(matrix.get("Leeds", "Arsenal"), Some(0));
    assert_eq!(matrix.get("Norwich", "Arsenal"), Some(0));
    assert_eq!(matrix.get("Chelsea", "Arsenal"), None);

    let home_goals: u32 = matches.iter().map(|m| m.home_goals).sum();
    assert_eq!(matrix.total(), home_goals);
    assert_eq!(matrix.max_value(), 4);
}

#[test]
fn accuracy_is_bounded_and_finite() {
    for row in shot_accuracy_by_team(&fixture_matches()) {
        assert!(row.accuracy.is_finite(), "{}", row.team);
        assert!((0.0..=1.0).contains(&row.accuracy), "{}", row.team);
        assert!(row.goals >= 0.0);
    }
}

#[test]
fn team_without_shots_has_zero_accuracy() {
    let matches = vec![
        record("Shotless", "Sharp", (0, 1), (0, 4), (0, 2)),
        record("Sharp", "Shotless", (3, 0), (6, 0), (3, 0)),
    ];
    let rows = shot_accuracy_by_team(&matches);
    let shotless = rows.iter().find(|r| r.team == "Shotless").unwrap();
    assert_eq!(shotless.accuracy, 0.0);
    assert_eq!(shotless.goals, 0.0);
    assert_eq!(shotless.matches, 2);

    let sharp = rows.iter().find(|r| r.team == "Sharp").unwrap();
    assert!((sharp.accuracy - 0.5).abs() < 1e-9);
    assert!((sharp.goals - 2.0).abs() < 1e-9);
}

#[test]
fn goals_over_time_sums_per_day_and_team() {
    let rows = goals_over_time(&fixture_matches());
    // Every match contributes two sides; no team plays twice on one date here.
    assert_eq!(rows.len(), 20);
    assert!(rows.windows(2).all(|w| (w[0].date, &w[0].team) <= (w[1].date, &w[1].team)));
    let liverpool_opening = rows
        .iter()
        .find(|r| r.team == "Liverpool" && r.date == NaiveDate::from_ymd_opt(2020, 9, 12).unwrap())
        .unwrap();
    assert_eq!(liverpool_opening.goals, 4);
    let total: u32 = rows.iter().map(|r| r.goals).sum();
    assert_eq!(total, 32);
}
