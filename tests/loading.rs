use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use epl_goals::match_dataset::{
    MatchResult, SeasonManifest, group_by_season, load_data_folder, parse_matches_csv,
};

const HEADER: &str = "Date,HomeTeam,AwayTeam,FTHG,FTAG,FTR,HS,AS,HST,AST";

fn fixture_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("data");
    path
}

#[test]
fn loads_every_csv_in_folder() {
    let dataset = load_data_folder(&fixture_dir(), &SeasonManifest::default())
        .expect("fixture folder should load");
    assert_eq!(dataset.files.len(), 2);
    assert_eq!(dataset.matches.len(), 10);

    let first = &dataset.matches[0];
    assert_eq!(first.home_team, "Fulham");
    assert_eq!(first.away_team, "Arsenal");
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2020, 9, 12).unwrap());
    assert_eq!(first.result, MatchResult::Away);
    assert_eq!((first.home_shots, first.away_shots), (5, 13));
    assert_eq!((first.home_shots_on_target, first.away_shots_on_target), (2, 5));

    // Two-digit years in the second file.
    let last = dataset.matches.last().unwrap();
    assert_eq!(last.date, NaiveDate::from_ymd_opt(2022, 1, 22).unwrap());
    assert_eq!(last.season, "2021-2022");
}

#[test]
fn january_match_keeps_manifest_season() {
    let dataset = load_data_folder(&fixture_dir(), &SeasonManifest::default()).unwrap();
    let jan = dataset
        .matches
        .iter()
        .find(|m| m.date == NaiveDate::from_ymd_opt(2021, 1, 16).unwrap())
        .expect("january fixture present");
    assert_eq!(jan.season, "2020-2021");
}

#[test]
fn manifest_seasons_skip_missing_files() {
    let manifest = SeasonManifest::default();
    let dataset = load_data_folder(&fixture_dir(), &manifest).unwrap();
    let seasons = group_by_season(&dataset.matches, &manifest);
    let labels = seasons.iter().map(|s| s.label.as_str()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["2020-2021", "2021-2022"]);
    assert_eq!(seasons[0].matches.len(), 6);
    assert_eq!(seasons[1].matches.len(), 4);
}

#[test]
fn unlisted_file_takes_season_from_name() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("E0_2019_2020.csv"),
        format!("{HEADER}\n10/08/2019,Liverpool,Norwich,4,1,H,15,12,7,5\n"),
    )
    .unwrap();
    fs::write(
        dir.path().join("extra.csv"),
        format!("{HEADER}\n01/03/2018,Arsenal,Leeds,1,0,H,9,9,3,3\n"),
    )
    .unwrap();

    let dataset = load_data_folder(dir.path(), &SeasonManifest::default()).unwrap();
    assert_eq!(dataset.matches.len(), 2);
    assert_eq!(dataset.matches[0].season, "2019-2020");
    // No manifest entry and no year pair: falls back to the match date.
    assert_eq!(dataset.matches[1].season, "2017-2018");
}

#[test]
fn custom_manifest_label_wins() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("data_epl_2020_2021.csv"),
        format!("{HEADER}\n12/09/2020,Fulham,Arsenal,0,3,A,5,13,2,5\n"),
    )
    .unwrap();
    let manifest = SeasonManifest::parse("EPL 20/21=data_epl_2020_2021.csv").unwrap();
    let dataset = load_data_folder(dir.path(), &manifest).unwrap();
    assert_eq!(dataset.matches[0].season, "EPL 20/21");
}

#[test]
fn malformed_file_halts_with_context() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("data_epl_2020_2021.csv"),
        format!("{HEADER}\n12/09/2020,Fulham,Arsenal,zero,3,A,5,13,2,5\n"),
    )
    .unwrap();
    let err = load_data_folder(dir.path(), &SeasonManifest::default()).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("data_epl_2020_2021.csv"), "{msg}");
    assert!(msg.contains("line 2"), "{msg}");
}

#[test]
fn bad_date_and_result_code_are_errors() {
    let bad_date = format!("{HEADER}\n2020/13/45,A,B,1,0,H,1,1,1,1\n");
    assert!(parse_matches_csv(&bad_date, Some("x")).is_err());

    let bad_ftr = format!("{HEADER}\n12/09/2020,A,B,1,0,W,1,1,1,1\n");
    let err = parse_matches_csv(&bad_ftr, Some("x")).unwrap_err();
    assert!(format!("{err:#}").contains("result code"));

    let negative = format!("{HEADER}\n12/09/2020,A,B,-1,0,A,1,1,1,1\n");
    assert!(parse_matches_csv(&negative, Some("x")).is_err());
}

#[test]
fn empty_folder_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("readme.txt"), "nothing here").unwrap();
    assert!(load_data_folder(dir.path(), &SeasonManifest::default()).is_err());
    assert!(load_data_folder(&dir.path().join("missing"), &SeasonManifest::default()).is_err());
}

#[test]
fn inconsistent_result_code_is_kept() {
    let raw = format!("{HEADER}\n12/09/2020,A,B,2,0,A,1,1,1,1\n");
    let rows = parse_matches_csv(&raw, Some("2020-2021")).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].result_consistent());
}
