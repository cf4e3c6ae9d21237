use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Columns every season file must carry. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Date", "HomeTeam", "AwayTeam", "FTHG", "FTAG", "FTR", "HS", "AS", "HST", "AST",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchResult {
    Home,
    Draw,
    Away,
}

impl MatchResult {
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim() {
            "H" | "h" => Some(Self::Home),
            "D" | "d" => Some(Self::Draw),
            "A" | "a" => Some(Self::Away),
            _ => None,
        }
    }

    pub fn from_score(home_goals: u32, away_goals: u32) -> Self {
        if home_goals > away_goals {
            Self::Home
        } else if home_goals < away_goals {
            Self::Away
        } else {
            Self::Draw
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::Home => 'H',
            Self::Draw => 'D',
            Self::Away => 'A',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub season: String,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub result: MatchResult,
    pub home_shots: u32,
    pub away_shots: u32,
    pub home_shots_on_target: u32,
    pub away_shots_on_target: u32,
}

impl MatchRecord {
    pub fn total_goals(&self) -> u32 {
        self.home_goals + self.away_goals
    }

    /// FTR agrees with the full-time score.
    pub fn result_consistent(&self) -> bool {
        MatchResult::from_score(self.home_goals, self.away_goals) == self.result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonEntry {
    pub label: String,
    pub file_name: String,
}

/// Ordered season label -> file name mapping. Order drives report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonManifest {
    entries: Vec<SeasonEntry>,
}

impl Default for SeasonManifest {
    fn default() -> Self {
        Self::epl_2020_2025()
    }
}

impl SeasonManifest {
    pub fn new(entries: Vec<SeasonEntry>) -> Self {
        Self { entries }
    }

    pub fn epl_2020_2025() -> Self {
        let entries = (2020..2025)
            .map(|start| SeasonEntry {
                label: format!("{start}-{}", start + 1),
                file_name: format!("data_epl_{start}_{}.csv", start + 1),
            })
            .collect();
        Self { entries }
    }

    /// Parses `label=file;label=file` (commas also accepted as separators).
    pub fn parse(raw: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for part in raw.split([';', ',']) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (label, file_name) = part
                .split_once('=')
                .ok_or_else(|| anyhow!("season entry {part:?} is not label=file"))?;
            let (label, file_name) = (label.trim(), file_name.trim());
            if label.is_empty() || file_name.is_empty() {
                bail!("season entry {part:?} has an empty label or file");
            }
            entries.push(SeasonEntry {
                label: label.to_string(),
                file_name: file_name.to_string(),
            });
        }
        if entries.is_empty() {
            bail!("season manifest is empty");
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SeasonEntry] {
        &self.entries
    }

    pub fn label_for_file(&self, file_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.file_name == file_name)
            .map(|e| e.label.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SeasonMatches {
    pub label: String,
    pub matches: Vec<MatchRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MatchDataset {
    pub files: Vec<PathBuf>,
    pub matches: Vec<MatchRecord>,
}

#[derive(Debug, Deserialize)]
struct RawMatchRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "HomeTeam")]
    home_team: String,
    #[serde(rename = "AwayTeam")]
    away_team: String,
    #[serde(rename = "FTHG")]
    home_goals: u32,
    #[serde(rename = "FTAG")]
    away_goals: u32,
    #[serde(rename = "FTR")]
    result: String,
    #[serde(rename = "HS")]
    home_shots: u32,
    #[serde(rename = "AS")]
    away_shots: u32,
    #[serde(rename = "HST")]
    home_shots_on_target: u32,
    #[serde(rename = "AST")]
    away_shots_on_target: u32,
}

/// Reads every `*.csv` in `dir` into one combined table.
///
/// Files are visited in file-name order. Each file's season comes from the
/// manifest, then from a `YYYY_YYYY` pair in its name, and only as a last
/// resort from each match date.
pub fn load_data_folder(dir: &Path, manifest: &SeasonManifest) -> Result<MatchDataset> {
    let files = list_csv_files(dir)?;
    if files.is_empty() {
        bail!("no .csv files found in {}", dir.display());
    }
    for entry in manifest.entries() {
        let path = dir.join(&entry.file_name);
        if !path.is_file() {
            warn!(season = %entry.label, file = %path.display(), "season file missing, skipped");
        }
    }

    let mut dataset = MatchDataset::default();
    for path in files {
        let season = season_label_for_path(&path, manifest);
        if season.is_none() {
            warn!(
                file = %path.display(),
                "no season in manifest or file name; deriving season from match dates"
            );
        }
        let rows = load_match_file(&path, season.as_deref())?;
        debug!(file = %path.display(), rows = rows.len(), "loaded season file");
        dataset.matches.extend(rows);
        dataset.files.push(path);
    }

    info!(
        files = dataset.files.len(),
        matches = dataset.matches.len(),
        "combined match table loaded"
    );
    Ok(dataset)
}

/// Splits the combined table by `MatchRecord::season`.
///
/// Manifest seasons come first, in manifest order, followed by any season
/// derived from a file name or match date, in label order. Seasons without
/// matches are left out.
pub fn group_by_season(matches: &[MatchRecord], manifest: &SeasonManifest) -> Vec<SeasonMatches> {
    let mut by_label: BTreeMap<&str, Vec<MatchRecord>> = BTreeMap::new();
    for m in matches {
        by_label.entry(m.season.as_str()).or_default().push(m.clone());
    }

    let mut out = Vec::with_capacity(by_label.len());
    for entry in manifest.entries() {
        if let Some(matches) = by_label.remove(entry.label.as_str()) {
            out.push(SeasonMatches {
                label: entry.label.clone(),
                matches,
            });
        }
    }
    out.extend(by_label.into_iter().map(|(label, matches)| SeasonMatches {
        label: label.to_string(),
        matches,
    }));
    out
}

pub fn load_match_file(path: &Path, season: Option<&str>) -> Result<Vec<MatchRecord>> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_matches(file, season).with_context(|| format!("read match file {}", path.display()))
}

pub fn parse_matches_csv(raw: &str, season: Option<&str>) -> Result<Vec<MatchRecord>> {
    read_matches(raw.as_bytes(), season)
}

fn read_matches<R: Read>(rdr: R, season: Option<&str>) -> Result<Vec<MatchRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers = reader.headers().context("read header row")?.clone();
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!("missing expected column(s): {}", missing.join(", "));
    }

    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<RawMatchRow>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let raw = row.with_context(|| format!("malformed row at line {line}"))?;
        let record =
            build_record(raw, season).with_context(|| format!("invalid row at line {line}"))?;
        if !record.result_consistent() {
            let score = format!("{}-{}", record.home_goals, record.away_goals);
            warn!(
                line,
                home = %record.home_team,
                away = %record.away_team,
                ftr = %record.result.code(),
                score = %score,
                "result code disagrees with score"
            );
        }
        out.push(record);
    }
    Ok(out)
}

fn build_record(raw: RawMatchRow, season: Option<&str>) -> Result<MatchRecord> {
    if raw.home_team.is_empty() || raw.away_team.is_empty() {
        bail!("empty team name");
    }
    let date = parse_match_date(&raw.date)?;
    let result = MatchResult::from_code(&raw.result)
        .ok_or_else(|| anyhow!("unknown result code {:?}", raw.result))?;
    let season = season
        .map(|s| s.to_string())
        .unwrap_or_else(|| season_label_for_date(date));
    Ok(MatchRecord {
        date,
        season,
        home_team: raw.home_team,
        away_team: raw.away_team,
        home_goals: raw.home_goals,
        away_goals: raw.away_goals,
        result,
        home_shots: raw.home_shots,
        away_shots: raw.away_shots,
        home_shots_on_target: raw.home_shots_on_target,
        away_shots_on_target: raw.away_shots_on_target,
    })
}

/// Day-first dates (`dd/mm/yyyy`, `dd/mm/yy`) plus ISO `yyyy-mm-dd`.
pub fn parse_match_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    if s.contains('-') {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid match date {s:?}"));
    }
    let year_digits = s.rsplit('/').next().map(str::len).unwrap_or(0);
    let fmt = if year_digits == 2 { "%d/%m/%y" } else { "%d/%m/%Y" };
    NaiveDate::parse_from_str(s, fmt).with_context(|| format!("invalid match date {s:?}"))
}

/// August-to-May league calendar: July onwards opens a new season.
pub fn season_label_for_date(date: NaiveDate) -> String {
    let start = if date.month() >= 7 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{start}-{}", start + 1)
}

/// `data_epl_2020_2021.csv` -> `2020-2021`.
pub fn season_label_from_file_name(file_name: &str) -> Option<String> {
    let years = file_name
        .split(|ch: char| !ch.is_ascii_digit())
        .filter(|s| s.len() == 4)
        .filter_map(|s| s.parse::<i32>().ok())
        .collect::<Vec<_>>();
    years
        .windows(2)
        .find(|pair| pair[1] == pair[0] + 1)
        .map(|pair| format!("{}-{}", pair[0], pair[1]))
}

fn season_label_for_path(path: &Path, manifest: &SeasonManifest) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    manifest
        .label_for_file(name)
        .map(|s| s.to_string())
        .or_else(|| season_label_from_file_name(name))
}

fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("read data folder {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("list data folder {}", dir.display()))?
            .path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
