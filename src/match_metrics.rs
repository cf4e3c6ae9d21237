use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::match_dataset::{MatchRecord, MatchResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanSheetTally {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultCounts {
    pub home_wins: u32,
    pub draws: u32,
    pub away_wins: u32,
}

impl ResultCounts {
    pub fn total(&self) -> u32 {
        self.home_wins + self.draws + self.away_wins
    }
}

/// Goals scored by the home team (row) against the away team (column).
/// Both axes are the sorted union of every team in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalMatrix {
    pub teams: Vec<String>,
    pub cells: Vec<Vec<u32>>,
}

impl GoalMatrix {
    pub fn get(&self, home: &str, away: &str) -> Option<u32> {
        let row = self.teams.iter().position(|t| t == home)?;
        let col = self.teams.iter().position(|t| t == away)?;
        Some(self.cells[row][col])
    }

    pub fn max_value(&self) -> u32 {
        self.cells
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.cells.iter().flat_map(|row| row.iter()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamAccuracy {
    pub team: String,
    pub matches: u32,
    /// Mean of per-match shots-on-target / shots.
    pub accuracy: f64,
    /// Mean goals per match.
    pub goals: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamGoalsOnDate {
    pub date: NaiveDate,
    pub team: String,
    pub goals: u32,
}

/// A side keeps a clean sheet when the opponent scored nothing.
pub fn clean_sheet_flags(m: &MatchRecord) -> (bool, bool) {
    (m.away_goals == 0, m.home_goals == 0)
}

pub fn clean_sheets(matches: &[MatchRecord]) -> CleanSheetTally {
    let mut tally = CleanSheetTally::default();
    for m in matches {
        let (home, away) = clean_sheet_flags(m);
        tally.home += u32::from(home);
        tally.away += u32::from(away);
    }
    tally
}

pub fn result_counts(matches: &[MatchRecord]) -> ResultCounts {
    let mut counts = ResultCounts::default();
    for m in matches {
        match m.result {
            MatchResult::Home => counts.home_wins += 1,
            MatchResult::Draw => counts.draws += 1,
            MatchResult::Away => counts.away_wins += 1,
        }
    }
    counts
}

pub fn goal_matrix(matches: &[MatchRecord]) -> GoalMatrix {
    let teams = matches
        .iter()
        .flat_map(|m| [m.home_team.as_str(), m.away_team.as_str()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let index: HashMap<&str, usize> = teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let mut cells = vec![vec![0u32; teams.len()]; teams.len()];
    for m in matches {
        let row = index[m.home_team.as_str()];
        let col = index[m.away_team.as_str()];
        cells[row][col] += m.home_goals;
    }

    GoalMatrix { teams, cells }
}

/// Shots on target over shots, 0 when no shots were taken.
pub fn shot_accuracy(on_target: u32, shots: u32) -> f64 {
    if shots == 0 {
        return 0.0;
    }
    (f64::from(on_target) / f64::from(shots)).clamp(0.0, 1.0)
}

/// Average shot accuracy and average goals per team across all its matches,
/// home and away. Ordered by team name.
pub fn shot_accuracy_by_team(matches: &[MatchRecord]) -> Vec<TeamAccuracy> {
    // team -> (matches, accuracy sum, goals sum)
    let mut acc: BTreeMap<&str, (u32, f64, u32)> = BTreeMap::new();
    for m in matches {
        let home = acc.entry(m.home_team.as_str()).or_default();
        home.0 += 1;
        home.1 += shot_accuracy(m.home_shots_on_target, m.home_shots);
        home.2 += m.home_goals;

        let away = acc.entry(m.away_team.as_str()).or_default();
        away.0 += 1;
        away.1 += shot_accuracy(m.away_shots_on_target, m.away_shots);
        away.2 += m.away_goals;
    }

    acc.into_iter()
        .map(|(team, (n, acc_sum, goals))| {
            let n_f = f64::from(n.max(1));
            TeamAccuracy {
                team: team.to_string(),
                matches: n,
                accuracy: acc_sum / n_f,
                goals: f64::from(goals) / n_f,
            }
        })
        .collect()
}

pub fn goals_over_time(matches: &[MatchRecord]) -> Vec<TeamGoalsOnDate> {
    let mut by_day: BTreeMap<(NaiveDate, &str), u32> = BTreeMap::new();
    for m in matches {
        *by_day.entry((m.date, m.home_team.as_str())).or_insert(0) += m.home_goals;
        *by_day.entry((m.date, m.away_team.as_str())).or_insert(0) += m.away_goals;
    }
    by_day
        .into_iter()
        .map(|((date, team), goals)| TeamGoalsOnDate {
            date,
            team: team.to_string(),
            goals,
        })
        .collect()
}
