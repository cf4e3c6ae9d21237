use std::collections::BTreeMap;

use crate::match_dataset::{MatchRecord, SeasonMatches};

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAggregate {
    pub team: String,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    pub matches: u32,
}

impl TeamAggregate {
    pub fn metric(&self, metric: RankMetric) -> u32 {
        match metric {
            RankMetric::GoalsScored => self.goals_scored,
            RankMetric::GoalsConceded => self.goals_conceded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMetric {
    GoalsScored,
    GoalsConceded,
}

impl RankMetric {
    pub fn column(self) -> &'static str {
        match self {
            Self::GoalsScored => "GoalsScored",
            Self::GoalsConceded => "GoalsConceded",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::GoalsScored => "Goals Scored",
            Self::GoalsConceded => "Goals Conceded",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeasonSummary {
    pub season: String,
    pub matches: usize,
    pub total_goals: u32,
    pub teams: Vec<TeamAggregate>,
    pub top_scorers: Vec<TeamAggregate>,
    pub top_conceders: Vec<TeamAggregate>,
}

#[derive(Debug, Clone)]
pub struct OverallSummary {
    pub matches: usize,
    pub total_goals: u32,
    pub teams: Vec<TeamAggregate>,
    pub top_scorers: Vec<TeamAggregate>,
    pub top_conceders: Vec<TeamAggregate>,
}

/// Per-team scored/conceded totals over the union of home and away sides.
///
/// Output is ordered by team name; that order is the tie-break for rankings.
pub fn aggregate_teams(matches: &[MatchRecord]) -> Vec<TeamAggregate> {
    let mut by_team: BTreeMap<&str, TeamAggregate> = BTreeMap::new();

    for m in matches {
        let home = by_team
            .entry(m.home_team.as_str())
            .or_insert_with(|| empty_aggregate(&m.home_team));
        home.goals_scored += m.home_goals;
        home.goals_conceded += m.away_goals;
        home.matches += 1;

        let away = by_team
            .entry(m.away_team.as_str())
            .or_insert_with(|| empty_aggregate(&m.away_team));
        away.goals_scored += m.away_goals;
        away.goals_conceded += m.home_goals;
        away.matches += 1;
    }

    by_team.into_values().collect()
}

/// Stable descending sort by `metric`, truncated to `n`.
pub fn rank_top(teams: &[TeamAggregate], metric: RankMetric, n: usize) -> Vec<TeamAggregate> {
    let mut ranked = teams.to_vec();
    ranked.sort_by(|a, b| b.metric(metric).cmp(&a.metric(metric)));
    ranked.truncate(n);
    ranked
}

pub fn total_goals(matches: &[MatchRecord]) -> u32 {
    matches.iter().map(MatchRecord::total_goals).sum()
}

pub fn summarize_season(season: &str, matches: &[MatchRecord], top_n: usize) -> SeasonSummary {
    let teams = aggregate_teams(matches);
    SeasonSummary {
        season: season.to_string(),
        matches: matches.len(),
        total_goals: total_goals(matches),
        top_scorers: rank_top(&teams, RankMetric::GoalsScored, top_n),
        top_conceders: rank_top(&teams, RankMetric::GoalsConceded, top_n),
        teams,
    }
}

pub fn summarize_seasons(seasons: &[SeasonMatches], top_n: usize) -> Vec<SeasonSummary> {
    seasons
        .iter()
        .map(|s| summarize_season(&s.label, &s.matches, top_n))
        .collect()
}

pub fn summarize_overall(matches: &[MatchRecord], top_n: usize) -> OverallSummary {
    let teams = aggregate_teams(matches);
    OverallSummary {
        matches: matches.len(),
        total_goals: total_goals(matches),
        top_scorers: rank_top(&teams, RankMetric::GoalsScored, top_n),
        top_conceders: rank_top(&teams, RankMetric::GoalsConceded, top_n),
        teams,
    }
}

fn empty_aggregate(team: &str) -> TeamAggregate {
    TeamAggregate {
        team: team.to_string(),
        goals_scored: 0,
        goals_conceded: 0,
        matches: 0,
    }
}
