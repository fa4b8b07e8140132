use chrono::NaiveDate;
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::model::ModelError;

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}
impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn nil_all() -> Self {
        Self { home: 0, away: 0 }
    }

    pub fn total(&self) -> u16 {
        self.home as u16 + self.away as u16
    }

    pub fn result(&self) -> MatchResult {
        MatchResult::from_goals(self.home, self.away)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// Full-time result from the home team's perspective.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Ordinal, EnumCount, EnumIter, Display, Serialize, Deserialize)]
pub enum MatchResult {
    #[strum(serialize = "H")]
    HomeWin,
    #[strum(serialize = "D")]
    Draw,
    #[strum(serialize = "A")]
    AwayWin,
}
impl MatchResult {
    pub fn from_goals(home: u8, away: u8) -> Self {
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => MatchResult::HomeWin,
            std::cmp::Ordering::Equal => MatchResult::Draw,
            std::cmp::Ordering::Less => MatchResult::AwayWin,
        }
    }
}

/// A completed match, as read from a match-history table.
#[derive(Clone, Debug, PartialEq)]
pub struct Fixture {
    pub date: Option<NaiveDate>,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u8,
    pub away_goals: u8,
    pub home_xg: Option<f64>,
    pub away_xg: Option<f64>,
}
impl Fixture {
    pub fn score(&self) -> Score {
        Score::new(self.home_goals, self.away_goals)
    }

    pub fn result(&self) -> MatchResult {
        MatchResult::from_goals(self.home_goals, self.away_goals)
    }

    /// Per-match expected goals `(home, away)`, if both sides carry a figure.
    pub fn xg(&self) -> Option<(f64, f64)> {
        match (self.home_xg, self.away_xg) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }
}

/// A team's season-cumulative expected-goals line from a league table.
#[derive(Clone, Debug, PartialEq)]
pub struct LeagueTableRow {
    pub team: String,
    pub xg: f64,
    pub xga: f64,
    pub matches: u32,
}
impl LeagueTableRow {
    /// Per-match `(xG, xGA)`, or `None` if the team has not played.
    pub fn per_match(&self) -> Option<TeamForm> {
        if self.matches == 0 {
            None
        } else {
            let matches = self.matches as f64;
            Some(TeamForm {
                attack_rate: self.xg / matches,
                defense_rate: self.xga / matches,
            })
        }
    }
}

/// Average goals (or expected goals) scored and conceded per match.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamForm {
    pub attack_rate: f64,
    pub defense_rate: f64,
}

/// Venue-split form: how a team fares at home and away.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VenueForm {
    pub home: TeamForm,
    pub away: TeamForm,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeagueAverages {
    pub avg_goals_for: f64,
    pub avg_goals_against: f64,
}
impl LeagueAverages {
    pub fn new(avg_goals_for: f64, avg_goals_against: f64) -> Result<Self, ModelError> {
        let averages = Self {
            avg_goals_for,
            avg_goals_against,
        };
        averages.validate()?;
        Ok(averages)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for (name, value) in [
            ("avg_goals_for", self.avg_goals_for),
            ("avg_goals_against", self.avg_goals_against),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ModelError::InvalidParameter {
                    name,
                    value,
                    reason: "league averages must be strictly positive",
                });
            }
        }
        Ok(())
    }

    pub fn as_form(&self) -> TeamForm {
        TeamForm {
            attack_rate: self.avg_goals_for,
            defense_rate: self.avg_goals_against,
        }
    }
}

/// The pair of Poisson rates for a fixture.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}
impl ExpectedGoals {
    pub fn new(home: f64, away: f64) -> Self {
        Self { home, away }
    }

    pub fn total(&self) -> f64 {
        self.home + self.away
    }

    /// The integer-truncated scoreline implied by the rates.
    pub fn truncated_score(&self) -> Score {
        Score::new(self.home.max(0.0) as u8, self.away.max(0.0) as u8)
    }
}
