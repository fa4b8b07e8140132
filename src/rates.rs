//! Estimation of the expected-goal rates `(λ_home, λ_away)` for a fixture.
//!
//! Two strategies are supported:
//!
//! * [`FormEstimator`] averages each side's recent venue-specific goals scored and conceded. It
//!   is a simple averaging heuristic, not a fitted model: the home rate is the mean of the home
//!   side's home attack and the away side's away defence, and vice versa.
//! * [`XgRatioEstimator`] scales each side's per-match xG by the opponent's per-match xGA
//!   relative to the league average xGA.
//!
//! Neither estimator fails. Missing teams and empty histories degrade to the configured
//! [`Fallbacks`].

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::{debug, warn};

use crate::config::Fallbacks;
use crate::domain::{ExpectedGoals, Fixture, LeagueAverages, LeagueTableRow, TeamForm, VenueForm};

pub trait RateEstimator {
    fn estimate(&self, home_team: &str, away_team: &str) -> ExpectedGoals;
}

/// Selects the estimation strategy where the data source is chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum RateSource {
    #[strum(serialize = "form")]
    Form,
    #[strum(serialize = "xg")]
    XgRatio,
}
impl RateSource {
    /// Builds an estimator over a match history. Backtests pass only the fixtures preceding the
    /// one under evaluation.
    pub fn estimator<'a>(
        &self,
        history: &'a [Fixture],
        form_window: usize,
        min_games: usize,
        fallbacks: &'a Fallbacks,
    ) -> Box<dyn RateEstimator + 'a> {
        match self {
            RateSource::Form => Box::new(FormEstimator::new(history, form_window, fallbacks)),
            RateSource::XgRatio => Box::new(XgRatioEstimator::from_history(history, min_games, fallbacks)),
        }
    }
}

pub struct FormEstimator<'a> {
    history: &'a [Fixture],
    window: usize,
    fallbacks: &'a Fallbacks,
}
impl<'a> FormEstimator<'a> {
    /// `history` must be in chronological order; the last `window` matches at each venue count.
    pub fn new(history: &'a [Fixture], window: usize, fallbacks: &'a Fallbacks) -> Self {
        Self {
            history,
            window,
            fallbacks,
        }
    }

    pub fn venue_form(&self, team: &str) -> VenueForm {
        let home = trailing_average(
            self.history
                .iter()
                .rev()
                .filter(|fixture| fixture.home_team == team)
                .take(self.window)
                .map(|fixture| (fixture.home_goals, fixture.away_goals)),
        );
        let away = trailing_average(
            self.history
                .iter()
                .rev()
                .filter(|fixture| fixture.away_team == team)
                .take(self.window)
                .map(|fixture| (fixture.away_goals, fixture.home_goals)),
        );
        if home.is_none() || away.is_none() {
            debug!(
                "incomplete form for {team} (home: {}, away: {}); substituting fallbacks",
                home.is_some(),
                away.is_some()
            );
        }
        VenueForm {
            home: home.unwrap_or(self.fallbacks.home_form),
            away: away.unwrap_or(self.fallbacks.away_form),
        }
    }
}

impl<'a> RateEstimator for FormEstimator<'a> {
    fn estimate(&self, home_team: &str, away_team: &str) -> ExpectedGoals {
        let home = self.venue_form(home_team).home;
        let away = self.venue_form(away_team).away;
        ExpectedGoals {
            home: (home.attack_rate + away.defense_rate) / 2.0,
            away: (away.attack_rate + home.defense_rate) / 2.0,
        }
    }
}

/// Mean `(scored, conceded)` over the given matches, or `None` if there are none.
fn trailing_average(goals: impl Iterator<Item = (u8, u8)>) -> Option<TeamForm> {
    let (mut scored, mut conceded, mut matches) = (0u32, 0u32, 0u32);
    for (for_goals, against_goals) in goals {
        scored += for_goals as u32;
        conceded += against_goals as u32;
        matches += 1;
    }
    if matches == 0 {
        None
    } else {
        Some(TeamForm {
            attack_rate: scored as f64 / matches as f64,
            defense_rate: conceded as f64 / matches as f64,
        })
    }
}

#[derive(Debug, Clone)]
pub struct XgRatioEstimator {
    teams: FxHashMap<String, TeamForm>,
    league_averages: LeagueAverages,
}
impl XgRatioEstimator {
    /// From a season league table of cumulative xG and xGA. Teams that have not played are
    /// treated as unknown. A team listed more than once keeps its first row.
    pub fn from_league_table(rows: &[LeagueTableRow], fallbacks: &Fallbacks) -> Self {
        let mut teams = FxHashMap::default();
        for row in rows {
            if let Some(form) = row.per_match() {
                match teams.entry(row.team.clone()) {
                    Entry::Occupied(_) => warn!("duplicate league table row for {}; keeping the first", row.team),
                    Entry::Vacant(entry) => {
                        entry.insert(form);
                    }
                }
            }
        }
        let league_averages = average_forms(teams.values(), fallbacks);
        Self { teams, league_averages }
    }

    /// From per-match xG recorded in a match history, aggregated across both venues. Fixtures
    /// without xG figures are ignored. Only teams with at least `min_games` such matches
    /// contribute to the league averages.
    pub fn from_history(history: &[Fixture], min_games: usize, fallbacks: &Fallbacks) -> Self {
        #[derive(Default)]
        struct Totals {
            xg: f64,
            xga: f64,
            matches: u32,
        }

        let mut totals: FxHashMap<&str, Totals> = FxHashMap::default();
        for fixture in history {
            if let Some((home_xg, away_xg)) = fixture.xg() {
                let home = totals.entry(&fixture.home_team).or_default();
                home.xg += home_xg;
                home.xga += away_xg;
                home.matches += 1;
                let away = totals.entry(&fixture.away_team).or_default();
                away.xg += away_xg;
                away.xga += home_xg;
                away.matches += 1;
            }
        }

        let teams = totals
            .into_iter()
            .filter(|(_, totals)| totals.matches > 0)
            .map(|(team, totals)| {
                (
                    team.to_string(),
                    (
                        TeamForm {
                            attack_rate: totals.xg / totals.matches as f64,
                            defense_rate: totals.xga / totals.matches as f64,
                        },
                        totals.matches,
                    ),
                )
            })
            .collect::<FxHashMap<_, _>>();
        let min_games = u32::try_from(min_games.max(1)).unwrap_or(u32::MAX);
        let league_averages = average_forms(
            teams
                .values()
                .filter(|(_, matches)| *matches >= min_games)
                .map(|(form, _)| form),
            fallbacks,
        );
        Self {
            teams: teams.into_iter().map(|(team, (form, _))| (team, form)).collect(),
            league_averages,
        }
    }

    pub fn league_averages(&self) -> &LeagueAverages {
        &self.league_averages
    }

    /// Per-match xG and xGA; the league averages for unknown teams.
    pub fn team_form(&self, team: &str) -> TeamForm {
        match self.teams.get(team) {
            Some(form) => *form,
            None => {
                debug!("no xG data for {team}; using league averages");
                self.league_averages.as_form()
            }
        }
    }
}

impl RateEstimator for XgRatioEstimator {
    fn estimate(&self, home_team: &str, away_team: &str) -> ExpectedGoals {
        let home = self.team_form(home_team);
        let away = self.team_form(away_team);
        let avg_xga = self.league_averages.avg_goals_against;
        ExpectedGoals {
            home: home.attack_rate * (away.defense_rate / avg_xga),
            away: away.attack_rate * (home.defense_rate / avg_xga),
        }
    }
}

/// Mean of per-team per-match ratios. Falls back to the configured averages when there are no
/// teams or the result would not be a usable divisor.
fn average_forms<'a>(forms: impl Iterator<Item = &'a TeamForm>, fallbacks: &Fallbacks) -> LeagueAverages {
    let (mut xg, mut xga, mut teams) = (0.0, 0.0, 0usize);
    for form in forms {
        xg += form.attack_rate;
        xga += form.defense_rate;
        teams += 1;
    }
    if teams == 0 {
        return fallbacks.league_averages;
    }
    match LeagueAverages::new(xg / teams as f64, xga / teams as f64) {
        Ok(averages) => averages,
        Err(err) => {
            warn!("{err}; using fallback league averages");
            fallbacks.league_averages
        }
    }
}

/// The fixtures strictly preceding a given position in a chronologically ordered history.
#[derive(Debug, Clone, Copy)]
pub struct HistoryView<'a> {
    fixtures: &'a [Fixture],
}
impl<'a> HistoryView<'a> {
    pub fn before(fixtures: &'a [Fixture], index: usize) -> Self {
        Self {
            fixtures: &fixtures[..index],
        }
    }

    pub fn fixtures(&self) -> &'a [Fixture] {
        self.fixtures
    }

    pub fn home_matches(&self, team: &str) -> usize {
        self.fixtures.iter().filter(|fixture| fixture.home_team == team).count()
    }

    pub fn away_matches(&self, team: &str) -> usize {
        self.fixtures.iter().filter(|fixture| fixture.away_team == team).count()
    }

    /// Whether the home side has `min_games` prior home matches and the away side `min_games`
    /// prior away matches.
    pub fn is_eligible(&self, home_team: &str, away_team: &str, min_games: usize) -> bool {
        self.home_matches(home_team) >= min_games && self.away_matches(away_team) >= min_games
    }
}
