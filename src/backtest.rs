//! Chronological replay of a match history, predicting each fixture from the fixtures before it.

use std::time::Instant;

use ordinalizer::Ordinal;
use strum::EnumCount;
use tracing::{debug, info, trace, warn};

use crate::config::{validate_form_window, Config, Fallbacks};
use crate::domain::{ExpectedGoals, Fixture, LeagueAverages, MatchResult, Score};
use crate::model::{MatchPrediction, ModelConfig, ModelError, ScorelineModel};
use crate::rates::{HistoryView, RateSource, XgRatioEstimator};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub source: RateSource,

    /// Prior matches at the fixture's venue each side needs before the fixture is evaluated.
    pub min_games: usize,

    pub form_window: usize,
    pub model: ModelConfig,
    pub fallbacks: Fallbacks,
}
impl BacktestConfig {
    pub fn new(source: RateSource, config: &Config) -> Self {
        Self {
            source,
            min_games: config.min_games,
            form_window: config.form_window,
            model: config.model,
            fallbacks: config.fallbacks,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_form_window(self.form_window)?;
        self.model.validate()?;
        self.fallbacks.validate()
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self::new(RateSource::XgRatio, &Config::default())
    }
}

/// The prediction made for one evaluated fixture, alongside what actually happened.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRecord {
    /// Position of the fixture in the replayed history.
    pub index: usize,
    pub home_team: String,
    pub away_team: String,
    pub predicted: MatchResult,
    pub actual: MatchResult,
    pub expected_goals: ExpectedGoals,
    pub actual_score: Score,
    /// Indexed by [`MatchResult`] ordinal.
    pub outcome_probs: [f64; MatchResult::COUNT],
    pub most_likely_score: Score,
}
impl BacktestRecord {
    pub fn new(index: usize, fixture: &Fixture, prediction: &MatchPrediction) -> Self {
        Self {
            index,
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            predicted: prediction.predicted_result(),
            actual: fixture.result(),
            expected_goals: ExpectedGoals::new(prediction.lambda_home, prediction.lambda_away),
            actual_score: fixture.score(),
            outcome_probs: prediction.outcome_probs(),
            most_likely_score: prediction.most_likely_score.clone(),
        }
    }

    pub fn is_correct(&self) -> bool {
        self.predicted == self.actual
    }

    /// The point-estimate scoreline: each rate truncated to an integer.
    pub fn predicted_score(&self) -> Score {
        self.expected_goals.truncated_score()
    }

    pub fn predicted_total_goals(&self) -> u16 {
        self.expected_goals.total().round() as u16
    }

    pub fn total_goals_error(&self) -> f64 {
        (self.expected_goals.total() - self.actual_score.total() as f64).abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub total_matches: usize,
    pub correct_predictions: usize,
    pub accuracy: f64,

    /// Number of fixtures ending in each result, indexed by [`MatchResult`] ordinal.
    pub actual_counts: [usize; MatchResult::COUNT],

    /// Correct predictions among the fixtures ending in each result.
    pub correct_counts: [usize; MatchResult::COUNT],

    /// `correct_counts / actual_counts`; zero where a result never occurred.
    pub precision: [f64; MatchResult::COUNT],

    /// Rate at which the truncated rates match the final score exactly.
    pub score_accuracy: f64,

    /// Rate at which the most likely scoreline of the grid matches the final score.
    pub modal_score_accuracy: f64,

    /// Rate at which the rounded sum of the rates matches the total goals.
    pub total_goals_accuracy: f64,

    /// Mean absolute error between the summed rates and the total goals.
    pub mae: f64,

    /// Fixtures passed over for want of prior matches.
    pub skipped: usize,

    /// League averages implied by the complete history, if the xG source was used.
    pub league_averages: Option<LeagueAverages>,

    pub records: Vec<BacktestRecord>,
}
impl BacktestReport {
    pub fn from_records(records: Vec<BacktestRecord>, skipped: usize) -> Self {
        let mut actual_counts = [0; MatchResult::COUNT];
        let mut correct_counts = [0; MatchResult::COUNT];
        let (mut score_matches, mut modal_matches, mut total_goals_matches) = (0, 0, 0);
        let mut total_error = 0.0;
        for record in &records {
            actual_counts[record.actual.ordinal()] += 1;
            if record.is_correct() {
                correct_counts[record.actual.ordinal()] += 1;
            }
            if record.predicted_score() == record.actual_score {
                score_matches += 1;
            }
            if record.most_likely_score == record.actual_score {
                modal_matches += 1;
            }
            if record.predicted_total_goals() == record.actual_score.total() {
                total_goals_matches += 1;
            }
            total_error += record.total_goals_error();
        }

        let total_matches = records.len();
        let correct_predictions = correct_counts.iter().sum();
        let mut precision = [0.0; MatchResult::COUNT];
        for (ordinal, precision) in precision.iter_mut().enumerate() {
            *precision = ratio(correct_counts[ordinal], actual_counts[ordinal]);
        }

        Self {
            total_matches,
            correct_predictions,
            accuracy: ratio(correct_predictions, total_matches),
            actual_counts,
            correct_counts,
            precision,
            score_accuracy: ratio(score_matches, total_matches),
            modal_score_accuracy: ratio(modal_matches, total_matches),
            total_goals_accuracy: ratio(total_goals_matches, total_matches),
            mae: if total_matches == 0 {
                0.0
            } else {
                total_error / total_matches as f64
            },
            skipped,
            league_averages: None,
            records,
        }
    }

    pub fn precision_of(&self, result: &MatchResult) -> f64 {
        self.precision[result.ordinal()]
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Predicts every fixture that both sides have enough venue history for, using only the
/// fixtures preceding it. `fixtures` must be in chronological order. Fixtures that cannot be
/// predicted are skipped rather than failing the run, and skipped fixtures still count as
/// history for the fixtures after them. Only an invalid `config` is an error.
pub fn run_backtest(fixtures: &[Fixture], config: &BacktestConfig) -> Result<BacktestReport, ModelError> {
    config.validate()?;
    let model = ScorelineModel::try_from(config.model)?;
    let start_time = Instant::now();

    let mut records = Vec::new();
    let mut skipped = 0;
    for (index, fixture) in fixtures.iter().enumerate() {
        let history = HistoryView::before(fixtures, index);
        if !history.is_eligible(&fixture.home_team, &fixture.away_team, config.min_games) {
            trace!(
                "skipping fixture {index} ({} v {}): insufficient history",
                fixture.home_team,
                fixture.away_team
            );
            skipped += 1;
            continue;
        }

        let estimator = config.source.estimator(
            history.fixtures(),
            config.form_window,
            config.min_games,
            &config.fallbacks,
        );
        let expected_goals = estimator.estimate(&fixture.home_team, &fixture.away_team);
        let prediction = match model.predict_expected(&expected_goals) {
            Ok(prediction) => prediction,
            Err(err) => {
                warn!(
                    "skipping fixture {index} ({} v {}): {err}",
                    fixture.home_team, fixture.away_team
                );
                skipped += 1;
                continue;
            }
        };
        let record = BacktestRecord::new(index, fixture, &prediction);
        debug!(
            "fixture {index}: {} v {}, rates {:.3}:{:.3}, predicted {}, actual {}",
            record.home_team,
            record.away_team,
            expected_goals.home,
            expected_goals.away,
            record.predicted,
            record.actual
        );
        records.push(record);
    }

    let elapsed = start_time.elapsed();
    info!(
        "evaluated {} of {} fixtures in {}s",
        records.len(),
        fixtures.len(),
        elapsed.as_millis() as f64 / 1_000.
    );

    let mut report = BacktestReport::from_records(records, skipped);
    if let RateSource::XgRatio = config.source {
        let estimator = XgRatioEstimator::from_history(fixtures, config.min_games, &config.fallbacks);
        report.league_averages = Some(*estimator.league_averages());
    }
    Ok(report)
}
