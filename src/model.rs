//! The scoreline model: turns a pair of expected-goal rates into a full scoreline distribution
//! and the derived home/draw/away probabilities.

use serde::{Deserialize, Serialize};
use strum::EnumCount;
use thiserror::Error;
use tracing::trace;

use crate::domain::{ExpectedGoals, MatchResult, Score, Side};
use crate::linear::Matrix;
use crate::poisson::MAX_FACTORIAL;
use crate::probs::SliceExt;
use crate::scoregrid;
use crate::scoregrid::Outcome;

pub const DEFAULT_MAX_GOALS: u8 = 6;
pub const DEFAULT_RHO: f64 = 0.92;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid {name} ({value}): {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Low-score dependence adjustment applied on top of the independent Poisson grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Correction {
    /// Plain independent Poisson.
    None,

    /// Dixon-Coles τ adjustment of the 0:0, 1:0, 0:1 and 1:1 cells. A `rho` of 1 leaves the grid
    /// unchanged; values below 1 deflate 0:0 and 1:1 and inflate 1:0 and 0:1.
    DixonColes { rho: f64 },
}
impl Default for Correction {
    fn default() -> Self {
        Correction::DixonColes { rho: DEFAULT_RHO }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Largest goal count tracked per side; the grid spans `0..=max_goals`.
    pub max_goals: u8,
    pub correction: Correction,
}
impl ModelConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.max_goals < 1 || self.max_goals > MAX_FACTORIAL {
            return Err(ModelError::InvalidParameter {
                name: "max_goals",
                value: self.max_goals as f64,
                reason: "must lie in the range 1..=34",
            });
        }
        if let Correction::DixonColes { rho } = self.correction {
            if !rho.is_finite() || rho <= 0.0 {
                return Err(ModelError::InvalidParameter {
                    name: "rho",
                    value: rho,
                    reason: "must be finite and positive",
                });
            }
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_goals: DEFAULT_MAX_GOALS,
            correction: Correction::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchPrediction {
    pub lambda_home: f64,
    pub lambda_away: f64,
    pub home_win_prob: f64,
    pub draw_prob: f64,
    pub away_win_prob: f64,
    pub most_likely_score: Score,
    pub most_likely_score_prob: f64,
    pub probability_matrix: Matrix<f64>,
}
impl MatchPrediction {
    /// Outcome probabilities indexed by [`MatchResult`] ordinal.
    pub fn outcome_probs(&self) -> [f64; MatchResult::COUNT] {
        [self.home_win_prob, self.draw_prob, self.away_win_prob]
    }

    /// The most probable of home win, draw and away win, in that order of precedence on ties.
    pub fn predicted_result(&self) -> MatchResult {
        match self.outcome_probs().argmax() {
            Some(1) => MatchResult::Draw,
            Some(2) => MatchResult::AwayWin,
            _ => MatchResult::HomeWin,
        }
    }

    pub fn probability(&self, outcome: &Outcome) -> f64 {
        outcome.gather(&self.probability_matrix)
    }

    /// Expected goals implied by the truncated, corrected grid. These differ slightly from the
    /// input rates.
    pub fn expectations(&self) -> ExpectedGoals {
        let (home, away) = scoregrid::home_away_expectations(&self.probability_matrix);
        ExpectedGoals::new(home, away)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScorelineModel {
    config: ModelConfig,
}
impl ScorelineModel {
    /// Predicts the scoreline distribution for the given rates. Any finite, non-negative pair of
    /// rates yields a normalised grid, however large.
    pub fn predict(&self, lambda_home: f64, lambda_away: f64) -> Result<MatchPrediction, ModelError> {
        validate_rate("lambda_home", lambda_home)?;
        validate_rate("lambda_away", lambda_away)?;

        let size = self.config.max_goals as usize + 1;
        let mut probability_matrix = Matrix::allocate(size, size);
        scoregrid::from_scaled_poisson(lambda_home, lambda_away, &mut probability_matrix);
        if let Correction::DixonColes { rho } = self.config.correction {
            scoregrid::apply_dixon_coles(lambda_home, lambda_away, rho, &mut probability_matrix);
        }

        scoregrid::normalise(&mut probability_matrix);
        trace!("scoregrid:\n{}", probability_matrix.verbose());

        let home_win_prob = Outcome::Win(Side::Home).gather(&probability_matrix);
        let draw_prob = Outcome::Draw.gather(&probability_matrix);
        let away_win_prob = Outcome::Win(Side::Away).gather(&probability_matrix);
        let (most_likely_score, most_likely_score_prob) = scoregrid::most_likely(&probability_matrix);

        Ok(MatchPrediction {
            lambda_home,
            lambda_away,
            home_win_prob,
            draw_prob,
            away_win_prob,
            most_likely_score,
            most_likely_score_prob,
            probability_matrix,
        })
    }

    pub fn predict_expected(&self, expected_goals: &ExpectedGoals) -> Result<MatchPrediction, ModelError> {
        self.predict(expected_goals.home, expected_goals.away)
    }
}

impl TryFrom<ModelConfig> for ScorelineModel {
    type Error = ModelError;

    fn try_from(config: ModelConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self { config })
    }
}

/// One-shot Dixon-Coles prediction; see [`ScorelineModel::predict`].
pub fn score_distribution(
    lambda_home: f64,
    lambda_away: f64,
    max_goals: u8,
    rho: f64,
) -> Result<MatchPrediction, ModelError> {
    ScorelineModel::try_from(ModelConfig {
        max_goals,
        correction: Correction::DixonColes { rho },
    })?
    .predict(lambda_home, lambda_away)
}

fn validate_rate(name: &'static str, rate: f64) -> Result<(), ModelError> {
    if !rate.is_finite() || rate < 0.0 {
        Err(ModelError::InvalidParameter {
            name,
            value: rate,
            reason: "expected goals must be finite and non-negative",
        })
    } else {
        Ok(())
    }
}
