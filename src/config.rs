//! Tuning and fallback constants, loadable from JSON.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::from_reader;
use thiserror::Error;

use crate::domain::{LeagueAverages, TeamForm};
use crate::model::{ModelConfig, ModelError};

pub const DEFAULT_FORM_WINDOW: usize = 5;
pub const DEFAULT_MIN_GAMES: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidParameter(#[from] ModelError),
}

/// Rates substituted when a team has no usable history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fallbacks {
    /// Goals scored and conceded by a side playing at home (long-run top-flight averages).
    pub home_form: TeamForm,

    /// Goals scored and conceded by a side playing away.
    pub away_form: TeamForm,

    /// Per-match xG/xGA used when no league table or history is available.
    pub league_averages: LeagueAverages,
}
impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            home_form: TeamForm {
                attack_rate: 1.4,
                defense_rate: 1.2,
            },
            away_form: TeamForm {
                attack_rate: 1.1,
                defense_rate: 1.4,
            },
            league_averages: LeagueAverages {
                avg_goals_for: 1.3,
                avg_goals_against: 1.3,
            },
        }
    }
}
impl Fallbacks {
    pub fn validate(&self) -> Result<(), ModelError> {
        for (name, value) in [
            ("home_form.attack_rate", self.home_form.attack_rate),
            ("home_form.defense_rate", self.home_form.defense_rate),
            ("away_form.attack_rate", self.away_form.attack_rate),
            ("away_form.defense_rate", self.away_form.defense_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidParameter {
                    name,
                    value,
                    reason: "fallback rates must be finite and non-negative",
                });
            }
        }
        self.league_averages.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of most recent venue-specific matches averaged by the form estimator.
    pub form_window: usize,

    /// Prior matches a team needs at the fixture's venue before a backtest evaluates it.
    pub min_games: usize,

    pub model: ModelConfig,
    pub fallbacks: Fallbacks,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            form_window: DEFAULT_FORM_WINDOW,
            min_games: DEFAULT_MIN_GAMES,
            model: ModelConfig::default(),
            fallbacks: Fallbacks::default(),
        }
    }
}
impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_form_window(self.form_window)?;
        self.model.validate()?;
        self.fallbacks.validate()?;
        Ok(())
    }

    /// Reads and validates a config from a JSON file. Absent fields take their defaults.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Config = read_json(path)?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn validate_form_window(form_window: usize) -> Result<(), ModelError> {
    if form_window == 0 {
        Err(ModelError::InvalidParameter {
            name: "form_window",
            value: 0.0,
            reason: "must be at least 1",
        })
    } else {
        Ok(())
    }
}

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, ConfigError> {
    let file = File::open(path)?;
    Ok(from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Correction;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(5, config.form_window);
        assert_eq!(5, config.min_games);
        assert_eq!(6, config.model.max_goals);
        assert_eq!(Correction::DixonColes { rho: 0.92 }, config.model.correction);
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config: Config = serde_json::from_str(r#"{"min_games": 3, "model": {"correction": "None"}}"#).unwrap();
        assert_eq!(3, config.min_games);
        assert_eq!(5, config.form_window);
        assert_eq!(Correction::None, config.model.correction);
        assert_eq!(6, config.model.max_goals);
        assert_eq!(Fallbacks::default(), config.fallbacks);
    }

    #[test]
    fn json_round_trip() {
        let config = Config {
            form_window: 8,
            model: ModelConfig {
                max_goals: 10,
                correction: Correction::DixonColes { rho: 0.85 },
            },
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let decoded: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, decoded);
    }

    #[test]
    fn rejects_invalid_values() {
        let config = Config {
            form_window: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter(ModelError::InvalidParameter { name: "form_window", .. }))
        ));

        let mut config = Config::default();
        config.fallbacks.league_averages.avg_goals_against = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidParameter(_))));

        let mut config = Config::default();
        config.fallbacks.away_form.attack_rate = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidParameter(_))));

        let mut config = Config::default();
        config.model.max_goals = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidParameter(_))));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Config::read_json_file("does/not/exist.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
