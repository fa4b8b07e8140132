//! Testing helpers.

use assert_float_eq::*;

use crate::domain::Fixture;

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

/// A fixture without a date, optionally carrying per-match expected goals.
pub fn fixture(home_team: &str, away_team: &str, home_goals: u8, away_goals: u8, xg: Option<(f64, f64)>) -> Fixture {
    Fixture {
        date: None,
        home_team: home_team.into(),
        away_team: away_team.into(),
        home_goals,
        away_goals,
        home_xg: xg.map(|(home, _)| home),
        away_xg: xg.map(|(_, away)| away),
    }
}
