//! Construction and querying of scoregrids: square matrices where cell `(i, j)` holds the
//! probability of the home side scoring `i` and the away side scoring `j`.

use crate::domain::{Score, Side};
use crate::linear::Matrix;
use crate::poisson;
use crate::probs::SliceExt;

/// Fills the grid with the product of two independent Poisson mass functions.
pub fn from_univariate_poisson(home_rate: f64, away_rate: f64, scoregrid: &mut Matrix<f64>) {
    let factorial = poisson::Lookup::default();
    let mut home_pmf = vec![0.0; scoregrid.rows()];
    let mut away_pmf = vec![0.0; scoregrid.cols()];
    poisson::fill_univariate(home_rate, &mut home_pmf, &factorial);
    poisson::fill_univariate(away_rate, &mut away_pmf, &factorial);
    for (home_goals, home_prob) in home_pmf.iter().enumerate() {
        for (away_goals, away_prob) in away_pmf.iter().enumerate() {
            scoregrid[(home_goals, away_goals)] = home_prob * away_prob;
        }
    }
}

/// Fills the grid with the product of two independent Poisson mass functions, each scaled to a
/// unit peak. Proportional to [`from_univariate_poisson`], but stays well-defined for any finite
/// rate; normalise before reading probabilities.
pub fn from_scaled_poisson(home_rate: f64, away_rate: f64, scoregrid: &mut Matrix<f64>) {
    let factorial = poisson::Lookup::default();
    let mut home_pmf = vec![0.0; scoregrid.rows()];
    let mut away_pmf = vec![0.0; scoregrid.cols()];
    poisson::fill_scaled_univariate(home_rate, &mut home_pmf, &factorial);
    poisson::fill_scaled_univariate(away_rate, &mut away_pmf, &factorial);
    for (home_goals, home_prob) in home_pmf.iter().enumerate() {
        for (away_goals, away_prob) in away_pmf.iter().enumerate() {
            scoregrid[(home_goals, away_goals)] = home_prob * away_prob;
        }
    }
}

/// The Dixon-Coles dependence factor τ for a single scoreline. Only the four low scores are
/// affected; `rho = 1` yields `1.0` everywhere.
pub fn dixon_coles_tau(home_goals: usize, away_goals: usize, home_rate: f64, away_rate: f64, rho: f64) -> f64 {
    let kappa = home_rate + away_rate + home_rate * away_rate;
    if kappa == 0.0 {
        return 1.0;
    }
    let adjustment = (1.0 - rho) / kappa;
    match (home_goals, away_goals) {
        (0, 0) => 1.0 - home_rate * away_rate * adjustment,
        (1, 0) | (0, 1) => 1.0 + adjustment,
        (1, 1) => 1.0 - adjustment,
        _ => 1.0,
    }
}

/// Scales the low-score cells of an independent-Poisson grid by τ. Cells that would turn
/// negative under an extreme `rho` are floored at zero. The grid is left unnormalised.
pub fn apply_dixon_coles(home_rate: f64, away_rate: f64, rho: f64, scoregrid: &mut Matrix<f64>) {
    for home_goals in 0..usize::min(2, scoregrid.rows()) {
        for away_goals in 0..usize::min(2, scoregrid.cols()) {
            let tau = dixon_coles_tau(home_goals, away_goals, home_rate, away_rate, rho);
            let cell = &mut scoregrid[(home_goals, away_goals)];
            *cell = f64::max(0.0, *cell * tau);
        }
    }
}

/// Rescales the grid to a unit sum, returning the mass prior to rescaling.
pub fn normalise(scoregrid: &mut Matrix<f64>) -> f64 {
    scoregrid.flatten_mut().normalise(1.0)
}

/// The most probable scoreline and its probability. Ties resolve to the first cell in row-major
/// order, i.e., the lowest home score, then the lowest away score.
pub fn most_likely(scoregrid: &Matrix<f64>) -> (Score, f64) {
    let index = scoregrid.flatten().argmax().unwrap_or(0);
    let (home_goals, away_goals) = (index / scoregrid.cols(), index % scoregrid.cols());
    (
        Score::new(home_goals as u8, away_goals as u8),
        scoregrid[(home_goals, away_goals)],
    )
}

/// Expected home and away goals within the (truncated) grid.
pub fn home_away_expectations(scoregrid: &Matrix<f64>) -> (f64, f64) {
    let (mut home_expectation, mut away_expectation) = (0.0, 0.0);
    for ((home_goals, away_goals), &prob) in scoregrid.cells() {
        home_expectation += home_goals as f64 * prob;
        away_expectation += away_goals as f64 * prob;
    }
    (home_expectation, away_expectation)
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Outcome {
    Win(Side),
    Draw,
    GoalsUnder(u8),
    GoalsOver(u8),
    CorrectScore(Score),
}
impl Outcome {
    pub fn gather(&self, scoregrid: &Matrix<f64>) -> f64 {
        match self {
            Outcome::Win(side) => Self::gather_win(side, scoregrid),
            Outcome::Draw => Self::gather_draw(scoregrid),
            Outcome::GoalsUnder(goals) => Self::gather_goals_under(*goals, scoregrid),
            Outcome::GoalsOver(goals) => Self::gather_goals_over(*goals, scoregrid),
            Outcome::CorrectScore(score) => Self::gather_correct_score(score, scoregrid),
        }
    }

    fn gather_win(side: &Side, scoregrid: &Matrix<f64>) -> f64 {
        let mut prob = 0.0;
        match side {
            Side::Home => {
                for row in 1..scoregrid.rows() {
                    for col in 0..usize::min(row, scoregrid.cols()) {
                        prob += scoregrid[(row, col)];
                    }
                }
            }
            Side::Away => {
                for col in 1..scoregrid.cols() {
                    for row in 0..usize::min(col, scoregrid.rows()) {
                        prob += scoregrid[(row, col)];
                    }
                }
            }
        }
        prob
    }

    fn gather_draw(scoregrid: &Matrix<f64>) -> f64 {
        let mut prob = 0.0;
        for index in 0..usize::min(scoregrid.rows(), scoregrid.cols()) {
            prob += scoregrid[(index, index)];
        }
        prob
    }

    fn gather_goals_over(goals: u8, scoregrid: &Matrix<f64>) -> f64 {
        let goals = goals as usize;
        scoregrid
            .cells()
            .filter(|((row, col), _)| row + col > goals)
            .map(|(_, &prob)| prob)
            .sum()
    }

    fn gather_goals_under(goals: u8, scoregrid: &Matrix<f64>) -> f64 {
        let goals = goals as usize;
        scoregrid
            .cells()
            .filter(|((row, col), _)| row + col < goals)
            .map(|(_, &prob)| prob)
            .sum()
    }

    fn gather_correct_score(score: &Score, scoregrid: &Matrix<f64>) -> f64 {
        if (score.home as usize) < scoregrid.rows() && (score.away as usize) < scoregrid.cols() {
            scoregrid[(score.home as usize, score.away as usize)]
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests;
