use super::*;
use assert_float_eq::*;
use crate::testing::assert_slice_f64_relative;

fn create_test_4x4_scoregrid() -> Matrix<f64> {
    let mut scoregrid = Matrix::allocate(4, 4);
    scoregrid[0].copy_from_slice(&[0.04, 0.03, 0.02, 0.01]);
    scoregrid[1].copy_from_slice(&[0.08, 0.06, 0.04, 0.02]);
    scoregrid[2].copy_from_slice(&[0.12, 0.09, 0.06, 0.03]);
    scoregrid[3].copy_from_slice(&[0.16, 0.12, 0.08, 0.04]);
    scoregrid
}

#[test]
pub fn outcome_win_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.65, Outcome::Win(Side::Home).gather(&scoregrid));
    assert_float_absolute_eq!(0.15, Outcome::Win(Side::Away).gather(&scoregrid));
}

#[test]
pub fn outcome_draw_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.2, Outcome::Draw.gather(&scoregrid));
}

#[test]
pub fn outcome_goals_ou_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.35, Outcome::GoalsUnder(3).gather(&scoregrid));
    assert_float_absolute_eq!(0.65, Outcome::GoalsOver(2).gather(&scoregrid));
}

#[test]
pub fn outcome_correct_score_gather() {
    let scoregrid = create_test_4x4_scoregrid();
    assert_float_absolute_eq!(0.04, Outcome::CorrectScore(Score::new(0, 0)).gather(&scoregrid));
    assert_float_absolute_eq!(0.08, Outcome::CorrectScore(Score::new(3, 2)).gather(&scoregrid));
    assert_eq!(0.0, Outcome::CorrectScore(Score::new(4, 0)).gather(&scoregrid));
}

#[test]
pub fn expectations() {
    let scoregrid = create_test_4x4_scoregrid();
    let (home, away) = home_away_expectations(&scoregrid);
    assert_float_absolute_eq!(2.0, home);
    assert_float_absolute_eq!(1.0, away);
}

#[test]
pub fn univariate_poisson_truncation() {
    const INTERVALS: usize = 6;
    let mut scoregrid = Matrix::allocate(INTERVALS + 1, INTERVALS + 1);
    from_univariate_poisson(1.2, 1.8, &mut scoregrid);
    println!("scoregrid:\n{}sum: {}", scoregrid.verbose(), scoregrid.flatten().sum());
    assert_float_relative_eq!(f64::exp(-3.0), scoregrid[(0, 0)]);
    let mass = normalise(&mut scoregrid);
    assert!(mass < 1.0, "mass: {mass}");
    assert!(mass > 0.95, "mass: {mass}");
    assert_float_absolute_eq!(1.0, scoregrid.flatten().sum(), 1e-12);
}

#[test]
pub fn scaled_poisson_is_proportional_to_univariate() {
    let mut exact = Matrix::allocate(7, 7);
    from_univariate_poisson(1.2, 1.8, &mut exact);
    let mut scaled = Matrix::allocate(7, 7);
    from_scaled_poisson(1.2, 1.8, &mut scaled);
    assert_eq!(1.0, scaled[(1, 1)]);
    normalise(&mut exact);
    normalise(&mut scaled);
    assert_slice_f64_relative(exact.flatten(), scaled.flatten(), 1e-12);
}

#[test]
pub fn scaled_poisson_keeps_mass_for_extreme_rates() {
    let mut scoregrid = Matrix::allocate(7, 7);
    from_scaled_poisson(800.0, 1.0, &mut scoregrid);
    println!("scoregrid:\n{}", scoregrid.verbose());
    assert_eq!(1.0, scoregrid[(6, 0)]);
    assert_eq!(1.0, scoregrid[(6, 1)]);
    let mass = normalise(&mut scoregrid);
    assert!(mass.is_finite() && mass > 0.0, "mass: {mass}");
    assert_float_absolute_eq!(1.0, scoregrid.flatten().sum(), 1e-12);
}

#[test]
pub fn dixon_coles_tau_values() {
    // κ = 1.5 + 1.2 + 1.8 = 4.5; (1 - ρ) / κ = 0.08 / 4.5
    let adjustment = 0.08 / 4.5;
    assert_float_relative_eq!(1.0 - 1.8 * adjustment, dixon_coles_tau(0, 0, 1.5, 1.2, 0.92));
    assert_float_relative_eq!(1.0 + adjustment, dixon_coles_tau(1, 0, 1.5, 1.2, 0.92));
    assert_float_relative_eq!(1.0 + adjustment, dixon_coles_tau(0, 1, 1.5, 1.2, 0.92));
    assert_float_relative_eq!(1.0 - adjustment, dixon_coles_tau(1, 1, 1.5, 1.2, 0.92));
    assert_eq!(1.0, dixon_coles_tau(2, 0, 1.5, 1.2, 0.92));
    assert_eq!(1.0, dixon_coles_tau(3, 3, 1.5, 1.2, 0.92));
}

#[test]
pub fn dixon_coles_tau_is_identity_for_unit_rho() {
    for home_goals in 0..3 {
        for away_goals in 0..3 {
            assert_eq!(1.0, dixon_coles_tau(home_goals, away_goals, 1.5, 1.2, 1.0));
        }
    }
}

#[test]
pub fn dixon_coles_tau_with_zero_rates() {
    assert_eq!(1.0, dixon_coles_tau(0, 0, 0.0, 0.0, 0.92));
    assert_eq!(1.0, dixon_coles_tau(1, 1, 0.0, 0.0, 0.92));
}

#[test]
pub fn dixon_coles_pulls_down_nil_all() {
    const INTERVALS: usize = 6;
    let mut independent = Matrix::allocate(INTERVALS + 1, INTERVALS + 1);
    from_univariate_poisson(1.5, 1.2, &mut independent);
    let mut corrected = independent.clone();
    apply_dixon_coles(1.5, 1.2, 0.92, &mut corrected);
    println!("corrected:\n{}", corrected.verbose());

    let uncorrected_nil_all = poisson::univariate(0, 1.5, &poisson::Lookup::default())
        * poisson::univariate(0, 1.2, &poisson::Lookup::default());
    assert!(corrected[(0, 0)] < uncorrected_nil_all);
    assert_float_relative_eq!(0.968 * f64::exp(-2.7), corrected[(0, 0)]);
    assert!(corrected[(1, 0)] > independent[(1, 0)]);
    assert!(corrected[(0, 1)] > independent[(0, 1)]);
    assert!(corrected[(1, 1)] < independent[(1, 1)]);
    assert_eq!(independent[(2, 2)], corrected[(2, 2)]);
}

#[test]
pub fn dixon_coles_with_unit_rho_matches_independent() {
    const INTERVALS: usize = 6;
    let mut independent = Matrix::allocate(INTERVALS + 1, INTERVALS + 1);
    from_univariate_poisson(1.5, 1.2, &mut independent);
    let mut corrected = independent.clone();
    apply_dixon_coles(1.5, 1.2, 1.0, &mut corrected);
    assert_eq!(independent, corrected);
}

#[test]
pub fn dixon_coles_floors_negative_cells() {
    let mut scoregrid = Matrix::allocate(3, 3);
    from_univariate_poisson(1.0, 1.0, &mut scoregrid);
    // κ = 3, so a ρ of -3 yields τ(1,1) = 1 - 4/3 < 0
    apply_dixon_coles(1.0, 1.0, -3.0, &mut scoregrid);
    assert_eq!(0.0, scoregrid[(1, 1)]);
    assert!(scoregrid.flatten().iter().all(|&prob| prob >= 0.0));
}

#[test]
pub fn most_likely_resolves_ties_in_row_major_order() {
    let mut scoregrid = Matrix::allocate(3, 3);
    scoregrid[0].copy_from_slice(&[0.1, 0.2, 0.0]);
    scoregrid[1].copy_from_slice(&[0.2, 0.1, 0.1]);
    scoregrid[2].copy_from_slice(&[0.1, 0.1, 0.1]);
    assert_eq!((Score::new(0, 1), 0.2), most_likely(&scoregrid));

    let scoregrid = create_test_4x4_scoregrid();
    assert_eq!((Score::new(3, 0), 0.16), most_likely(&scoregrid));
}
