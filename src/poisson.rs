//! Poisson mass function over small goal counts.

/// Largest `n` for which `n!` fits in a `u128`.
pub const MAX_FACTORIAL: u8 = 34;

pub trait Factorial {
    fn get(&self, n: u8) -> u128;
}

/// Precomputed factorials `0!..=34!`.
pub struct Lookup {
    entries: [u128; MAX_FACTORIAL as usize + 1],
}
impl Factorial for Lookup {
    #[inline]
    fn get(&self, n: u8) -> u128 {
        assert!(n <= MAX_FACTORIAL, "{n}! overflows");
        self.entries[n as usize]
    }
}

impl Default for Lookup {
    fn default() -> Self {
        let mut entries = [1u128; MAX_FACTORIAL as usize + 1];
        for i in 2..entries.len() {
            entries[i] = i as u128 * entries[i - 1];
        }
        Self { entries }
    }
}

/// P(X = k) for X ~ Poisson(`lambda`). A zero rate puts all of the mass on `k = 0`.
#[inline]
pub fn univariate(k: u8, lambda: f64, factorial: &impl Factorial) -> f64 {
    lambda.powi(k as i32) * f64::exp(-lambda) / factorial.get(k) as f64
}

/// ln P(X = k) for X ~ Poisson(`lambda`), i.e., `k ln λ - λ - ln k!`. A zero rate gives `0` at
/// `k = 0` and negative infinity elsewhere.
#[inline]
pub fn ln_univariate(k: u8, lambda: f64, factorial: &impl Factorial) -> f64 {
    if k == 0 {
        -lambda
    } else if lambda == 0.0 {
        f64::NEG_INFINITY
    } else {
        k as f64 * lambda.ln() - lambda - (factorial.get(k) as f64).ln()
    }
}

/// Fills `pmf[k]` with P(X = k) for `k` in `0..pmf.len()`.
pub fn fill_univariate(lambda: f64, pmf: &mut [f64], factorial: &impl Factorial) {
    for (k, prob) in pmf.iter_mut().enumerate() {
        *prob = univariate(k as u8, lambda, factorial);
    }
}

/// Fills `pmf` with the Poisson masses over `0..pmf.len()`, scaled so that the largest entry is 1.
/// The masses are formed in log space, so they never all underflow for a finite rate.
pub fn fill_scaled_univariate(lambda: f64, pmf: &mut [f64], factorial: &impl Factorial) {
    let mut max_ln = f64::NEG_INFINITY;
    for (k, prob) in pmf.iter_mut().enumerate() {
        *prob = ln_univariate(k as u8, lambda, factorial);
        max_ln = f64::max(max_ln, *prob);
    }
    for prob in pmf.iter_mut() {
        *prob = f64::exp(*prob - max_ln);
    }
}
