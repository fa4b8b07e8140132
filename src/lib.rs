//! A Dixon-Coles adjusted Poisson model of football scorelines. Derives home/draw/away
//! probabilities and the most likely scoreline from a pair of expected-goal rates, estimates those
//! rates from recent form or season xG, and backtests the whole pipeline without lookahead.

pub mod backtest;
pub mod config;
pub mod data;
pub mod domain;
pub mod linear;
pub mod model;
pub mod poisson;
pub mod print;
pub mod probs;
pub mod rates;
pub mod scoregrid;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
