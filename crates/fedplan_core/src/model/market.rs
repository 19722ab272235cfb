//! Annual market-return models for Monte Carlo trials
//!
//! Which distribution best describes TSP fund returns is a product decision, so the simulator
//! only depends on the [`ReturnModel`] trait. [`ReturnProfile`] is the serializable set of
//! built-in strategies that a scenario file can select.

use rand::{Rng, distr::Distribution};
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// A source of per-year return sequences.
///
/// Implementations must draw all randomness from `rng` so that a seeded generator makes the
/// sequence reproducible.
pub trait ReturnModel {
    fn sample_sequence<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        num_years: usize,
    ) -> Result<Vec<f64>, MarketError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReturnProfile {
    /// The same return every year
    Fixed { rate: f64 },
    Normal { mean: f64, std_dev: f64 },
    /// `mean` and `std_dev` describe the log return `ln(1 + r)`
    LogNormal { mean: f64, std_dev: f64 },
    /// Location-scale Student's t. Lower `df` means fatter tails; 4 to 6 suits equity funds.
    StudentT { mean: f64, scale: f64, df: f64 },
    /// Two-state Markov chain. Every trial opens in the bull state.
    RegimeSwitching {
        bull: Box<ReturnProfile>,
        bear: Box<ReturnProfile>,
        bull_to_bear_prob: f64,
        bear_to_bull_prob: f64,
    },
    /// Resample an observed return history; blocks longer than one year keep runs of
    /// consecutive years together.
    Bootstrap {
        history: HistoricalReturns,
        #[serde(default)]
        block_size: Option<usize>,
    },
}

fn bad_parameters(
    profile_type: &'static str,
    mean: f64,
    spread: f64,
    reason: &'static str,
) -> MarketError {
    MarketError::InvalidDistributionParameters {
        profile_type,
        mean,
        std_dev: spread,
        reason,
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Regime {
    Bull,
    Bear,
}

impl ReturnProfile {
    /// Draw one year's return, independent of any other year.
    ///
    /// A regime-switching profile picks its state from the long-run mix of the chain here;
    /// the chain itself only runs inside [`ReturnModel::sample_sequence`].
    pub fn draw_year<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, MarketError> {
        let spread_reason = "std_dev must be non-negative and finite";
        match *self {
            ReturnProfile::Fixed { rate } => Ok(rate),
            ReturnProfile::Normal { mean, std_dev } => {
                let normal = rand_distr::Normal::new(mean, std_dev)
                    .map_err(|_| bad_parameters("normal", mean, std_dev, spread_reason))?;
                Ok(normal.sample(rng))
            }
            ReturnProfile::LogNormal { mean, std_dev } => {
                let growth = rand_distr::LogNormal::new(mean, std_dev)
                    .map_err(|_| bad_parameters("log-normal", mean, std_dev, spread_reason))?;
                Ok(growth.sample(rng) - 1.0)
            }
            ReturnProfile::StudentT { mean, scale, df } => {
                let t = rand_distr::StudentT::new(df).map_err(|_| {
                    bad_parameters("student-t", mean, scale, "df must be positive and finite")
                })?;
                Ok(mean + scale * t.sample(rng))
            }
            ReturnProfile::RegimeSwitching {
                ref bull,
                ref bear,
                bull_to_bear_prob,
                bear_to_bull_prob,
            } => {
                check_switch_odds(bull_to_bear_prob, bear_to_bull_prob)?;
                let leave_rates = bull_to_bear_prob + bear_to_bull_prob;
                let share_in_bull = if leave_rates > 0.0 {
                    bear_to_bull_prob / leave_rates
                } else {
                    1.0
                };
                if rng.random_bool(share_in_bull) {
                    bull.draw_year(rng)
                } else {
                    bear.draw_year(rng)
                }
            }
            ReturnProfile::Bootstrap { ref history, .. } => {
                history.draw(rng).ok_or(MarketError::EmptyHistoricalData)
            }
        }
    }

    fn run_chain<R: Rng + ?Sized>(
        bull: &ReturnProfile,
        bear: &ReturnProfile,
        bull_to_bear: f64,
        bear_to_bull: f64,
        rng: &mut R,
        num_years: usize,
    ) -> Result<Vec<f64>, MarketError> {
        check_switch_odds(bull_to_bear, bear_to_bull)?;
        let mut regime = Regime::Bull;
        let mut returns = Vec::with_capacity(num_years);
        for _ in 0..num_years {
            let (profile, switch_odds, other) = match regime {
                Regime::Bull => (bull, bull_to_bear, Regime::Bear),
                Regime::Bear => (bear, bear_to_bull, Regime::Bull),
            };
            returns.push(profile.draw_year(rng)?);
            if rng.random_bool(switch_odds) {
                regime = other;
            }
        }
        Ok(returns)
    }
}

fn check_switch_odds(bull_to_bear: f64, bear_to_bull: f64) -> Result<(), MarketError> {
    let is_probability = |p: f64| (0.0..=1.0).contains(&p);
    if is_probability(bull_to_bear) && is_probability(bear_to_bull) {
        return Ok(());
    }
    Err(bad_parameters(
        "regime-switching",
        bull_to_bear,
        bear_to_bull,
        "transition probabilities must lie in [0, 1]",
    ))
}

impl ReturnModel for ReturnProfile {
    fn sample_sequence<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        num_years: usize,
    ) -> Result<Vec<f64>, MarketError> {
        match self {
            ReturnProfile::RegimeSwitching {
                bull,
                bear,
                bull_to_bear_prob,
                bear_to_bull_prob,
            } => Self::run_chain(
                bull,
                bear,
                *bull_to_bear_prob,
                *bear_to_bull_prob,
                rng,
                num_years,
            ),
            ReturnProfile::Bootstrap {
                history,
                block_size,
            } => {
                let drawn = match block_size.unwrap_or(1) {
                    0 => {
                        return Err(bad_parameters(
                            "bootstrap",
                            0.0,
                            0.0,
                            "block_size must be at least 1",
                        ));
                    }
                    1 => history.resample(rng, num_years),
                    block => history.resample_blocks(rng, num_years, block),
                };
                drawn.ok_or(MarketError::EmptyHistoricalData)
            }
            independent => (0..num_years).map(|_| independent.draw_year(rng)).collect(),
        }
    }
}

/// An observed annual return series for bootstrap sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalReturns {
    /// Fund or index name, for display
    pub name: String,
    /// Calendar year of `returns[0]`
    pub start_year: i16,
    pub returns: Vec<f64>,
}

impl HistoricalReturns {
    #[must_use]
    pub fn new(name: impl Into<String>, start_year: i16, returns: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            start_year,
            returns,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// One observed year chosen uniformly at random.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<f64> {
        if self.returns.is_empty() {
            None
        } else {
            Some(self.returns[rng.random_range(0..self.returns.len())])
        }
    }

    /// `n` independent draws with replacement.
    pub fn resample<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Option<Vec<f64>> {
        if self.returns.is_empty() {
            return None;
        }
        Some(
            (0..n)
                .map(|_| self.returns[rng.random_range(0..self.returns.len())])
                .collect(),
        )
    }

    /// Circular block bootstrap: each block starts at a random year and wraps past the end
    /// of the series.
    pub fn resample_blocks<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        block_size: usize,
    ) -> Option<Vec<f64>> {
        if self.returns.is_empty() || block_size == 0 {
            return None;
        }
        let mut drawn = Vec::with_capacity(n);
        while drawn.len() < n {
            let first = rng.random_range(0..self.returns.len());
            let take = block_size.min(n - drawn.len());
            drawn.extend(self.returns.iter().cycle().skip(first).take(take));
        }
        Some(drawn)
    }
}
