//! Simulation configuration
//!
//! [`SimulationConfig`] is the read-only input to every projection. It is a plain serde value
//! so scenario files and worker messages can carry it unchanged.
//!
//! # Conceptual Organization
//!
//! **Your situation** (fixed facts):
//! - `career` - dates, service and high-3
//! - `salary`, `traditional`, `roth` - pay and current TSP balances
//!
//! **World assumptions** (scenarios you might compare):
//! - `growth_rate` / `return_profile` - market assumptions
//! - `inflation_rate` - expense growth and COLA input
//! - `regulatory` - published limits and tables
//!
//! **Your plan**:
//! - `annual_expenses` and `withdrawal` - spending in retirement
//!
//! For a fluent way to assemble one, see [`SimulationBuilder`].

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, growth_rate, non_negative};
use crate::model::{CareerRecord, RegulatoryTables, ReturnProfile};
use crate::tsp::{AgencyContributionPolicy, ContributionInputs};

pub mod builder;

pub use builder::SimulationBuilder;

fn default_horizon_years() -> u32 {
    40
}

fn default_true() -> bool {
    true
}

fn default_percentiles() -> Vec<f64> {
    vec![0.05, 0.25, 0.50, 0.75, 0.95]
}

/// Current balance and deferral election for one TSP account
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub opening_balance: f64,
    /// Employee deferral as a share of salary
    #[serde(default)]
    pub contribution_rate: f64,
}

/// How retirement withdrawals from the TSP are sized
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WithdrawalStrategy {
    /// Withdraw whatever the annuity and supplement leave uncovered
    #[default]
    CoverShortfall,
    /// Withdraw `rate` of the balance at separation in the first retirement year, then the
    /// same amount grown with inflation
    FixedPercentage { rate: f64 },
}

/// Complete input to a projection or a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    // === Your Situation ===
    pub career: CareerRecord,

    /// First projected calendar year
    pub start_year: i16,

    /// Number of calendar years to project
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,

    /// Salary in `start_year`
    pub salary: f64,

    #[serde(default)]
    pub salary_growth_rate: f64,

    #[serde(default)]
    pub traditional: AccountConfig,

    #[serde(default)]
    pub roth: AccountConfig,

    #[serde(default)]
    pub agency: AgencyContributionPolicy,

    // === World Assumptions ===
    /// Deterministic annual return used by single projections
    pub growth_rate: f64,

    /// Return model sampled by Monte Carlo trials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_profile: Option<ReturnProfile>,

    #[serde(default)]
    pub inflation_rate: f64,

    #[serde(default)]
    pub regulatory: RegulatoryTables,

    // === Your Plan ===
    /// Retirement spending in `start_year` dollars
    #[serde(default)]
    pub annual_expenses: f64,

    #[serde(default)]
    pub withdrawal: WithdrawalStrategy,

    /// Estimated annual Social Security benefit at 62, used for the FERS supplement
    #[serde(default)]
    pub annual_ss_at_62: f64,

    /// Apply the FERS COLA to the annuity from age 62
    #[serde(default = "default_true")]
    pub apply_cola: bool,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.career.validate()?;
        non_negative("salary", self.salary)?;
        growth_rate("salary_growth_rate", self.salary_growth_rate)?;
        for account in [&self.traditional, &self.roth] {
            non_negative("opening_balance", account.opening_balance)?;
            non_negative("contribution_rate", account.contribution_rate)?;
        }
        self.agency.validate()?;
        growth_rate("growth_rate", self.growth_rate)?;
        growth_rate("inflation_rate", self.inflation_rate)?;
        non_negative("annual_expenses", self.annual_expenses)?;
        non_negative("annual_ss_at_62", self.annual_ss_at_62)?;
        if let WithdrawalStrategy::FixedPercentage { rate } = self.withdrawal {
            let rate = non_negative("withdrawal.rate", rate)?;
            if rate > 1.0 {
                return Err(ValidationError::OutOfRange {
                    field: "withdrawal.rate",
                    value: rate,
                    reason: "must not exceed 1.0",
                });
            }
        }
        Ok(())
    }

    /// Contribution inputs for one account, anchored at `start_year`
    #[must_use]
    pub fn contribution_inputs(&self, account: &AccountConfig) -> ContributionInputs {
        ContributionInputs {
            salary: self.salary,
            salary_growth_rate: self.salary_growth_rate,
            employee_rate: account.contribution_rate,
        }
    }

    /// Last projected calendar year
    #[must_use]
    pub fn end_year(&self) -> i16 {
        self.start_year + self.horizon_years as i16 - 1
    }

    #[must_use]
    pub fn with_horizon_years(&self, years: u32) -> Self {
        let mut config = self.clone();
        config.horizon_years = years;
        config
    }

    /// Set the horizon so the projection ends in the year the retiree reaches `end_age`
    #[must_use]
    pub fn with_end_age(&self, end_age: i16) -> Self {
        let end_year = self.career.birth_year() + end_age;
        let years = (end_year - self.start_year + 1).max(0) as u32;
        self.with_horizon_years(years)
    }

    #[must_use]
    pub fn with_growth_rate(&self, growth_rate: f64) -> Self {
        let mut config = self.clone();
        config.growth_rate = growth_rate;
        config
    }
}

/// Parameters of one Monte Carlo request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub iterations: usize,
    /// Master seed; `None` draws one from the operating system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Percentiles to report, each in [0, 1]
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<f64>,
}

impl MonteCarloConfig {
    #[must_use]
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            seed: None,
            percentiles: default_percentiles(),
        }
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.iterations == 0 {
            return Err(ValidationError::ZeroIterations);
        }
        for p in &self.percentiles {
            if !(0.0..=1.0).contains(p) {
                return Err(ValidationError::OutOfRange {
                    field: "percentiles",
                    value: *p,
                    reason: "percentiles must lie in [0, 1]",
                });
            }
        }
        Ok(())
    }
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self::new(1_000)
    }
}
