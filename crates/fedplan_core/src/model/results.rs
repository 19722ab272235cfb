//! Output types of the engine
//!
//! Everything here is derived from a [`SimulationConfig`](crate::config::SimulationConfig)
//! and handed to the caller by value; nothing is persisted or mutated afterwards.

use serde::{Deserialize, Serialize};

/// Retirement category, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EligibilityKind {
    FullImmediate,
    #[serde(rename = "MRA+10-reduced")]
    MraPlus10Reduced,
    Deferred,
    NotEligible,
}

impl EligibilityKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            EligibilityKind::FullImmediate => "FullImmediate",
            EligibilityKind::MraPlus10Reduced => "MRA+10-reduced",
            EligibilityKind::Deferred => "Deferred",
            EligibilityKind::NotEligible => "NotEligible",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    /// True when an immediate annuity is payable at separation
    pub eligible: bool,
    pub kind: EligibilityKind,
    /// Age at separation as supplied, unrounded
    pub decimal_age: f64,
    /// Minimum Retirement Age used for the decision
    pub mra: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnuityResult {
    pub multiplier: f64,
    pub gross_annual_annuity: f64,
    /// In [0, 1]
    pub reduction_factor: f64,
    /// Always `gross_annual_annuity * reduction_factor`
    pub net_annual_annuity: f64,
}

/// Common view over the per-year rows of both account projections
pub trait YearlySnapshot {
    fn year(&self) -> i16;
    fn opening_balance(&self) -> f64;
    fn closing_balance(&self) -> f64;
    fn employee_contribution(&self) -> f64;
    /// Employee plus any agency money deposited during the year
    fn total_contributions(&self) -> f64;
    fn growth(&self) -> f64;
    fn withdrawal(&self) -> f64;
}

/// One year of the tax-deferred account
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraditionalSnapshot {
    pub year: i16,
    pub opening_balance: f64,
    pub employee_contribution: f64,
    /// Agency automatic contribution (a fixed share of salary)
    pub agency_automatic: f64,
    pub agency_matching: f64,
    pub growth: f64,
    pub withdrawal: f64,
    pub closing_balance: f64,
}

/// One year of the post-tax account; agency money never lands here
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RothSnapshot {
    pub year: i16,
    pub opening_balance: f64,
    pub employee_contribution: f64,
    pub growth: f64,
    pub withdrawal: f64,
    pub closing_balance: f64,
}

impl YearlySnapshot for TraditionalSnapshot {
    fn year(&self) -> i16 {
        self.year
    }
    fn opening_balance(&self) -> f64 {
        self.opening_balance
    }
    fn closing_balance(&self) -> f64 {
        self.closing_balance
    }
    fn employee_contribution(&self) -> f64 {
        self.employee_contribution
    }
    fn total_contributions(&self) -> f64 {
        self.employee_contribution + self.agency_automatic + self.agency_matching
    }
    fn growth(&self) -> f64 {
        self.growth
    }
    fn withdrawal(&self) -> f64 {
        self.withdrawal
    }
}

impl YearlySnapshot for RothSnapshot {
    fn year(&self) -> i16 {
        self.year
    }
    fn opening_balance(&self) -> f64 {
        self.opening_balance
    }
    fn closing_balance(&self) -> f64 {
        self.closing_balance
    }
    fn employee_contribution(&self) -> f64 {
        self.employee_contribution
    }
    fn total_contributions(&self) -> f64 {
        self.employee_contribution
    }
    fn growth(&self) -> f64 {
        self.growth
    }
    fn withdrawal(&self) -> f64 {
        self.withdrawal
    }
}

/// Where a calendar year sits relative to the separation date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Working,
    /// Part of the year worked, the rest retired
    Separation,
    Retired,
}

/// One calendar year of the full-horizon projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: i16,
    pub age: i16,
    pub phase: Phase,
    pub growth_rate: f64,
    /// Salary actually earned this year (prorated in the separation year)
    pub salary: f64,
    pub traditional: TraditionalSnapshot,
    pub roth: RothSnapshot,
    pub annuity: f64,
    pub supplement: f64,
    /// Withdrawals from both accounts
    pub withdrawal: f64,
    pub expenses: f64,
    /// Retirement income: annuity + supplement + withdrawals
    pub total_income: f64,
    pub surplus: f64,
    pub total_balance: f64,
}

/// Deterministic trajectory for a single return sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub eligibility: EligibilityResult,
    pub annuity: AnnuityResult,
    /// Annual FERS supplement payable until the unreduced age (0 when not payable)
    pub supplement: f64,
    pub years: Vec<ProjectionYear>,
    /// Age in the first year a requested withdrawal could not be met in full
    pub depletion_age: Option<i16>,
    /// Sum of retirement-year surpluses (negative when expenses outran income)
    pub lifetime_surplus: f64,
    /// True when any retirement year ran a deficit
    pub shortfall: bool,
}

impl ProjectionResult {
    #[must_use]
    pub fn terminal_balance(&self) -> f64 {
        self.years.last().map(|y| y.total_balance).unwrap_or(0.0)
    }
}

/// Percentile values, as `(percentile in 0..=1, value)` pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    pub year: i16,
    pub age: i16,
    pub values: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub percentiles: Vec<(f64, f64)>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepletionStats {
    /// Share of trials whose savings ran out within the horizon
    pub probability: f64,
    /// Percentiles of the depletion age across depleted trials only
    pub age_percentiles: Vec<(f64, f64)>,
    pub earliest_age: Option<i16>,
}

/// Aggregate outcome of one Monte Carlo request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub iterations: usize,
    pub seed: u64,
    /// Total TSP balance per year
    pub balance_bands: Vec<PercentileBand>,
    /// Retirement income per year
    pub income_bands: Vec<PercentileBand>,
    pub terminal_balance: DistributionSummary,
    pub lifetime_surplus: DistributionSummary,
    pub depletion: DepletionStats,
    /// Share of trials with at least one retirement-year deficit
    pub probability_of_shortfall: f64,
    /// Share of trials that never depleted savings
    pub success_rate: f64,
}
