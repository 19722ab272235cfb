//! Year-by-year Thrift Savings Plan projection
//!
//! Both accounts compound the same way:
//!
//! ```text
//! closing = opening * (1 + growth_rate) + contributions - withdrawal
//! ```
//!
//! Contributions land without intra-year compounding. The Traditional account also receives
//! agency automatic and matching money, which does not count against the elective-deferral
//! limit. Withdrawals are only used by the full-horizon projection and are taken at year end,
//! capped at what the account holds.

use serde::{Deserialize, Serialize};

use crate::contribution::ContributionCapState;
use crate::error::{ValidationError, growth_rate, non_negative};
use crate::model::{ContributionLimitTable, RothSnapshot, TraditionalSnapshot};

/// How the employee's contribution request is derived from pay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionInputs {
    /// Salary in the first projected year
    pub salary: f64,
    #[serde(default)]
    pub salary_growth_rate: f64,
    /// Requested contribution as a share of salary
    pub employee_rate: f64,
}

impl ContributionInputs {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("salary", self.salary)?;
        growth_rate("salary_growth_rate", self.salary_growth_rate)?;
        non_negative("employee_rate", self.employee_rate)?;
        Ok(())
    }

    /// Salary `year_index` years after the first projected year
    #[must_use]
    pub fn salary_in_year(&self, year_index: u32) -> f64 {
        self.salary * (1.0 + self.salary_growth_rate).powi(year_index as i32)
    }

    #[must_use]
    pub fn requested_contribution(&self, salary: f64) -> f64 {
        salary * self.employee_rate
    }
}

/// One band of the agency matching schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchTier {
    /// Upper bound of the band, as a cumulative employee contribution rate
    pub up_to_rate: f64,
    /// Agency dollars per employee dollar inside the band
    pub match_ratio: f64,
}

/// Agency money paid into the Traditional account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyContributionPolicy {
    /// Automatic contribution as a share of salary, paid regardless of employee deferrals
    pub automatic_rate: f64,
    pub match_tiers: Vec<MatchTier>,
}

impl Default for AgencyContributionPolicy {
    /// FERS: 1% automatic, dollar-for-dollar on the first 3%, fifty cents on the next 2%
    fn default() -> Self {
        Self {
            automatic_rate: 0.01,
            match_tiers: vec![
                MatchTier {
                    up_to_rate: 0.03,
                    match_ratio: 1.0,
                },
                MatchTier {
                    up_to_rate: 0.05,
                    match_ratio: 0.5,
                },
            ],
        }
    }
}

impl AgencyContributionPolicy {
    /// No agency money at all
    #[must_use]
    pub fn none() -> Self {
        Self {
            automatic_rate: 0.0,
            match_tiers: Vec::new(),
        }
    }

    #[must_use]
    pub fn automatic(&self, salary: f64) -> f64 {
        salary * self.automatic_rate
    }

    /// Matching contribution on an employee contribution, band by band.
    #[must_use]
    pub fn matching(&self, salary: f64, employee_contribution: f64) -> f64 {
        if salary <= 0.0 || employee_contribution <= 0.0 {
            return 0.0;
        }
        let employee_rate = employee_contribution / salary;

        let mut tiers = self.match_tiers.clone();
        tiers.sort_by(|a, b| a.up_to_rate.total_cmp(&b.up_to_rate));

        let mut matched_rate = 0.0;
        let mut lower = 0.0_f64;
        for tier in &tiers {
            let band = (employee_rate.min(tier.up_to_rate) - lower).max(0.0);
            matched_rate += band * tier.match_ratio;
            lower = lower.max(tier.up_to_rate);
        }
        matched_rate * salary
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("automatic_rate", self.automatic_rate)?;
        for tier in &self.match_tiers {
            non_negative("match_tiers.up_to_rate", tier.up_to_rate)?;
            non_negative("match_tiers.match_ratio", tier.match_ratio)?;
        }
        Ok(())
    }
}

/// Inputs for a single projected year of one account
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearStep {
    pub year: i16,
    pub opening_balance: f64,
    pub salary: f64,
    pub requested_contribution: f64,
    pub growth_rate: f64,
    /// Requested end-of-year withdrawal
    pub withdrawal: f64,
}

impl YearStep {
    fn validate(&self) -> Result<(), ValidationError> {
        non_negative("opening_balance", self.opening_balance)?;
        non_negative("salary", self.salary)?;
        non_negative("requested_contribution", self.requested_contribution)?;
        growth_rate("growth_rate", self.growth_rate)?;
        non_negative("withdrawal", self.withdrawal)?;
        Ok(())
    }
}

struct Compounded {
    growth: f64,
    withdrawal: f64,
    closing: f64,
}

fn compound(opening: f64, rate: f64, contributions: f64, withdrawal_request: f64) -> Compounded {
    let grown = opening * (1.0 + rate);
    let available = (grown + contributions).max(0.0);
    let withdrawal = withdrawal_request.min(available);
    Compounded {
        growth: grown - opening,
        withdrawal,
        closing: available - withdrawal,
    }
}

/// Advance the Traditional account by one year. Returns the snapshot and the cap state with
/// this account's deferral recorded, ready for the Roth account of the same year.
pub fn step_traditional(
    step: &YearStep,
    cap: ContributionCapState,
    agency: &AgencyContributionPolicy,
) -> Result<(TraditionalSnapshot, ContributionCapState), ValidationError> {
    step.validate()?;
    let (employee_contribution, cap) = cap.take(step.requested_contribution)?;
    let agency_automatic = agency.automatic(step.salary);
    let agency_matching = agency.matching(step.salary, employee_contribution);

    let c = compound(
        step.opening_balance,
        step.growth_rate,
        employee_contribution + agency_automatic + agency_matching,
        step.withdrawal,
    );

    Ok((
        TraditionalSnapshot {
            year: step.year,
            opening_balance: step.opening_balance,
            employee_contribution,
            agency_automatic,
            agency_matching,
            growth: c.growth,
            withdrawal: c.withdrawal,
            closing_balance: c.closing,
        },
        cap,
    ))
}

/// Advance the Roth account by one year against whatever limit the Traditional account left.
pub fn step_roth(
    step: &YearStep,
    cap: ContributionCapState,
) -> Result<(RothSnapshot, ContributionCapState), ValidationError> {
    step.validate()?;
    let (employee_contribution, cap) = cap.take(step.requested_contribution)?;

    let c = compound(
        step.opening_balance,
        step.growth_rate,
        employee_contribution,
        step.withdrawal,
    );

    Ok((
        RothSnapshot {
            year: step.year,
            opening_balance: step.opening_balance,
            employee_contribution,
            growth: c.growth,
            withdrawal: c.withdrawal,
            closing_balance: c.closing,
        },
        cap,
    ))
}

/// Multi-year projection of one account under a fixed growth rate
#[derive(Debug, Clone, Copy)]
pub struct TspProjector<'a> {
    pub opening_balance: f64,
    pub inputs: ContributionInputs,
    pub growth_rate: f64,
    pub years: u32,
    pub start_year: i16,
    pub catch_up_eligible: bool,
    pub limits: &'a ContributionLimitTable,
}

impl TspProjector<'_> {
    fn validate(&self) -> Result<(), ValidationError> {
        non_negative("opening_balance", self.opening_balance)?;
        growth_rate("growth_rate", self.growth_rate)?;
        self.inputs.validate()
    }

    fn year_step(&self, index: u32, opening_balance: f64) -> YearStep {
        let salary = self.inputs.salary_in_year(index);
        YearStep {
            year: self.start_year + index as i16,
            opening_balance,
            salary,
            requested_contribution: self.inputs.requested_contribution(salary),
            growth_rate: self.growth_rate,
            withdrawal: 0.0,
        }
    }

    fn cap_for(&self, year: i16) -> Result<ContributionCapState, ValidationError> {
        ContributionCapState::for_year(year, self.catch_up_eligible, self.limits)
    }

    /// One snapshot per year, calendar years consecutive from `start_year`.
    pub fn project_traditional_detailed(
        &self,
        agency: &AgencyContributionPolicy,
    ) -> Result<Vec<TraditionalSnapshot>, ValidationError> {
        self.validate()?;
        agency.validate()?;
        let mut snapshots = Vec::with_capacity(self.years as usize);
        let mut balance = self.opening_balance;
        for index in 0..self.years {
            let step = self.year_step(index, balance);
            let (snapshot, _) = step_traditional(&step, self.cap_for(step.year)?, agency)?;
            balance = snapshot.closing_balance;
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }

    /// Roth snapshots; `peer_contributions[i]` is the Traditional deferral already taken
    /// from year `i`'s limit. Missing entries count as zero.
    pub fn project_roth_detailed(
        &self,
        peer_contributions: Option<&[f64]>,
    ) -> Result<Vec<RothSnapshot>, ValidationError> {
        self.validate()?;
        let mut snapshots = Vec::with_capacity(self.years as usize);
        let mut balance = self.opening_balance;
        for index in 0..self.years {
            let step = self.year_step(index, balance);
            let peer = peer_contribution(peer_contributions, index);
            let cap = self.cap_for(step.year)?.with_consumed(peer)?;
            let (snapshot, _) = step_roth(&step, cap)?;
            balance = snapshot.closing_balance;
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }

    /// Final Traditional balance after `years`; the opening balance when `years == 0`.
    pub fn project_traditional_balance(
        &self,
        agency: &AgencyContributionPolicy,
    ) -> Result<f64, ValidationError> {
        self.validate()?;
        agency.validate()?;
        let mut balance = self.opening_balance;
        for index in 0..self.years {
            let step = self.year_step(index, balance);
            balance = step_traditional(&step, self.cap_for(step.year)?, agency)?
                .0
                .closing_balance;
        }
        Ok(balance)
    }

    /// Final Roth balance after `years`; the opening balance when `years == 0`.
    pub fn project_roth_balance(
        &self,
        peer_contributions: Option<&[f64]>,
    ) -> Result<f64, ValidationError> {
        self.validate()?;
        let mut balance = self.opening_balance;
        for index in 0..self.years {
            let step = self.year_step(index, balance);
            let peer = peer_contribution(peer_contributions, index);
            let cap = self.cap_for(step.year)?.with_consumed(peer)?;
            balance = step_roth(&step, cap)?.0.closing_balance;
        }
        Ok(balance)
    }
}

fn peer_contribution(peer_contributions: Option<&[f64]>, index: u32) -> f64 {
    peer_contributions
        .and_then(|p| p.get(index as usize).copied())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_match_schedule() {
        let agency = AgencyContributionPolicy::default();
        let salary = 100_000.0;
        assert_eq!(agency.automatic(salary), 1_000.0);
        assert!((agency.matching(salary, 5_000.0) - 4_000.0).abs() < 1e-9);
        assert!((agency.matching(salary, 3_000.0) - 3_000.0).abs() < 1e-9);
        assert!((agency.matching(salary, 4_000.0) - 3_500.0).abs() < 1e-9);
        // Nothing beyond 5%
        assert!((agency.matching(salary, 10_000.0) - 4_000.0).abs() < 1e-9);
        assert_eq!(agency.matching(salary, 0.0), 0.0);
        assert_eq!(agency.matching(0.0, 1_000.0), 0.0);
    }

    #[test]
    fn test_withdrawal_capped_at_available() {
        let limits = ContributionLimitTable::irs_published();
        let step = YearStep {
            year: 2030,
            opening_balance: 1_000.0,
            salary: 0.0,
            requested_contribution: 0.0,
            growth_rate: 0.10,
            withdrawal: 5_000.0,
        };
        let cap = ContributionCapState::for_year(2030, false, &limits).unwrap();
        let (snap, _) = step_roth(&step, cap).unwrap();
        assert!((snap.withdrawal - 1_100.0).abs() < 1e-9);
        assert_eq!(snap.closing_balance, 0.0);
    }

    #[test]
    fn test_step_traditional_records_consumption() {
        let limits = ContributionLimitTable::irs_published();
        let step = YearStep {
            year: 2025,
            opening_balance: 0.0,
            salary: 100_000.0,
            requested_contribution: 10_000.0,
            growth_rate: 0.0,
            withdrawal: 0.0,
        };
        let cap = ContributionCapState::for_year(2025, false, &limits).unwrap();
        let (snap, cap) = step_traditional(&step, cap, &AgencyContributionPolicy::default())
            .unwrap();
        assert_eq!(snap.employee_contribution, 10_000.0);
        assert_eq!(cap.consumed, 10_000.0);
        assert!((snap.closing_balance - 15_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_growth_rate_below_minus_one_rejected() {
        let limits = ContributionLimitTable::irs_published();
        let projector = TspProjector {
            opening_balance: 1_000.0,
            inputs: ContributionInputs {
                salary: 0.0,
                salary_growth_rate: 0.0,
                employee_rate: 0.0,
            },
            growth_rate: -1.5,
            years: 3,
            start_year: 2025,
            catch_up_eligible: false,
            limits: &limits,
        };
        assert!(matches!(
            projector.project_roth_detailed(None),
            Err(ValidationError::OutOfRange {
                field: "growth_rate",
                ..
            })
        ));
        assert!(projector.project_roth_balance(None).is_err());
    }
}
