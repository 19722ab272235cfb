//! Elective-deferral limits shared by the Traditional and Roth accounts
//!
//! Both accounts draw from one annual ceiling. Traditional is always resolved first; Roth gets
//! whatever is left. Instead of a global running total, the caller threads a
//! [`ContributionCapState`] from the Traditional allocation into the Roth allocation of the
//! same year.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, non_negative};
use crate::model::ContributionLimitTable;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub traditional: f64,
    pub roth: f64,
}

impl Allocation {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.traditional + self.roth
    }
}

/// Limit bookkeeping for one calendar year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionCapState {
    pub calendar_year: i16,
    pub catch_up_eligible: bool,
    /// Combined employee limit, catch-up included when eligible
    pub limit: f64,
    /// Already allocated to an account this year
    pub consumed: f64,
}

impl ContributionCapState {
    pub fn for_year(
        calendar_year: i16,
        catch_up_eligible: bool,
        table: &ContributionLimitTable,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            calendar_year,
            catch_up_eligible,
            limit: table.limit(calendar_year, catch_up_eligible)?,
            consumed: 0.0,
        })
    }

    /// Record an amount a peer account already took from this year's limit.
    pub fn with_consumed(mut self, peer_contribution: f64) -> Result<Self, ValidationError> {
        self.consumed += non_negative("peer_contribution", peer_contribution)?;
        Ok(self)
    }

    #[must_use]
    pub fn remaining(&self) -> f64 {
        (self.limit - self.consumed).max(0.0)
    }

    /// Take up to `requested` from the remaining limit. Returns the granted amount and the
    /// state to hand to the next account.
    pub fn take(self, requested: f64) -> Result<(f64, Self), ValidationError> {
        let requested = non_negative("requested_contribution", requested)?;
        let granted = requested.min(self.remaining());
        Ok((
            granted,
            Self {
                consumed: self.consumed + granted,
                ..self
            },
        ))
    }
}

/// Traditional side of the year's allocation. Returns the granted deferral and the state the
/// Roth allocation must start from.
pub fn allocate_traditional(
    requested: f64,
    calendar_year: i16,
    catch_up_eligible: bool,
    table: &ContributionLimitTable,
) -> Result<(f64, ContributionCapState), ValidationError> {
    ContributionCapState::for_year(calendar_year, catch_up_eligible, table)?.take(requested)
}

/// Roth side of the year's allocation, resolved against whatever Traditional left.
pub fn allocate_roth(requested: f64, state: ContributionCapState) -> Result<f64, ValidationError> {
    Ok(state.take(requested)?.0)
}

/// Split requested employee contributions across both accounts under the year's limit.
pub fn allocate(
    requested_traditional: f64,
    requested_roth: f64,
    calendar_year: i16,
    catch_up_eligible: bool,
    table: &ContributionLimitTable,
) -> Result<Allocation, ValidationError> {
    let requested_traditional = non_negative("requested_traditional", requested_traditional)?;
    let requested_roth = non_negative("requested_roth", requested_roth)?;

    let (traditional, state) =
        allocate_traditional(requested_traditional, calendar_year, catch_up_eligible, table)?;
    let roth = allocate_roth(requested_roth, state)?;

    Ok(Allocation { traditional, roth })
}
