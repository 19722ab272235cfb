//! Annual leave accrual and sick-leave service credit

use serde::{Deserialize, Serialize};

use crate::error::{LeaveError, ValidationError, non_negative};
use crate::model::LeaveRules;

/// Hours accrued per biweekly pay period at a given length of service.
pub fn accrual_rate(years_of_service: f64, rules: &LeaveRules) -> Result<f64, ValidationError> {
    let years = non_negative("years_of_service", years_of_service)?;
    rules
        .tiers
        .iter()
        .filter(|t| t.min_years_of_service <= years)
        .max_by(|a, b| a.min_years_of_service.total_cmp(&b.min_years_of_service))
        .map(|t| t.hours_per_period)
        .ok_or(ValidationError::EmptyTable("leave accrual"))
}

/// Hours earned over `pay_periods_worked` biweekly periods.
pub fn accrue(
    years_of_service: f64,
    pay_periods_worked: f64,
    rules: &LeaveRules,
) -> Result<f64, ValidationError> {
    let periods = non_negative("pay_periods_worked", pay_periods_worked)?;
    Ok(accrual_rate(years_of_service, rules)? * periods)
}

/// Year-end rollover: anything above `cap` is forfeited.
pub fn apply_rollover_cap(balance: f64, cap: f64) -> Result<f64, ValidationError> {
    let balance = non_negative("balance", balance)?;
    let cap = non_negative("cap", cap)?;
    Ok(balance.min(cap))
}

pub fn use_leave(balance: f64, hours_used: f64) -> Result<f64, LeaveError> {
    let balance = non_negative("balance", balance)?;
    let hours_used = non_negative("hours_used", hours_used)?;
    if hours_used > balance {
        return Err(LeaveError::InsufficientBalance {
            requested: hours_used,
            available: balance,
        });
    }
    Ok(balance - hours_used)
}

/// Service credit for unused sick leave, in years.
pub fn sick_leave_service_credit(hours: f64, rules: &LeaveRules) -> Result<f64, ValidationError> {
    let hours = non_negative("unused_sick_leave_hours", hours)?;
    if rules.hours_per_service_year <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "hours_per_service_year",
            value: rules.hours_per_service_year,
            reason: "must be positive",
        });
    }
    Ok(hours / rules.hours_per_service_year)
}

/// A leave balance in hours; never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LeaveBalance {
    hours: f64,
}

impl LeaveBalance {
    pub fn new(hours: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            hours: non_negative("hours", hours)?,
        })
    }

    #[must_use]
    pub fn hours(&self) -> f64 {
        self.hours
    }

    pub fn accrue(
        self,
        years_of_service: f64,
        pay_periods_worked: f64,
        rules: &LeaveRules,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            hours: self.hours + accrue(years_of_service, pay_periods_worked, rules)?,
        })
    }

    pub fn use_hours(self, hours_used: f64) -> Result<Self, LeaveError> {
        Ok(Self {
            hours: use_leave(self.hours, hours_used)?,
        })
    }

    /// Apply the rollover ceiling from `rules` at the leave-year boundary.
    pub fn year_end(self, rules: &LeaveRules) -> Result<Self, ValidationError> {
        Ok(Self {
            hours: apply_rollover_cap(self.hours, rules.rollover_cap_hours)?,
        })
    }
}
