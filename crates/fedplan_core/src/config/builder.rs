//! Simulation Builder
//!
//! Fluent construction of a [`SimulationConfig`], validated on `build()`.
//!
//! ```ignore
//! use fedplan_core::config::SimulationBuilder;
//!
//! let config = SimulationBuilder::new()
//!     .born(1970, 3, 15)
//!     .hired(2000, 1, 10)
//!     .separating(2027, 3, 31)
//!     .service_years(27.2)
//!     .high3(110_000.0)
//!     .start_year(2025)
//!     .years(40)
//!     .salary(112_000.0)
//!     .traditional(250_000.0, 0.05)
//!     .roth(40_000.0, 0.05)
//!     .growth_rate(0.06)
//!     .annual_expenses(70_000.0)
//!     .build()?;
//! ```

use jiff::civil::{Date, date};

use super::{AccountConfig, SimulationConfig, WithdrawalStrategy};
use crate::error::ValidationError;
use crate::model::{CareerRecord, RegulatoryTables, ReturnProfile};
use crate::tsp::AgencyContributionPolicy;

/// Builder for [`SimulationConfig`]
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    birth_date: Date,
    hire_date: Date,
    separation_date: Date,
    service_years: Option<f64>,
    eligibility_service_years: Option<f64>,
    high3: f64,
    config: PendingConfig,
}

#[derive(Debug, Clone)]
struct PendingConfig {
    start_year: i16,
    horizon_years: u32,
    salary: f64,
    salary_growth_rate: f64,
    traditional: AccountConfig,
    roth: AccountConfig,
    agency: AgencyContributionPolicy,
    growth_rate: f64,
    return_profile: Option<ReturnProfile>,
    inflation_rate: f64,
    regulatory: RegulatoryTables,
    annual_expenses: f64,
    withdrawal: WithdrawalStrategy,
    annual_ss_at_62: f64,
    apply_cola: bool,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            birth_date: date(1970, 1, 1),
            hire_date: date(2000, 1, 1),
            separation_date: date(2027, 1, 1),
            service_years: None,
            eligibility_service_years: None,
            high3: 0.0,
            config: PendingConfig {
                start_year: 2025,
                horizon_years: 40,
                salary: 0.0,
                salary_growth_rate: 0.0,
                traditional: AccountConfig::default(),
                roth: AccountConfig::default(),
                agency: AgencyContributionPolicy::default(),
                growth_rate: 0.0,
                return_profile: None,
                inflation_rate: 0.0,
                regulatory: RegulatoryTables::default(),
                annual_expenses: 0.0,
                withdrawal: WithdrawalStrategy::default(),
                annual_ss_at_62: 0.0,
                apply_cola: true,
            },
        }
    }

    // =========================================================================
    // Career
    // =========================================================================

    #[must_use]
    pub fn born(mut self, year: i16, month: i8, day: i8) -> Self {
        self.birth_date = date(year, month, day);
        self
    }

    #[must_use]
    pub fn hired(mut self, year: i16, month: i8, day: i8) -> Self {
        self.hire_date = date(year, month, day);
        self
    }

    #[must_use]
    pub fn separating(mut self, year: i16, month: i8, day: i8) -> Self {
        self.separation_date = date(year, month, day);
        self
    }

    /// Creditable service; defaults to the span from hire to separation
    #[must_use]
    pub fn service_years(mut self, years: f64) -> Self {
        self.service_years = Some(years);
        self
    }

    #[must_use]
    pub fn eligibility_service_years(mut self, years: f64) -> Self {
        self.eligibility_service_years = Some(years);
        self
    }

    #[must_use]
    pub fn high3(mut self, high3: f64) -> Self {
        self.high3 = high3;
        self
    }

    // =========================================================================
    // Horizon and pay
    // =========================================================================

    #[must_use]
    pub fn start_year(mut self, year: i16) -> Self {
        self.config.start_year = year;
        self
    }

    #[must_use]
    pub fn years(mut self, years: u32) -> Self {
        self.config.horizon_years = years;
        self
    }

    #[must_use]
    pub fn salary(mut self, salary: f64) -> Self {
        self.config.salary = salary;
        self
    }

    #[must_use]
    pub fn salary_growth(mut self, rate: f64) -> Self {
        self.config.salary_growth_rate = rate;
        self
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    #[must_use]
    pub fn traditional(mut self, opening_balance: f64, contribution_rate: f64) -> Self {
        self.config.traditional = AccountConfig {
            opening_balance,
            contribution_rate,
        };
        self
    }

    #[must_use]
    pub fn roth(mut self, opening_balance: f64, contribution_rate: f64) -> Self {
        self.config.roth = AccountConfig {
            opening_balance,
            contribution_rate,
        };
        self
    }

    #[must_use]
    pub fn agency(mut self, agency: AgencyContributionPolicy) -> Self {
        self.config.agency = agency;
        self
    }

    // =========================================================================
    // Assumptions and plan
    // =========================================================================

    #[must_use]
    pub fn growth_rate(mut self, rate: f64) -> Self {
        self.config.growth_rate = rate;
        self
    }

    #[must_use]
    pub fn return_profile(mut self, profile: ReturnProfile) -> Self {
        self.config.return_profile = Some(profile);
        self
    }

    #[must_use]
    pub fn inflation(mut self, rate: f64) -> Self {
        self.config.inflation_rate = rate;
        self
    }

    #[must_use]
    pub fn regulatory(mut self, tables: RegulatoryTables) -> Self {
        self.config.regulatory = tables;
        self
    }

    #[must_use]
    pub fn annual_expenses(mut self, amount: f64) -> Self {
        self.config.annual_expenses = amount;
        self
    }

    #[must_use]
    pub fn withdrawal(mut self, strategy: WithdrawalStrategy) -> Self {
        self.config.withdrawal = strategy;
        self
    }

    #[must_use]
    pub fn social_security_at_62(mut self, annual_amount: f64) -> Self {
        self.config.annual_ss_at_62 = annual_amount;
        self
    }

    #[must_use]
    pub fn cola(mut self, apply: bool) -> Self {
        self.config.apply_cola = apply;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<SimulationConfig, ValidationError> {
        let service_years = self.service_years.unwrap_or_else(|| {
            crate::date_math::decimal_years_between(self.hire_date, self.separation_date)
        });
        let mut career = CareerRecord::new(
            self.birth_date,
            self.hire_date,
            self.separation_date,
            service_years,
            self.high3,
        )?;
        career.eligibility_service_years = self.eligibility_service_years;

        let c = self.config;
        let config = SimulationConfig {
            career,
            start_year: c.start_year,
            horizon_years: c.horizon_years,
            salary: c.salary,
            salary_growth_rate: c.salary_growth_rate,
            traditional: c.traditional,
            roth: c.roth,
            agency: c.agency,
            growth_rate: c.growth_rate,
            return_profile: c.return_profile,
            inflation_rate: c.inflation_rate,
            regulatory: c.regulatory,
            annual_expenses: c.annual_expenses,
            withdrawal: c.withdrawal,
            annual_ss_at_62: c.annual_ss_at_62,
            apply_cola: c.apply_cola,
        };
        config.validate()?;
        Ok(config)
    }
}
