//! Federal retirement projection engine
//!
//! This crate projects retirement income for employees covered by FERS and the Thrift Savings
//! Plan. It supports:
//! - Retirement eligibility (full immediate, MRA+10 reduced, deferred)
//! - Basic annuity with age reduction, FERS supplement and diet COLA
//! - Traditional and Roth TSP projections sharing one elective-deferral limit
//! - Agency automatic and matching contributions
//! - Full-horizon projections through separation and retirement
//! - Monte Carlo simulation over pluggable return models
//! - Annual leave accrual and sick-leave service credit
//!
//! Every component is a pure function of its inputs; nothing here performs I/O.
//!
//! # Builder DSL
//!
//! ```ignore
//! use fedplan_core::{SimulationBuilder, MonteCarloConfig, ReturnProfile};
//!
//! let config = SimulationBuilder::new()
//!     .born(1970, 3, 15)
//!     .hired(2000, 1, 10)
//!     .separating(2027, 3, 31)
//!     .high3(110_000.0)
//!     .salary(112_000.0)
//!     .traditional(250_000.0, 0.05)
//!     .growth_rate(0.06)
//!     .return_profile(ReturnProfile::Normal { mean: 0.06, std_dev: 0.12 })
//!     .annual_expenses(70_000.0)
//!     .build()?;
//!
//! let projection = fedplan_core::projection::project(&config)?;
//! let mc = fedplan_core::monte_carlo::run(&config, &MonteCarloConfig::new(1_000).seed(42))?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod annuity;
pub mod contribution;
pub mod date_math;
pub mod eligibility;
pub mod error;
pub mod leave;
pub mod monte_carlo;
pub mod percentiles;
pub mod projection;
pub mod tsp;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{MonteCarloConfig, SimulationBuilder, SimulationConfig, WithdrawalStrategy};
pub use error::{LeaveError, MarketError, SimulationError, ValidationError};
pub use model::{
    CareerRecord, EligibilityKind, MonteCarloResult, ProjectionResult, ReturnModel, ReturnProfile,
};
