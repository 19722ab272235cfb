//! Full-horizon projection
//!
//! Runs the career and retirement year by year for one sequence of annual returns:
//!
//! 1. Working years: salary grows, both accounts receive capped deferrals and the Traditional
//!    account receives agency money.
//! 2. The separation year is split at the separation date. Pay, contributions and agency money
//!    cover the worked fraction; annuity, supplement, expenses and withdrawals cover the rest.
//! 3. Retired years: the annuity (with diet COLA after 62), the FERS supplement (until 62) and
//!    TSP withdrawals fund inflating expenses. Withdrawals drain Traditional before Roth.
//!
//! The deterministic [`project`] repeats the configured `growth_rate` every year; Monte Carlo
//! trials call [`project_with_returns`] with a sampled sequence.

use crate::annuity::{annuity_start_year, compute_annuity, diet_cola, fers_supplement};
use crate::config::{SimulationConfig, WithdrawalStrategy};
use crate::contribution::ContributionCapState;
use crate::date_math::fraction_of_year_elapsed;
use crate::error::{MarketError, SimulationError, growth_rate};
use crate::model::{Phase, ProjectionResult, ProjectionYear};
use crate::tsp::{YearStep, step_roth, step_traditional};

/// Shortfalls smaller than this are rounding noise, not a deficit.
const SHORTFALL_TOLERANCE: f64 = 1e-6;

/// Project the whole horizon at the configured fixed growth rate.
pub fn project(config: &SimulationConfig) -> Result<ProjectionResult, SimulationError> {
    let returns = vec![config.growth_rate; config.horizon_years as usize];
    project_with_returns(config, &returns)
}

/// Project the whole horizon with `returns[i]` as the growth rate of year `start_year + i`.
pub fn project_with_returns(
    config: &SimulationConfig,
    returns: &[f64],
) -> Result<ProjectionResult, SimulationError> {
    config.validate()?;
    if returns.len() != config.horizon_years as usize {
        return Err(MarketError::SequenceLength {
            expected: config.horizon_years as usize,
            actual: returns.len(),
        }
        .into());
    }
    for r in returns {
        growth_rate("returns", *r)?;
    }

    let career = &config.career;
    let tables = &config.regulatory;
    let rules = &tables.annuity;

    let age_at_separation = career.age_at_separation();
    let eligibility = crate::eligibility::evaluate(
        age_at_separation,
        career.eligibility_years(),
        career.birth_year(),
        &tables.mra,
    )?;
    let annuity = compute_annuity(
        career.high3_salary,
        career.creditable_service_years,
        age_at_separation,
        eligibility.kind,
        rules,
    )?;
    let supplement = fers_supplement(
        eligibility.kind,
        age_at_separation,
        career.creditable_service_years,
        config.annual_ss_at_62,
        rules,
    )?;
    let annuity_start = annuity_start_year(career, eligibility.kind, rules);

    let separation_year = career.separation_year();
    let unreduced_age = rules.unreduced_age.ceil() as i16;
    let traditional_inputs = config.contribution_inputs(&config.traditional);
    let roth_inputs = config.contribution_inputs(&config.roth);

    let mut years = Vec::with_capacity(returns.len());
    let mut traditional_balance = config.traditional.opening_balance;
    let mut roth_balance = config.roth.opening_balance;
    let mut cola_factor = 1.0;
    let mut fixed_withdrawal: Option<f64> = None;
    let mut depletion_age = None;
    let mut lifetime_surplus = 0.0;
    let mut shortfall = false;

    for (index, &rate) in returns.iter().enumerate() {
        let year = config.start_year + index as i16;
        let age = career.age_in_year(year);

        let (phase, worked_fraction) = match year.cmp(&separation_year) {
            std::cmp::Ordering::Less => (Phase::Working, 1.0),
            std::cmp::Ordering::Equal => (
                Phase::Separation,
                fraction_of_year_elapsed(career.separation_date),
            ),
            std::cmp::Ordering::Greater => (Phase::Retired, 0.0),
        };
        let retired_fraction = 1.0 - worked_fraction;

        // Pay and contributions
        let salary = traditional_inputs.salary_in_year(index as u32) * worked_fraction;
        let catch_up = age >= tables.catch_up_age;

        // Annuity, COLA from the year after the retiree reaches the unreduced age
        let annuity_paid = match annuity_start {
            Some(start) if year >= start => {
                if config.apply_cola && year > start && age > unreduced_age {
                    cola_factor *= 1.0 + diet_cola(config.inflation_rate);
                }
                let fraction = if year == separation_year {
                    retired_fraction
                } else {
                    1.0
                };
                annuity.net_annual_annuity * cola_factor * fraction
            }
            _ => 0.0,
        };

        let supplement_paid = if year >= separation_year && age < unreduced_age {
            supplement * retired_fraction
        } else {
            0.0
        };

        let expenses = if phase == Phase::Working {
            0.0
        } else {
            config.annual_expenses
                * (1.0 + config.inflation_rate).powi(i32::from(year - config.start_year))
                * retired_fraction
        };

        let requested_withdrawal = match (phase, config.withdrawal) {
            (Phase::Working, _) => 0.0,
            (_, WithdrawalStrategy::CoverShortfall) => {
                (expenses - annuity_paid - supplement_paid).max(0.0)
            }
            // Fixed share of the balance when retirement begins, then grown with inflation
            (_, WithdrawalStrategy::FixedPercentage { rate: pct }) => {
                let amount = match fixed_withdrawal {
                    Some(previous) => previous * (1.0 + config.inflation_rate),
                    None => (traditional_balance + roth_balance) * pct,
                };
                fixed_withdrawal = Some(amount);
                amount * retired_fraction
            }
        };

        let traditional_step = YearStep {
            year,
            opening_balance: traditional_balance,
            salary,
            requested_contribution: traditional_inputs.requested_contribution(salary),
            growth_rate: rate,
            withdrawal: requested_withdrawal,
        };
        let cap = ContributionCapState::for_year(year, catch_up, &tables.contribution_limits)?;
        let (traditional, cap) = step_traditional(&traditional_step, cap, &config.agency)?;

        let roth_step = YearStep {
            year,
            opening_balance: roth_balance,
            salary,
            requested_contribution: roth_inputs.requested_contribution(salary),
            growth_rate: rate,
            withdrawal: (requested_withdrawal - traditional.withdrawal).max(0.0),
        };
        let (roth, _) = step_roth(&roth_step, cap)?;

        traditional_balance = traditional.closing_balance;
        roth_balance = roth.closing_balance;

        let withdrawal = traditional.withdrawal + roth.withdrawal;
        if depletion_age.is_none() && requested_withdrawal - withdrawal > SHORTFALL_TOLERANCE {
            depletion_age = Some(age);
        }

        let total_income = annuity_paid + supplement_paid + withdrawal;
        let surplus = if phase == Phase::Working {
            0.0
        } else {
            total_income - expenses
        };
        lifetime_surplus += surplus;
        if surplus < -SHORTFALL_TOLERANCE {
            shortfall = true;
        }

        years.push(ProjectionYear {
            year,
            age,
            phase,
            growth_rate: rate,
            salary,
            traditional,
            roth,
            annuity: annuity_paid,
            supplement: supplement_paid,
            withdrawal,
            expenses,
            total_income,
            surplus,
            total_balance: traditional_balance + roth_balance,
        });
    }

    Ok(ProjectionResult {
        eligibility,
        annuity,
        supplement,
        years,
        depletion_age,
        lifetime_surplus,
        shortfall,
    })
}
