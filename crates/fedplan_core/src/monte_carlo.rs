//! Monte Carlo simulation over randomized market returns
//!
//! Each trial samples one return per projected year and re-runs the full-horizon projection.
//! Trial seeds are drawn up front from a generator seeded with the master seed, so the result
//! does not depend on how trials are scheduled across threads.
//!
//! A sampled return below -100% is floored at [`TOTAL_LOSS`] before projecting, so the trial
//! records a wiped-out balance instead of failing.

use rand::{Rng, SeedableRng, rngs::SmallRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{MonteCarloConfig, SimulationConfig};
use crate::error::{SimulationError, ValidationError};
use crate::model::{
    DepletionStats, DistributionSummary, MonteCarloResult, PercentileBand, ReturnModel,
};
use crate::percentiles::percentiles;
use crate::projection::project_with_returns;

/// Worst possible annual return: the whole balance is lost
pub const TOTAL_LOSS: f64 = -1.0;

/// What aggregation keeps from a single trial
#[derive(Debug, Clone)]
struct TrialOutcome {
    balances: Vec<f64>,
    incomes: Vec<f64>,
    terminal_balance: f64,
    lifetime_surplus: f64,
    depletion_age: Option<i16>,
    shortfall: bool,
}

/// Fresh master seed from the thread-local OS-seeded generator
pub fn random_seed() -> u64 {
    rand::rng().random()
}

/// Run `mc.iterations` trials against the config's `return_profile`.
pub fn run(
    config: &SimulationConfig,
    mc: &MonteCarloConfig,
) -> Result<MonteCarloResult, SimulationError> {
    let model = config
        .return_profile
        .as_ref()
        .ok_or(ValidationError::MissingReturnModel)?;
    run_with_model(config, mc, model)
}

/// Run `mc.iterations` trials against any return model.
pub fn run_with_model<M: ReturnModel + Sync>(
    config: &SimulationConfig,
    mc: &MonteCarloConfig,
    model: &M,
) -> Result<MonteCarloResult, SimulationError> {
    mc.validate()?;
    config.validate()?;

    let seed = mc.seed.unwrap_or_else(random_seed);
    let mut master = SmallRng::seed_from_u64(seed);
    let trial_seeds: Vec<u64> = (0..mc.iterations).map(|_| master.random()).collect();
    let num_years = config.horizon_years as usize;

    let run_trial = |trial_seed: &u64| -> Result<TrialOutcome, SimulationError> {
        let mut rng = SmallRng::seed_from_u64(*trial_seed);
        let returns: Vec<f64> = model
            .sample_sequence(&mut rng, num_years)?
            .into_iter()
            .map(|r| r.max(TOTAL_LOSS))
            .collect();
        let projection = project_with_returns(config, &returns)?;
        Ok(TrialOutcome {
            balances: projection.years.iter().map(|y| y.total_balance).collect(),
            incomes: projection.years.iter().map(|y| y.total_income).collect(),
            terminal_balance: projection.terminal_balance(),
            lifetime_surplus: projection.lifetime_surplus,
            depletion_age: projection.depletion_age,
            shortfall: projection.shortfall,
        })
    };

    #[cfg(feature = "parallel")]
    let trials: Vec<TrialOutcome> = trial_seeds
        .par_iter()
        .map(run_trial)
        .collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let trials: Vec<TrialOutcome> = trial_seeds
        .iter()
        .map(run_trial)
        .collect::<Result<_, _>>()?;

    Ok(aggregate(config, mc, seed, &trials))
}

fn aggregate(
    config: &SimulationConfig,
    mc: &MonteCarloConfig,
    seed: u64,
    trials: &[TrialOutcome],
) -> MonteCarloResult {
    let n = trials.len() as f64;
    let ps = &mc.percentiles;

    let band = |index: usize, pick: fn(&TrialOutcome) -> &[f64]| {
        let year = config.start_year + index as i16;
        let mut values: Vec<f64> = trials.iter().map(|t| pick(t)[index]).collect();
        PercentileBand {
            year,
            age: config.career.age_in_year(year),
            values: percentiles(&mut values, ps),
        }
    };
    let num_years = config.horizon_years as usize;
    let balance_bands = (0..num_years).map(|i| band(i, |t| t.balances.as_slice())).collect();
    let income_bands = (0..num_years).map(|i| band(i, |t| t.incomes.as_slice())).collect();

    let terminal_balance = summarize(trials.iter().map(|t| t.terminal_balance).collect(), ps);
    let lifetime_surplus = summarize(trials.iter().map(|t| t.lifetime_surplus).collect(), ps);

    let mut depletion_ages: Vec<f64> = trials
        .iter()
        .filter_map(|t| t.depletion_age.map(f64::from))
        .collect();
    let depleted = depletion_ages.len();
    let depletion = DepletionStats {
        probability: depleted as f64 / n,
        earliest_age: trials.iter().filter_map(|t| t.depletion_age).min(),
        age_percentiles: if depleted == 0 {
            Vec::new()
        } else {
            percentiles(&mut depletion_ages, ps)
        },
    };

    let shortfalls = trials.iter().filter(|t| t.shortfall).count();

    MonteCarloResult {
        iterations: trials.len(),
        seed,
        balance_bands,
        income_bands,
        terminal_balance,
        lifetime_surplus,
        probability_of_shortfall: shortfalls as f64 / n,
        success_rate: 1.0 - depletion.probability,
        depletion,
    }
}

fn summarize(mut values: Vec<f64>, ps: &[f64]) -> DistributionSummary {
    let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
    let percentiles = percentiles(&mut values, ps);
    DistributionSummary {
        percentiles,
        mean,
        min: values.first().copied().unwrap_or(0.0),
        max: values.last().copied().unwrap_or(0.0),
    }
}
