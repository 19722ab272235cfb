//! Criterion benchmarks for the fedplan_core projection engine
//!
//! Run with: cargo bench -p fedplan_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fedplan_core::config::{MonteCarloConfig, SimulationBuilder, SimulationConfig};
use fedplan_core::model::{ContributionLimitTable, ReturnProfile};
use fedplan_core::monte_carlo;
use fedplan_core::projection::project;
use fedplan_core::tsp::{AgencyContributionPolicy, ContributionInputs, TspProjector};

fn create_config(years: u32) -> SimulationConfig {
    SimulationBuilder::new()
        .born(1970, 3, 15)
        .hired(2000, 1, 10)
        .separating(2030, 3, 31)
        .high3(110_000.0)
        .start_year(2025)
        .years(years)
        .salary(112_000.0)
        .salary_growth(0.02)
        .traditional(250_000.0, 0.05)
        .roth(40_000.0, 0.05)
        .growth_rate(0.06)
        .return_profile(ReturnProfile::Normal {
            mean: 0.06,
            std_dev: 0.12,
        })
        .inflation(0.025)
        .annual_expenses(70_000.0)
        .social_security_at_62(24_000.0)
        .build()
        .unwrap()
}

fn bench_tsp_projection(c: &mut Criterion) {
    let limits = ContributionLimitTable::irs_published();
    let projector = TspProjector {
        opening_balance: 250_000.0,
        inputs: ContributionInputs {
            salary: 112_000.0,
            salary_growth_rate: 0.02,
            employee_rate: 0.10,
        },
        growth_rate: 0.06,
        years: 30,
        start_year: 2025,
        catch_up_eligible: true,
        limits: &limits,
    };
    let agency = AgencyContributionPolicy::default();

    c.bench_function("traditional_30yr_detailed", |b| {
        b.iter(|| projector.project_traditional_detailed(black_box(&agency)))
    });
}

fn bench_full_projection(c: &mut Criterion) {
    let config = create_config(40);

    c.bench_function("full_horizon_40yr", |b| b.iter(|| project(black_box(&config))));
}

fn bench_monte_carlo(c: &mut Criterion) {
    let config = create_config(40);
    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(10);

    for iterations in [100, 1_000] {
        let mc_config = MonteCarloConfig::new(iterations).seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &mc_config,
            |b, mc_config| b.iter(|| monte_carlo::run(black_box(&config), black_box(mc_config))),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_tsp_projection,
    bench_full_projection,
    bench_monte_carlo
);
criterion_main!(benches);
