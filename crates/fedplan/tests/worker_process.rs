//! Runs simulations through the `fedplan worker` child process.

use std::path::PathBuf;

use fedplan::worker::{Isolation, WorkerRequest, WorkerResponse, WorkerSupervisor};
use fedplan_core::config::{MonteCarloConfig, SimulationBuilder};
use fedplan_core::model::ReturnProfile;
use fedplan_core::monte_carlo;
use tempfile::TempDir;

fn request(iterations: usize, seed: u64) -> WorkerRequest {
    let config = SimulationBuilder::new()
        .born(1966, 11, 20)
        .hired(1992, 4, 1)
        .separating(2026, 12, 31)
        .high3(120_000.0)
        .start_year(2025)
        .years(30)
        .salary(124_000.0)
        .traditional(520_000.0, 0.07)
        .roth(60_000.0, 0.03)
        .growth_rate(0.05)
        .return_profile(ReturnProfile::Normal {
            mean: 0.055,
            std_dev: 0.11,
        })
        .inflation(0.025)
        .annual_expenses(80_000.0)
        .social_security_at_62(26_000.0)
        .build()
        .unwrap();
    WorkerRequest::Run {
        config,
        mc_config: MonteCarloConfig::new(iterations).seed(seed),
    }
}

fn supervisor(data_dir: &TempDir) -> WorkerSupervisor {
    WorkerSupervisor::new(
        Isolation::Process,
        PathBuf::from(env!("CARGO_BIN_EXE_fedplan")),
    )
    .with_data_dir(data_dir.path().to_path_buf())
}

#[test]
fn test_process_worker_matches_in_process_run() {
    let data_dir = TempDir::new().unwrap();
    let req = request(40, 17);
    let WorkerRequest::Run { config, mc_config } = req.clone();
    let expected = monte_carlo::run(&config, &mc_config).unwrap();

    let mut supervisor = supervisor(&data_dir);
    supervisor.submit("baseline", req).unwrap();
    match supervisor.wait("baseline") {
        Some(WorkerResponse::Result { result }) => assert_eq!(*result, expected),
        other => panic!("unexpected response: {other:?}"),
    }
    assert_eq!(supervisor.active_count(), 0);
    assert!(data_dir.path().join("fedplan.log").exists());
}

#[test]
fn test_process_worker_reports_engine_errors() {
    let data_dir = TempDir::new().unwrap();
    let mut supervisor = supervisor(&data_dir);
    supervisor.submit("broken", request(0, 1)).unwrap();
    assert!(matches!(
        supervisor.wait("broken"),
        Some(WorkerResponse::Error { .. })
    ));
}

#[test]
fn test_superseded_process_is_killed() {
    let data_dir = TempDir::new().unwrap();
    let mut supervisor = supervisor(&data_dir);
    supervisor.submit("plan", request(20_000, 1)).unwrap();
    supervisor.submit("plan", request(10, 2)).unwrap();
    assert_eq!(supervisor.active_count(), 1);

    match supervisor.wait("plan") {
        Some(WorkerResponse::Result { result }) => {
            assert_eq!(result.seed, 2);
            assert_eq!(result.iterations, 10);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}
