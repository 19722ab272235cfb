//! Command-line front end for the federal retirement projection engine
//!
//! The engine itself lives in `fedplan_core`. This crate adds:
//! - YAML scenario files and a named-scenario store in the data directory
//! - Isolated Monte Carlo workers (thread or child process) keyed by request
//! - File logging with size-based rotation
//! - Plain-text reports

pub mod logging;
pub mod report;
pub mod scenario;
pub mod worker;

pub use logging::init_logging;
pub use scenario::{ScenarioError, ScenarioStore};
pub use worker::{Isolation, WorkerRequest, WorkerResponse, WorkerSupervisor};
