//! Isolated execution of Monte Carlo runs
//!
//! Each run gets its own execution context: one request in, exactly one response out, then
//! the context is torn down. Submitting a new request for a key that already has a run in
//! flight terminates the old one outright and its result is never observed.
//!
//! Two backends implement [`SimulationWorker`]:
//! - [`ThreadWorker`] runs on a dedicated thread and reports over a channel.
//! - [`ProcessWorker`] runs `fedplan worker` as a child process and speaks JSON lines.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use fedplan_core::config::{MonteCarloConfig, SimulationConfig};
use fedplan_core::model::MonteCarloResult;
use fedplan_core::monte_carlo;
use serde::{Deserialize, Serialize};

// ============================================================================
// Protocol
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerRequest {
    Run {
        config: SimulationConfig,
        #[serde(rename = "mcConfig")]
        mc_config: MonteCarloConfig,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerResponse {
    Result { result: Box<MonteCarloResult> },
    Error { message: String },
}

impl WorkerResponse {
    fn error(message: impl Into<String>) -> Self {
        WorkerResponse::Error {
            message: message.into(),
        }
    }
}

/// Execute one request inside the current context.
///
/// Engine errors and panics both come back as [`WorkerResponse::Error`].
pub fn handle_request(request: WorkerRequest) -> WorkerResponse {
    let WorkerRequest::Run { config, mc_config } = request;

    tracing::info!(
        iterations = mc_config.iterations,
        seed = ?mc_config.seed,
        "Starting Monte Carlo run"
    );

    match catch_unwind(AssertUnwindSafe(|| monte_carlo::run(&config, &mc_config))) {
        Ok(Ok(result)) => {
            tracing::info!(
                seed = result.seed,
                success_rate = result.success_rate,
                "Monte Carlo run complete"
            );
            WorkerResponse::Result {
                result: Box::new(result),
            }
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Monte Carlo run rejected");
            WorkerResponse::error(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(%message, "Monte Carlo run panicked");
            WorkerResponse::error(format!("simulation panicked: {message}"))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Worker side of the process backend: read one request line, write one response line.
pub fn serve<R: BufRead, W: Write>(mut input: R, mut output: W) -> std::io::Result<()> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    let response = match serde_json::from_str::<WorkerRequest>(line.trim()) {
        Ok(request) => handle_request(request),
        Err(e) => {
            tracing::warn!(error = %e, "Malformed worker request");
            WorkerResponse::error(format!("malformed request: {e}"))
        }
    };

    serde_json::to_writer(&mut output, &response)?;
    output.write_all(b"\n")?;
    output.flush()
}

pub fn serve_stdio() -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(stdin.lock(), stdout.lock())
}

// ============================================================================
// Backends
// ============================================================================

/// One isolated run in flight
pub trait SimulationWorker {
    /// Block until the run reports. `None` once terminated or if the context died silently.
    fn recv(&mut self) -> Option<WorkerResponse>;

    /// Tear the context down. Any result not yet received is discarded.
    fn terminate(&mut self);
}

/// Which execution context to use for each run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Isolation {
    #[default]
    Thread,
    Process,
}

pub struct ThreadWorker {
    rx: Option<Receiver<WorkerResponse>>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadWorker {
    pub fn spawn(request: WorkerRequest) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("fedplan-sim".into())
            .spawn(move || {
                // Receiver is gone once the run was superseded
                let _ = tx.send(handle_request(request));
            })?;

        Ok(Self {
            rx: Some(rx),
            handle: Some(handle),
        })
    }
}

impl SimulationWorker for ThreadWorker {
    fn recv(&mut self) -> Option<WorkerResponse> {
        let response = self.rx.as_ref()?.recv().ok();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        response
    }

    fn terminate(&mut self) {
        self.rx = None;
        // Threads cannot be killed; detach and let the orphaned result drop
        self.handle = None;
    }
}

pub struct ProcessWorker {
    child: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
}

impl ProcessWorker {
    /// Start `program worker` and hand it the request. The child logs under `data_dir` when
    /// one is given.
    pub fn spawn(
        program: &Path,
        data_dir: Option<&Path>,
        request: &WorkerRequest,
    ) -> std::io::Result<Self> {
        let mut command = Command::new(program);
        command.arg("worker");
        if let Some(dir) = data_dir {
            command.arg("--data-dir").arg(dir);
        }
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let payload = serde_json::to_string(request)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(payload.as_bytes())?;
            stdin.write_all(b"\n")?;
            // stdin closes here
        }

        let stdout = child.stdout.take().map(BufReader::new);
        tracing::debug!(pid = child.id(), "Spawned worker process");

        Ok(Self {
            child: Some(child),
            stdout,
        })
    }
}

impl SimulationWorker for ProcessWorker {
    fn recv(&mut self) -> Option<WorkerResponse> {
        let stdout = self.stdout.as_mut()?;
        let mut line = String::new();
        let response = match stdout.read_line(&mut line) {
            Ok(0) => WorkerResponse::error("worker process exited without a response"),
            Ok(_) => serde_json::from_str(line.trim()).unwrap_or_else(|e| {
                WorkerResponse::error(format!("unreadable worker response: {e}"))
            }),
            Err(e) => WorkerResponse::error(format!("failed to read worker output: {e}")),
        };
        self.stdout = None;
        Some(response)
    }

    fn terminate(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let pid = child.id();
            if let Err(e) = child.kill() {
                tracing::debug!(pid, error = %e, "Worker process already exited");
            }
            let _ = child.wait();
        }
    }
}

impl Drop for ProcessWorker {
    fn drop(&mut self) {
        self.terminate();
    }
}

// ============================================================================
// Supervisor
// ============================================================================

/// Keeps at most one run per request key.
pub struct WorkerSupervisor {
    isolation: Isolation,
    /// Executable started for process isolation
    program: PathBuf,
    data_dir: Option<PathBuf>,
    active: HashMap<String, Box<dyn SimulationWorker + Send>>,
}

impl WorkerSupervisor {
    pub fn new(isolation: Isolation, program: PathBuf) -> Self {
        Self {
            isolation,
            program,
            data_dir: None,
            active: HashMap::new(),
        }
    }

    /// Data directory handed to process workers
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = Some(data_dir);
        self
    }

    /// Supervisor that starts process workers from the running executable.
    pub fn for_current_exe(isolation: Isolation) -> std::io::Result<Self> {
        Ok(Self::new(isolation, std::env::current_exe()?))
    }

    /// Start a run for `key`, terminating whatever run that key had in flight.
    pub fn submit(&mut self, key: &str, request: WorkerRequest) -> std::io::Result<()> {
        if let Some(mut previous) = self.active.remove(key) {
            tracing::info!(key, "Superseding in-flight run");
            previous.terminate();
        }

        let worker: Box<dyn SimulationWorker + Send> = match self.isolation {
            Isolation::Thread => Box::new(ThreadWorker::spawn(request)?),
            Isolation::Process => Box::new(ProcessWorker::spawn(
                &self.program,
                self.data_dir.as_deref(),
                &request,
            )?),
        };
        self.active.insert(key.to_string(), worker);
        Ok(())
    }

    /// Block for the current run of `key` and tear its context down.
    pub fn wait(&mut self, key: &str) -> Option<WorkerResponse> {
        let mut worker = self.active.remove(key)?;
        let response = worker.recv();
        worker.terminate();
        response
    }

    pub fn cancel(&mut self, key: &str) -> bool {
        match self.active.remove(key) {
            Some(mut worker) => {
                tracing::info!(key, "Cancelled run");
                worker.terminate();
                true
            }
            None => false,
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl Drop for WorkerSupervisor {
    fn drop(&mut self) {
        for (_, mut worker) in self.active.drain() {
            worker.terminate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedplan_core::config::SimulationBuilder;
    use fedplan_core::model::ReturnProfile;

    fn request(seed: u64, iterations: usize) -> WorkerRequest {
        let config = SimulationBuilder::new()
            .born(1968, 5, 1)
            .hired(1996, 1, 1)
            .separating(2026, 6, 30)
            .high3(98_000.0)
            .start_year(2025)
            .years(25)
            .salary(100_000.0)
            .traditional(300_000.0, 0.06)
            .growth_rate(0.05)
            .return_profile(ReturnProfile::Normal {
                mean: 0.06,
                std_dev: 0.12,
            })
            .annual_expenses(60_000.0)
            .build()
            .unwrap();
        WorkerRequest::Run {
            config,
            mc_config: MonteCarloConfig::new(iterations).seed(seed),
        }
    }

    #[test]
    fn test_thread_worker_matches_direct_run() {
        let req = request(42, 50);
        let WorkerRequest::Run { config, mc_config } = req.clone();
        let direct = monte_carlo::run(&config, &mc_config).unwrap();

        let mut worker = ThreadWorker::spawn(req).unwrap();
        match worker.recv() {
            Some(WorkerResponse::Result { result }) => assert_eq!(*result, direct),
            other => panic!("unexpected response: {other:?}"),
        }
        // One response per context
        assert_eq!(worker.recv(), None);
    }

    #[test]
    fn test_terminated_thread_worker_reports_nothing() {
        let mut worker = ThreadWorker::spawn(request(1, 20)).unwrap();
        worker.terminate();
        assert_eq!(worker.recv(), None);
    }

    #[test]
    fn test_supervisor_supersedes_by_key() {
        let mut supervisor = WorkerSupervisor::new(Isolation::Thread, PathBuf::from("unused"));
        supervisor.submit("plan", request(1, 200)).unwrap();
        supervisor.submit("plan", request(2, 20)).unwrap();
        supervisor.submit("other", request(3, 20)).unwrap();
        assert_eq!(supervisor.active_count(), 2);

        match supervisor.wait("plan") {
            Some(WorkerResponse::Result { result }) => {
                assert_eq!(result.seed, 2);
                assert_eq!(result.iterations, 20);
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert_eq!(supervisor.wait("plan"), None);

        assert!(supervisor.cancel("other"));
        assert!(!supervisor.cancel("other"));
        assert_eq!(supervisor.active_count(), 0);
    }

    #[test]
    fn test_engine_error_becomes_error_response() {
        let response = handle_request(request(1, 0));
        match response {
            WorkerResponse::Error { message } => assert!(message.contains("iterations")),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(request(9, 10)).unwrap();
        assert_eq!(json["type"], "run");
        assert_eq!(json["mcConfig"]["iterations"], 10);
        assert_eq!(json["mcConfig"]["seed"], 9);

        let error = serde_json::to_value(WorkerResponse::error("boom")).unwrap();
        assert_eq!(error, serde_json::json!({ "type": "error", "message": "boom" }));
    }

    #[test]
    fn test_serve_round_trip_in_memory() {
        let line = serde_json::to_string(&request(5, 10)).unwrap() + "\n";
        let mut output = Vec::new();
        serve(line.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with('\n'));
        let response: WorkerResponse = serde_json::from_str(text.trim()).unwrap();
        assert!(matches!(response, WorkerResponse::Result { ref result } if result.seed == 5));
    }

    #[test]
    fn test_serve_rejects_garbage() {
        let mut output = Vec::new();
        serve("not json\n".as_bytes(), &mut output).unwrap();
        let response: WorkerResponse = serde_json::from_slice(&output).unwrap();
        assert!(matches!(response, WorkerResponse::Error { .. }));
    }
}
