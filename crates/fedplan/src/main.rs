use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use fedplan::worker::{self, Isolation, WorkerRequest, WorkerResponse, WorkerSupervisor};
use fedplan::{ScenarioStore, init_logging, report, scenario};
use fedplan_core::annuity::{compute_annuity, fers_supplement};
use fedplan_core::eligibility::evaluate;
use fedplan_core::leave::{LeaveBalance, apply_rollover_cap, sick_leave_service_credit};
use fedplan_core::model::RegulatoryTables;
use fedplan_core::{MonteCarloConfig, monte_carlo, projection};

#[derive(Parser, Debug)]
#[command(name = "fedplan")]
#[command(about = "FERS annuity and TSP retirement projections")]
struct Args {
    /// Path to the data directory (default: ~/.fedplan/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deterministic year-by-year projection of a scenario
    Project {
        /// Scenario name in the data directory, or a path to a YAML file
        scenario: String,
        /// Run the projection through the year this age is reached
        #[arg(long)]
        end_age: Option<i16>,
        /// Override the scenario's annual growth rate (0.05 = 5%)
        #[arg(long)]
        growth_rate: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Monte Carlo simulation of a scenario
    Simulate {
        scenario: String,
        #[arg(short = 'n', long, default_value_t = 1000)]
        iterations: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = Isolation::Thread)]
        isolation: Isolation,
        /// Print every n-th year of the percentile bands
        #[arg(long, default_value_t = 5)]
        stride: usize,
        #[arg(long)]
        json: bool,
    },
    /// Retirement category and annuity for a separation
    Eligibility {
        #[arg(long)]
        birth_year: i16,
        /// Age at separation, in decimal years
        #[arg(long)]
        age: f64,
        /// Creditable service, in decimal years
        #[arg(long)]
        service: f64,
        #[arg(long)]
        high3: Option<f64>,
        /// Estimated annual Social Security at 62, for the FERS supplement
        #[arg(long)]
        ss_at_62: Option<f64>,
    },
    /// Annual leave accrual for a leave year
    Leave {
        #[arg(long)]
        years_of_service: f64,
        #[arg(long, default_value_t = 26.0)]
        periods: f64,
        /// Balance carried in from last year, in hours
        #[arg(long, default_value_t = 0.0)]
        balance: f64,
        #[arg(long, default_value_t = 0.0)]
        used: f64,
        #[arg(long, default_value_t = 240.0)]
        cap: f64,
        /// Unused sick leave to convert to service credit, in hours
        #[arg(long)]
        sick_hours: Option<f64>,
    },
    /// Print a starter scenario
    Example {
        /// Save it under this name in the data directory
        #[arg(long)]
        save: Option<String>,
        /// Write it to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List scenarios saved in the data directory
    List,
    /// Serve one simulation request over stdin/stdout
    #[command(hide = true)]
    Worker,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fedplan")
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;
    let store = ScenarioStore::new(&data_dir);

    match args.command {
        Command::Project {
            scenario,
            end_age,
            growth_rate,
            json,
        } => {
            let mut config = store.load(&scenario)?;
            if let Some(age) = end_age {
                config = config.with_end_age(age);
            }
            if let Some(rate) = growth_rate {
                config = config.with_growth_rate(rate);
            }
            tracing::info!(scenario = %scenario, years = config.horizon_years, "Projecting");

            let result = projection::project(&config).wrap_err("Projection failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", report::render_projection(&result));
            }
        }
        Command::Simulate {
            scenario,
            iterations,
            seed,
            isolation,
            stride,
            json,
        } => {
            let config = store.load(&scenario)?;
            let mut mc_config = MonteCarloConfig::new(iterations);
            // Fix the seed here so the report can show it whichever backend runs
            mc_config.seed = Some(seed.unwrap_or_else(monte_carlo::random_seed));

            let mut supervisor = WorkerSupervisor::for_current_exe(isolation)
                .wrap_err("Failed to locate the fedplan executable")?
                .with_data_dir(data_dir.clone());
            supervisor
                .submit(
                    &scenario,
                    WorkerRequest::Run {
                        config,
                        mc_config,
                    },
                )
                .wrap_err("Failed to start simulation worker")?;

            match supervisor.wait(&scenario) {
                Some(WorkerResponse::Result { result }) if json => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
                Some(WorkerResponse::Result { result }) => {
                    print!("{}", report::render_monte_carlo(&result, stride));
                }
                Some(WorkerResponse::Error { message }) => {
                    return Err(eyre!("Simulation failed: {message}"));
                }
                None => return Err(eyre!("Simulation worker exited without a response")),
            }
        }
        Command::Eligibility {
            birth_year,
            age,
            service,
            high3,
            ss_at_62,
        } => {
            let tables = RegulatoryTables::default();
            let eligibility = evaluate(age, service, birth_year, &tables.mra)?;
            print!("{}", report::render_eligibility(&eligibility));
            println!("  {}", report::verdict(eligibility.kind));

            if let Some(high3) = high3 {
                let annuity =
                    compute_annuity(high3, service, age, eligibility.kind, &tables.annuity)?;
                print!("{}", report::render_annuity(&annuity));
            }
            if let Some(ss) = ss_at_62 {
                let supplement =
                    fers_supplement(eligibility.kind, age, service, ss, &tables.annuity)?;
                println!(
                    "FERS supplement:     {}",
                    report::format_currency(supplement)
                );
            }
        }
        Command::Leave {
            years_of_service,
            periods,
            balance,
            used,
            cap,
            sick_hours,
        } => {
            let rules = RegulatoryTables::default().leave;
            let start = LeaveBalance::new(balance)?;
            let accrued = start.accrue(years_of_service, periods, &rules)?;
            let after_use = accrued.use_hours(used)?;
            let carried = apply_rollover_cap(after_use.hours(), cap)?;

            println!("Accrued this year:   {:.1} h", accrued.hours() - start.hours());
            println!("Balance after use:   {:.1} h", after_use.hours());
            println!("Carried forward:     {carried:.1} h");
            if carried < after_use.hours() {
                println!("Forfeited:           {:.1} h", after_use.hours() - carried);
            }
            if let Some(hours) = sick_hours {
                let credit = sick_leave_service_credit(hours, &rules)?;
                println!("Sick leave credit:   {credit:.3} years");
            }
        }
        Command::Example { save, output } => {
            let config = scenario::example()?;
            if let Some(name) = save {
                let path = store.save(&name, &config)?;
                println!("Saved {}", path.display());
            } else if let Some(path) = output {
                scenario::save(&path, &config)?;
                println!("Wrote {}", path.display());
            } else {
                print!("{}", scenario::to_yaml(&config)?);
            }
        }
        Command::List => {
            for name in store.list()? {
                println!("{name}");
            }
        }
        Command::Worker => {
            worker::serve_stdio().wrap_err("Worker I/O failed")?;
        }
    }

    Ok(())
}
