use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tasched_core::{BackendKind, ProblemInput, SchedulerConfig, SchedulerError, report, solve};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    GoodLp,
    CpSat,
}

impl From<Backend> for BackendKind {
    fn from(b: Backend) -> Self {
        match b {
            Backend::GoodLp => BackendKind::GoodLp,
            Backend::CpSat => BackendKind::CpSat,
        }
    }
}

#[derive(Parser)]
#[command(name = "tasched")]
#[command(about = "Assign TAs to office-hour shifts and recitation sections")]
struct Cli {
    /// Problem input (JSON)
    #[arg(long, short)]
    input: PathBuf,

    /// Scheduler configuration (TOML); defaults apply when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Write the schedule to an .xlsx workbook
    #[arg(long)]
    xlsx: Option<PathBuf>,

    /// Overrides `[solver] backend`
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Overrides `[solver] time_limit_seconds`
    #[arg(long)]
    time_limit: Option<f64>,
}

fn run(cli: Cli) -> Result<()> {
    let input = ProblemInput::from_json_file(&cli.input)?;
    let mut config = match &cli.config {
        Some(path) => SchedulerConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SchedulerConfig::default(),
    };
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend.into());
    }
    if let Some(secs) = cli.time_limit {
        config = config.with_time_limit_seconds(secs);
    }
    info!(
        tas = input.tas.len(),
        windows = input.coverage.len(),
        recitations = input.recitations.len(),
        backend = %config.solver.backend,
        "loaded problem"
    );

    let schedule = solve(&input, &config)?;
    println!("{schedule}");

    if let Some(path) = &cli.xlsx {
        report::write_workbook(&schedule, &input, path)?;
        info!(path = %path.display(), "workbook written");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tasched_core=info,tasched=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            match e.downcast_ref::<SchedulerError>() {
                Some(SchedulerError::Infeasible) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
