//! CLI definition and dispatch.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::domain::backtest::BackTestRequest;
use crate::domain::error::VistraderError;
use crate::domain::strategy_builder::build_strategy;
use crate::orchestrator::Orchestrator;

#[derive(Parser, Debug)]
#[command(name = "vistrader", about = "Rule-based trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a batch of backtests against a CSV data file
    Run {
        /// CSV file with timestamp,open,high,low,close[,volume,...] columns
        #[arg(short, long)]
        data: PathBuf,
        /// JSON file with an array of backtest requests
        #[arg(short, long)]
        requests: PathBuf,
        /// Concurrent backtests (capped at 5)
        #[arg(short, long)]
        concurrency: Option<usize>,
    },
    /// Validate a backtest request file without running anything
    Validate {
        #[arg(short, long)]
        requests: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Command::Run {
            data,
            requests,
            concurrency,
        } => run_batch(&data, &requests, concurrency),
        Command::Validate { requests } => run_validate(&requests),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn run_batch(
    data_path: &PathBuf,
    requests_path: &PathBuf,
    concurrency: Option<usize>,
) -> Result<(), VistraderError> {
    let csv_bytes: Arc<[u8]> = fs::read(data_path)?.into();
    let requests = load_requests(requests_path)?;

    let orchestrator = match concurrency {
        Some(limit) => Orchestrator::new(limit),
        None => Orchestrator::default(),
    };

    let runtime = tokio::runtime::Runtime::new().map_err(VistraderError::Io)?;
    let results = runtime.block_on(orchestrator.run(csv_bytes, requests))?;

    let rendered =
        serde_json::to_string_pretty(&results).map_err(|e| VistraderError::ExecutionFailure {
            reason: format!("cannot serialize results: {e}"),
        })?;
    println!("{rendered}");
    Ok(())
}

fn run_validate(requests_path: &PathBuf) -> Result<(), VistraderError> {
    let requests = load_requests(requests_path)?;
    for (index, request) in requests.iter().enumerate() {
        build_strategy(request).map_err(|err| VistraderError::InvalidRequest {
            reason: format!("request {index}: {err}"),
        })?;
    }
    println!("{} request(s) valid", requests.len());
    Ok(())
}

fn load_requests(path: &PathBuf) -> Result<Vec<BackTestRequest>, VistraderError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| VistraderError::InvalidRequest {
        reason: format!("cannot parse {}: {e}", path.display()),
    })
}
