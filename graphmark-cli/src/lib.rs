#![warn(missing_docs)]
//! Graphmark CLI Library
//!
//! CLI infrastructure for benchmark harness binaries. Call `graphmark::run()`
//! (or `graphmark_cli::run()`) from your main function to get the supervising
//! CLI, the hidden worker mode and configuration discovery for your registered
//! platform integrations.
//!
//! # Example
//!
//! ```ignore
//! graphmark_core::register_platform!("reference", || Box::new(ReferencePlatform::new()));
//!
//! fn main() -> anyhow::Result<()> {
//!     graphmark_cli::run()
//! }
//! ```

mod config;
mod supervisor;

pub use config::*;
pub use supervisor::*;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use graphmark_core::{BenchmarkRun, PlatformRegistry};
use graphmark_runner::WorkerService;
use graphmark_validate::{OutputValidator, UnconfiguredValidator};

/// Graphmark CLI arguments
#[derive(Parser, Debug)]
#[command(name = "graphmark")]
#[command(author, version, about = "Graphmark - graph-processing benchmark harness")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Supervise one benchmark run in an isolated worker process
    Run {
        /// Platform integration to benchmark
        #[arg(long)]
        platform: String,

        /// Path to the serialized benchmark run description
        #[arg(long)]
        run_spec: PathBuf,

        /// Worker time limit, e.g. "90s" or "15m" (overrides graphmark.toml)
        #[arg(long)]
        timeout: Option<String>,
    },
    /// List registered platform integrations
    Platforms,
    /// Internal: benchmark worker entry point (used by the supervisor)
    #[command(hide = true)]
    Worker {
        /// Platform integration id
        platform: String,
        /// Benchmark run id
        benchmark_id: String,
    },
}

/// Run the Graphmark CLI against the link-time platform registry.
/// This is the main entry point for harness binaries.
pub fn run() -> anyhow::Result<()> {
    run_with(PlatformRegistry::discover(), &UnconfiguredValidator)
}

/// Run the Graphmark CLI with an explicit registry and output checker.
///
/// Embedding suites use this to wire in manually registered platforms and a
/// real output validator.
pub fn run_with(
    registry: PlatformRegistry,
    validator: &dyn OutputValidator,
) -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli, registry, validator)
}

/// Run the Graphmark CLI with pre-parsed arguments.
pub fn run_with_cli(
    cli: Cli,
    registry: PlatformRegistry,
    validator: &dyn OutputValidator,
) -> anyhow::Result<()> {
    match cli.command {
        // Worker mode comes first and gets its own logging setup: its output
        // is drained line-by-line by a supervising parent.
        Commands::Worker {
            platform,
            benchmark_id,
        } => {
            init_worker_logging(cli.verbose);
            run_worker_mode(&registry, validator, &platform, &benchmark_id)
        }
        Commands::Run {
            platform,
            run_spec,
            timeout,
        } => {
            init_logging(cli.verbose);
            let config = GraphmarkConfig::discover().unwrap_or_default();
            cmd_run(&registry, &config, &platform, &run_spec, timeout.as_deref())
        }
        Commands::Platforms => {
            init_logging(cli.verbose);
            cmd_platforms(&registry)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "graphmark=debug"
    } else {
        "graphmark=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn init_worker_logging(verbose: bool) {
    let filter = if verbose {
        "graphmark=debug"
    } else {
        "graphmark=info"
    };
    // No ANSI escapes: the parent re-emits these lines into its own log.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .init();
}

/// Run as a worker process hosting one benchmark run.
///
/// Exit code convention: zero whenever a result record was produced, even for
/// a failed run (failure is data); nonzero only for fatal startup errors.
fn run_worker_mode(
    registry: &PlatformRegistry,
    validator: &dyn OutputValidator,
    platform_id: &str,
    benchmark_id: &str,
) -> anyhow::Result<()> {
    tracing::info!(
        platform = platform_id,
        benchmark_id,
        "Benchmark worker process started"
    );

    let service = WorkerService::new(registry, validator);
    let result = service
        .execute(platform_id, benchmark_id)
        .map_err(|e| anyhow::anyhow!("Worker error: {e}"))?;

    // Single-line record for the supervising side and reporting collaborators.
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

fn cmd_run(
    registry: &PlatformRegistry,
    config: &GraphmarkConfig,
    platform_id: &str,
    run_spec: &Path,
    timeout_override: Option<&str>,
) -> anyhow::Result<()> {
    if !registry.contains(platform_id) {
        let registered: Vec<_> = registry.ids().collect();
        anyhow::bail!(
            "unknown platform \"{platform_id}\"; registered: {}",
            registered.join(", ")
        );
    }

    // Read the run description up front so a malformed spec fails before any
    // process is spawned.
    let contents = std::fs::read_to_string(run_spec)
        .with_context(|| format!("cannot read run spec {}", run_spec.display()))?;
    let run: BenchmarkRun = serde_json::from_str(&contents)
        .with_context(|| format!("malformed run spec {}", run_spec.display()))?;

    let timeout = match timeout_override {
        Some(value) => GraphmarkConfig::parse_duration(value)?,
        None => config.worker_timeout(),
    };

    let entry = CurrentExeEntry::with_run_spec(run_spec);
    let supervisor = Supervisor::new(Box::new(entry), timeout, config.termination_grace());
    let outcome = supervisor.run(platform_id, &run.id)?;

    match outcome {
        WorkerOutcome::Exited { status, drain } if status.success() => {
            tracing::info!(
                benchmark_id = %run.id,
                lines = drain.lines,
                "Benchmark run finished"
            );
            Ok(())
        }
        WorkerOutcome::Exited { status, .. } => {
            anyhow::bail!("worker for benchmark {} failed: {status}", run.id)
        }
        WorkerOutcome::TimedOut { .. } => {
            anyhow::bail!("benchmark {} exceeded the {timeout:?} time limit", run.id)
        }
    }
}

fn cmd_platforms(registry: &PlatformRegistry) -> anyhow::Result<()> {
    println!("Registered platform integrations:");
    for id in registry.ids() {
        println!("  {id}");
    }
    println!("{} platforms found.", registry.len());
    Ok(())
}
