#![warn(missing_docs)]
//! # Graphmark
//!
//! Execution driver for cross-platform graph-processing benchmarks: one
//! algorithm on one graph, on one target platform, in one isolated worker
//! process.
//!
//! - **Platform Contract**: a fixed lifecycle every platform integration
//!   implements; phase ordering is enforced by staged types, so out-of-order
//!   calls do not compile
//! - **Process Isolation**: each run executes in its own worker process with a
//!   hard wall-clock limit; a hung platform cannot hang the suite
//! - **Deadlock-Free Log Capture**: the worker's combined stdout/stderr is
//!   drained concurrently and joined before a run is reported done
//! - **Structured Results**: completed/validated/successful flags, timestamps
//!   and per-phase timings in one immutable record per run
//! - **Opaque Validation**: output correctness checking stays behind a
//!   capability trait supplied by the embedding suite
//!
//! ## Quick Start
//!
//! ```ignore
//! use graphmark::prelude::*;
//!
//! struct ReferencePlatform { /* ... */ }
//!
//! impl Platform for ReferencePlatform {
//!     // verify_setup / load_graph / prepare / startup / run /
//!     // finalize / terminate / delete_graph
//!     # fn platform_name(&self) -> &str { "reference" }
//! }
//!
//! graphmark::register_platform!("reference", || Box::new(ReferencePlatform::new()));
//!
//! fn main() -> anyhow::Result<()> {
//!     graphmark::run()
//! }
//! ```

// Re-export the domain model and platform contract
pub use graphmark_core::{
    Algorithm, BenchmarkMetrics, BenchmarkRun, BenchmarkRunResult, FormattedGraph, Metric, Phase,
    PhaseFailure, Platform, PlatformError, PlatformRegistration, PlatformRegistry, ResultBuilder,
    UnknownPlatform, ValidationRule,
};

// Re-export the staged lifecycle types
pub use graphmark_core::lifecycle;

// Re-export the platform registration macro
pub use graphmark_core::register_platform;

// Re-export the validation capability
pub use graphmark_validate::{
    OutputValidator, UnconfiguredValidator, ValidationJob, ValidatorError,
};

// Re-export the in-worker driver
pub use graphmark_runner::{
    execute_run, BenchmarkRunner, WorkerError, WorkerService, RUN_SPEC_ENV,
};

// Re-export supervision and configuration
pub use graphmark_cli::{
    run_with, run_with_cli, Cli, Commands, CurrentExeEntry, DrainReport, GraphmarkConfig,
    RunnerConfig, Supervisor, SupervisorError, WorkerEntry, WorkerOutcome, WorkerProcess,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        register_platform, Algorithm, BenchmarkRun, BenchmarkRunResult, FormattedGraph, Platform,
        PlatformError, PlatformRegistry, ValidationRule,
    };
}

/// Run the Graphmark CLI harness.
///
/// Call this from your benchmark binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     graphmark::run()
/// }
/// ```
pub use graphmark_cli::run;
