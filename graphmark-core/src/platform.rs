//! The contract a processing-platform integration implements.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::benchmark::BenchmarkRun;
use crate::graph::FormattedGraph;
use crate::metrics::BenchmarkMetrics;

/// Error raised by a platform integration from any lifecycle phase.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlatformError {
    /// Environment prerequisite missing or broken.
    #[error("setup check failed: {0}")]
    Setup(String),
    /// The platform could not ingest, serve or unload the graph.
    #[error("graph storage error: {0}")]
    GraphStorage(String),
    /// The algorithm execution failed.
    #[error("execution failed: {0}")]
    Execution(String),
    /// The platform's own internal time limit elapsed during execution.
    #[error("platform-internal timeout after {0:?}")]
    Timeout(Duration),
    /// Underlying I/O fault.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Anything else the integration wants to surface.
    #[error("{0}")]
    Other(String),
}

/// One processing-platform integration, stateful across the ordered lifecycle
/// calls of a benchmark run.
///
/// Implementations only define the phase bodies; phase ordering is enforced by
/// the staged types in [`crate::lifecycle`], which are the sole way the harness
/// drives this trait. Integrations must tolerate abrupt process termination at
/// any point without corrupting graph storage shared with future runs.
pub trait Platform: Send {
    /// Identity of the platform integration, e.g. "graphx".
    fn platform_name(&self) -> &str;

    /// Checks platform/environment prerequisites. Any error here is fatal for
    /// the run; there is no retry.
    fn verify_setup(&mut self) -> Result<(), PlatformError>;

    /// Converts and uploads a graph into platform storage. The loaded graph
    /// must stay valid across subsequent `run` calls until `delete_graph` is
    /// invoked for the same graph.
    fn load_graph(&mut self, graph: &FormattedGraph) -> Result<(), PlatformError>;

    /// Acquires compute resources / starts background services for one run.
    /// On failure the platform must clean up whatever it partially acquired;
    /// the harness will not call `terminate` for a failed prepare.
    fn prepare(&mut self, run: &BenchmarkRun) -> Result<(), PlatformError>;

    /// Configures deployment-specific paths (input/output/log directories)
    /// ahead of execution.
    fn startup(&mut self, run: &BenchmarkRun) -> Result<(), PlatformError>;

    /// Executes the algorithm. Expected to finish within the harness timeout;
    /// a worker that never returns from this phase is killed from outside.
    fn run(&mut self, run: &BenchmarkRun) -> Result<(), PlatformError>;

    /// Collects metrics for the finished run and restores the platform to a
    /// ready state for the next one.
    fn finalize(&mut self, run: &BenchmarkRun) -> Result<BenchmarkMetrics, PlatformError>;

    /// Releases the resources acquired in `prepare`. Invoked exactly once per
    /// run if and only if `prepare` succeeded, even when later phases failed.
    fn terminate(&mut self, run: &BenchmarkRun) -> Result<(), PlatformError>;

    /// Unloads a graph once no further runs need it.
    fn delete_graph(&mut self, graph: &FormattedGraph) -> Result<(), PlatformError>;
}
