//! Staged lifecycle for driving a [`Platform`] through benchmark runs.
//!
//! Phase ordering is encoded in the type system: each stage is its own type
//! owning the platform handle, and every transition consumes the previous
//! stage. Calling a phase out of order is therefore unconstructible rather
//! than a runtime contract violation.
//!
//! ```text
//! Uninitialized → Verified → GraphLoaded                  (per platform/graph)
//! GraphLoaded → Prepared → Started → Ran → Finalized → GraphLoaded   (per run)
//! GraphLoaded → Verified                                 (delete_graph)
//! ```
//!
//! Failure edges keep the resource-safety invariant enforceable by
//! construction: transitions that fail before `prepare` drop nothing worth
//! releasing and return a plain [`PlatformError`]; transitions that fail once
//! run resources exist hand the still-terminable stage back inside
//! [`PhaseFailure`]; the `run` and `finalize` phases never lose the platform
//! at all and instead return the next stage alongside the phase outcome.

use std::fmt;

use crate::benchmark::BenchmarkRun;
use crate::graph::FormattedGraph;
use crate::metrics::BenchmarkMetrics;
use crate::platform::{Platform, PlatformError};

/// One ordered step of the platform lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Environment prerequisite check.
    VerifySetup,
    /// Graph upload into platform storage.
    LoadGraph,
    /// Run resource acquisition.
    Prepare,
    /// Deployment path configuration.
    Startup,
    /// Algorithm execution.
    Run,
    /// Metrics collection.
    Finalize,
    /// Run resource release.
    Terminate,
    /// Graph unload.
    DeleteGraph,
}

impl Phase {
    /// Snake-case phase name, as used in log fields and metric keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::VerifySetup => "verify_setup",
            Phase::LoadGraph => "load_graph",
            Phase::Prepare => "prepare",
            Phase::Startup => "startup",
            Phase::Run => "run",
            Phase::Finalize => "finalize",
            Phase::Terminate => "terminate",
            Phase::DeleteGraph => "delete_graph",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed phase transition carrying the stage the platform was left in.
///
/// The stage rides along so the caller can still release resources (or reuse
/// the loaded graph) after logging the error.
pub struct PhaseFailure<S> {
    /// The stage that remains valid after the failure.
    pub stage: S,
    /// Which phase failed.
    pub phase: Phase,
    /// The platform's error.
    pub error: PlatformError,
}

impl<S> PhaseFailure<S> {
    fn new(stage: S, phase: Phase, error: PlatformError) -> Self {
        Self { stage, phase, error }
    }

    /// Discards the stage, keeping only the error.
    pub fn into_error(self) -> PlatformError {
        self.error
    }
}

impl<S> fmt::Debug for PhaseFailure<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseFailure")
            .field("phase", &self.phase)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<S> fmt::Display for PhaseFailure<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.phase, self.error)
    }
}

impl<S> std::error::Error for PhaseFailure<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// A platform instance on which no lifecycle phase has run yet.
pub struct Uninitialized {
    platform: Box<dyn Platform>,
}

impl Uninitialized {
    /// Wraps a freshly constructed platform integration.
    pub fn new(platform: Box<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Identity of the wrapped integration.
    pub fn platform_name(&self) -> String {
        self.platform.platform_name().to_string()
    }

    /// Checks prerequisites. A failure here is fatal for the run; nothing has
    /// been acquired yet, so the platform handle is simply dropped.
    pub fn verify_setup(mut self) -> Result<Verified, PlatformError> {
        self.platform.verify_setup()?;
        Ok(Verified {
            platform: self.platform,
        })
    }
}

impl fmt::Debug for Uninitialized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uninitialized")
            .field("platform", &self.platform.platform_name())
            .finish()
    }
}

/// Prerequisites checked; ready to load a graph.
pub struct Verified {
    platform: Box<dyn Platform>,
}

impl Verified {
    /// Uploads a graph into platform storage. A failure is fatal for runs on
    /// this graph: there is nothing loaded to release.
    pub fn load_graph(mut self, graph: &FormattedGraph) -> Result<GraphLoaded, PlatformError> {
        self.platform.load_graph(graph)?;
        Ok(GraphLoaded {
            platform: self.platform,
            graph: graph.clone(),
        })
    }
}

impl fmt::Debug for Verified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verified")
            .field("platform", &self.platform.platform_name())
            .finish()
    }
}

/// A graph is resident in platform storage. Outlives individual runs: every
/// finished or aborted run hands a `GraphLoaded` back for the next one.
pub struct GraphLoaded {
    platform: Box<dyn Platform>,
    graph: FormattedGraph,
}

impl GraphLoaded {
    /// The graph this stage is keyed by.
    pub fn graph(&self) -> &FormattedGraph {
        &self.graph
    }

    /// Identity of the wrapped integration.
    pub fn platform_name(&self) -> String {
        self.platform.platform_name().to_string()
    }

    /// Acquires run resources. On failure the stage is handed back: the graph
    /// stays loaded and no terminate is owed, because a failed prepare must
    /// clean up after itself.
    pub fn prepare(mut self, run: &BenchmarkRun) -> Result<Prepared, PhaseFailure<GraphLoaded>> {
        match self.platform.prepare(run) {
            Ok(()) => Ok(Prepared {
                platform: self.platform,
                graph: self.graph,
            }),
            Err(error) => Err(PhaseFailure::new(self, Phase::Prepare, error)),
        }
    }

    /// Unloads the graph. On failure the stage is handed back so the caller
    /// can decide whether storage is still usable.
    pub fn delete_graph(mut self) -> Result<Verified, PhaseFailure<GraphLoaded>> {
        match self.platform.delete_graph(&self.graph) {
            Ok(()) => Ok(Verified {
                platform: self.platform,
            }),
            Err(error) => Err(PhaseFailure::new(self, Phase::DeleteGraph, error)),
        }
    }
}

impl fmt::Debug for GraphLoaded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphLoaded")
            .field("platform", &self.platform.platform_name())
            .field("graph", &self.graph.name)
            .finish()
    }
}

/// Run resources acquired; `terminate` is owed from here on.
pub struct Prepared {
    platform: Box<dyn Platform>,
    graph: FormattedGraph,
}

impl Prepared {
    /// Configures deployment paths. On failure the stage is handed back so the
    /// owed terminate can still be issued.
    pub fn startup(mut self, run: &BenchmarkRun) -> Result<Started, PhaseFailure<Prepared>> {
        match self.platform.startup(run) {
            Ok(()) => Ok(Started {
                platform: self.platform,
                graph: self.graph,
            }),
            Err(error) => Err(PhaseFailure::new(self, Phase::Startup, error)),
        }
    }

    /// Releases run resources without executing (early-exit path after a
    /// failed startup). The graph stays loaded for the next run.
    pub fn terminate(mut self, run: &BenchmarkRun) -> (GraphLoaded, Result<(), PlatformError>) {
        let outcome = self.platform.terminate(run);
        (
            GraphLoaded {
                platform: self.platform,
                graph: self.graph,
            },
            outcome,
        )
    }
}

impl fmt::Debug for Prepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prepared")
            .field("platform", &self.platform.platform_name())
            .field("graph", &self.graph.name)
            .finish()
    }
}

/// Deployment paths configured; the algorithm may execute.
pub struct Started {
    platform: Box<dyn Platform>,
    graph: FormattedGraph,
}

impl Started {
    /// Executes the algorithm. Never loses the platform: the outcome rides
    /// alongside the next stage so finalize and terminate stay reachable even
    /// when execution fails.
    pub fn run(mut self, run: &BenchmarkRun) -> (Ran, Result<(), PlatformError>) {
        let outcome = self.platform.run(run);
        (
            Ran {
                platform: self.platform,
                graph: self.graph,
            },
            outcome,
        )
    }
}

impl fmt::Debug for Started {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Started")
            .field("platform", &self.platform.platform_name())
            .field("graph", &self.graph.name)
            .finish()
    }
}

/// The run phase has been driven, successfully or not.
pub struct Ran {
    platform: Box<dyn Platform>,
    graph: FormattedGraph,
}

impl Ran {
    /// Collects metrics and readies the platform for the next run. The stage
    /// advances regardless of the outcome; a failed finalize yields no
    /// metrics but must not block the owed terminate.
    pub fn finalize(
        mut self,
        run: &BenchmarkRun,
    ) -> (Finalized, Result<BenchmarkMetrics, PlatformError>) {
        let outcome = self.platform.finalize(run);
        (
            Finalized {
                platform: self.platform,
                graph: self.graph,
            },
            outcome,
        )
    }
}

impl fmt::Debug for Ran {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ran")
            .field("platform", &self.platform.platform_name())
            .field("graph", &self.graph.name)
            .finish()
    }
}

/// Metrics collected; only the owed terminate remains for this run.
pub struct Finalized {
    platform: Box<dyn Platform>,
    graph: FormattedGraph,
}

impl Finalized {
    /// Releases run resources. The graph stays loaded for the next run; a
    /// terminate error is reported but cannot un-finish the run.
    pub fn terminate(mut self, run: &BenchmarkRun) -> (GraphLoaded, Result<(), PlatformError>) {
        let outcome = self.platform.terminate(run);
        (
            GraphLoaded {
                platform: self.platform,
                graph: self.graph,
            },
            outcome,
        )
    }
}

impl fmt::Debug for Finalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finalized")
            .field("platform", &self.platform.platform_name())
            .field("graph", &self.graph.name)
            .finish()
    }
}
