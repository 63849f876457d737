//! Worker startup: parameter resolution, run handoff, result emission.

use std::env;
use std::fs;
use std::path::PathBuf;

use graphmark_core::lifecycle::Uninitialized;
use graphmark_core::{
    BenchmarkRun, BenchmarkRunResult, Platform, PlatformError, PlatformRegistry, UnknownPlatform,
};
use graphmark_validate::OutputValidator;
use thiserror::Error;

use crate::runner::execute_run;

/// Environment variable naming the file the launching side serialized the
/// [`BenchmarkRun`] into.
pub const RUN_SPEC_ENV: &str = "GRAPHMARK_RUN_SPEC";

/// Fatal worker startup error.
///
/// Anything here means no result record was produced: the worker exits nonzero
/// and the supervising side treats the benchmark as failed to start.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkerError {
    /// The run handoff variable is absent from the worker environment.
    #[error("{} is not set; workers must be launched by the harness", RUN_SPEC_ENV)]
    MissingRunSpec,
    /// The run handoff file could not be read.
    #[error("cannot read run spec {}: {source}", path.display())]
    UnreadableRunSpec {
        /// Path taken from the handoff variable.
        path: PathBuf,
        /// Underlying read fault.
        source: std::io::Error,
    },
    /// The run handoff file does not deserialize to a run description.
    #[error("malformed run spec {}: {source}", path.display())]
    MalformedRunSpec {
        /// Path taken from the handoff variable.
        path: PathBuf,
        /// Underlying parse fault.
        source: serde_json::Error,
    },
    /// The handoff describes a different run than the worker was launched for.
    #[error("run spec describes benchmark \"{found}\", worker was launched for \"{expected}\"")]
    BenchmarkIdMismatch {
        /// Benchmark id from the worker command line.
        expected: String,
        /// Benchmark id found in the run spec.
        found: String,
    },
    /// No platform integration is registered under the requested id.
    #[error(transparent)]
    UnknownPlatform(#[from] UnknownPlatform),
    /// A fatal setup phase (verify_setup or load_graph) failed.
    #[error("platform setup failed: {0}")]
    Setup(#[from] PlatformError),
}

/// Reads the [`BenchmarkRun`] the launching side serialized for this worker.
pub fn load_run_spec() -> Result<BenchmarkRun, WorkerError> {
    let path = PathBuf::from(env::var_os(RUN_SPEC_ENV).ok_or(WorkerError::MissingRunSpec)?);
    let contents = fs::read_to_string(&path)
        .map_err(|source| WorkerError::UnreadableRunSpec {
            path: path.clone(),
            source,
        })?;
    serde_json::from_str(&contents).map_err(|source| WorkerError::MalformedRunSpec { path, source })
}

/// Resolves worker invocation parameters into one driven benchmark run.
///
/// The worker command line carries only the platform id and the benchmark id;
/// the run description arrives out-of-band via [`RUN_SPEC_ENV`]. The service
/// cross-checks the two, constructs the platform integration from the registry
/// and drives the full lifecycle.
pub struct WorkerService<'a> {
    registry: &'a PlatformRegistry,
    validator: &'a dyn OutputValidator,
}

impl<'a> WorkerService<'a> {
    /// Service over the given registry, judging output with the given checker.
    pub fn new(registry: &'a PlatformRegistry, validator: &'a dyn OutputValidator) -> Self {
        Self {
            registry,
            validator,
        }
    }

    /// Full worker path: handoff, id cross-check, registry lookup, drive.
    pub fn execute(
        &self,
        platform_id: &str,
        benchmark_id: &str,
    ) -> Result<BenchmarkRunResult, WorkerError> {
        let run = load_run_spec()?;
        if run.id != benchmark_id {
            return Err(WorkerError::BenchmarkIdMismatch {
                expected: benchmark_id.to_string(),
                found: run.id,
            });
        }
        let platform = self.registry.create(platform_id)?;
        self.execute_with_platform(platform, &run)
    }

    /// Drives one run on an already-constructed platform instance.
    ///
    /// `verify_setup` and `load_graph` failures are fatal and propagate; from
    /// `prepare` onward every outcome becomes flags on the returned result.
    /// The graph stays resident in platform storage when the worker exits;
    /// unloading is the suite scheduler's call, not the run's.
    pub fn execute_with_platform(
        &self,
        platform: Box<dyn Platform>,
        run: &BenchmarkRun,
    ) -> Result<BenchmarkRunResult, WorkerError> {
        let stage = Uninitialized::new(platform);
        tracing::info!(
            platform = %stage.platform_name(),
            benchmark_id = %run.id,
            algorithm = %run.algorithm.acronym,
            graph = %run.graph.name,
            "Starting benchmark run"
        );

        let verified = stage.verify_setup()?;
        let loaded = verified.load_graph(&run.graph)?;
        let (_loaded, result) = execute_run(loaded, run, self.validator);

        tracing::info!(
            benchmark_id = %result.benchmark_id,
            completed = result.completed,
            validated = result.validated,
            successful = result.successful,
            "Benchmark run finished"
        );
        Ok(result)
    }
}
