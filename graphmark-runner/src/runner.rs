//! The per-run driver: phases, timing, and outcome flags.

use std::time::Instant;

use graphmark_core::lifecycle::{
    Finalized, GraphLoaded, Phase, PhaseFailure, Prepared, Ran, Started,
};
use graphmark_core::{BenchmarkMetrics, BenchmarkRun, BenchmarkRunResult, ResultBuilder};
use graphmark_validate::{OutputValidator, ValidationJob};

/// Drives the lifecycle phases for one benchmark run.
///
/// Holds the outcome flags and the result builder while the staged lifecycle
/// types thread the platform handle through the phase methods. All platform
/// errors stop here: they become flags and log lines, never panics or early
/// returns that would skip the owed cleanup.
pub struct BenchmarkRunner<'a> {
    run: &'a BenchmarkRun,
    validator: &'a dyn OutputValidator,
    builder: ResultBuilder,
    completed: bool,
    validated: bool,
    phase_timings: BenchmarkMetrics,
}

impl<'a> BenchmarkRunner<'a> {
    /// Runner for one run, judging output with the given checker.
    pub fn new(run: &'a BenchmarkRun, validator: &'a dyn OutputValidator) -> Self {
        Self {
            run,
            validator,
            builder: ResultBuilder::new(run),
            completed: false,
            validated: false,
            phase_timings: BenchmarkMetrics::new(),
        }
    }

    /// Whether the run phase returned without error.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Whether validation, where required, passed.
    pub fn validated(&self) -> bool {
        self.validated
    }

    /// Configures deployment paths ahead of execution.
    pub fn preprocess(&mut self, stage: Prepared) -> Result<Started, PhaseFailure<Prepared>> {
        let clock = Instant::now();
        let outcome = stage.startup(self.run);
        self.record_phase(Phase::Startup, clock);
        outcome
    }

    /// Executes the algorithm between the result's start and end marks. An
    /// execution error is recorded as `completed = false` and logged with the
    /// algorithm and graph names; it never propagates.
    pub fn execute(&mut self, stage: Started) -> Ran {
        tracing::info!(benchmark_id = %self.run.id, "Runner executing benchmark");
        self.builder.mark_start_of_benchmark();
        let clock = Instant::now();
        let (ran, outcome) = stage.run(self.run);
        self.builder.mark_end_of_benchmark();
        self.record_phase(Phase::Run, clock);
        match outcome {
            Ok(()) => self.completed = true,
            Err(error) => {
                self.completed = false;
                tracing::error!(
                    algorithm = %self.run.algorithm.name,
                    graph = %self.run.graph.name,
                    error = %error,
                    "Algorithm failed to complete"
                );
            }
        }
        ran
    }

    /// Judges the output, only when the run completed and requires it. A
    /// checker that cannot run counts as `validated = false`, same as a
    /// mismatch; the two differ only in the log stream.
    pub fn validate(&mut self) {
        if self.completed && self.run.validation_required {
            let job = ValidationJob::for_run(self.run);
            self.validated = match self.validator.validate(&job) {
                Ok(true) => true,
                Ok(false) => {
                    tracing::warn!(
                        benchmark_id = %self.run.id,
                        "Output does not match the expected result"
                    );
                    false
                }
                Err(error) => {
                    tracing::error!(
                        benchmark_id = %self.run.id,
                        error = %error,
                        "Failed to validate output"
                    );
                    false
                }
            };
        } else {
            self.validated = false;
        }
    }

    /// Collects platform metrics. A failed finalize yields an empty map and a
    /// log line; the run's flags are untouched.
    pub fn postprocess(&mut self, stage: Ran) -> (Finalized, BenchmarkMetrics) {
        let clock = Instant::now();
        let (finalized, outcome) = stage.finalize(self.run);
        self.record_phase(Phase::Finalize, clock);
        let metrics = match outcome {
            Ok(metrics) => metrics,
            Err(error) => {
                tracing::error!(
                    benchmark_id = %self.run.id,
                    error = %error,
                    "Failed to collect platform metrics"
                );
                BenchmarkMetrics::new()
            }
        };
        (finalized, metrics)
    }

    /// Computes `successful`, folds the driver's phase timings into the
    /// platform metrics, and builds the immutable result.
    pub fn summarize(self, metrics: BenchmarkMetrics) -> BenchmarkRunResult {
        let successful = if self.run.validation_required {
            self.completed && self.validated
        } else {
            self.completed
        };
        let mut combined = metrics;
        combined.merge(self.phase_timings);
        let mut builder = self.builder;
        builder.set_completed(self.completed);
        builder.set_validated(self.validated);
        builder.set_successful(successful);
        builder.set_metrics(combined);
        builder.build()
    }

    fn record_phase(&mut self, phase: Phase, since: Instant) {
        self.phase_timings.insert(
            format!("{}_time", phase.as_str()),
            since.elapsed().as_secs_f64(),
            "s",
        );
    }
}

/// Drives the complete per-run sequence from a loaded graph and hands the
/// loaded graph back for the next run.
///
/// Invariants upheld here:
/// - `terminate` happens exactly once if and only if `prepare` succeeded
/// - validation runs only when the run completed and requires it
/// - cleanup failures are logged and cannot reclassify the outcome
pub fn execute_run(
    loaded: GraphLoaded,
    run: &BenchmarkRun,
    validator: &dyn OutputValidator,
) -> (GraphLoaded, BenchmarkRunResult) {
    let mut runner = BenchmarkRunner::new(run, validator);

    let clock = Instant::now();
    let prepared = match loaded.prepare(run) {
        Ok(prepared) => {
            runner.record_phase(Phase::Prepare, clock);
            prepared
        }
        Err(failure) => {
            tracing::error!(
                benchmark_id = %run.id,
                error = %failure.error,
                "Failed to prepare run"
            );
            return (failure.stage, runner.summarize(BenchmarkMetrics::new()));
        }
    };

    let started = match runner.preprocess(prepared) {
        Ok(started) => started,
        Err(failure) => {
            tracing::error!(
                benchmark_id = %run.id,
                error = %failure.error,
                "Failed to start up run"
            );
            let (loaded, terminated) = failure.stage.terminate(run);
            if let Err(error) = terminated {
                tracing::error!(
                    benchmark_id = %run.id,
                    error = %error,
                    "Failed to terminate after startup failure"
                );
            }
            return (loaded, runner.summarize(BenchmarkMetrics::new()));
        }
    };

    let ran = runner.execute(started);
    runner.validate();
    let (finalized, metrics) = runner.postprocess(ran);

    let clock = Instant::now();
    let (loaded, terminated) = finalized.terminate(run);
    runner.record_phase(Phase::Terminate, clock);
    if let Err(error) = terminated {
        tracing::error!(
            benchmark_id = %run.id,
            error = %error,
            "Failed to terminate run"
        );
    }

    (loaded, runner.summarize(metrics))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use graphmark_core::lifecycle::Uninitialized;
    use graphmark_core::{Algorithm, FormattedGraph, Platform, PlatformError, ValidationRule};
    use graphmark_validate::ValidatorError;

    use super::*;

    #[derive(Clone, Default)]
    struct CallLog(Arc<Mutex<Vec<&'static str>>>);

    impl CallLog {
        fn push(&self, call: &'static str) {
            self.0.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }

        fn count(&self, call: &str) -> usize {
            self.0.lock().unwrap().iter().filter(|c| **c == call).count()
        }
    }

    struct ScriptedPlatform {
        log: CallLog,
        fail_on: Option<Phase>,
    }

    impl ScriptedPlatform {
        fn boxed(log: CallLog, fail_on: Option<Phase>) -> Box<dyn Platform> {
            Box::new(Self { log, fail_on })
        }

        fn outcome(&self, phase: Phase) -> Result<(), PlatformError> {
            if self.fail_on == Some(phase) {
                Err(PlatformError::Execution(format!("scripted {phase} failure")))
            } else {
                Ok(())
            }
        }
    }

    impl Platform for ScriptedPlatform {
        fn platform_name(&self) -> &str {
            "scripted"
        }

        fn verify_setup(&mut self) -> Result<(), PlatformError> {
            self.log.push("verify_setup");
            self.outcome(Phase::VerifySetup)
        }

        fn load_graph(&mut self, _graph: &FormattedGraph) -> Result<(), PlatformError> {
            self.log.push("load_graph");
            self.outcome(Phase::LoadGraph)
        }

        fn prepare(&mut self, _run: &BenchmarkRun) -> Result<(), PlatformError> {
            self.log.push("prepare");
            self.outcome(Phase::Prepare)
        }

        fn startup(&mut self, _run: &BenchmarkRun) -> Result<(), PlatformError> {
            self.log.push("startup");
            self.outcome(Phase::Startup)
        }

        fn run(&mut self, _run: &BenchmarkRun) -> Result<(), PlatformError> {
            self.log.push("run");
            self.outcome(Phase::Run)
        }

        fn finalize(&mut self, _run: &BenchmarkRun) -> Result<BenchmarkMetrics, PlatformError> {
            self.log.push("finalize");
            self.outcome(Phase::Finalize)?;
            let mut metrics = BenchmarkMetrics::new();
            metrics.insert("processing_time", 0.25, "s");
            Ok(metrics)
        }

        fn terminate(&mut self, _run: &BenchmarkRun) -> Result<(), PlatformError> {
            self.log.push("terminate");
            self.outcome(Phase::Terminate)
        }

        fn delete_graph(&mut self, _graph: &FormattedGraph) -> Result<(), PlatformError> {
            self.log.push("delete_graph");
            self.outcome(Phase::DeleteGraph)
        }
    }

    enum TestValidator {
        Pass,
        Mismatch,
        Broken,
        Counting(Arc<AtomicUsize>),
    }

    impl OutputValidator for TestValidator {
        fn validate(&self, _job: &ValidationJob) -> Result<bool, ValidatorError> {
            match self {
                TestValidator::Pass => Ok(true),
                TestValidator::Mismatch => Ok(false),
                TestValidator::Broken => {
                    Err(ValidatorError::MissingExpectedOutput("/expected".into()))
                }
                TestValidator::Counting(hits) => {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(true)
                }
            }
        }
    }

    fn make_run(validation_required: bool) -> BenchmarkRun {
        BenchmarkRun {
            id: "r100".to_string(),
            algorithm: Algorithm::new("bfs", "Breadth-First Search", ValidationRule::ExactMatch),
            graph: FormattedGraph::new("graph500-22", "/g/g.v", "/g/g.e", false),
            output_dir: "/out/r100".into(),
            validation_dir: "/expected/graph500-22/bfs".into(),
            validation_required,
        }
    }

    fn load(log: CallLog, fail_on: Option<Phase>) -> GraphLoaded {
        Uninitialized::new(ScriptedPlatform::boxed(log, fail_on))
            .verify_setup()
            .unwrap()
            .load_graph(&make_run(false).graph)
            .unwrap()
    }

    #[test]
    fn test_run_without_validation_succeeds() {
        let log = CallLog::default();
        let run = make_run(false);
        let (_loaded, result) = execute_run(load(log.clone(), None), &run, &TestValidator::Pass);

        assert!(result.completed);
        assert!(!result.validated);
        assert!(result.successful);
        assert_eq!(
            log.calls(),
            vec![
                "verify_setup",
                "load_graph",
                "prepare",
                "startup",
                "run",
                "finalize",
                "terminate"
            ]
        );
    }

    #[test]
    fn test_validation_pass_makes_run_successful() {
        let run = make_run(true);
        let (_loaded, result) =
            execute_run(load(CallLog::default(), None), &run, &TestValidator::Pass);
        assert!(result.completed);
        assert!(result.validated);
        assert!(result.successful);
    }

    #[test]
    fn test_validation_mismatch_fails_run() {
        let run = make_run(true);
        let (_loaded, result) =
            execute_run(load(CallLog::default(), None), &run, &TestValidator::Mismatch);
        assert!(result.completed);
        assert!(!result.validated);
        assert!(!result.successful);
    }

    #[test]
    fn test_broken_validator_counts_as_invalid() {
        let run = make_run(true);
        let (_loaded, result) =
            execute_run(load(CallLog::default(), None), &run, &TestValidator::Broken);
        assert!(result.completed);
        assert!(!result.validated);
        assert!(!result.successful);
    }

    #[test]
    fn test_run_failure_skips_validation() {
        let log = CallLog::default();
        let run = make_run(true);
        let hits = Arc::new(AtomicUsize::new(0));
        let (_loaded, result) = execute_run(
            load(log.clone(), Some(Phase::Run)),
            &run,
            &TestValidator::Counting(hits.clone()),
        );

        assert!(!result.completed);
        assert!(!result.validated);
        assert!(!result.successful);
        // The checker must not have been consulted at all.
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        // Execution failures are not fatal: finalize and terminate still ran.
        assert_eq!(log.count("finalize"), 1);
        assert_eq!(log.count("terminate"), 1);
    }

    #[test]
    fn test_prepare_failure_aborts_before_execution() {
        let log = CallLog::default();
        let run = make_run(true);
        let (loaded, result) = execute_run(
            load(log.clone(), Some(Phase::Prepare)),
            &run,
            &TestValidator::Pass,
        );

        assert!(!result.completed);
        assert!(!result.validated);
        assert!(!result.successful);
        assert_eq!(log.calls(), vec!["verify_setup", "load_graph", "prepare"]);
        // The graph survives the aborted run.
        assert_eq!(loaded.graph().name, "graph500-22");
    }

    #[test]
    fn test_startup_failure_still_terminates() {
        let log = CallLog::default();
        let run = make_run(false);
        let (_loaded, result) = execute_run(
            load(log.clone(), Some(Phase::Startup)),
            &run,
            &TestValidator::Pass,
        );

        assert!(!result.completed);
        assert!(!result.successful);
        let calls = log.calls();
        assert!(!calls.contains(&"run"));
        assert!(!calls.contains(&"finalize"));
        assert_eq!(log.count("terminate"), 1);
    }

    #[test]
    fn test_terminate_failure_keeps_outcome() {
        let log = CallLog::default();
        let run = make_run(false);
        let (_loaded, result) = execute_run(
            load(log.clone(), Some(Phase::Terminate)),
            &run,
            &TestValidator::Pass,
        );

        // A cleanup failure cannot reclassify an already-successful run.
        assert!(result.completed);
        assert!(result.successful);
        assert_eq!(log.count("terminate"), 1);
    }

    #[test]
    fn test_finalize_failure_yields_driver_timings_only() {
        let log = CallLog::default();
        let run = make_run(false);
        let (_loaded, result) = execute_run(
            load(log.clone(), Some(Phase::Finalize)),
            &run,
            &TestValidator::Pass,
        );

        assert!(result.completed);
        assert!(result.successful);
        assert!(result.metrics.get("processing_time").is_none());
        assert!(result.metrics.get("run_time").is_some());
        assert_eq!(log.count("terminate"), 1);
    }

    #[test]
    fn test_phase_timings_recorded_alongside_platform_metrics() {
        let run = make_run(false);
        let (_loaded, result) =
            execute_run(load(CallLog::default(), None), &run, &TestValidator::Pass);

        for key in ["prepare_time", "startup_time", "run_time", "finalize_time", "terminate_time"] {
            let metric = result.metrics.get(key).unwrap_or_else(|| panic!("missing {key}"));
            assert_eq!(metric.unit, "s");
            assert!(metric.value >= 0.0);
        }
        assert_eq!(result.metrics.get("processing_time").unwrap().value, 0.25);
    }

    #[test]
    fn test_success_formula_holds_for_all_outcomes() {
        for validation_required in [false, true] {
            for run_fails in [false, true] {
                for validator in [TestValidator::Pass, TestValidator::Mismatch, TestValidator::Broken] {
                    let run = make_run(validation_required);
                    let fail_on = run_fails.then_some(Phase::Run);
                    let (_loaded, result) =
                        execute_run(load(CallLog::default(), fail_on), &run, &validator);

                    assert_eq!(result.completed, !run_fails);
                    let expected = if validation_required {
                        result.completed && result.validated
                    } else {
                        result.completed
                    };
                    assert_eq!(
                        result.successful, expected,
                        "validation_required={validation_required} run_fails={run_fails}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_result_marks_wrap_the_run_phase() {
        let run = make_run(false);
        let (_loaded, result) =
            execute_run(load(CallLog::default(), None), &run, &TestValidator::Pass);
        assert!(result.end_time >= result.start_time);
        assert_eq!(result.benchmark_id, "r100");
    }
}
