//! The terminal artifact of one benchmark run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::benchmark::BenchmarkRun;
use crate::metrics::BenchmarkMetrics;

/// Result record handed to the external suite driver after one run.
///
/// `successful` is derived, never set independently:
/// `validation_required ? completed && validated : completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRunResult {
    /// Identifier of the originating run.
    pub benchmark_id: String,
    /// Wall-clock start of the run phase.
    pub start_time: DateTime<Utc>,
    /// Wall-clock end of the run phase.
    pub end_time: DateTime<Utc>,
    /// The run phase returned without error.
    pub completed: bool,
    /// Validation, where required, passed.
    pub validated: bool,
    /// The run counts as a success for the suite.
    pub successful: bool,
    /// Metrics reported by the platform's finalize phase plus the driver's
    /// per-phase timings.
    pub metrics: BenchmarkMetrics,
}

impl BenchmarkRunResult {
    /// Elapsed wall-clock time between the run phase's start and end marks.
    pub fn makespan(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

/// Write-once builder for [`BenchmarkRunResult`].
///
/// Created when a run starts and mutated only by the orchestrator driving that
/// run. Every field accepts its first write and ignores later ones, so an
/// already-determined outcome cannot be retroactively changed by cleanup code.
#[derive(Debug)]
pub struct ResultBuilder {
    benchmark_id: String,
    created: DateTime<Utc>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    completed: Option<bool>,
    validated: Option<bool>,
    successful: Option<bool>,
    metrics: Option<BenchmarkMetrics>,
}

impl ResultBuilder {
    /// Builder for the given run.
    pub fn new(run: &BenchmarkRun) -> Self {
        Self {
            benchmark_id: run.id.clone(),
            created: Utc::now(),
            start_time: None,
            end_time: None,
            completed: None,
            validated: None,
            successful: None,
            metrics: None,
        }
    }

    /// Records the start of the timed run phase.
    pub fn mark_start_of_benchmark(&mut self) {
        self.start_time.get_or_insert_with(Utc::now);
    }

    /// Records the end of the timed run phase.
    pub fn mark_end_of_benchmark(&mut self) {
        self.end_time.get_or_insert_with(Utc::now);
    }

    /// Whether the run phase returned without error.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed.get_or_insert(completed);
    }

    /// Whether validation, where required, passed.
    pub fn set_validated(&mut self, validated: bool) {
        self.validated.get_or_insert(validated);
    }

    /// The derived success flag.
    pub fn set_successful(&mut self, successful: bool) {
        self.successful.get_or_insert(successful);
    }

    /// The metrics to attach to the result.
    pub fn set_metrics(&mut self, metrics: BenchmarkMetrics) {
        if self.metrics.is_none() {
            self.metrics = Some(metrics);
        }
    }

    /// Finalizes the immutable result. Unset flags default to `false`; unset
    /// time marks fall back to the builder's creation time, so runs aborted
    /// before execution still carry coherent timestamps.
    pub fn build(self) -> BenchmarkRunResult {
        let start_time = self.start_time.unwrap_or(self.created);
        let end_time = self.end_time.unwrap_or(start_time);
        BenchmarkRunResult {
            benchmark_id: self.benchmark_id,
            start_time,
            end_time,
            completed: self.completed.unwrap_or(false),
            validated: self.validated.unwrap_or(false),
            successful: self.successful.unwrap_or(false),
            metrics: self.metrics.unwrap_or_default(),
        }
    }
}
