//! What one run hands the external checker.

use std::path::PathBuf;

use graphmark_core::{BenchmarkRun, ValidationRule};

/// Everything the external checker needs to judge one run's output.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationJob {
    /// Directory the platform wrote algorithm output into.
    pub output_dir: PathBuf,
    /// Directory holding the expected output.
    pub validation_dir: PathBuf,
    /// How actual and expected values are compared.
    pub rule: ValidationRule,
}

impl ValidationJob {
    /// Job for the given run, using the run's directories and the algorithm's
    /// validation rule.
    pub fn for_run(run: &BenchmarkRun) -> Self {
        Self {
            output_dir: run.output_dir.clone(),
            validation_dir: run.validation_dir.clone(),
            rule: run.algorithm.validation_rule,
        }
    }
}
