//! The checker capability trait and its error taxonomy.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::job::ValidationJob;

/// Raised when the checker itself cannot run. A mismatch between actual and
/// expected output is NOT an error; it is the `Ok(false)` verdict.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidatorError {
    /// The expected-output directory or file is missing.
    #[error("expected output missing at {}", .0.display())]
    MissingExpectedOutput(PathBuf),
    /// The platform produced no output to check.
    #[error("benchmark output missing at {}", .0.display())]
    MissingOutput(PathBuf),
    /// Output exists but cannot be parsed under the job's rule.
    #[error("malformed output: {0}")]
    MalformedOutput(String),
    /// No checker was wired in by the embedding suite.
    #[error("no output validator configured")]
    Unconfigured,
    /// Underlying I/O fault while reading either side.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Capability interface for the external output-correctness checker.
pub trait OutputValidator: Send + Sync {
    /// Judges the job's actual output against its expected output.
    ///
    /// `Ok(true)`: output matches under the job's rule. `Ok(false)`: the
    /// checker ran and found a mismatch. `Err(_)`: the checker could not run.
    fn validate(&self, job: &ValidationJob) -> Result<bool, ValidatorError>;
}

/// Placeholder wired in when the embedding suite provides no checker.
///
/// Always raises [`ValidatorError::Unconfigured`], so runs that require
/// validation end up `validated = false` with a clear log line instead of a
/// silent false pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredValidator;

impl OutputValidator for UnconfiguredValidator {
    fn validate(&self, _job: &ValidationJob) -> Result<bool, ValidatorError> {
        Err(ValidatorError::Unconfigured)
    }
}
