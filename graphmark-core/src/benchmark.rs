//! Benchmark job descriptions: which algorithm runs on which graph, and how the
//! output is judged afterwards.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::FormattedGraph;

/// How the external checker compares actual output against expected output.
///
/// These are descriptors only; the comparison logic lives in the checker the
/// embedding suite wires in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValidationRule {
    /// Every vertex value must match the expected value exactly.
    ExactMatch,
    /// Numeric vertex values may deviate by at most the given relative error.
    EpsilonMatch {
        /// Maximum tolerated relative error.
        epsilon: f64,
    },
    /// Vertex values must induce the same equivalence classes as the expected
    /// values (labels may differ, the partition may not).
    EquivalenceMatch,
}

/// A graph algorithm known to the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Algorithm {
    /// Short identifier, e.g. "bfs".
    pub acronym: String,
    /// Human-readable name, e.g. "Breadth-First Search".
    pub name: String,
    /// Rule the external checker applies to this algorithm's output.
    pub validation_rule: ValidationRule,
}

impl Algorithm {
    /// New algorithm descriptor.
    pub fn new(
        acronym: impl Into<String>,
        name: impl Into<String>,
        validation_rule: ValidationRule,
    ) -> Self {
        Self {
            acronym: acronym.into(),
            name: name.into(),
            validation_rule,
        }
    }
}

/// One benchmark job: a single (algorithm, graph, platform) execution unit.
///
/// Supplied by the external suite driver and treated as read-only for the
/// duration of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    /// Run identifier, unique within a suite execution.
    pub id: String,
    /// The algorithm to execute.
    pub algorithm: Algorithm,
    /// The graph to execute it on.
    pub graph: FormattedGraph,
    /// Directory the platform writes algorithm output into.
    pub output_dir: PathBuf,
    /// Directory holding the expected output for validation.
    pub validation_dir: PathBuf,
    /// Whether the output must be validated for the run to count as successful.
    pub validation_required: bool,
}
