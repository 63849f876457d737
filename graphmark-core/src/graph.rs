//! Graph references exchanged between the suite driver and platform integrations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Reference to one graph dataset in the harness exchange format.
///
/// The harness never opens these files itself; the paths are handed verbatim to
/// the platform integration's `load_graph` phase. A loaded graph stays resident
/// in platform storage across runs until it is explicitly deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedGraph {
    /// Logical graph name, unique within a benchmark suite.
    pub name: String,
    /// Vertex file (one vertex id per line, optionally followed by properties).
    pub vertex_path: PathBuf,
    /// Edge file (one source/destination pair per line).
    pub edge_path: PathBuf,
    /// Whether the edge file describes a directed graph.
    pub directed: bool,
}

impl FormattedGraph {
    /// New graph reference.
    pub fn new(
        name: impl Into<String>,
        vertex_path: impl Into<PathBuf>,
        edge_path: impl Into<PathBuf>,
        directed: bool,
    ) -> Self {
        Self {
            name: name.into(),
            vertex_path: vertex_path.into(),
            edge_path: edge_path.into(),
            directed,
        }
    }
}
