//! Metrics reported by a platform's finalize phase, plus driver-side timings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single named measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Measured value.
    pub value: f64,
    /// Unit the value is expressed in, e.g. "s" or "ms".
    pub unit: String,
}

/// Named timing/metric keys mapped to values.
///
/// Produced by the platform's finalize phase; the orchestrator stores these
/// opaquely on the run result and adds its own per-phase wall-clock timings.
/// Keys are kept sorted so serialized results are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkMetrics {
    metrics: BTreeMap<String, Metric>,
}

impl BenchmarkMetrics {
    /// Empty metrics map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a measurement, replacing any previous value under the same key.
    pub fn insert(&mut self, name: impl Into<String>, value: f64, unit: impl Into<String>) {
        self.metrics.insert(
            name.into(),
            Metric {
                value,
                unit: unit.into(),
            },
        );
    }

    /// Looks up a measurement by key.
    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name)
    }

    /// Folds another metrics map into this one. Existing keys win: platform
    /// metrics are never silently overwritten by driver timings.
    pub fn merge(&mut self, other: BenchmarkMetrics) {
        for (name, metric) in other.metrics {
            self.metrics.entry(name).or_insert(metric);
        }
    }

    /// Iterates measurements in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Metric)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the map holds no measurements.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
