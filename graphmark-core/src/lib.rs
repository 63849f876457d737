#![warn(missing_docs)]
//! Graphmark Core - Domain Model and Platform Contract
//!
//! This crate defines what the rest of the harness runs against:
//! - `BenchmarkRun` / `FormattedGraph`: the job description handed in by a suite driver
//! - `Platform`: the contract a processing-platform integration implements
//! - staged lifecycle types that make out-of-order phase calls unconstructible
//! - `BenchmarkRunResult` and its write-once builder
//! - link-time registration of platform integrations

mod benchmark;
mod graph;
mod metrics;
mod platform;
mod registry;
mod result;

pub mod lifecycle;

pub use benchmark::{Algorithm, BenchmarkRun, ValidationRule};
pub use graph::FormattedGraph;
pub use lifecycle::{Phase, PhaseFailure, Uninitialized};
pub use metrics::{BenchmarkMetrics, Metric};
pub use platform::{Platform, PlatformError};
pub use registry::{PlatformRegistry, UnknownPlatform};
pub use result::{BenchmarkRunResult, ResultBuilder};

// Re-exported so `register_platform!` works through this crate (or the facade)
// without the caller depending on `inventory` directly.
pub use inventory;

/// Platform integration factory registered via [`register_platform!`].
pub struct PlatformRegistration {
    /// Identifier quoted in worker invocations and configuration.
    pub id: &'static str,
    /// Constructs a fresh integration instance for one worker process.
    pub construct: fn() -> Box<dyn Platform>,
}

inventory::collect!(PlatformRegistration);

/// Registers a platform integration factory at link time.
///
/// ```ignore
/// graphmark_core::register_platform!("reference", || Box::new(ReferencePlatform::new()));
/// ```
#[macro_export]
macro_rules! register_platform {
    ($id:expr, $construct:expr) => {
        $crate::inventory::submit! {
            $crate::PlatformRegistration {
                id: $id,
                construct: $construct,
            }
        }
    };
}
