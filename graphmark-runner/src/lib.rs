#![warn(missing_docs)]
//! Graphmark Runner - In-Worker Execution Driver
//!
//! Everything that happens inside the worker process:
//! - `BenchmarkRunner`: preprocess/execute/validate/postprocess/summarize for
//!   one run, timing the run phase and converting platform errors into result
//!   flags
//! - `execute_run`: the complete per-run drive over the staged lifecycle
//! - `WorkerService`: worker startup (platform resolution, run handoff) and
//!   result emission

mod runner;
mod service;

pub use runner::{execute_run, BenchmarkRunner};
pub use service::{WorkerError, WorkerService, RUN_SPEC_ENV};
