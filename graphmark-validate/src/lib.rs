#![warn(missing_docs)]
//! Graphmark Validate - Output Correctness Capability
//!
//! The harness never checks algorithm output itself; it delegates to an
//! external checker behind the [`OutputValidator`] trait. This crate defines
//! that capability surface:
//! - `ValidationJob`: what one run hands the checker
//! - `OutputValidator`: the trait the embedding suite implements
//! - `ValidatorError`: the "checker could not run" taxonomy
//!
//! A clean negative verdict is not an error: `Ok(false)` means the checker ran
//! and found a mismatch, while `Err(_)` means it could not judge the output at
//! all. The driver collapses both into `validated = false` on the result and
//! distinguishes them only in the log stream.

mod checker;
mod job;

pub use checker::{OutputValidator, UnconfiguredValidator, ValidatorError};
pub use job::ValidationJob;
