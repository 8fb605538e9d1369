//! Error types for assay-core.
//!
//! The library distinguishes two failure classes: inputs that violate a
//! caller contract (`InvalidInput`) and inputs that are structurally valid
//! but statistically unusable (`DegenerateInput`). Neither is recoverable
//! inside the library; callers decide whether to skip the offending query
//! or abort the run.

use thiserror::Error;

/// Errors produced by scoring, ranking, and evaluation operations.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// A caller-supplied value violates the documented contract
    /// (zero document length, mismatched paired-sample lengths, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Input is well-formed but statistically degenerate
    /// (zero-variance paired differences with a non-zero mean).
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}
