//! Evaluation configuration constants.
//!
//! Default parameters for the ranking functions and the evaluation run.
//! These are compile-time constants; per-run overrides are handled by CLI
//! arguments in the `assay-cli` crate.

/// Default number of results retained per query.
///
/// Average precision is computed over this cutoff, so it also bounds the
/// evaluation depth.
pub const DEFAULT_TOP_K: usize = 10;

/// Default InL2 smoothing parameter `c`.
///
/// Controls how quickly the normalized term frequency saturates. Must be
/// positive; 1.0 is the standard DFR setting.
pub const DEFAULT_INL2_C: f64 = 1.0;

/// Okapi BM25 term-frequency saturation parameter.
///
/// Higher values allow term frequency to contribute for longer before
/// saturating. Standard range: 1.0-2.0.
pub const BM25_K1: f64 = 1.2;

/// Okapi BM25 document-length normalization parameter.
///
/// 0.0 disables length normalization, 1.0 applies it fully.
pub const BM25_B: f64 = 0.75;

/// Okapi BM25 query-term-frequency saturation parameter.
///
/// Only matters for queries that repeat terms; large values make the
/// query-side saturation nearly linear.
pub const BM25_K3: f64 = 500.0;

/// Significance level used when flagging a paired-test comparison.
pub const SIGNIFICANCE_ALPHA: f64 = 0.05;
