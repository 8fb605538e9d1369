//! # Assay Core
//!
//! Platform-independent library for comparing document-ranking functions.
//!
//! This crate provides the pieces needed to evaluate a term-weighting scheme
//! against a baseline over a shared query set: pluggable scoring functions,
//! query-time ranking over a corpus-statistics seam, average-precision
//! accumulation, and paired significance testing.
//!
//! ## Modules
//!
//! - [`scoring`] - Term-weighting functions (InL2, Okapi BM25) over per-term statistics
//! - [`ranking`] - Top-k ranking against a [`ranking::CorpusIndex`] statistics source
//! - [`evaluation`] - Average precision, MAP accumulation, and the paired t-test
//! - [`config`] - Evaluation configuration constants
//! - [`error`] - Error types shared across the library

pub mod config;
pub mod error;
pub mod evaluation;
pub mod ranking;
pub mod scoring;
