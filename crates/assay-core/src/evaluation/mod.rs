//! Evaluation of ranked retrieval results.
//!
//! This module measures ranking quality and decides whether one ranking
//! function beats another:
//!
//! - [`metrics`] - per-query average precision and its accumulation into
//!   mean average precision across a query batch
//! - [`stats`] - paired two-sided Student's t-test over two rankers'
//!   per-query precision vectors
//!
//! The two halves meet through [`Evaluator::samples`]: run one evaluator per
//! ranker over the identical query set, then hand both sample vectors to
//! [`stats::paired_ttest`]. The pairing contract (equal length, same
//! queries, same order) is the caller's to uphold; the t-test rejects
//! mismatched lengths but cannot detect reordered queries.
//!
//! # References
//!
//! - Voorhees & Harman (2005). "TREC: Experiment and Evaluation in Information Retrieval"
//! - Smucker et al. (2007). "A comparison of statistical significance tests for IR evaluation"

pub mod metrics;
pub mod stats;

pub use metrics::{average_precision, Evaluator, QueryId, RelevanceJudgments};
pub use stats::{paired_ttest, TTestResult};
