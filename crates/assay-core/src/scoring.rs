//! Term-weighting functions for document ranking.
//!
//! A scoring function maps per-(query term, document) statistics to a
//! relevance contribution; the ranker sums contributions over the query
//! terms a document contains. Two functions are provided:
//!
//! - **InL2**: a Divergence-from-Randomness scheme that normalizes raw term
//!   frequency by document length relative to the corpus average
//! - **Okapi BM25**: the standard probabilistic baseline with term-frequency
//!   saturation and length normalization
//!
//! Both are pure functions of [`TermStats`] with no state or side effects,
//! deterministic for identical inputs. This is what makes evaluation runs
//! reproducible bit-for-bit.
//!
//! # References
//!
//! - Amati & van Rijsbergen (2002). "Probabilistic models of information
//!   retrieval based on measuring the divergence from randomness"
//! - Robertson & Walker (1994). "Some simple effective approximations to the
//!   2-Poisson model for probabilistic weighted retrieval"

use crate::error::EvalError;
use serde::{Deserialize, Serialize};

/// Statistics for a single (query term, document) pair.
///
/// Resolved by a [`CorpusIndex`](crate::ranking::CorpusIndex) at scoring
/// time and owned transiently by the caller; nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermStats {
    /// Weight of the term within the query (term frequency for plain text queries).
    pub query_term_weight: f64,
    /// Raw frequency of the term in the document.
    pub doc_term_count: u64,
    /// Number of distinct terms in the document.
    pub doc_unique_terms: u32,
    /// Document length in tokens. Must be positive.
    pub doc_length: u32,
    /// Corpus-wide average document length in tokens. Must be positive.
    pub avg_doc_length: f64,
    /// Total number of documents in the corpus. Must be positive.
    pub num_docs: u64,
    /// Number of documents containing the term.
    pub doc_frequency: u64,
    /// Total occurrences of the term across the corpus. May be zero.
    pub corpus_term_count: u64,
}

impl TermStats {
    /// Checks the invariants the index is supposed to guarantee.
    ///
    /// A zero document length or an empty corpus means the upstream index
    /// handed us garbage; scoring refuses rather than dividing by zero.
    fn validate(&self) -> Result<(), EvalError> {
        if self.doc_length == 0 {
            return Err(EvalError::InvalidInput(
                "document length must be positive".to_string(),
            ));
        }
        if self.num_docs == 0 {
            return Err(EvalError::InvalidInput(
                "corpus must contain at least one document".to_string(),
            ));
        }
        if self.avg_doc_length <= 0.0 {
            return Err(EvalError::InvalidInput(
                "average document length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A document-ranking function, selected by configuration.
///
/// Modeled as a closed set of tagged variants rather than a trait hierarchy:
/// the evaluation harness compares exactly these functions, and a variant
/// carries its own tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RankingFunction {
    /// InL2 term weighting with smoothing parameter `c`.
    InL2 {
        /// Smoothing parameter. Positive; 1.0 is the standard setting.
        c: f64,
    },
    /// Okapi BM25 with the usual three tuning constants.
    OkapiBm25 {
        /// Term-frequency saturation.
        k1: f64,
        /// Document-length normalization in [0, 1].
        b: f64,
        /// Query-term-frequency saturation.
        k3: f64,
    },
}

impl RankingFunction {
    /// Creates an InL2 function, validating that `c` is positive.
    pub fn inl2(c: f64) -> Result<Self, EvalError> {
        if !(c > 0.0) {
            return Err(EvalError::InvalidInput(format!(
                "InL2 smoothing parameter must be positive, got {c}"
            )));
        }
        Ok(RankingFunction::InL2 { c })
    }

    /// Creates an Okapi BM25 function, validating the parameter ranges.
    pub fn okapi_bm25(k1: f64, b: f64, k3: f64) -> Result<Self, EvalError> {
        if !(k1 > 0.0) || !(k3 > 0.0) {
            return Err(EvalError::InvalidInput(format!(
                "BM25 saturation parameters must be positive, got k1={k1} k3={k3}"
            )));
        }
        if !(0.0..=1.0).contains(&b) {
            return Err(EvalError::InvalidInput(format!(
                "BM25 length-normalization parameter must be in [0, 1], got {b}"
            )));
        }
        Ok(RankingFunction::OkapiBm25 { k1, b, k3 })
    }

    /// Short identifier used in reports and output file names.
    pub fn name(&self) -> &'static str {
        match self {
            RankingFunction::InL2 { .. } => "inl2",
            RankingFunction::OkapiBm25 { .. } => "bm25",
        }
    }

    /// Scores a single (query term, document) pair.
    ///
    /// # Formula
    ///
    /// InL2:
    ///
    /// ```text
    /// tfn   = tf * log2(1 + avgdl / dl)
    /// score = qtw * tfn / (tfn + c) * log2((N + 1) / (ctc + 0.5))
    /// ```
    ///
    /// Okapi BM25:
    ///
    /// ```text
    /// TF    = (k1 + 1) * tf / (k1 * ((1 - b) + b * dl / avgdl) + tf)
    /// IDF   = ln((N - df + 0.5) / (df + 0.5))
    /// QTF   = (k3 + 1) * qtw / (k3 + qtw)
    /// score = TF * IDF * QTF
    /// ```
    ///
    /// # Returns
    ///
    /// The term's relevance contribution. Zero term frequency contributes
    /// zero; a corpus term count of zero is handled by the +0.5 smoothing.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the statistics violate the index contract
    /// (zero document length, empty corpus, non-positive average length).
    pub fn score_one(&self, stats: &TermStats) -> Result<f64, EvalError> {
        stats.validate()?;

        let tf = stats.doc_term_count as f64;
        let dl = f64::from(stats.doc_length);
        let avgdl = stats.avg_doc_length;
        let n = stats.num_docs as f64;

        let score = match *self {
            RankingFunction::InL2 { c } => {
                let tfn = tf * (1.0 + avgdl / dl).log2();
                let idf = ((n + 1.0) / (stats.corpus_term_count as f64 + 0.5)).log2();
                stats.query_term_weight * (tfn / (tfn + c)) * idf
            }
            RankingFunction::OkapiBm25 { k1, b, k3 } => {
                let df = stats.doc_frequency as f64;
                let tf_part = ((k1 + 1.0) * tf) / (k1 * ((1.0 - b) + b * dl / avgdl) + tf);
                let idf = ((n - df + 0.5) / (df + 0.5)).ln();
                let qtf = ((k3 + 1.0) * stats.query_term_weight) / (k3 + stats.query_term_weight);
                tf_part * idf * qtf
            }
        };

        Ok(score)
    }
}
