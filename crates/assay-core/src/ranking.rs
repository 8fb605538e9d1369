//! Query-time ranking over an external corpus-statistics source.
//!
//! The ranker owns no index. It walks the query's terms, asks a
//! [`CorpusIndex`] for the postings and statistics of each, sums
//! [`RankingFunction`](crate::scoring::RankingFunction) contributions per
//! document, and keeps the top-k. Documents containing none of the query
//! terms are never touched: they are implicitly score 0 and excluded, which
//! is exact for both scoring functions, not an approximation.

use crate::error::EvalError;
use crate::scoring::{RankingFunction, TermStats};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

/// Unique document identifier.
///
/// Internal ids are dense integers assigned by whatever loads the corpus;
/// mapping to and from external string ids is the loader's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(u64);

impl DocId {
    /// Creates a DocId from a raw u64 value.
    pub fn from_u64(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value of this ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A single entry in a term's postings: one document containing the term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Document containing the term.
    pub doc_id: DocId,
    /// Number of times the term appears in that document.
    pub term_frequency: u32,
}

/// The consumed interface onto an external corpus index.
///
/// Everything the scoring functions need, and nothing about how it is
/// stored: an in-memory table, an inverted file, or a remote service all fit
/// behind this trait. Implementations must be stable across calls within a
/// run; the evaluation contract is that identical (query, corpus, k)
/// inputs produce identical rankings.
pub trait CorpusIndex {
    /// Total number of documents in the corpus.
    fn num_docs(&self) -> u64;

    /// Corpus-wide average document length in tokens.
    fn avg_doc_length(&self) -> f64;

    /// Length of a document in tokens; 0 if the id is unknown.
    fn doc_length(&self, doc_id: DocId) -> u32;

    /// Number of distinct terms in a document; 0 if the id is unknown.
    fn doc_unique_terms(&self, doc_id: DocId) -> u32;

    /// Number of documents containing `term`.
    fn doc_frequency(&self, term: &str) -> u64;

    /// Total occurrences of `term` across the corpus.
    fn corpus_term_count(&self, term: &str) -> u64;

    /// All documents containing `term`, with per-document frequencies.
    /// Order is unspecified; the ranker imposes its own.
    fn postings(&self, term: &str) -> Vec<Posting>;
}

/// A configured ranker: one scoring function plus a top-k bound.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    function: RankingFunction,
    top_k: usize,
}

impl Ranker {
    /// Creates a ranker.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `top_k` is zero.
    pub fn new(function: RankingFunction, top_k: usize) -> Result<Self, EvalError> {
        if top_k == 0 {
            return Err(EvalError::InvalidInput(
                "top-k bound must be positive".to_string(),
            ));
        }
        Ok(Self { function, top_k })
    }

    /// The scoring function this ranker applies.
    pub fn function(&self) -> &RankingFunction {
        &self.function
    }

    /// The top-k bound this ranker retains.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Ranks the corpus against a query.
    ///
    /// `query_terms` is the query as an ordered term sequence; repeated
    /// terms raise that term's query weight (weight = in-query frequency).
    ///
    /// # Returns
    ///
    /// At most `top_k` `(doc_id, score)` pairs, sorted by score descending.
    /// Ties break on ascending document id so that repeated invocations
    /// yield identical sequences regardless of accumulation order.
    ///
    /// # Errors
    ///
    /// `InvalidInput` on an empty query, or if the index supplies
    /// statistics that violate the scoring contract.
    #[instrument(skip_all, fields(terms = query_terms.len(), top_k = self.top_k))]
    pub fn rank<I>(&self, query_terms: &[String], index: &I) -> Result<Vec<(DocId, f64)>, EvalError>
    where
        I: CorpusIndex + ?Sized,
    {
        if query_terms.is_empty() {
            return Err(EvalError::InvalidInput(
                "query must contain at least one term".to_string(),
            ));
        }

        let mut weights: HashMap<&str, f64> = HashMap::new();
        for term in query_terms {
            *weights.entry(term.as_str()).or_insert(0.0) += 1.0;
        }

        let num_docs = index.num_docs();
        let avg_doc_length = index.avg_doc_length();

        let mut scores: HashMap<DocId, f64> = HashMap::new();
        for (term, &query_term_weight) in &weights {
            let doc_frequency = index.doc_frequency(term);
            let corpus_term_count = index.corpus_term_count(term);

            for posting in index.postings(term) {
                let stats = TermStats {
                    query_term_weight,
                    doc_term_count: u64::from(posting.term_frequency),
                    doc_unique_terms: index.doc_unique_terms(posting.doc_id),
                    doc_length: index.doc_length(posting.doc_id),
                    avg_doc_length,
                    num_docs,
                    doc_frequency,
                    corpus_term_count,
                };
                *scores.entry(posting.doc_id).or_insert(0.0) +=
                    self.function.score_one(&stats)?;
            }
        }

        let mut ranked: Vec<(DocId, f64)> = scores.into_iter().collect();
        // Total order: map iteration order must not leak into the output.
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(self.top_k);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BM25_B, BM25_K1, BM25_K3};

    /// Tiny fixed corpus: per-document token lists, statistics derived on
    /// the fly. Stands in for the external index.
    struct FixtureIndex {
        docs: Vec<Vec<&'static str>>,
    }

    impl FixtureIndex {
        fn new(docs: Vec<Vec<&'static str>>) -> Self {
            Self { docs }
        }
    }

    impl CorpusIndex for FixtureIndex {
        fn num_docs(&self) -> u64 {
            self.docs.len() as u64
        }

        fn avg_doc_length(&self) -> f64 {
            let total: usize = self.docs.iter().map(Vec::len).sum();
            total as f64 / self.docs.len() as f64
        }

        fn doc_length(&self, doc_id: DocId) -> u32 {
            self.docs
                .get(doc_id.as_u64() as usize)
                .map_or(0, |d| d.len() as u32)
        }

        fn doc_unique_terms(&self, doc_id: DocId) -> u32 {
            self.docs.get(doc_id.as_u64() as usize).map_or(0, |d| {
                let unique: std::collections::HashSet<_> = d.iter().collect();
                unique.len() as u32
            })
        }

        fn doc_frequency(&self, term: &str) -> u64 {
            self.docs
                .iter()
                .filter(|d| d.iter().any(|t| *t == term))
                .count() as u64
        }

        fn corpus_term_count(&self, term: &str) -> u64 {
            self.docs
                .iter()
                .map(|d| d.iter().filter(|t| **t == term).count() as u64)
                .sum()
        }

        fn postings(&self, term: &str) -> Vec<Posting> {
            self.docs
                .iter()
                .enumerate()
                .filter_map(|(i, d)| {
                    let tf = d.iter().filter(|t| **t == term).count() as u32;
                    (tf > 0).then_some(Posting {
                        doc_id: DocId::from_u64(i as u64),
                        term_frequency: tf,
                    })
                })
                .collect()
        }
    }

    fn fixture() -> FixtureIndex {
        FixtureIndex::new(vec![
            vec!["rust", "borrow", "checker", "rust"],
            vec!["python", "interpreter", "bytecode"],
            vec!["rust", "async", "runtime", "tokio"],
            vec!["garbage", "collector", "heap", "python"],
        ])
    }

    fn query(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_rank_only_scores_matching_documents() {
        let index = fixture();
        let ranker = Ranker::new(RankingFunction::inl2(1.0).unwrap(), 10).unwrap();
        let results = ranker.rank(&query(&["rust"]), &index).unwrap();
        let ids: Vec<u64> = results.iter().map(|(id, _)| id.as_u64()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&0) && ids.contains(&2));
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let index = fixture();
        let ranker = Ranker::new(RankingFunction::inl2(1.0).unwrap(), 10).unwrap();
        // doc 0 has "rust" twice; same length as doc 2 which has it once.
        let results = ranker.rank(&query(&["rust"]), &index).unwrap();
        assert_eq!(results[0].0.as_u64(), 0);
        assert!(results[0].1 > results[1].1);
    }

    #[test]
    fn test_rank_truncates_to_top_k() {
        let index = fixture();
        let ranker = Ranker::new(RankingFunction::inl2(1.0).unwrap(), 1).unwrap();
        let results = ranker.rank(&query(&["rust", "python"]), &index).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_rank_is_deterministic_across_invocations() {
        let index = fixture();
        let ranker =
            Ranker::new(RankingFunction::okapi_bm25(BM25_K1, BM25_B, BM25_K3).unwrap(), 10)
                .unwrap();
        let q = query(&["rust", "python", "heap"]);
        let first = ranker.rank(&q, &index).unwrap();
        for _ in 0..20 {
            assert_eq!(first, ranker.rank(&q, &index).unwrap());
        }
    }

    #[test]
    fn test_repeated_query_terms_raise_weight() {
        let index = fixture();
        let ranker = Ranker::new(RankingFunction::inl2(1.0).unwrap(), 10).unwrap();
        let single = ranker.rank(&query(&["rust"]), &index).unwrap();
        let doubled = ranker.rank(&query(&["rust", "rust"]), &index).unwrap();
        assert!(
            doubled[0].1 > single[0].1,
            "doubled term weight should double the contribution"
        );
    }

    #[test]
    fn test_term_absent_from_corpus_matches_nothing() {
        let index = fixture();
        let ranker = Ranker::new(RankingFunction::inl2(1.0).unwrap(), 10).unwrap();
        let results = ranker.rank(&query(&["fortran"]), &index).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_query_rejected() {
        let index = fixture();
        let ranker = Ranker::new(RankingFunction::inl2(1.0).unwrap(), 10).unwrap();
        assert!(matches!(
            ranker.rank(&[], &index),
            Err(EvalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        assert!(matches!(
            Ranker::new(RankingFunction::inl2(1.0).unwrap(), 0),
            Err(EvalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_score_ties_break_on_doc_id() {
        // Two identical documents tie exactly; the lower id must come first.
        let index = FixtureIndex::new(vec![
            vec!["alpha", "beta"],
            vec!["alpha", "beta"],
        ]);
        let ranker = Ranker::new(RankingFunction::inl2(1.0).unwrap(), 10).unwrap();
        let results = ranker.rank(&query(&["alpha"]), &index).unwrap();
        assert_eq!(results[0].0.as_u64(), 0);
        assert_eq!(results[1].0.as_u64(), 1);
        assert_eq!(results[0].1, results[1].1);
    }
}
