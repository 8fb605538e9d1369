//! Average precision and its accumulation across a query batch.

use crate::error::EvalError;
use crate::ranking::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query identifier within a relevance-judgment set.
pub type QueryId = u64;

/// Ground-truth relevance judgments: (query, document) -> grade.
///
/// Grades are binary or graded (0 = not relevant, higher = more relevant);
/// the precision metrics binarize at grade > 0. Judgments are consumed,
/// never mutated, by the evaluator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelevanceJudgments {
    by_query: HashMap<QueryId, HashMap<DocId, u8>>,
}

impl RelevanceJudgments {
    /// Creates an empty judgment set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a judgment. A repeated (query, document) pair keeps the
    /// latest grade.
    pub fn insert(&mut self, query_id: QueryId, doc_id: DocId, relevance: u8) {
        self.by_query
            .entry(query_id)
            .or_default()
            .insert(doc_id, relevance);
    }

    /// Relevance grade for a (query, document) pair; 0 if unjudged.
    pub fn relevance(&self, query_id: QueryId, doc_id: DocId) -> u8 {
        self.by_query
            .get(&query_id)
            .and_then(|docs| docs.get(&doc_id))
            .copied()
            .unwrap_or(0)
    }

    /// Whether a document is judged relevant (grade > 0) for a query.
    pub fn is_relevant(&self, query_id: QueryId, doc_id: DocId) -> bool {
        self.relevance(query_id, doc_id) > 0
    }

    /// Number of queries with at least one judgment.
    pub fn num_queries(&self) -> usize {
        self.by_query.len()
    }

    /// Total number of recorded judgments.
    pub fn len(&self) -> usize {
        self.by_query.values().map(HashMap::len).sum()
    }

    /// Returns `true` if no judgments have been recorded.
    pub fn is_empty(&self) -> bool {
        self.by_query.is_empty()
    }
}

/// Computes average precision for one query's ranked results.
///
/// Walks the ranking from rank 1 to `k`; at each rank holding a relevant
/// document, accumulates precision-at-that-rank (relevant-so-far / rank).
/// The result is the mean of those precision values over the relevant
/// documents found, so a top-k made entirely of relevant documents scores
/// exactly 1.0 in any order, and a top-k with no relevant documents scores
/// exactly 0.0, never NaN.
///
/// # Arguments
///
/// * `results` - Ranked `(doc_id, score)` pairs, highest score first
/// * `judgments` - Ground-truth relevance judgments
/// * `query_id` - Which query's judgments to consult
/// * `k` - Cutoff position
pub fn average_precision(
    results: &[(DocId, f64)],
    judgments: &RelevanceJudgments,
    query_id: QueryId,
    k: usize,
) -> f64 {
    let mut relevant_found = 0u32;
    let mut precision_sum = 0.0;

    for (i, (doc_id, _)) in results.iter().take(k).enumerate() {
        if judgments.is_relevant(query_id, *doc_id) {
            relevant_found += 1;
            precision_sum += f64::from(relevant_found) / (i as f64 + 1.0);
        }
    }

    if relevant_found == 0 {
        0.0
    } else {
        precision_sum / f64::from(relevant_found)
    }
}

/// Accumulates per-query average precision into mean average precision.
///
/// One evaluator instance per ranker per run. The accumulated sample vector
/// preserves query processing order, which is what makes two evaluators'
/// samples pairable for [`stats::paired_ttest`](super::stats::paired_ttest).
///
/// A failed per-query computation is never recorded: the sample only ever
/// contains values that were returned to the caller.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    samples: Vec<f64>,
}

impl Evaluator {
    /// Creates an evaluator with an empty sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes average precision for one query and records it.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `k` is zero; nothing is recorded in that case.
    pub fn average_precision(
        &mut self,
        results: &[(DocId, f64)],
        judgments: &RelevanceJudgments,
        query_id: QueryId,
        k: usize,
    ) -> Result<f64, EvalError> {
        if k == 0 {
            return Err(EvalError::InvalidInput(
                "average precision cutoff must be positive".to_string(),
            ));
        }
        let ap = average_precision(results, judgments, query_id, k);
        self.samples.push(ap);
        Ok(ap)
    }

    /// Arithmetic mean of every average precision recorded so far.
    ///
    /// 0.0 before any query has been processed.
    pub fn mean_average_precision(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// The accumulated per-query sample, in processing order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Number of queries recorded.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no queries have been recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clears the accumulated sample for a fresh run.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
