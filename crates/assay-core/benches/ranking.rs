//! Benchmarks for ranking and evaluation.
//!
//! Run with: `cargo bench -p assay-core --bench ranking`
//!
//! Measures the per-query cost of scoring + top-k selection for both
//! ranking functions, and the cost of the paired t-test, over synthetic
//! corpora of a few sizes.

use assay_core::config::{BM25_B, BM25_K1, BM25_K3, DEFAULT_INL2_C, DEFAULT_TOP_K};
use assay_core::evaluation::paired_ttest;
use assay_core::ranking::{CorpusIndex, DocId, Posting, Ranker};
use assay_core::scoring::RankingFunction;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;

// =============================================================================
// Synthetic Corpus
// =============================================================================

/// Vocabulary the generator draws from. Small enough that query terms hit
/// a realistic fraction of documents.
const VOCABULARY: &[&str] = &[
    "flow", "boundary", "layer", "wing", "lift", "drag", "heat", "transfer", "pressure",
    "supersonic", "laminar", "turbulent", "plate", "body", "speed", "design",
];

/// Deterministic in-memory corpus with precomputed term tables.
struct SyntheticCorpus {
    term_counts: Vec<HashMap<&'static str, u32>>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f64,
}

impl SyntheticCorpus {
    /// Builds `num_docs` documents of 20-60 tokens using a splitmix-style
    /// hash of (doc, position), so every run sees identical data.
    fn new(num_docs: usize) -> Self {
        let mut term_counts = Vec::with_capacity(num_docs);
        let mut doc_lengths = Vec::with_capacity(num_docs);
        let mut total_len = 0u64;

        for doc in 0..num_docs as u64 {
            let len = 20 + (mix(doc, 0) % 41) as u32;
            let mut counts: HashMap<&'static str, u32> = HashMap::new();
            for pos in 0..len {
                let term = VOCABULARY[(mix(doc, u64::from(pos) + 1) as usize) % VOCABULARY.len()];
                *counts.entry(term).or_insert(0) += 1;
            }
            term_counts.push(counts);
            doc_lengths.push(len);
            total_len += u64::from(len);
        }

        Self {
            term_counts,
            doc_lengths,
            avg_doc_length: total_len as f64 / num_docs as f64,
        }
    }
}

fn mix(a: u64, b: u64) -> u64 {
    let mut z = a.wrapping_mul(0x9E3779B97F4A7C15).wrapping_add(b);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z ^ (z >> 31)
}

impl CorpusIndex for SyntheticCorpus {
    fn num_docs(&self) -> u64 {
        self.term_counts.len() as u64
    }

    fn avg_doc_length(&self) -> f64 {
        self.avg_doc_length
    }

    fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_lengths[doc_id.as_u64() as usize]
    }

    fn doc_unique_terms(&self, doc_id: DocId) -> u32 {
        self.term_counts[doc_id.as_u64() as usize].len() as u32
    }

    fn doc_frequency(&self, term: &str) -> u64 {
        self.term_counts
            .iter()
            .filter(|c| c.contains_key(term))
            .count() as u64
    }

    fn corpus_term_count(&self, term: &str) -> u64 {
        self.term_counts
            .iter()
            .map(|c| u64::from(*c.get(term).unwrap_or(&0)))
            .sum()
    }

    fn postings(&self, term: &str) -> Vec<Posting> {
        self.term_counts
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                c.get(term).map(|&tf| Posting {
                    doc_id: DocId::from_u64(i as u64),
                    term_frequency: tf,
                })
            })
            .collect()
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_rank(c: &mut Criterion) {
    let query: Vec<String> = ["boundary", "layer", "flow"]
        .iter()
        .map(|t| t.to_string())
        .collect();

    let mut group = c.benchmark_group("rank");
    for &size in &[100usize, 1_000, 10_000] {
        let corpus = SyntheticCorpus::new(size);
        let inl2 =
            Ranker::new(RankingFunction::inl2(DEFAULT_INL2_C).unwrap(), DEFAULT_TOP_K).unwrap();
        let bm25 = Ranker::new(
            RankingFunction::okapi_bm25(BM25_K1, BM25_B, BM25_K3).unwrap(),
            DEFAULT_TOP_K,
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("inl2", size), &corpus, |b, corpus| {
            b.iter(|| inl2.rank(black_box(&query), corpus).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("bm25", size), &corpus, |b, corpus| {
            b.iter(|| bm25.rank(black_box(&query), corpus).unwrap())
        });
    }
    group.finish();
}

fn bench_paired_ttest(c: &mut Criterion) {
    // Per-query AP vectors with a small, noisy separation.
    let sample_a: Vec<f64> = (0..225)
        .map(|i| 0.5 + (mix(i, 7) % 1000) as f64 / 4000.0)
        .collect();
    let sample_b: Vec<f64> = (0..225)
        .map(|i| 0.45 + (mix(i, 13) % 1000) as f64 / 4000.0)
        .collect();

    c.bench_function("paired_ttest/225", |b| {
        b.iter(|| paired_ttest(black_box(&sample_a), black_box(&sample_b)).unwrap())
    });
}

criterion_group!(benches, bench_rank, bench_paired_ttest);
criterion_main!(benches);
