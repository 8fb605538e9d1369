//! Assay - ranking-function comparison harness.
//!
//! Runs two ranking functions (InL2 and Okapi BM25) over the same corpus,
//! query batch, and relevance judgments; reports per-query average
//! precision, MAP, and a paired two-sided t-test between the two systems.
//!
//! # Usage
//!
//! ```bash
//! # Compare the rankers over a corpus at the default k=10
//! assay --corpus corpus.jsonl --queries queries.txt --qrels qrels.tsv
//!
//! # Output JSON for analysis
//! assay --corpus corpus.jsonl --queries queries.txt --qrels qrels.tsv --json
//!
//! # Numeric query ids starting at 1 (matching 1-based qrels files)
//! assay ... --query-id-start 1
//! ```
//!
//! Three files land in `--output-dir`: `inl2.avg_p.txt` and
//! `bm25.avg_p.txt` (one average-precision value per query, in query
//! order) and `significance.txt` (the paired-test p-value).

mod corpus;
mod data;

use anyhow::{Context, Result};
use assay_core::config::{
    BM25_B, BM25_K1, BM25_K3, DEFAULT_INL2_C, DEFAULT_TOP_K, SIGNIFICANCE_ALPHA,
};
use assay_core::evaluation::{paired_ttest, Evaluator, RelevanceJudgments};
use assay_core::ranking::Ranker;
use assay_core::scoring::RankingFunction;
use clap::Parser;
use corpus::{tokenize, CorpusTable};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Compare InL2 and Okapi BM25 rankings over a query batch.
///
/// Both rankers consume the identical corpus, queries, judgments, and
/// cutoff, so per-query scores stay paired for the significance test.
#[derive(Parser, Debug)]
#[command(name = "assay", version, about)]
struct Args {
    /// Corpus file (JSONL, one {"doc_id", "title", "text"} per line)
    #[arg(long)]
    corpus: PathBuf,

    /// Query file, one query per line
    #[arg(long)]
    queries: PathBuf,

    /// Relevance judgments (rows of: query_id doc_id [relevance])
    #[arg(long)]
    qrels: PathBuf,

    /// Query id assigned to the first line of the query file
    #[arg(long, default_value_t = 0)]
    query_id_start: u64,

    /// Number of results retained and evaluated per query
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// InL2 smoothing parameter c
    #[arg(long, default_value_t = DEFAULT_INL2_C)]
    inl2_c: f64,

    /// Directory for the per-query AP and significance output files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Emit the report as JSON instead of the table
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Serialize)]
struct EvalReport {
    dataset: DatasetInfo,
    top_k: usize,
    elapsed_secs: f64,
    systems: Vec<SystemResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<ComparisonReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison_note: Option<String>,
}

#[derive(Debug, Serialize)]
struct DatasetInfo {
    num_documents: usize,
    num_queries: usize,
    num_judgments: usize,
    queries_skipped: usize,
}

#[derive(Debug, Serialize)]
struct SystemResult {
    name: String,
    mean_average_precision: f64,
    per_query: Vec<PerQuery>,
}

#[derive(Debug, Serialize)]
struct PerQuery {
    query_id: u64,
    average_precision: f64,
}

#[derive(Debug, Serialize)]
struct ComparisonReport {
    system_a: String,
    system_b: String,
    statistic: f64,
    p_value: f64,
    df: usize,
    significant: bool,
}

// =============================================================================
// Evaluation
// =============================================================================

struct RunOutcome {
    query_ids: Vec<u64>,
    inl2: Evaluator,
    bm25: Evaluator,
    skipped: usize,
    elapsed_secs: f64,
}

/// Runs both rankers over the query batch in one pass.
///
/// A query that tokenizes to nothing is skipped for both systems, keeping
/// the two sample vectors paired; nothing is ever recorded for it.
fn run_comparison(
    args: &Args,
    corpus: &CorpusTable,
    queries: &[String],
    judgments: &RelevanceJudgments,
) -> Result<RunOutcome> {
    let inl2_ranker = Ranker::new(RankingFunction::inl2(args.inl2_c)?, args.top_k)?;
    let bm25_ranker = Ranker::new(
        RankingFunction::okapi_bm25(BM25_K1, BM25_B, BM25_K3)?,
        args.top_k,
    )?;

    let mut ev_inl2 = Evaluator::new();
    let mut ev_bm25 = Evaluator::new();
    let mut query_ids = Vec::new();
    let mut skipped = 0usize;

    let start = Instant::now();
    for (i, query) in queries.iter().enumerate() {
        let query_id = args.query_id_start + i as u64;
        let terms = tokenize(query);
        if terms.is_empty() {
            skipped += 1;
            warn!(query_id, "query has no terms after tokenization, skipping");
            continue;
        }

        let inl2_results = inl2_ranker.rank(&terms, corpus)?;
        let bm25_results = bm25_ranker.rank(&terms, corpus)?;

        let ap_inl2 = ev_inl2.average_precision(&inl2_results, judgments, query_id, args.top_k)?;
        let ap_bm25 = ev_bm25.average_precision(&bm25_results, judgments, query_id, args.top_k)?;
        query_ids.push(query_id);

        if !args.json {
            println!("Query {query_id} average precision: inl2 {ap_inl2:.4}  bm25 {ap_bm25:.4}");
        }
    }

    Ok(RunOutcome {
        query_ids,
        inl2: ev_inl2,
        bm25: ev_bm25,
        skipped,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

// =============================================================================
// Output
// =============================================================================

/// Writes one average-precision value per line, in query order.
fn write_sample(path: &Path, samples: &[f64]) -> Result<()> {
    let mut body = String::new();
    for value in samples {
        body.push_str(&format!("{value}\n"));
    }
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn print_report(report: &EvalReport) {
    println!();
    println!("{}", "=".repeat(72));
    println!("RANKER COMPARISON");
    println!("{}", "=".repeat(72));
    println!(
        "Dataset: {} docs, {} queries ({} skipped), {} judgments",
        report.dataset.num_documents,
        report.dataset.num_queries,
        report.dataset.queries_skipped,
        report.dataset.num_judgments
    );
    println!("Elapsed: {:.4} seconds", report.elapsed_secs);

    println!();
    println!("{:<8} {:>10}", "System", format!("MAP@{}", report.top_k));
    for system in &report.systems {
        println!("{:<8} {:>10.4}", system.name, system.mean_average_precision);
    }

    println!();
    if let Some(cmp) = &report.comparison {
        let marker = if cmp.significant { "*" } else { "" };
        println!(
            "Paired t-test ({} vs {}): t({}) = {:.3}, p = {:.4}{}  (* = p < {})",
            cmp.system_a, cmp.system_b, cmp.df, cmp.statistic, cmp.p_value, marker,
            SIGNIFICANCE_ALPHA
        );
    } else if let Some(note) = &report.comparison_note {
        println!("Paired t-test: {note}");
    }
    println!("{}", "=".repeat(72));
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let corpus = CorpusTable::load(&args.corpus)?;
    let queries = data::load_queries(&args.queries)?;
    let judgments = data::load_qrels(&args.qrels, &corpus)?;

    let outcome = run_comparison(&args, &corpus, &queries, &judgments)?;

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", args.output_dir.display())
    })?;
    write_sample(&args.output_dir.join("inl2.avg_p.txt"), outcome.inl2.samples())?;
    write_sample(&args.output_dir.join("bm25.avg_p.txt"), outcome.bm25.samples())?;

    let (comparison, comparison_note) =
        match paired_ttest(outcome.inl2.samples(), outcome.bm25.samples()) {
            Ok(result) => {
                let p_path = args.output_dir.join("significance.txt");
                std::fs::write(&p_path, format!("{}\n", result.p_value))
                    .with_context(|| format!("Failed to write {}", p_path.display()))?;
                (
                    Some(ComparisonReport {
                        system_a: "inl2".to_string(),
                        system_b: "bm25".to_string(),
                        statistic: result.statistic,
                        p_value: result.p_value,
                        df: result.df,
                        significant: result.is_significant(SIGNIFICANCE_ALPHA),
                    }),
                    None,
                )
            }
            // Too few paired queries, or a zero-variance constant shift:
            // report it instead of inventing a p-value.
            Err(err) => {
                warn!(error = %err, "significance test not computed");
                (None, Some(err.to_string()))
            }
        };

    let per_query = |ev: &Evaluator| -> Vec<PerQuery> {
        outcome
            .query_ids
            .iter()
            .zip(ev.samples())
            .map(|(&query_id, &average_precision)| PerQuery {
                query_id,
                average_precision,
            })
            .collect()
    };

    let report = EvalReport {
        dataset: DatasetInfo {
            num_documents: corpus.len(),
            num_queries: queries.len(),
            num_judgments: judgments.len(),
            queries_skipped: outcome.skipped,
        },
        top_k: args.top_k,
        elapsed_secs: outcome.elapsed_secs,
        systems: vec![
            SystemResult {
                name: "inl2".to_string(),
                mean_average_precision: outcome.inl2.mean_average_precision(),
                per_query: per_query(&outcome.inl2),
            },
            SystemResult {
                name: "bm25".to_string(),
                mean_average_precision: outcome.bm25.mean_average_precision(),
                per_query: per_query(&outcome.bm25),
            },
        ],
        comparison,
        comparison_note,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
