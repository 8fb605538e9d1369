//! Query and relevance-judgment file loaders.
//!
//! Queries are plain text, one query per line; the query id is its line
//! index offset by `--query-id-start`, so judgment files keyed on numeric
//! ids line up with the query file.
//!
//! Judgment rows are whitespace-separated:
//!
//! ```text
//! query_id  doc_id  relevance        # 3 columns
//! query_id  doc_id                   # 2 columns, relevance defaults to 1
//! query_id  iteration  doc_id  rel   # 4 columns, TREC qrels layout
//! ```

use crate::corpus::CorpusTable;
use anyhow::{Context, Result};
use assay_core::evaluation::RelevanceJudgments;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Loads the query file. Every line is a query; callers decide what to do
/// with queries that tokenize to nothing.
pub fn load_queries(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open query file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut queries = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("Failed to read query line {}", line_no + 1))?;
        queries.push(line.trim().to_string());
    }

    if queries.is_empty() {
        anyhow::bail!("Query file contains no queries: {}", path.display());
    }
    Ok(queries)
}

/// Loads relevance judgments, mapping external document ids through the
/// corpus table. Rows referencing unknown documents are dropped with a
/// warning; an unparsable row is an error.
pub fn load_qrels(path: &Path, corpus: &CorpusTable) -> Result<RelevanceJudgments> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open qrels file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut judgments = RelevanceJudgments::new();
    let mut dropped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("Failed to read qrels line {}", line_no + 1))?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let (query_field, doc_field, rel_field) = match fields.as_slice() {
            [q, d] => (*q, *d, "1"),
            [q, d, r] => (*q, *d, *r),
            // TREC layout: the second column is an unused iteration marker.
            [q, _, d, r] => (*q, *d, *r),
            _ => anyhow::bail!(
                "Malformed qrels row on line {}: expected 2-4 columns, got {}",
                line_no + 1,
                fields.len()
            ),
        };

        let query_id: u64 = query_field.parse().with_context(|| {
            format!("Invalid query id {query_field:?} on qrels line {}", line_no + 1)
        })?;
        let relevance: u8 = rel_field.parse().with_context(|| {
            format!("Invalid relevance {rel_field:?} on qrels line {}", line_no + 1)
        })?;

        match corpus.resolve(doc_field) {
            Some(doc_id) => judgments.insert(query_id, doc_id, relevance),
            None => {
                dropped += 1;
                warn!(doc_id = doc_field, line = line_no + 1, "judgment references unknown document");
            }
        }
    }

    if dropped > 0 {
        warn!(dropped, "judgments referencing unknown documents were dropped");
    }
    Ok(judgments)
}
