//! Corpus loading and the in-memory statistics table.
//!
//! The corpus file is JSONL, one document per line:
//!
//! ```text
//! {"doc_id": "cran-1", "title": "...", "text": "..."}
//! ```
//!
//! Documents are kept as flat per-document term-count tables plus a
//! corpus-level totals table, deliberately *not* an inverted index.
//! `postings` answers by scanning documents, which is plenty for
//! evaluation-sized corpora and keeps index engineering out of this tool;
//! a real index can implement the same [`CorpusIndex`] trait instead.
//!
//! Token splitting is intentionally trivial: lowercase, split on
//! whitespace, strip non-alphanumeric edges. No stemming, no stopwords.

use anyhow::{Context, Result};
use assay_core::ranking::{CorpusIndex, DocId, Posting};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// One corpus document as stored on disk.
#[derive(Debug, Deserialize)]
struct CorpusDoc {
    doc_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
}

/// Per-term corpus-wide totals.
#[derive(Debug, Default, Clone, Copy)]
struct TermTotals {
    corpus_count: u64,
    doc_frequency: u64,
}

/// Per-document term-count table.
#[derive(Debug)]
struct DocEntry {
    term_counts: HashMap<String, u32>,
    length: u32,
}

/// In-memory corpus statistics backing the ranking seam.
#[derive(Debug)]
pub struct CorpusTable {
    docs: Vec<DocEntry>,
    totals: HashMap<String, TermTotals>,
    total_length: u64,
    /// internal id -> external string id, in file order
    external_ids: Vec<String>,
    /// external string id -> internal id
    id_map: HashMap<String, DocId>,
}

impl CorpusTable {
    /// Loads a JSONL corpus file.
    ///
    /// Internal ids are assigned in file order; a duplicated external id is
    /// an error since judgments would become ambiguous.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open corpus file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut table = Self {
            docs: Vec::new(),
            totals: HashMap::new(),
            total_length: 0,
            external_ids: Vec::new(),
            id_map: HashMap::new(),
        };

        for (line_no, line) in reader.lines().enumerate() {
            let line = line
                .with_context(|| format!("Failed to read corpus line {}", line_no + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: CorpusDoc = serde_json::from_str(&line)
                .with_context(|| format!("Malformed corpus document on line {}", line_no + 1))?;
            table.add_document(doc)?;
        }

        if table.docs.is_empty() {
            anyhow::bail!("Corpus file contains no documents: {}", path.display());
        }

        info!(
            documents = table.docs.len(),
            vocabulary = table.totals.len(),
            avg_doc_length = table.avg_doc_length(),
            "corpus loaded"
        );
        Ok(table)
    }

    fn add_document(&mut self, doc: CorpusDoc) -> Result<()> {
        let internal = DocId::from_u64(self.docs.len() as u64);
        if self.id_map.insert(doc.doc_id.clone(), internal).is_some() {
            anyhow::bail!("Duplicate document id in corpus: {}", doc.doc_id);
        }

        let tokens = tokenize(&format!("{} {}", doc.title, doc.text));
        let mut term_counts: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *term_counts.entry(token.clone()).or_insert(0) += 1;
        }

        for (term, &count) in &term_counts {
            let totals = self.totals.entry(term.clone()).or_default();
            totals.corpus_count += u64::from(count);
            totals.doc_frequency += 1;
        }

        self.total_length += tokens.len() as u64;
        self.docs.push(DocEntry {
            term_counts,
            length: tokens.len() as u32,
        });
        self.external_ids.push(doc.doc_id);
        Ok(())
    }

    /// Number of documents loaded.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Resolves an external document id to its internal id.
    pub fn resolve(&self, external_id: &str) -> Option<DocId> {
        self.id_map.get(external_id).copied()
    }

    /// External id of an internal document id.
    pub fn external_id(&self, doc_id: DocId) -> Option<&str> {
        self.external_ids
            .get(doc_id.as_u64() as usize)
            .map(String::as_str)
    }
}

impl CorpusIndex for CorpusTable {
    fn num_docs(&self) -> u64 {
        self.docs.len() as u64
    }

    fn avg_doc_length(&self) -> f64 {
        if self.docs.is_empty() {
            return 0.0;
        }
        self.total_length as f64 / self.docs.len() as f64
    }

    fn doc_length(&self, doc_id: DocId) -> u32 {
        self.docs.get(doc_id.as_u64() as usize).map_or(0, |d| d.length)
    }

    fn doc_unique_terms(&self, doc_id: DocId) -> u32 {
        self.docs
            .get(doc_id.as_u64() as usize)
            .map_or(0, |d| d.term_counts.len() as u32)
    }

    fn doc_frequency(&self, term: &str) -> u64 {
        self.totals.get(term).map_or(0, |t| t.doc_frequency)
    }

    fn corpus_term_count(&self, term: &str) -> u64 {
        self.totals.get(term).map_or(0, |t| t.corpus_count)
    }

    fn postings(&self, term: &str) -> Vec<Posting> {
        // Documents-containing-term scan; see module docs for why there is
        // no inverted index here.
        self.docs
            .iter()
            .enumerate()
            .filter_map(|(i, d)| {
                d.term_counts.get(term).map(|&tf| Posting {
                    doc_id: DocId::from_u64(i as u64),
                    term_frequency: tf,
                })
            })
            .collect()
    }
}

/// Lowercases and splits on whitespace, trimming non-alphanumeric edges.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
