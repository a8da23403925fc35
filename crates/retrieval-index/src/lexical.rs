//! BM25-style lexical scoring over a corpus snapshot.

use std::collections::HashMap;

use tracing::debug;

use retrieval_core::cancel::CANCEL_CHECK_INTERVAL;
use retrieval_core::{CancellationToken, Document, RankedResult, Result, RetrievalError};

/// Tokenize text for lexical indexing and querying.
///
/// The contract is intentionally minimal and must stay exactly this for
/// reproducibility: lower-case the input, then split on Unicode
/// whitespace. No stemming, no punctuation stripping, no stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// A BM25 lexical index built from a corpus snapshot.
///
/// Immutable once built. `built_from_count` records the corpus size at
/// build time; if the corpus has grown since, the index is stale and must
/// be rebuilt before use.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    /// Per-term document frequency across the corpus.
    doc_frequency: HashMap<String, u32>,

    /// Per-document term frequencies, in corpus order.
    term_frequencies: Vec<HashMap<String, u32>>,

    /// Token count per document, in corpus order.
    doc_lengths: Vec<u32>,

    /// Mean token count across the corpus (0 for an empty corpus).
    avg_doc_length: f32,

    /// Document texts, in corpus order, for result construction.
    texts: Vec<String>,

    k1: f32,
    b: f32,
    built_from_count: usize,
}

impl LexicalIndex {
    /// Build term statistics from a corpus snapshot.
    pub fn build(docs: &[Document], k1: f32, b: f32) -> Self {
        let mut doc_frequency: HashMap<String, u32> = HashMap::new();
        let mut term_frequencies = Vec::with_capacity(docs.len());
        let mut doc_lengths = Vec::with_capacity(docs.len());
        let mut texts = Vec::with_capacity(docs.len());

        for doc in docs {
            let tokens = tokenize(&doc.text);
            doc_lengths.push(tokens.len() as u32);

            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *tf.entry(token).or_default() += 1;
            }
            for term in tf.keys() {
                *doc_frequency.entry(term.clone()).or_default() += 1;
            }

            term_frequencies.push(tf);
            texts.push(doc.text.clone());
        }

        let total_len: u32 = doc_lengths.iter().sum();
        let avg_doc_length = if docs.is_empty() {
            0.0
        } else {
            total_len as f32 / docs.len() as f32
        };

        debug!(
            "Built lexical index: {} documents, {} terms, avg length {:.1}",
            docs.len(),
            doc_frequency.len(),
            avg_doc_length
        );

        Self {
            doc_frequency,
            term_frequencies,
            doc_lengths,
            avg_doc_length,
            texts,
            k1,
            b,
            built_from_count: docs.len(),
        }
    }

    /// Corpus size at build time.
    pub fn built_from_count(&self) -> usize {
        self.built_from_count
    }

    /// Whether the corpus has grown past this index.
    pub fn is_stale(&self, corpus_count: usize) -> bool {
        self.built_from_count != corpus_count
    }

    /// Inverse document frequency for a term.
    ///
    /// `IDF(t) = ln((N - df + 0.5) / (df + 0.5) + 1)`
    fn idf(&self, term: &str) -> f32 {
        let n = self.built_from_count as f32;
        let df = self.doc_frequency.get(term).copied().unwrap_or(0) as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// BM25 score of every document for the given query tokens, in corpus
    /// order. An empty token list scores 0 for every document: no lexical
    /// signal, not an error.
    pub fn scores(&self, query_tokens: &[String], cancel: &CancellationToken) -> Result<Vec<f32>> {
        let mut scores = vec![0.0f32; self.term_frequencies.len()];

        for (i, tf) in self.term_frequencies.iter().enumerate() {
            if i % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(RetrievalError::Cancelled);
            }

            let len_norm = if self.avg_doc_length > 0.0 {
                self.doc_lengths[i] as f32 / self.avg_doc_length
            } else {
                0.0
            };

            let mut score = 0.0f32;
            for token in query_tokens {
                let freq = tf.get(token).copied().unwrap_or(0) as f32;
                if freq == 0.0 {
                    continue;
                }
                let numerator = freq * (self.k1 + 1.0);
                let denominator = freq + self.k1 * (1.0 - self.b + self.b * len_norm);
                score += self.idf(token) * numerator / denominator;
            }
            scores[i] = score;
        }

        Ok(scores)
    }

    /// Rank documents for a query text.
    ///
    /// The query is tokenized with the same rule as the corpus. Documents
    /// are sorted descending by score; the sort is stable, so ties resolve
    /// to corpus insertion order. Zero-score documents carry no lexical
    /// signal and are dropped rather than ranked, which lets the vector
    /// side dominate fusion when the query has no lexical overlap.
    pub fn rank(
        &self,
        query_text: &str,
        top_k: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<RankedResult>> {
        let query_tokens = tokenize(query_text);
        let scores = self.scores(&query_tokens, cancel)?;

        let mut scored: Vec<(usize, f32)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(rank, (idx, score))| RankedResult {
                text: self.texts[idx].clone(),
                score,
                rank: rank + 1,
            })
            .collect())
    }
}
