//! Core domain types for the retrieval engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ulid::Ulid;

/// A text chunk in the corpus.
///
/// The text and metadata come from an external extraction/chunking stage;
/// the embedding comes from an external embedding model. This core only
/// consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (ULID), assigned at construction.
    pub id: Ulid,

    /// Chunk text content.
    pub text: String,

    /// User-provided metadata (source, page, section, ...).
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Embedding vector. Length must match the corpus dimension.
    pub embedding: Vec<f32>,
}

impl Document {
    /// Create a new document with a fresh id.
    pub fn new(text: &str, embedding: Vec<f32>) -> Self {
        Self {
            id: Ulid::new(),
            text: text.to_string(),
            metadata: HashMap::new(),
            embedding,
        }
    }

    /// Attach a metadata entry, builder style.
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// A single-engine search result. Ephemeral, produced per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Matched chunk text.
    pub text: String,

    /// Engine-native relevance score (BM25 or cosine; higher is better).
    pub score: f32,

    /// Rank within this engine's list (1-indexed).
    pub rank: usize,
}

/// A fused search result. Ephemeral, produced per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    /// Matched chunk text (trimmed).
    pub text: String,

    /// Reciprocal rank fusion score.
    pub rrf_score: f32,

    /// Rank in the vector list, 0 if absent from it.
    pub vector_rank: usize,

    /// Rank in the lexical list, 0 if absent from it.
    pub lexical_rank: usize,

    /// Rank in the fused output (1-indexed).
    pub final_rank: usize,
}

/// Fused results plus the raw per-engine lists, for explainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchBreakdown {
    /// The fused top-k.
    pub results: Vec<FusedResult>,

    /// Lexical-only top-k.
    pub lexical: Vec<RankedResult>,

    /// Vector-only top-k.
    pub vector: Vec<RankedResult>,
}
