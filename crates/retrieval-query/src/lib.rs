//! retrieval-query - Rank fusion and hybrid search orchestration
//!
//! This crate combines the lexical (BM25) and vector (cosine) rankings
//! into one fused ranking using Reciprocal Rank Fusion (RRF), and provides
//! the `HybridRetriever` orchestrator that owns a corpus plus both
//! indexes.
//!
//! # Example
//!
//! ```rust,ignore
//! use retrieval_query::{HybridRetriever, SearchOptions};
//! use retrieval_store::Corpus;
//!
//! let retriever = HybridRetriever::new(corpus, RetrievalConfig::default())?;
//! let results = retriever.search("corn drought", &query_embedding, &SearchOptions::default())?;
//! ```

mod engine;
mod fusion;

pub use engine::{HybridRetriever, SearchOptions};
pub use fusion::{dedup_key, reciprocal_rank_fusion, FusionParams};

// Re-export for convenience
pub use retrieval_core::{FusedResult, RankedResult, SearchBreakdown};
