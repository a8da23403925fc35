//! retrieval-embed - Deterministic fixture embedder
//!
//! Real embeddings come from an external model provider; this crate ships
//! a hash-based `EmbeddingProvider` so demos and tests can run without
//! one. The vectors carry no semantics beyond "identical text embeds
//! identically".

mod hash;

pub use hash::HashEmbedder;

// Re-export the trait for convenience
pub use retrieval_core::EmbeddingProvider;
