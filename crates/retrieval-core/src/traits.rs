//! Capability traits at the seams of the retrieval core.

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::types::{Document, RankedResult};

/// Embedding model capability.
///
/// The retrieval core never computes embeddings; it consumes fixed-length
/// float vectors from whatever implements this trait (an ONNX session, a
/// remote API client, or a deterministic hash embedder in tests).
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, one vector per input, in order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| crate::error::RetrievalError::embedding("provider returned no vector"))
    }

    /// The embedding dimension this provider produces.
    fn dimension(&self) -> usize;
}

/// Vector similarity backend.
///
/// The stock implementation is an exact brute-force cosine scan; an
/// approximate nearest-neighbor backend may be substituted behind this
/// trait as long as its ranking stays within a documented tolerance of
/// exact cosine order.
pub trait VectorStore: Send + Sync {
    /// Build the store from a corpus snapshot, one row per document in
    /// corpus order. Fails with `DimensionMismatch` if any embedding does
    /// not have the given dimension.
    fn build(docs: &[Document], dimension: usize) -> Result<Self>
    where
        Self: Sized;

    /// Rank stored documents by similarity to the query embedding,
    /// descending, ties broken by corpus insertion order, truncated to
    /// `top_k`. Ranks are 1-indexed.
    fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<RankedResult>>;

    /// The fixed embedding dimension.
    fn dimension(&self) -> usize;

    /// Number of stored rows.
    fn len(&self) -> usize;

    /// Whether the store holds no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
