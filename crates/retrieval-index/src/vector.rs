//! Exact cosine-similarity vector index.

use tracing::debug;

use retrieval_core::cancel::CANCEL_CHECK_INTERVAL;
use retrieval_core::{
    CancellationToken, Document, RankedResult, Result, RetrievalError, VectorStore,
};

/// Cosine similarity between two vectors of equal length.
///
/// A zero-norm operand defines similarity 0 rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Brute-force vector index: one embedding row per corpus document, in
/// corpus order.
///
/// An exact O(N·d) brute-force scan, always correct. Approximate
/// nearest-neighbor stores can replace it behind the `VectorStore` trait
/// as long as their ranking stays within a documented tolerance of exact
/// cosine order.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    embeddings: Vec<Vec<f32>>,
    texts: Vec<String>,
    dimension: usize,
}

impl VectorStore for VectorIndex {
    fn build(docs: &[Document], dimension: usize) -> Result<Self> {
        let mut embeddings = Vec::with_capacity(docs.len());
        let mut texts = Vec::with_capacity(docs.len());

        for doc in docs {
            if doc.embedding.len() != dimension {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dimension,
                    actual: doc.embedding.len(),
                });
            }
            embeddings.push(doc.embedding.clone());
            texts.push(doc.text.clone());
        }

        debug!("Built vector index: {} rows, dimension {}", texts.len(), dimension);

        Ok(Self {
            embeddings,
            texts,
            dimension,
        })
    }

    fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<RankedResult>> {
        if query_embedding.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: query_embedding.len(),
            });
        }

        let mut scored = Vec::with_capacity(self.embeddings.len());
        for (i, embedding) in self.embeddings.iter().enumerate() {
            if i % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(RetrievalError::Cancelled);
            }
            scored.push((i, cosine_similarity(query_embedding, embedding)));
        }

        // Stable sort: equal similarities keep insertion order.
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

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.embeddings.len()
    }
}
