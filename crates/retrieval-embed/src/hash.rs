//! Hash-based deterministic embeddings.

use retrieval_core::{EmbeddingProvider, Result};

/// Deterministic embedder producing L2-normalized vectors from a text
/// hash. Identical text always embeds identically, which is all demos
/// and fixtures need.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder with the default dimension.
    pub fn new() -> Self {
        Self { dimension: 64 }
    }

    /// Create an embedder with a custom dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let hash = text
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
                let mut embedding = vec![0.0f32; self.dimension];
                for (i, v) in embedding.iter_mut().enumerate() {
                    *v = ((hash.wrapping_mul(i as u64 + 1)) as f32 % 1000.0) / 1000.0 - 0.5;
                }
                // L2 normalize
                let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for x in &mut embedding {
                        *x /= norm;
                    }
                }
                embedding
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embeddings_are_deterministic() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed(&["corn drought"]).unwrap();
        let b = embedder.embed(&["corn drought"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_embeddings_are_normalized() {
        let embedder = HashEmbedder::with_dimension(32);
        let vectors = embedder.embed(&["hello world", "rust"]).unwrap();

        assert_eq!(vectors.len(), 2);
        for v in &vectors {
            assert_eq!(v.len(), 32);
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_embed_query_matches_batch() {
        let embedder = HashEmbedder::new();
        let batch = embedder.embed(&["query text"]).unwrap();
        let single = embedder.embed_query("query text").unwrap();
        assert_eq!(batch[0], single);
    }

    #[test]
    fn test_distinct_texts_embed_differently() {
        let embedder = HashEmbedder::new();
        let vectors = embedder.embed(&["alpha", "beta"]).unwrap();
        assert_ne!(vectors[0], vectors[1]);
    }
}
