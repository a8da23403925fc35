//! Append-only, insertion-ordered document collection.

use std::collections::HashSet;

use tracing::debug;
use ulid::Ulid;

use retrieval_core::{Document, Result, RetrievalError};

/// An in-memory corpus of text chunks.
///
/// Insertion order is preserved and acts as the stable tie-break key for
/// every ranking downstream. Documents are only ever appended; the corpus
/// never removes entries. Duplicate `text` across different ids is
/// permitted; deduplication happens at fusion time.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
    ids: HashSet<Ulid>,
    dimension: usize,
}

impl Corpus {
    /// Create an empty corpus with a fixed embedding dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            documents: Vec::new(),
            ids: HashSet::new(),
            dimension,
        }
    }

    /// Append a document and return its id. O(1).
    ///
    /// Rejects a duplicate id and an embedding whose length does not match
    /// the corpus dimension. Appending makes any previously built lexical
    /// index stale; the retriever rebuilds before the next query.
    pub fn add(&mut self, doc: Document) -> Result<Ulid> {
        if doc.embedding.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: doc.embedding.len(),
            });
        }
        if !self.ids.insert(doc.id) {
            return Err(RetrievalError::DuplicateId {
                id: doc.id.to_string(),
            });
        }

        let id = doc.id;
        self.documents.push(doc);
        debug!("Corpus grew to {} documents", self.documents.len());
        Ok(id)
    }

    /// Iterate over all documents in insertion order. Finite, restartable.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// All documents in insertion order, as a slice.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents.
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The fixed embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut corpus = Corpus::new(2);
        corpus.add(Document::new("first", vec![1.0, 0.0])).unwrap();
        corpus.add(Document::new("second", vec![0.0, 1.0])).unwrap();

        let texts: Vec<&str> = corpus.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(corpus.count(), 2);
    }

    #[test]
    fn test_add_rejects_wrong_dimension() {
        let mut corpus = Corpus::new(3);
        let err = corpus.add(Document::new("short", vec![1.0])).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        ));
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut corpus = Corpus::new(1);
        let doc = Document::new("chunk", vec![1.0]);
        let twin = doc.clone();
        corpus.add(doc).unwrap();
        assert!(matches!(
            corpus.add(twin),
            Err(RetrievalError::DuplicateId { .. })
        ));
        assert_eq!(corpus.count(), 1);
    }

    #[test]
    fn test_duplicate_text_is_permitted() {
        let mut corpus = Corpus::new(1);
        corpus.add(Document::new("same chunk", vec![1.0])).unwrap();
        corpus.add(Document::new("same chunk", vec![0.5])).unwrap();
        assert_eq!(corpus.count(), 2);
    }

    #[test]
    fn test_iter_is_restartable() {
        let mut corpus = Corpus::new(1);
        corpus.add(Document::new("a", vec![1.0])).unwrap();

        assert_eq!(corpus.iter().count(), 1);
        assert_eq!(corpus.iter().count(), 1);
    }
}
