//! retrieval-index - Lexical and vector indexes
//!
//! This crate provides the two independent ranking engines behind hybrid
//! search: a BM25-style lexical index and an exact-cosine vector index.
//! Both are built from a corpus snapshot and are immutable once built, so
//! any number of threads may query them concurrently without locks.

mod lexical;
mod vector;

pub use lexical::{tokenize, LexicalIndex};
pub use vector::{cosine_similarity, VectorIndex};
