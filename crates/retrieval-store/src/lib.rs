//! retrieval-store - In-memory document corpus
//!
//! This crate provides the append-only, insertion-ordered collection of
//! text chunks that the lexical and vector indexes are built from.
//! Persistence is an external concern; this core only holds a corpus in
//! memory.

mod corpus;

pub use corpus::Corpus;
