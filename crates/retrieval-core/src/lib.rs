//! retrieval-core - Core types and traits for the hybrid retrieval engine
//!
//! This crate provides the foundational types, traits, and error handling
//! used throughout the retrieval workspace.

pub mod cancel;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use cancel::CancellationToken;
pub use config::*;
pub use error::{Result, RetrievalError};
pub use traits::*;
pub use types::*;
