//! Hybrid search orchestrator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use tracing::{debug, info, warn};
use ulid::Ulid;

use retrieval_core::{
    CancellationToken, Document, EmbeddingProvider, FusedResult, Result, RetrievalConfig,
    RetrievalError, SearchBreakdown, VectorStore,
};
use retrieval_index::{LexicalIndex, VectorIndex};
use retrieval_store::Corpus;

use crate::fusion::{dedup_key, reciprocal_rank_fusion, FusionParams};

/// Per-query search options.
///
/// `Default::default()` uses the standard constants; to honor a loaded
/// configuration, seed from [`HybridRetriever::default_options`] instead
/// and override per query.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum number of fused results.
    pub top_k: usize,

    /// Weight of the vector ranking in fusion.
    pub vector_weight: f32,

    /// Weight of the lexical ranking in fusion.
    pub lexical_weight: f32,

    /// Cooperative cancellation for the O(N) scans.
    pub cancel: CancellationToken,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            vector_weight: 1.0,
            lexical_weight: 1.0,
            cancel: CancellationToken::new(),
        }
    }
}

/// Both indexes plus the dedup-key order map, built from one corpus
/// snapshot. Immutable once published; queries hold an `Arc` snapshot and
/// never touch shared mutable state.
struct BuiltIndex<V> {
    lexical: LexicalIndex,
    vector: V,
    /// Earliest corpus position per trimmed-text dedup key, for fusion
    /// tie-breaking.
    corpus_order: HashMap<blake3::Hash, usize>,
    built_from_count: usize,
}

/// Index lifecycle: `Uninitialized -> Built`, then `Built -> Built` via
/// atomic replacement. There is no half-built state a reader can observe.
enum IndexState<V> {
    Uninitialized,
    Built(Arc<BuiltIndex<V>>),
}

/// Orchestrator owning a corpus plus a lexical and a vector index.
///
/// Generic over the vector backend; `VectorIndex` (exact brute-force
/// cosine) is the stock choice, and an ANN store can be substituted
/// through the same trait.
///
/// Reads are lock-free once an index snapshot is taken; corpus appends
/// and index rebuilds are serialized behind writer locks, and a rebuild
/// publishes the fully constructed new index with a single reference
/// swap, so in-flight queries keep running against the old one.
pub struct HybridRetriever<V: VectorStore = VectorIndex> {
    corpus: RwLock<Corpus>,
    state: RwLock<IndexState<V>>,
    rebuild: Mutex<()>,
    config: RetrievalConfig,
}

impl<V: VectorStore> HybridRetriever<V> {
    /// Create a retriever over a corpus. Validates the configuration up
    /// front; no index is built until the first query needs one.
    pub fn new(corpus: Corpus, config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            corpus: RwLock::new(corpus),
            state: RwLock::new(IndexState::Uninitialized),
            rebuild: Mutex::new(()),
            config,
        })
    }

    /// Search options seeded from the retriever's configuration: the
    /// configured default top-k and fusion weights, with a fresh
    /// cancellation token. Callers override per query as needed.
    pub fn default_options(&self) -> SearchOptions {
        SearchOptions {
            top_k: self.config.search.default_top_k,
            vector_weight: self.config.fusion.vector_weight,
            lexical_weight: self.config.fusion.lexical_weight,
            cancel: CancellationToken::new(),
        }
    }

    /// Append a document to the owned corpus. The next query detects the
    /// grown corpus and rebuilds the indexes before answering.
    pub fn add_document(&self, doc: Document) -> Result<Ulid> {
        self.corpus
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(doc)
    }

    /// Current corpus size.
    pub fn corpus_count(&self) -> usize {
        self.corpus
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .count()
    }

    /// Hybrid search: fuse the lexical and vector rankings for a query.
    ///
    /// Over-fetches `min(top_k * 3, corpus_size)` candidates from each
    /// engine so a document ranked low on one axis can still surface
    /// after fusion.
    pub fn search(
        &self,
        query_text: &str,
        query_embedding: &[f32],
        opts: &SearchOptions,
    ) -> Result<Vec<FusedResult>> {
        Ok(self
            .search_internal(query_text, query_embedding, opts)?
            .results)
    }

    /// Like `search`, but also returns the raw lexical-only and
    /// vector-only top-k lists for explainability.
    pub fn search_with_breakdown(
        &self,
        query_text: &str,
        query_embedding: &[f32],
        opts: &SearchOptions,
    ) -> Result<SearchBreakdown> {
        self.search_internal(query_text, query_embedding, opts)
    }

    /// Embed the query through the provider, then search.
    pub fn search_query<P: EmbeddingProvider>(
        &self,
        query_text: &str,
        provider: &P,
        opts: &SearchOptions,
    ) -> Result<Vec<FusedResult>> {
        let query_embedding = provider.embed_query(query_text)?;
        self.search(query_text, &query_embedding, opts)
    }

    fn search_internal(
        &self,
        query_text: &str,
        query_embedding: &[f32],
        opts: &SearchOptions,
    ) -> Result<SearchBreakdown> {
        let start = Instant::now();

        // Fail fast, before any computation.
        self.validate_options(opts)?;
        let (corpus_count, dimension) = {
            let corpus = self.corpus.read().unwrap_or_else(PoisonError::into_inner);
            (corpus.count(), corpus.dimension())
        };
        if query_embedding.len() != dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: dimension,
                actual: query_embedding.len(),
            });
        }
        if corpus_count == 0 {
            warn!("Search against empty corpus returns no results");
            return Ok(SearchBreakdown {
                results: Vec::new(),
                lexical: Vec::new(),
                vector: Vec::new(),
            });
        }

        let index = self.ensure_built()?;

        let candidate_k = opts.top_k.saturating_mul(3).min(index.built_from_count);
        let lexical = index.lexical.rank(query_text, candidate_k, &opts.cancel)?;
        let vector = index.vector.search(query_embedding, candidate_k, &opts.cancel)?;

        debug!(
            "Lexical returned {} candidates, vector returned {}",
            lexical.len(),
            vector.len()
        );

        let params = FusionParams {
            k: self.config.fusion.rrf_k,
            vector_weight: opts.vector_weight,
            lexical_weight: opts.lexical_weight,
        };
        let results = reciprocal_rank_fusion(
            &vector,
            &lexical,
            &params,
            &index.corpus_order,
            opts.top_k,
        );

        info!(
            "Hybrid search for {:?} returned {} results in {}ms",
            query_text,
            results.len(),
            start.elapsed().as_millis()
        );

        let mut lexical = lexical;
        let mut vector = vector;
        lexical.truncate(opts.top_k);
        vector.truncate(opts.top_k);

        Ok(SearchBreakdown {
            results,
            lexical,
            vector,
        })
    }

    fn validate_options(&self, opts: &SearchOptions) -> Result<()> {
        if opts.top_k == 0 {
            return Err(RetrievalError::invalid_argument("top_k must be > 0"));
        }
        if opts.vector_weight < 0.0 || opts.lexical_weight < 0.0 {
            return Err(RetrievalError::invalid_argument(
                "fusion weights must be >= 0",
            ));
        }
        Ok(())
    }

    /// Return the current index snapshot, rebuilding first if the corpus
    /// has grown past it. Staleness is internal; callers never see it.
    fn ensure_built(&self) -> Result<Arc<BuiltIndex<V>>> {
        if let Some(index) = self.built_snapshot() {
            return Ok(index);
        }

        // One rebuild at a time; concurrent callers wait, then reuse.
        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = self.built_snapshot() {
            return Ok(index);
        }

        let built = {
            let corpus = self.corpus.read().unwrap_or_else(PoisonError::into_inner);
            let docs = corpus.documents();

            info!("Building indexes over {} documents", docs.len());
            let lexical = LexicalIndex::build(docs, self.config.bm25.k1, self.config.bm25.b);
            let vector = V::build(docs, corpus.dimension())?;

            let mut corpus_order = HashMap::new();
            for (position, doc) in docs.iter().enumerate() {
                corpus_order.entry(dedup_key(&doc.text)).or_insert(position);
            }

            Arc::new(BuiltIndex {
                lexical,
                vector,
                corpus_order,
                built_from_count: docs.len(),
            })
        };

        // Single reference swap; in-flight readers keep the old Arc.
        *self.state.write().unwrap_or_else(PoisonError::into_inner) =
            IndexState::Built(built.clone());
        Ok(built)
    }

    fn built_snapshot(&self) -> Option<Arc<BuiltIndex<V>>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            IndexState::Built(index) if !index.lexical.is_stale(self.corpus_count()) => {
                Some(index.clone())
            }
            _ => None,
        }
    }
}
