//! Retrieval CLI - hybrid search over a JSON corpus from the shell.
//!
//! Chunk texts come from a JSON file; embeddings are produced with the
//! deterministic hash embedder so the demo runs without a model.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use retrieval_core::{Document, EmbeddingProvider, RetrievalConfig};
use retrieval_embed::HashEmbedder;
use retrieval_query::{HybridRetriever, SearchOptions};
use retrieval_store::Corpus;

/// Hybrid retrieval over a corpus of text chunks
#[derive(Parser)]
#[command(name = "retrieve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON corpus file
    #[arg(short, long, global = true)]
    corpus: Option<PathBuf>,

    /// Embedding dimension for the hash embedder
    #[arg(short, long, global = true, default_value = "64")]
    dimension: usize,

    /// Path to a TOML config file (defaults are searched otherwise)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a hybrid search against the corpus
    Search {
        /// Search query
        query: String,

        /// Maximum number of results (config default when omitted)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Weight of the vector ranking (config default when omitted)
        #[arg(long)]
        vector_weight: Option<f32>,

        /// Weight of the lexical ranking (config default when omitted)
        #[arg(long)]
        lexical_weight: Option<f32>,

        /// Also print the raw per-engine rankings
        #[arg(long)]
        breakdown: bool,
    },

    /// Print corpus statistics
    Stats,
}

/// One corpus file entry: the chunk text plus optional metadata.
#[derive(Debug, Deserialize)]
struct CorpusEntry {
    text: String,

    #[serde(default)]
    metadata: HashMap<String, String>,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => RetrievalConfig::load(path)?,
        None => RetrievalConfig::load_default()?,
    };

    let corpus_path = cli.corpus.unwrap_or_else(|| {
        eprintln!("No corpus file given. Pass one with --corpus corpus.json");
        std::process::exit(1);
    });

    let embedder = HashEmbedder::with_dimension(cli.dimension);
    let corpus = load_corpus(&corpus_path, &embedder)?;

    match cli.command {
        Commands::Search {
            query,
            top_k,
            vector_weight,
            lexical_weight,
            breakdown,
        } => {
            let retriever = HybridRetriever::new(corpus, config)?;
            // Config supplies the defaults; flags override per invocation.
            let mut opts = retriever.default_options();
            if let Some(k) = top_k {
                opts.top_k = k;
            }
            if let Some(w) = vector_weight {
                opts.vector_weight = w;
            }
            if let Some(w) = lexical_weight {
                opts.lexical_weight = w;
            }
            search(&retriever, &embedder, &query, &opts, breakdown)?;
        }
        Commands::Stats => {
            println!("Documents: {}", corpus.count());
            println!("Dimension: {}", corpus.dimension());
        }
    }

    Ok(())
}

/// Load a JSON array of corpus entries and embed every chunk.
fn load_corpus(path: &Path, embedder: &HashEmbedder) -> Result<Corpus, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let entries: Vec<CorpusEntry> = serde_json::from_str(&content)?;

    let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
    let embeddings = embedder.embed(&texts)?;

    let mut corpus = Corpus::new(embedder.dimension());
    for (entry, embedding) in entries.into_iter().zip(embeddings) {
        let mut doc = Document::new(&entry.text, embedding);
        doc.metadata = entry.metadata;
        corpus.add(doc)?;
    }
    Ok(corpus)
}

fn search(
    retriever: &HybridRetriever,
    embedder: &HashEmbedder,
    query: &str,
    opts: &SearchOptions,
    breakdown: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let query_embedding = embedder.embed_query(query)?;

    if breakdown {
        let result = retriever.search_with_breakdown(query, &query_embedding, opts)?;

        println!("Lexical ranking:");
        for r in &result.lexical {
            println!("  {:>2}. [{:.4}] {}", r.rank, r.score, r.text);
        }
        println!("Vector ranking:");
        for r in &result.vector {
            println!("  {:>2}. [{:.4}] {}", r.rank, r.score, r.text);
        }
        println!("Fused:");
        for r in &result.results {
            println!(
                "  {:>2}. [{:.5}] (v:{} l:{}) {}",
                r.final_rank, r.rrf_score, r.vector_rank, r.lexical_rank, r.text
            );
        }
    } else {
        let results = retriever.search(query, &query_embedding, opts)?;
        if results.is_empty() {
            println!("No results.");
            return Ok(());
        }
        for r in &results {
            println!("{:>2}. [{:.5}] {}", r.final_rank, r.rrf_score, r.text);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_corpus_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"text": "corn yield forecast", "metadata": {{"source": "report.pdf"}}}},
                {{"text": "drought stress detection"}}
            ]"#
        )
        .unwrap();

        let embedder = HashEmbedder::with_dimension(16);
        let corpus = load_corpus(file.path(), &embedder).unwrap();

        assert_eq!(corpus.count(), 2);
        assert_eq!(corpus.dimension(), 16);
        let first = corpus.iter().next().unwrap();
        assert_eq!(first.text, "corn yield forecast");
        assert_eq!(first.metadata.get("source").map(String::as_str), Some("report.pdf"));
        assert_eq!(first.embedding.len(), 16);
    }

    #[test]
    fn test_load_corpus_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let embedder = HashEmbedder::new();
        assert!(load_corpus(file.path(), &embedder).is_err());
    }
}
