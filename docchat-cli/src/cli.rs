use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use docchat_rag::SimilarityMetric;

/// Chat with a local document corpus
#[derive(Parser, Debug)]
#[command(name = "docchat")]
#[command(version)]
#[command(about = "Retrieval-augmented chat over a directory of text documents", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: Options,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start an interactive chat (the default)
    Chat,

    /// Rebuild the vector index from the corpus
    Index,

    /// Print the chunks most similar to a query
    Search {
        /// Query text
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,

        /// Number of results (defaults to --top-k)
        #[arg(short = 'k', long = "limit")]
        limit: Option<usize>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Options {
    /// Directory of .txt documents to index
    #[arg(long, env = "DOCCHAT_DOCS_DIR", default_value = "docs", global = true)]
    pub docs_dir: PathBuf,

    /// Where the vector index is persisted
    #[arg(long, env = "DOCCHAT_STORE_DIR", default_value = "vector_store", global = true)]
    pub store_dir: PathBuf,

    /// Transcript file
    #[arg(long, env = "DOCCHAT_HISTORY_FILE", default_value = "chat_history.json", global = true)]
    pub history_file: PathBuf,

    /// Ollama server address
    #[arg(long, env = "DOCCHAT_OLLAMA_URL", default_value = "http://localhost:11434", global = true)]
    pub ollama_url: String,

    /// Completion model
    #[arg(long, env = "DOCCHAT_MODEL", default_value = "llama3", global = true)]
    pub model: String,

    /// Sampling temperature
    #[arg(long, env = "DOCCHAT_TEMPERATURE", default_value_t = 0.7, global = true)]
    pub temperature: f32,

    /// Embedding model
    #[arg(long, env = "DOCCHAT_EMBEDDING_MODEL", default_value = "all-minilm", global = true)]
    pub embedding_model: String,

    /// Vector size produced by the embedding model
    #[arg(long, env = "DOCCHAT_EMBEDDING_DIMENSIONS", default_value_t = 384, global = true)]
    pub embedding_dimensions: usize,

    /// Characters per chunk
    #[arg(long, env = "DOCCHAT_CHUNK_SIZE", default_value_t = 1000, global = true)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, env = "DOCCHAT_CHUNK_OVERLAP", default_value_t = 200, global = true)]
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    #[arg(long, env = "DOCCHAT_TOP_K", default_value_t = 3, global = true)]
    pub top_k: usize,

    /// Similarity metric for the index
    #[arg(long, env = "DOCCHAT_METRIC", value_enum, default_value_t = MetricArg::Cosine, global = true)]
    pub metric: MetricArg,

    /// Prior turns kept in the prompt
    #[arg(long, env = "DOCCHAT_HISTORY_TURNS", default_value_t = 10, global = true)]
    pub history_turns: usize,

    /// Seconds to wait for a completion
    #[arg(long, env = "DOCCHAT_TIMEOUT_SECS", default_value_t = 120, global = true)]
    pub timeout_secs: u64,

    /// Use local hashing embeddings and no language model
    #[arg(long, env = "DOCCHAT_OFFLINE", global = true)]
    pub offline: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricArg {
    Cosine,
    L2,
}

impl From<MetricArg> for SimilarityMetric {
    fn from(metric: MetricArg) -> Self {
        match metric {
            MetricArg::Cosine => SimilarityMetric::Cosine,
            MetricArg::L2 => SimilarityMetric::L2,
        }
    }
}
