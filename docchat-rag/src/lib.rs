//! # docchat-rag
//!
//! The retrieval half of docchat: turn a corpus of text documents into a
//! persisted vector index and search it.
//!
//! ## Overview
//!
//! - [`FixedSizeChunker`] splits documents into overlapping character windows
//! - [`EmbeddingProvider`] maps text to vectors ([`HashingEmbedder`] offline,
//!   `OllamaEmbeddingProvider` behind the `ollama` feature)
//! - [`VectorIndex`] ranks entries under a fixed [`SimilarityMetric`] and
//!   round-trips through a checksummed, versioned on-disk format
//! - [`DocumentStore`] decides when to restore and when to rebuild
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docchat_rag::{DirectoryCorpus, DocumentStore, HashingEmbedder};
//!
//! let store = DocumentStore::builder()
//!     .corpus(Arc::new(DirectoryCorpus::new("docs")))
//!     .embedding_provider(Arc::new(HashingEmbedder::default()))
//!     .build()?;
//! let hits = store.search("How many countries?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod persist;
pub mod store;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use corpus::{CorpusSource, DirectoryCorpus, InMemoryCorpus};
pub use document::{Chunk, Document, IndexEntry, SearchResult};
pub use embedding::{EmbeddingProvider, HashingEmbedder};
pub use error::{RagError, Result};
pub use index::{IndexProfile, Neighbor, SimilarityMetric, VectorIndex};
pub use persist::{INDEX_SCHEMA_VERSION, IndexManifest};
pub use store::{DEFAULT_PERSIST_DIR, DocumentStore, DocumentStoreBuilder, IngestReport, LoadOutcome};

#[cfg(feature = "ollama")]
pub use ollama::OllamaEmbeddingProvider;
