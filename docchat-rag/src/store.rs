//! Document store: owns the vector index and decides when to rebuild it.
//!
//! The [`DocumentStore`] coordinates corpus ingestion (list → read → chunk →
//! embed → index → persist) and query execution (embed → search). It tries
//! the persisted index first and falls back to a full rebuild whenever the
//! persisted copy is absent or unusable.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_rag::{DirectoryCorpus, DocumentStore, HashingEmbedder, RagConfig};
//!
//! let store = DocumentStore::builder()
//!     .config(RagConfig::default())
//!     .corpus(Arc::new(DirectoryCorpus::new("docs")))
//!     .embedding_provider(Arc::new(HashingEmbedder::default()))
//!     .persist_dir("vector_store")
//!     .build()?;
//!
//! store.load().await?;
//! let results = store.search("How many countries?").await?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::corpus::CorpusSource;
use crate::document::{IndexEntry, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::{IndexProfile, VectorIndex};

/// Default directory for the persisted index.
pub const DEFAULT_PERSIST_DIR: &str = "vector_store";

/// How [`DocumentStore::load`] obtained its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A persisted index was reused.
    Restored {
        /// Number of entries in the restored index.
        entries: usize,
    },
    /// The corpus was ingested from scratch.
    Built(IngestReport),
}

impl LoadOutcome {
    /// Number of entries in the adopted index.
    pub fn entries(&self) -> usize {
        match self {
            Self::Restored { entries } => *entries,
            Self::Built(report) => report.entries,
        }
    }
}

/// Summary of a full ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents that were read and indexed.
    pub documents: usize,
    /// Documents skipped because they could not be read.
    pub skipped: Vec<String>,
    /// Index entries produced.
    pub entries: usize,
    /// Whether the new index reached durable storage.
    pub persisted: bool,
}

/// Owner of the vector index and its on-disk copy.
///
/// Construct one via [`DocumentStore::builder()`].
pub struct DocumentStore {
    config: RagConfig,
    corpus: Arc<dyn CorpusSource>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    persist_dir: PathBuf,
    index: RwLock<Option<VectorIndex>>,
    load_lock: Mutex<()>,
}

impl DocumentStore {
    /// Create a new [`DocumentStoreBuilder`].
    pub fn builder() -> DocumentStoreBuilder {
        DocumentStoreBuilder::default()
    }

    /// Return a reference to the store configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return the directory the index is persisted to.
    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }

    /// The profile an index must match to be usable by this store.
    ///
    /// Chunk size and overlap come from the chunker when it reports them.
    pub fn profile(&self) -> IndexProfile {
        let (chunk_size, chunk_overlap) = self
            .chunker
            .window()
            .unwrap_or((self.config.chunk_size, self.config.chunk_overlap));
        IndexProfile {
            metric: self.config.metric,
            embedding_model: self.embedding_provider.model_id().to_string(),
            dimensions: self.embedding_provider.dimensions(),
            chunk_size,
            chunk_overlap,
        }
    }

    /// Number of entries in the in-memory index, or `None` if not loaded.
    pub async fn entry_count(&self) -> Option<usize> {
        self.index.read().await.as_ref().map(VectorIndex::len)
    }

    /// Restore the persisted index, or ingest the corpus if that fails.
    ///
    /// A persisted index that is missing, corrupt or built under a different
    /// profile triggers a full rebuild, which is then persisted. Failure to
    /// persist the rebuilt index is logged and reported in the
    /// [`IngestReport`]; the in-memory index is still adopted.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be enumerated or embedding fails.
    pub async fn load(&self) -> Result<LoadOutcome> {
        let _guard = self.load_lock.lock().await;
        self.load_locked().await
    }

    async fn load_locked(&self) -> Result<LoadOutcome> {
        let profile = self.profile();

        match VectorIndex::restore(&self.persist_dir, &profile) {
            Ok(Some(index)) => {
                let entries = index.len();
                *self.index.write().await = Some(index);
                return Ok(LoadOutcome::Restored { entries });
            }
            Ok(None) => {
                info!(path = %self.persist_dir.display(), "no persisted index, ingesting corpus");
            }
            Err(e) => {
                warn!(path = %self.persist_dir.display(), error = %e, "persisted index unusable, rebuilding");
            }
        }

        let (index, mut report) = self.ingest(profile).await?;

        match index.persist(&self.persist_dir) {
            Ok(()) => report.persisted = true,
            Err(e) => {
                warn!(error = %e, "failed to persist vector index, keeping it in memory only");
            }
        }

        *self.index.write().await = Some(index);
        info!(
            documents = report.documents,
            skipped = report.skipped.len(),
            entries = report.entries,
            "built vector index"
        );
        Ok(LoadOutcome::Built(report))
    }

    /// Read, chunk and embed every corpus document into a fresh index.
    async fn ingest(&self, profile: IndexProfile) -> Result<(VectorIndex, IngestReport)> {
        let ids = self.corpus.list()?;
        let mut entries = Vec::new();
        let mut report = IngestReport::default();

        for id in ids {
            let document = match self.corpus.load(&id) {
                Ok(document) => document,
                Err(e) => {
                    warn!(document.id = %id, error = %e, "skipping document");
                    report.skipped.push(id);
                    continue;
                }
            };

            let chunks = self.chunker.chunk(&document);
            report.documents += 1;
            if chunks.is_empty() {
                info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
                continue;
            }

            let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
            let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
                error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
                e
            })?;
            if embeddings.len() != chunks.len() {
                return Err(RagError::EmbeddingError {
                    provider: self.embedding_provider.model_id().to_string(),
                    message: format!(
                        "expected {} embeddings for document '{}', got {}",
                        chunks.len(),
                        document.id,
                        embeddings.len()
                    ),
                });
            }

            let chunk_count = chunks.len();
            entries.extend(chunks.into_iter().zip(embeddings).map(|(c, e)| IndexEntry::new(c, e)));
            info!(document.id = %document.id, chunk_count, "ingested document");
        }

        report.entries = entries.len();
        let index = VectorIndex::with_entries(profile, entries)?;
        Ok((index, report))
    }

    /// Search with the configured `top_k`.
    ///
    /// # Errors
    ///
    /// See [`search_top_k`](Self::search_top_k).
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search_top_k(query, self.config.top_k).await
    }

    /// Return up to `k` chunks ranked by similarity to `query`.
    ///
    /// Loads the index first if it is not in memory yet.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or query embedding fails.
    pub async fn search_top_k(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        self.ensure_loaded().await?;

        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;

        let guard = self.index.read().await;
        let Some(index) = guard.as_ref() else {
            // Reset between loading and querying.
            return Ok(Vec::new());
        };

        let results: Vec<SearchResult> = index
            .query(&query_embedding, k)?
            .into_iter()
            .map(|n| SearchResult { chunk: n.entry.chunk.clone(), score: n.score })
            .collect();

        info!(result_count = results.len(), "query completed");
        Ok(results)
    }

    async fn ensure_loaded(&self) -> Result<()> {
        if self.index.read().await.is_some() {
            return Ok(());
        }
        let _guard = self.load_lock.lock().await;
        if self.index.read().await.is_none() {
            self.load_locked().await?;
        }
        Ok(())
    }

    /// Discard the in-memory and the persisted index.
    ///
    /// The next [`load`](Self::load) or search rebuilds from the corpus.
    /// Calling this when no index exists is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PersistenceError`] if the persisted index exists
    /// but cannot be deleted. The in-memory index is dropped regardless.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.load_lock.lock().await;
        self.index.write().await.take();
        VectorIndex::remove_persisted(&self.persist_dir)
    }

    /// Reset, then load from the corpus.
    ///
    /// # Errors
    ///
    /// See [`reset`](Self::reset) and [`load`](Self::load).
    pub async fn rebuild(&self) -> Result<LoadOutcome> {
        self.reset().await?;
        self.load().await
    }
}

/// Builder for constructing a [`DocumentStore`].
///
/// `corpus` and `embedding_provider` are required. `config` defaults to
/// [`RagConfig::default()`], `persist_dir` to [`DEFAULT_PERSIST_DIR`], and
/// the chunker to a [`FixedSizeChunker`] using the configured size and
/// overlap.
#[derive(Default)]
pub struct DocumentStoreBuilder {
    config: Option<RagConfig>,
    corpus: Option<Arc<dyn CorpusSource>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    persist_dir: Option<PathBuf>,
}

impl DocumentStoreBuilder {
    /// Set the store configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the corpus source.
    pub fn corpus(mut self, corpus: Arc<dyn CorpusSource>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Set the embedding provider used for both ingestion and queries.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Override the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the directory the index is persisted to.
    pub fn persist_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.persist_dir = Some(dir.into());
        self
    }

    /// Build the [`DocumentStore`], validating configuration and required fields.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or
    /// the configuration is invalid.
    pub fn build(self) -> Result<DocumentStore> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let corpus =
            self.corpus.ok_or_else(|| RagError::ConfigError("corpus is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::from_config(&config)?),
        };

        Ok(DocumentStore {
            config,
            corpus,
            embedding_provider,
            chunker,
            persist_dir: self.persist_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_PERSIST_DIR)),
            index: RwLock::new(None),
            load_lock: Mutex::new(()),
        })
    }
}
