//! Corpus sources: where the document store gets its documents from.
//!
//! The store only sees the [`CorpusSource`] trait, so tests can supply
//! documents from memory via [`InMemoryCorpus`] while the application reads a
//! directory of text files via [`DirectoryCorpus`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::{RagError, Result};

/// An enumerable collection of documents.
pub trait CorpusSource: Send + Sync {
    /// Identifiers of every candidate document, in ingestion order.
    ///
    /// # Errors
    ///
    /// Returns an error only when the corpus as a whole cannot be enumerated.
    fn list(&self) -> Result<Vec<String>>;

    /// Load a single document by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorpusError`] if this document is unreadable or in
    /// an unsupported format. Callers skip such documents.
    fn load(&self, id: &str) -> Result<Document>;
}

/// A directory of text files, walked recursively.
///
/// Document IDs are paths relative to the root using `/` separators, sorted
/// so that ingestion order is stable across runs.
#[derive(Debug, Clone)]
pub struct DirectoryCorpus {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectoryCorpus {
    /// Create a corpus rooted at `root` accepting `.txt` files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), extensions: vec!["txt".to_string()] }
    }

    /// Replace the accepted file extensions (without the leading dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(|e| e.into().to_lowercase()).collect();
        self
    }

    /// The corpus root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

impl CorpusSource for DirectoryCorpus {
    fn list(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|e| RagError::PersistenceError {
                path: self.root.clone(),
                source: e,
            })?;
            info!(path = %self.root.display(), "created empty corpus directory");
            return Ok(Vec::new());
        }
        if !self.root.is_dir() {
            return Err(RagError::ConfigError(format!(
                "corpus root {} is not a directory",
                self.root.display()
            )));
        }

        let mut ids = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable corpus entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.accepts(entry.path()))
            .filter_map(|entry| {
                entry.path().strip_prefix(&self.root).ok().map(|rel| {
                    rel.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
            })
            .collect::<Vec<_>>();

        ids.sort();
        debug!(path = %self.root.display(), document_count = ids.len(), "listed corpus");
        Ok(ids)
    }

    fn load(&self, id: &str) -> Result<Document> {
        let path = self.root.join(id);
        let bytes = fs::read(&path).map_err(|e| RagError::CorpusError {
            document: id.to_string(),
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let text = String::from_utf8(bytes).map_err(|_| RagError::CorpusError {
            document: id.to_string(),
            message: "unsupported format: not valid UTF-8 text".to_string(),
        })?;

        Ok(Document {
            id: id.to_string(),
            text,
            metadata: HashMap::from([("source".to_string(), path.display().to_string())]),
            source_uri: Some(path.display().to_string()),
        })
    }
}

/// A fixed set of documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    documents: Vec<Document>,
}

impl InMemoryCorpus {
    /// Create a corpus from the given documents, kept in the given order.
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Append a document.
    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }
}

impl CorpusSource for InMemoryCorpus {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.documents.iter().map(|d| d.id.clone()).collect())
    }

    fn load(&self, id: &str) -> Result<Document> {
        self.documents.iter().find(|d| d.id == id).cloned().ok_or_else(|| {
            RagError::CorpusError { document: id.to_string(), message: "no such document".into() }
        })
    }
}
