//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`], which
//! splits text into overlapping windows of a fixed number of characters.

use crate::config::RagConfig;
use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text, offsets and metadata.
/// Embeddings are attached later by the document store.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;

    /// `(chunk_size, chunk_overlap)` in characters, if the strategy has them.
    ///
    /// Recorded in the index manifest so a change of chunking forces a
    /// rebuild. Chunkers returning `None` are recorded with the store's
    /// configured values.
    fn window(&self) -> Option<(usize, usize)> {
        None
    }
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// Consecutive chunks share exactly `chunk_overlap` characters, and the last
/// chunk ends at the end of the document (it may be shorter than
/// `chunk_size`). Chunk IDs are generated as `{document_id}_{chunk_index}`.
/// Each chunk inherits the parent document's metadata plus a `chunk_index`
/// field.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 200)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Create a chunker from the chunking fields of a [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Maximum number of characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of characters shared by consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Chunker for FixedSizeChunker {
    fn window(&self) -> Option<(usize, usize)> {
        Some((self.chunk_size, self.chunk_overlap))
    }

    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let text = &document.text;
        // Byte offset of every char boundary, including the end of the text.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_len = boundaries.len() - 1;
        let step = self.chunk_size - self.chunk_overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        loop {
            let end = (start + self.chunk_size).min(char_len);

            let mut metadata = document.metadata.clone();
            metadata.insert("chunk_index".to_string(), chunk_index.to_string());

            chunks.push(Chunk {
                id: format!("{}_{chunk_index}", document.id),
                text: text[boundaries[start]..boundaries[end]].to_string(),
                metadata,
                document_id: document.id.clone(),
                start,
                end,
            });

            if end == char_len {
                break;
            }
            chunk_index += 1;
            start += step;
        }

        chunks
    }
}
