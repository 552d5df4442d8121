//! Data types for documents, chunks, index entries and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document (a relative path for directory corpora).
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document with no metadata and no source URI.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: HashMap::new(), source_uri: None }
    }
}

/// A contiguous segment of a [`Document`].
///
/// `start` and `end` are character offsets (not byte offsets) into the
/// parent document's text, `end` exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Key-value metadata inherited from the parent document plus chunk-specific fields.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// First character offset covered by this chunk.
    pub start: usize,
    /// One past the last character offset covered by this chunk.
    pub end: usize,
}

/// A [`Chunk`] paired with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// Stable identifier, equal to the chunk ID.
    pub id: String,
    /// The indexed chunk.
    pub chunk: Chunk,
    /// The vector embedding of the chunk text.
    pub embedding: Vec<f32>,
}

impl IndexEntry {
    /// Pair a chunk with its embedding.
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self { id: chunk.id.clone(), chunk, embedding }
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
