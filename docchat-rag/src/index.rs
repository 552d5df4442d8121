//! In-memory vector index with a fixed similarity metric.
//!
//! [`VectorIndex`] keeps its entries in insertion order and answers
//! nearest-neighbour queries by exhaustive scan. Persistence lives in
//! [`crate::persist`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::IndexEntry;
use crate::error::{RagError, Result};

/// The similarity function used to rank entries.
///
/// An index is built and queried under a single metric; the metric is
/// recorded in the persisted manifest and checked on restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity, in `[-1, 1]`.
    #[default]
    Cosine,
    /// Negated Euclidean distance, so that higher is still closer.
    L2,
}

impl SimilarityMetric {
    /// Score two vectors of equal length. Higher means more similar.
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        let score = match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::L2 => -a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt(),
        };
        if score.is_nan() { f32::NEG_INFINITY } else { score }
    }

    /// Stable lowercase name, as written to the manifest.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::L2 => "l2",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Everything that must agree between the index and the code querying it.
///
/// A persisted index is only reusable when its profile equals the profile
/// the store would build today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexProfile {
    /// Similarity metric used for ranking.
    pub metric: SimilarityMetric,
    /// Identity of the embedding model that produced the vectors.
    pub embedding_model: String,
    /// Dimensionality of every vector in the index.
    pub dimensions: usize,
    /// Chunk size the corpus was split with.
    pub chunk_size: usize,
    /// Chunk overlap the corpus was split with.
    pub chunk_overlap: usize,
}

/// A ranked query hit borrowed from the index.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    /// The matching entry.
    pub entry: &'a IndexEntry,
    /// Its similarity to the query vector.
    pub score: f32,
}

/// An ordered collection of [`IndexEntry`] values with nearest-neighbour search.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    profile: IndexProfile,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Create an empty index for the given profile.
    pub fn new(profile: IndexProfile) -> Self {
        Self { profile, entries: Vec::new() }
    }

    /// Create an index holding `entries`, validating their dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if any embedding does not have
    /// `profile.dimensions` components.
    pub fn with_entries(profile: IndexProfile, entries: Vec<IndexEntry>) -> Result<Self> {
        let mut index = Self::new(profile);
        index.build(entries)?;
        Ok(index)
    }

    /// Replace the contents of the index wholesale.
    ///
    /// On error the index is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] for the first entry whose
    /// embedding length differs from the profile.
    pub fn build(&mut self, entries: Vec<IndexEntry>) -> Result<()> {
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != self.profile.dimensions) {
            return Err(RagError::DimensionMismatch {
                expected: self.profile.dimensions,
                found: bad.embedding.len(),
            });
        }
        self.entries = entries;
        Ok(())
    }

    /// Return up to `k` entries ranked by descending similarity to `vector`.
    ///
    /// Entries with equal scores keep their insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if `vector` does not match the
    /// index dimensionality.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor<'_>>> {
        if vector.len() != self.profile.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.profile.dimensions,
                found: vector.len(),
            });
        }

        let metric = self.profile.metric;
        let mut scored: Vec<Neighbor<'_>> = self
            .entries
            .iter()
            .map(|entry| Neighbor { entry, score: metric.score(&entry.embedding, vector) })
            .collect();

        // `sort_by` is stable, which gives the insertion-order tie-break.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    /// Drop every entry, keeping the profile.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The profile this index was built under.
    pub fn profile(&self) -> &IndexProfile {
        &self.profile
    }

    /// The entries in insertion order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
