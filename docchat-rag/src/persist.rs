//! Durable storage for a [`VectorIndex`].
//!
//! An index directory holds two files:
//!
//! - `index.json`: the entries, in insertion order
//! - `manifest.json`: an [`IndexManifest`] describing the entries blob
//!
//! Both are replaced atomically (write to a temp file in the same directory,
//! then rename). The manifest is written last and carries a SHA-256 of the
//! blob, so a crash between the two writes is detected as corruption on the
//! next restore instead of yielding mismatched neighbours.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::document::IndexEntry;
use crate::error::{RagError, Result};
use crate::index::{IndexProfile, VectorIndex};

/// Version of the on-disk layout. Bump on any incompatible change.
pub const INDEX_SCHEMA_VERSION: u32 = 1;

const MANIFEST_FILE: &str = "manifest.json";
const ENTRIES_FILE: &str = "index.json";

/// Metadata written next to a persisted index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// On-disk layout version.
    pub schema_version: u32,
    /// Settings the index was built under.
    #[serde(flatten)]
    pub profile: IndexProfile,
    /// Number of entries in the blob.
    pub entry_count: usize,
    /// Lowercase hex SHA-256 of the entries blob.
    pub checksum: String,
    /// When the index was written.
    pub created_at: DateTime<Utc>,
}

impl VectorIndex {
    /// Write the index to `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PersistenceError`] if any file cannot be written.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| persistence_error(dir, e))?;

        let blob = serde_json::to_vec(self.entries())
            .map_err(|e| persistence_error(&dir.join(ENTRIES_FILE), io::Error::other(e)))?;
        let manifest = IndexManifest {
            schema_version: INDEX_SCHEMA_VERSION,
            profile: self.profile().clone(),
            entry_count: self.len(),
            checksum: checksum(&blob),
            created_at: Utc::now(),
        };
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| persistence_error(&dir.join(MANIFEST_FILE), io::Error::other(e)))?;

        write_atomic(&dir.join(ENTRIES_FILE), &blob)?;
        write_atomic(&dir.join(MANIFEST_FILE), &manifest_bytes)?;

        info!(path = %dir.display(), entry_count = self.len(), "persisted vector index");
        Ok(())
    }

    /// Load a persisted index from `dir`.
    ///
    /// Returns `Ok(None)` when no manifest exists. A manifest that exists
    /// but does not describe a usable index for `expected` is an error,
    /// never a silently empty index.
    ///
    /// # Errors
    ///
    /// - [`RagError::CorruptIndex`] if the manifest or blob is malformed,
    ///   missing, truncated or fails its checksum
    /// - [`RagError::IncompatibleIndex`] if the schema version, metric,
    ///   embedding model or chunking settings differ from `expected`
    /// - [`RagError::DimensionMismatch`] if the dimensionality differs
    /// - [`RagError::PersistenceError`] if a file exists but cannot be read
    pub fn restore(dir: &Path, expected: &IndexProfile) -> Result<Option<Self>> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest_bytes = match fs::read(&manifest_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %dir.display(), "no persisted index");
                return Ok(None);
            }
            Err(e) => return Err(persistence_error(&manifest_path, e)),
        };

        let manifest: IndexManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| corrupt(dir, format!("malformed manifest: {e}")))?;
        check_manifest(&manifest, expected)?;

        let entries_path = dir.join(ENTRIES_FILE);
        let blob = match fs::read(&entries_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(corrupt(dir, "manifest present but entries file is missing"));
            }
            Err(e) => return Err(persistence_error(&entries_path, e)),
        };

        if checksum(&blob) != manifest.checksum {
            return Err(corrupt(dir, "entries checksum does not match manifest"));
        }

        let entries: Vec<IndexEntry> = serde_json::from_slice(&blob)
            .map_err(|e| corrupt(dir, format!("malformed entries: {e}")))?;
        if entries.len() != manifest.entry_count {
            return Err(corrupt(
                dir,
                format!("manifest lists {} entries, found {}", manifest.entry_count, entries.len()),
            ));
        }

        let index = VectorIndex::with_entries(manifest.profile, entries)?;
        info!(path = %dir.display(), entry_count = index.len(), "restored vector index");
        Ok(Some(index))
    }

    /// Delete a persisted index. Succeeds if nothing is there.
    ///
    /// Only the manifest and the entries file are removed; the directory
    /// itself goes too if that leaves it empty. Other files are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PersistenceError`] if an index file exists but
    /// cannot be removed.
    pub fn remove_persisted(dir: &Path) -> Result<()> {
        let mut removed = false;
        // Manifest first, so an interrupted removal reads as "absent".
        for name in [MANIFEST_FILE, ENTRIES_FILE] {
            let path = dir.join(name);
            match fs::remove_file(&path) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(persistence_error(&path, e)),
            }
        }

        let is_empty = fs::read_dir(dir).map(|mut entries| entries.next().is_none()).unwrap_or(false);
        if is_empty {
            if let Err(e) = fs::remove_dir(dir) {
                debug!(path = %dir.display(), error = %e, "left empty index directory in place");
            }
        }

        if removed {
            info!(path = %dir.display(), "removed persisted index");
        }
        Ok(())
    }
}

fn check_manifest(manifest: &IndexManifest, expected: &IndexProfile) -> Result<()> {
    if manifest.schema_version != INDEX_SCHEMA_VERSION {
        return Err(incompatible(
            "schema_version",
            INDEX_SCHEMA_VERSION.to_string(),
            manifest.schema_version.to_string(),
        ));
    }

    let found = &manifest.profile;
    if found.dimensions != expected.dimensions {
        return Err(RagError::DimensionMismatch {
            expected: expected.dimensions,
            found: found.dimensions,
        });
    }
    if found.metric != expected.metric {
        return Err(incompatible("metric", expected.metric.to_string(), found.metric.to_string()));
    }
    if found.embedding_model != expected.embedding_model {
        return Err(incompatible(
            "embedding_model",
            expected.embedding_model.clone(),
            found.embedding_model.clone(),
        ));
    }
    if found.chunk_size != expected.chunk_size {
        return Err(incompatible(
            "chunk_size",
            expected.chunk_size.to_string(),
            found.chunk_size.to_string(),
        ));
    }
    if found.chunk_overlap != expected.chunk_overlap {
        return Err(incompatible(
            "chunk_overlap",
            expected.chunk_overlap.to_string(),
            found.chunk_overlap.to_string(),
        ));
    }
    Ok(())
}

/// Replace `path` with `bytes` so readers see either the old or the new file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(|e| persistence_error(path, e))?;
    file.write_all(bytes).map_err(|e| persistence_error(path, e))?;
    file.as_file().sync_all().map_err(|e| persistence_error(path, e))?;
    file.persist(path).map_err(|e| persistence_error(path, e.error))?;
    Ok(())
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn persistence_error(path: &Path, source: io::Error) -> RagError {
    RagError::PersistenceError { path: path.to_path_buf(), source }
}

fn corrupt(dir: &Path, message: impl Into<String>) -> RagError {
    RagError::CorruptIndex { path: PathBuf::from(dir), message: message.into() }
}

fn incompatible(field: &'static str, expected: String, found: String) -> RagError {
    RagError::IncompatibleIndex { field, expected, found }
}
