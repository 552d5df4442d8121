//! Transcript storage with a JSON file behind it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::turn::{ConversationTurn, Transcript};

/// Default transcript file name.
pub const DEFAULT_TRANSCRIPT_FILE: &str = "chat_history.json";

/// The single owner of a conversation transcript.
///
/// Mutations only touch memory; call [`persist`](Self::persist) after each
/// completed exchange to make them durable. A memory created with
/// [`in_memory`](Self::in_memory) never touches disk.
#[derive(Debug, Default)]
pub struct SessionMemory {
    path: Option<PathBuf>,
    turns: Transcript,
}

impl SessionMemory {
    /// A transcript with no backing file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the transcript stored at `path`.
    ///
    /// A missing or malformed file yields an empty transcript; the problem is
    /// logged and startup continues. The next `persist` overwrites a malformed
    /// file.
    pub fn restore(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let turns = match read_transcript(&path) {
            Ok(Some(turns)) => {
                info!(path = %path.display(), turns = turns.len(), "restored transcript");
                turns
            }
            Ok(None) => {
                debug!(path = %path.display(), "no transcript on disk, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable transcript");
                Vec::new()
            }
        };
        Self { path: Some(path), turns }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// All turns, oldest first.
    pub fn all(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Write the whole transcript, replacing the previous file atomically.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_transcript(path, &self.turns)?;
        debug!(path = %path.display(), turns = self.turns.len(), "persisted transcript");
        Ok(())
    }

    /// Drop every turn and delete the backing file.
    ///
    /// The in-memory transcript is emptied even if the file cannot be removed.
    pub fn clear(&mut self) -> Result<()> {
        self.turns.clear();
        let Some(path) = &self.path else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "cleared transcript");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io { path: path.clone(), source }),
        }
    }
}

/// Read a transcript file strictly.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_transcript(path: &Path) -> Result<Option<Transcript>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(SessionError::Io { path: path.to_path_buf(), source }),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| SessionError::Malformed { path: path.to_path_buf(), source })
}

/// Write a transcript as a JSON array via a temp file in the same directory.
pub fn write_transcript(path: &Path, turns: &[ConversationTurn]) -> Result<()> {
    let io_error = |source| SessionError::Io { path: path.to_path_buf(), source };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_error)?;

    let bytes = serde_json::to_vec_pretty(turns)
        .map_err(|source| SessionError::Malformed { path: path.to_path_buf(), source })?;
    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(&bytes).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}
