//! JSON-file persistence for the note collection.
//!
//! This is the storage side of the thread index: it produces a fresh note
//! list for the index to consume and writes mutations back. The index itself
//! never calls in here.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::constants::NOTES_FILE_NAME;
use crate::models::Note;

#[derive(Debug, thiserror::Error)]
pub enum NoteStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed notes file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Duplicate note id: {0}")]
    DuplicateId(String),
}

/// Returns the path to the notes file inside `data_dir`.
pub fn notes_path(data_dir: &Path) -> PathBuf {
    data_dir.join(NOTES_FILE_NAME)
}

/// Load every note from `path`.
///
/// A missing file is an empty collection. Duplicate ids are rejected since
/// the index keys everything by id.
pub fn load_notes(path: &Path) -> Result<Vec<Note>, NoteStoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("notes_file: {} not found, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(NoteStoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let notes: Vec<Note> =
        serde_json::from_slice(&bytes).map_err(|source| NoteStoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let mut seen = HashSet::with_capacity(notes.len());
    for note in &notes {
        if !seen.insert(note.id.as_str()) {
            return Err(NoteStoreError::DuplicateId(note.id.clone()));
        }
    }

    Ok(notes)
}

/// Write `notes` to `path` as pretty JSON.
///
/// Uses a write-to-temp-then-rename pattern so an interrupted write never
/// leaves a truncated notes file behind.
pub fn save_notes(path: &Path, notes: &[Note]) -> Result<(), NoteStoreError> {
    let io_err = |source: std::io::Error| NoteStoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let bytes = serde_json::to_vec_pretty(notes).map_err(|source| NoteStoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let temp_file = path.with_extension("json.tmp");
    std::fs::write(&temp_file, &bytes).map_err(io_err)?;
    std::fs::rename(&temp_file, path).map_err(io_err)?;

    tracing::debug!("notes_file: saved {} notes to {}", notes.len(), path.display());
    Ok(())
}
