use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The slice of a note the thread index cares about.
///
/// The storage layer owns the full note (content, attachments, category...);
/// the index only ever reads identity, the parent pointer and timestamps.
pub trait ThreadNote {
    fn id(&self) -> &str;

    /// Declared parent, `None` for a thread root
    fn parent_id(&self) -> Option<&str>;

    /// Primary timestamp (unix milliseconds)
    fn timestamp(&self) -> u64;

    /// Explicit last-edit timestamp, if the note tracks one
    fn updated_at(&self) -> Option<u64> {
        None
    }

    /// Replace the parent pointer. Only orphan repair and reparenting call this.
    fn set_parent_id(&mut self, parent_id: Option<String>);

    /// The "updated" marker used by the cache signature and tree summaries
    fn updated_marker(&self) -> u64 {
        self.updated_at().unwrap_or_else(|| self.timestamp())
    }
}

/// A note as persisted by the note file store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Note {
    /// A thread root (no parent)
    pub fn root(id: impl Into<String>, timestamp: u64) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            timestamp,
            updated_at: None,
            title: String::new(),
            content: String::new(),
        }
    }

    /// A reply to `parent_id`
    pub fn reply(id: impl Into<String>, parent_id: impl Into<String>, timestamp: u64) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::root(id, timestamp)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_updated_at(mut self, updated_at: u64) -> Self {
        self.updated_at = Some(updated_at);
        self
    }
}

impl ThreadNote for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn updated_at(&self) -> Option<u64> {
        self.updated_at
    }

    fn set_parent_id(&mut self, parent_id: Option<String>) {
        self.parent_id = parent_id;
    }
}

/// Resolves a note id to the note itself (used for tree summaries)
pub trait NoteLookup {
    type Note: ThreadNote;

    fn get_note(&self, id: &str) -> Option<&Self::Note>;
}

impl<N: ThreadNote> NoteLookup for HashMap<String, N> {
    type Note = N;

    fn get_note(&self, id: &str) -> Option<&N> {
        self.get(id)
    }
}

impl<'a, N: ThreadNote> NoteLookup for HashMap<&'a str, &'a N> {
    type Note = N;

    fn get_note(&self, id: &str) -> Option<&N> {
        self.get(id).copied()
    }
}

/// Borrowing id -> note map over a note slice. Later duplicates win.
pub fn lookup_by_id<N: ThreadNote>(notes: &[N]) -> HashMap<&str, &N> {
    notes.iter().map(|note| (note.id(), note)).collect()
}
