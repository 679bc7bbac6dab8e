//! Application-wide constants
//!
//! Centralized location for limits and file names that are used across
//! multiple modules.

/// Upper bound on hops for any ancestor walk. Thread depth is user-controlled,
/// so a corrupt parent chain must never be followed indefinitely.
pub const MAX_ANCESTOR_HOPS: usize = 512;

/// File name of the persisted note collection inside the data directory
pub const NOTES_FILE_NAME: &str = "notes.json";

/// Default data directory name when none is configured
pub const DEFAULT_DATA_DIR: &str = "notethread_data";

// Signature separators (ASCII unit/record separators, escaped inside fields)
pub const SIGNATURE_FIELD_SEPARATOR: char = '\u{1f}';
pub const SIGNATURE_ENTRY_SEPARATOR: char = '\u{1e}';

/// Number of hex chars of the signature digest shown in log lines
pub const SIGNATURE_DIGEST_LEN: usize = 12;
