use sha2::{Digest, Sha256};

use crate::constants::{SIGNATURE_DIGEST_LEN, SIGNATURE_ENTRY_SEPARATOR, SIGNATURE_FIELD_SEPARATOR};
use crate::models::ThreadNote;

/// Content signature of a note collection.
///
/// One `id, parent, updated-marker` entry per note, sorted so iteration
/// order does not matter, joined and prefixed with the note count. Any
/// parent or timestamp change anywhere yields a different signature.
/// Separator characters inside ids are escaped, so distinct collections
/// never share a signature.
pub fn compute_signature<N: ThreadNote>(notes: &[N]) -> String {
    let mut entries: Vec<String> = notes
        .iter()
        .map(|note| {
            format!(
                "{}{sep}{}{sep}{}",
                escape_field(note.id()),
                escape_field(note.parent_id().unwrap_or("")),
                note.updated_marker(),
                sep = SIGNATURE_FIELD_SEPARATOR
            )
        })
        .collect();
    entries.sort_unstable();

    let mut signature = notes.len().to_string();
    for entry in &entries {
        signature.push(SIGNATURE_ENTRY_SEPARATOR);
        signature.push_str(entry);
    }
    signature
}

fn escape_field(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        if c == '\\' || c == SIGNATURE_FIELD_SEPARATOR || c == SIGNATURE_ENTRY_SEPARATOR {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Short hex digest of a signature, for log lines
pub fn signature_digest(signature: &str) -> String {
    let hash = Sha256::digest(signature.as_bytes());
    let mut digest = hex::encode(hash);
    digest.truncate(SIGNATURE_DIGEST_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;
    use crate::thread_index::test_support::sample_notes;

    #[test]
    fn test_order_independent() {
        let notes = sample_notes();
        let mut shuffled = notes.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);

        assert_eq!(compute_signature(&notes), compute_signature(&shuffled));
    }

    #[test]
    fn test_parent_change_changes_signature() {
        let notes = sample_notes();
        let mut moved = notes.clone();
        moved[3].parent_id = Some("c2".to_string());

        assert_ne!(compute_signature(&notes), compute_signature(&moved));
    }

    #[test]
    fn test_timestamp_change_changes_signature() {
        let notes = sample_notes();
        let mut edited = notes.clone();
        edited[1].updated_at = Some(999);

        assert_ne!(compute_signature(&notes), compute_signature(&edited));
    }

    #[test]
    fn test_updated_at_shadows_timestamp() {
        // Same updated marker from different fields
        let a = vec![Note::root("x", 50)];
        let b = vec![Note::root("x", 10).with_updated_at(50)];
        assert_eq!(compute_signature(&a), compute_signature(&b));
    }

    #[test]
    fn test_separator_in_id_does_not_collide() {
        let joined = vec![Note::root("a\u{1f}b", 1)];
        let split = vec![Note::reply("a", "b\u{1f}", 1)];
        assert_ne!(compute_signature(&joined), compute_signature(&split));

        let backslash = vec![Note::reply("a\\", "b", 1)];
        let plain = vec![Note::reply("a", "\\b", 1)];
        assert_ne!(compute_signature(&backslash), compute_signature(&plain));
    }

    #[test]
    fn test_length_prefix() {
        assert_eq!(compute_signature::<Note>(&[]), "0");
        assert!(compute_signature(&sample_notes()).starts_with('4'));
    }

    #[test]
    fn test_signature_digest() {
        let digest = signature_digest("4");
        assert_eq!(digest.len(), SIGNATURE_DIGEST_LEN);
        assert_eq!(digest, signature_digest("4"));
        assert_ne!(digest, signature_digest("5"));
    }
}
