use super::builder::ThreadIndex;
use super::cycle::would_introduce_cycle;
use crate::models::ThreadNote;

/// Point `note` at `new_parent_id`, or make it a root when `None`.
///
/// With an index, the move is checked against the pre-change index first.
/// Without one the caller is assumed to have validated already. Promotion to
/// root always succeeds.
///
/// On a rejected move the note's parent is cleared (the note becomes a root)
/// and `false` is returned. Callers that rely on the previous parent must
/// re-read it before calling. The index cache is never touched here.
pub fn change_parent<N: ThreadNote>(
    note: &mut N,
    new_parent_id: Option<&str>,
    index: Option<&ThreadIndex>,
) -> bool {
    let Some(new_parent_id) = new_parent_id else {
        note.set_parent_id(None);
        return true;
    };

    if let Some(index) = index {
        if would_introduce_cycle(note.id(), new_parent_id, index) {
            tracing::debug!(
                "reparent: rejected {} -> {} (would create a cycle)",
                note.id(),
                new_parent_id
            );
            note.set_parent_id(None);
            return false;
        }
    }

    note.set_parent_id(Some(new_parent_id.to_string()));
    true
}
