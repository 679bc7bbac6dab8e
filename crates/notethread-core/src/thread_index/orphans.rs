use std::collections::HashSet;

use crate::models::ThreadNote;

/// Notes whose declared parent is not in the collection
pub fn find_orphans<N: ThreadNote>(notes: &[N]) -> Vec<&N> {
    let known_ids: HashSet<&str> = notes.iter().map(|note| note.id()).collect();

    notes
        .iter()
        .filter(|note| {
            note.parent_id()
                .map(|parent_id| !known_ids.contains(parent_id))
                .unwrap_or(false)
        })
        .collect()
}

/// Ids of the orphans in `notes`, in input order
pub fn find_orphan_ids<N: ThreadNote>(notes: &[N]) -> Vec<String> {
    find_orphans(notes)
        .into_iter()
        .map(|note| note.id().to_string())
        .collect()
}

/// Promote each orphan to a thread root. Mutates the caller's notes; the
/// caller persists them and invalidates any index cache.
///
/// Returns how many notes actually changed.
pub fn repair_orphans<'a, N, I>(orphans: I) -> usize
where
    N: ThreadNote + 'a,
    I: IntoIterator<Item = &'a mut N>,
{
    let mut repaired = 0;
    for note in orphans {
        if let Some(missing_parent) = note.parent_id().map(str::to_string) {
            note.set_parent_id(None);
            repaired += 1;
            tracing::info!(
                "orphans: promoted {} to root (parent {} not found)",
                note.id(),
                missing_parent
            );
        }
    }
    repaired
}

/// Find and repair every orphan in `notes` in one go
pub fn repair_all_orphans<N: ThreadNote>(notes: &mut [N]) -> usize {
    let orphan_ids: HashSet<String> = find_orphan_ids(notes).into_iter().collect();
    if orphan_ids.is_empty() {
        return 0;
    }
    repair_orphans(
        notes
            .iter_mut()
            .filter(|note| orphan_ids.contains(note.id())),
    )
}
