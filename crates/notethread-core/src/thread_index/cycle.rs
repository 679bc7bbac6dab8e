use std::collections::HashSet;

use super::builder::ThreadIndex;

/// Would making `candidate_parent_id` the parent of `child_id` close a loop?
///
/// Must be given the index as it was *before* the change. Walks the parent
/// chain up from the candidate; finding `child_id` on it means the candidate
/// is one of the child's own descendants. Self-parenting is always a cycle.
///
/// The walk is bounded by a visited set only, so chains of any depth are
/// followed to the end. A walk that repeats an id is aborted and reported as
/// a cycle: the chain is already corrupt and must not grow.
pub fn would_introduce_cycle(
    child_id: &str,
    candidate_parent_id: &str,
    index: &ThreadIndex,
) -> bool {
    if child_id == candidate_parent_id {
        return true;
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = candidate_parent_id;

    loop {
        if current == child_id {
            return true;
        }
        if !visited.insert(current) {
            tracing::warn!(
                "cycle_guard: existing parent loop at {} while checking {} -> {}",
                current,
                child_id,
                candidate_parent_id
            );
            return true;
        }

        match index.parent(current) {
            Some(parent_id) => current = parent_id,
            // Reached a root or a dangling parent
            None => return false,
        }
    }
}
