use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::models::ThreadNote;

/// Forward/backward adjacency over a note collection, plus per-node depth and
/// descendant counts.
///
/// Rebuilt wholesale from the full collection; never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThreadIndex {
    /// parent id -> child ids, in input order. Keyed by whatever parent id was
    /// declared, so dangling parents get an entry too.
    pub children_map: HashMap<String, Vec<String>>,

    /// child id -> declared parent id (only notes that declare one)
    pub parent_map: HashMap<String, String>,

    /// Notes without a declared parent. A note with a dangling parent is NOT
    /// a root.
    pub root_ids: HashSet<String>,

    /// Hops from the nearest root. Only nodes reachable from a root.
    pub depth_map: HashMap<String, usize>,

    /// Transitive reply count. Only nodes reachable from a root.
    pub descendant_count_map: HashMap<String, usize>,
}

/// Build the index for `notes`. Total and pure: empty input gives an empty
/// index, dangling or cyclic parent chains are simply left unreachable.
pub fn build_index<N: ThreadNote>(notes: &[N]) -> ThreadIndex {
    let mut index = ThreadIndex::default();
    // Roots in input order so traversal order is deterministic
    let mut root_order: Vec<&str> = Vec::new();

    for note in notes {
        match note.parent_id() {
            Some(parent_id) => {
                index
                    .children_map
                    .entry(parent_id.to_string())
                    .or_default()
                    .push(note.id().to_string());
                index
                    .parent_map
                    .insert(note.id().to_string(), parent_id.to_string());
            }
            None => {
                if index.root_ids.insert(note.id().to_string()) {
                    root_order.push(note.id());
                }
            }
        }
    }

    index.depth_map = compute_depths(&index.children_map, &root_order);
    index.descendant_count_map = compute_descendant_counts(&index.children_map, &root_order);
    index
}

/// Breadth-first from all roots at once. First visit wins, so a node that is
/// listed under two parents (duplicate ids) keeps its shallowest depth.
fn compute_depths(
    children_map: &HashMap<String, Vec<String>>,
    roots: &[&str],
) -> HashMap<String, usize> {
    let mut depths = HashMap::new();
    let mut queue: VecDeque<(&str, usize)> = roots.iter().map(|id| (*id, 0)).collect();

    while let Some((id, depth)) = queue.pop_front() {
        if depths.contains_key(id) {
            continue;
        }
        depths.insert(id.to_string(), depth);

        if let Some(children) = children_map.get(id) {
            for child_id in children {
                if !depths.contains_key(child_id.as_str()) {
                    queue.push_back((child_id.as_str(), depth + 1));
                }
            }
        }
    }

    depths
}

/// Pre-order walk with an explicit stack, then a right-to-left fold so every
/// child is summed before its parent.
fn compute_descendant_counts(
    children_map: &HashMap<String, Vec<String>>,
    roots: &[&str],
) -> HashMap<String, usize> {
    let mut order: Vec<&str> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = roots.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        order.push(id);

        if let Some(children) = children_map.get(id) {
            // Reverse so the first child is popped first
            for child_id in children.iter().rev() {
                if !visited.contains(child_id.as_str()) {
                    stack.push(child_id.as_str());
                }
            }
        }
    }

    let mut counts: HashMap<String, usize> = HashMap::with_capacity(order.len());
    for id in order.iter().rev() {
        let count = children_map
            .get(*id)
            .map(|children| {
                children
                    .iter()
                    .map(|child_id| 1 + counts.get(child_id).copied().unwrap_or(0))
                    .sum::<usize>()
            })
            .unwrap_or(0);
        counts.insert(id.to_string(), count);
    }

    counts
}

impl ThreadIndex {
    pub fn is_empty(&self) -> bool {
        self.root_ids.is_empty() && self.parent_map.is_empty()
    }

    /// Number of distinct notes the index was built from (roots + replies)
    pub fn note_count(&self) -> usize {
        let replies = self
            .parent_map
            .keys()
            .filter(|id| !self.root_ids.contains(*id))
            .count();
        self.root_ids.len() + replies
    }

    /// Direct children in input order (empty when none)
    pub fn children(&self, id: &str) -> &[String] {
        self.children_map.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parent_map.get(id).map(String::as_str)
    }

    pub fn depth(&self, id: &str) -> usize {
        self.depth_map.get(id).copied().unwrap_or(0)
    }

    pub fn descendant_count(&self, id: &str) -> usize {
        self.descendant_count_map.get(id).copied().unwrap_or(0)
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.root_ids.contains(id)
    }

    /// Deepest depth among reachable nodes
    pub fn max_depth(&self) -> usize {
        self.depth_map.values().copied().max().unwrap_or(0)
    }

    /// Parent chain of `id`, nearest first. Stops at a root, at a dangling
    /// parent, on the first repeated id, or after `max_hops` hops.
    pub fn ancestors(&self, id: &str, max_hops: usize) -> Vec<String> {
        let mut ancestors = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut current = id;

        while let Some(parent_id) = self.parent_map.get(current) {
            if ancestors.len() >= max_hops {
                tracing::warn!(
                    "thread_index: ancestor walk from {} exceeded {} hops",
                    id,
                    max_hops
                );
                break;
            }
            // Cycle detection
            if !seen.insert(parent_id.as_str()) {
                tracing::warn!("thread_index: parent chain of {} loops at {}", id, parent_id);
                break;
            }
            ancestors.push(parent_id.clone());
            current = parent_id;
        }

        ancestors
    }

    /// Topmost ancestor of `id` (itself when it has no parent). For an orphan
    /// this is the dangling parent id.
    pub fn thread_root_of(&self, id: &str, max_hops: usize) -> String {
        self.ancestors(id, max_hops)
            .pop()
            .unwrap_or_else(|| id.to_string())
    }

    /// Every transitive reply of `id`, breadth-first, each listed once.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut descendants = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([id]);
        let mut queue: VecDeque<&str> = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for child_id in self.children(current) {
                if visited.insert(child_id.as_str()) {
                    descendants.push(child_id.clone());
                    queue.push_back(child_id.as_str());
                }
            }
        }

        descendants
    }
}
