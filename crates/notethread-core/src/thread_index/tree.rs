use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use super::builder::ThreadIndex;
use crate::models::{NoteLookup, ThreadNote};

/// One node of a thread tree view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadNode {
    pub id: String,
    /// Owned copy of the index's child list
    pub child_ids: Vec<String>,
    pub parent_id: Option<String>,
    /// Absolute depth from the index (not relative to the tree root)
    pub depth: usize,
    pub descendant_count: usize,
}

/// A thread rooted at an arbitrary note, with aggregate stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadTree {
    pub root_id: String,
    pub nodes: HashMap<String, ThreadNode>,
    pub total_count: usize,
    /// Max absolute depth over the included nodes
    pub max_depth: usize,
    /// Latest updated marker among included notes that the lookup resolved
    pub last_updated: Option<u64>,
}

/// Build the tree view under `root_id`.
///
/// A root id unknown to the index yields a single childless node with
/// depth and descendant count of zero.
pub fn build_thread_tree<L: NoteLookup>(root_id: &str, index: &ThreadIndex, lookup: &L) -> ThreadTree {
    let mut nodes: HashMap<String, ThreadNode> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::from([root_id]);
    let mut max_depth = 0;
    let mut last_updated: Option<u64> = None;

    while let Some(id) = queue.pop_front() {
        // A corrupt index can list a node twice
        if nodes.contains_key(id) {
            continue;
        }

        let child_ids = index.children(id).to_vec();
        let depth = index.depth(id);
        max_depth = max_depth.max(depth);

        if let Some(note) = lookup.get_note(id) {
            let marker = note.updated_marker();
            last_updated = Some(last_updated.map_or(marker, |current| current.max(marker)));
        }

        for child_id in index.children(id) {
            if !nodes.contains_key(child_id.as_str()) {
                queue.push_back(child_id.as_str());
            }
        }

        nodes.insert(
            id.to_string(),
            ThreadNode {
                id: id.to_string(),
                child_ids,
                parent_id: index.parent(id).map(str::to_string),
                depth,
                descendant_count: index.descendant_count(id),
            },
        );
    }

    ThreadTree {
        root_id: root_id.to_string(),
        total_count: nodes.len(),
        nodes,
        max_depth,
        last_updated,
    }
}

impl ThreadTree {
    pub fn node(&self, id: &str) -> Option<&ThreadNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> Option<&ThreadNode> {
        self.nodes.get(&self.root_id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Depth of `id` counted from this tree's own root (root = 0)
    pub fn relative_depth(&self, id: &str) -> Option<usize> {
        let node = self.nodes.get(id)?;
        let root_depth = self.root().map(|root| root.depth).unwrap_or(0);
        Some(node.depth.saturating_sub(root_depth))
    }

    /// Node ids in display order: depth-first, children in index order.
    /// Each entry carries the depth relative to the tree root.
    pub fn display_order(&self) -> Vec<(&str, usize)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut seen = std::collections::HashSet::new();
        let mut stack: Vec<(&str, usize)> = vec![(self.root_id.as_str(), 0)];

        while let Some((id, level)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push((id, level));
            if let Some(node) = self.nodes.get(id) {
                for child_id in node.child_ids.iter().rev() {
                    stack.push((child_id.as_str(), level + 1));
                }
            }
        }

        order
    }
}
