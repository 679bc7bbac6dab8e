//! Signature-checked cache of the thread index and per-root tree views.
//!
//! One `IndexCache` per workspace. Create it when the workspace opens, call
//! [`IndexCache::clear`] when it closes. The UI calls `get_index` every
//! redraw; that is a signature comparison unless the notes changed.
//!
//! Trees are always dropped together with the index they were built from.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::builder::{build_index, ThreadIndex};
use super::signature::{compute_signature, signature_digest};
use super::tree::{build_thread_tree, ThreadTree};
use crate::config::CoreConfig;
use crate::constants::MAX_ANCESTOR_HOPS;
use crate::models::{NoteLookup, ThreadNote};

#[derive(Debug)]
pub struct IndexCache {
    index: Option<Arc<ThreadIndex>>,
    /// Signature of the collection `index` was built from
    signature: Option<String>,
    tree_cache: HashMap<String, Arc<ThreadTree>>,
    max_ancestor_hops: usize,
}

impl Default for IndexCache {
    fn default() -> Self {
        Self {
            index: None,
            signature: None,
            tree_cache: HashMap::new(),
            max_ancestor_hops: MAX_ANCESTOR_HOPS,
        }
    }
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &CoreConfig) -> Self {
        Self {
            max_ancestor_hops: config.max_ancestor_hops,
            ..Self::default()
        }
    }

    /// Index for `notes`, rebuilt only when their signature changed.
    /// Unchanged notes return the very same `Arc`.
    pub fn get_index<N: ThreadNote>(&mut self, notes: &[N]) -> Arc<ThreadIndex> {
        let signature = compute_signature(notes);

        if let (Some(index), Some(current)) = (&self.index, &self.signature) {
            if *current == signature {
                return Arc::clone(index);
            }
        }

        self.install(notes, signature)
    }

    /// Rebuild unconditionally, skipping the signature check. Use after a
    /// known mutation.
    pub fn rebuild<N: ThreadNote>(&mut self, notes: &[N]) -> Arc<ThreadIndex> {
        let signature = compute_signature(notes);
        self.install(notes, signature)
    }

    fn install<N: ThreadNote>(&mut self, notes: &[N], signature: String) -> Arc<ThreadIndex> {
        let index = Arc::new(build_index(notes));

        tracing::debug!(
            "index_cache: rebuilt index ({} notes, {} roots, signature {})",
            notes.len(),
            index.root_ids.len(),
            signature_digest(&signature)
        );

        // Every cached tree was built against the old index
        self.tree_cache.clear();
        self.signature = Some(signature);
        self.index = Some(Arc::clone(&index));
        index
    }

    /// Tree view rooted at `root_id`, built on first request and cached
    /// until invalidated or the index is rebuilt.
    pub fn get_thread_tree<L: NoteLookup>(
        &mut self,
        root_id: &str,
        index: &ThreadIndex,
        lookup: &L,
    ) -> Arc<ThreadTree> {
        if let Some(tree) = self.tree_cache.get(root_id) {
            return Arc::clone(tree);
        }

        let tree = Arc::new(build_thread_tree(root_id, index, lookup));
        self.tree_cache
            .insert(root_id.to_string(), Arc::clone(&tree));
        tree
    }

    /// Drop one cached tree. Returns whether it was cached.
    pub fn invalidate_tree(&mut self, root_id: &str) -> bool {
        self.tree_cache.remove(root_id).is_some()
    }

    /// Drop index, signature and all trees
    pub fn clear(&mut self) {
        self.index = None;
        self.signature = None;
        self.tree_cache.clear();
    }

    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    /// The last built index, if any. Never triggers a build.
    pub fn current_index(&self) -> Option<&Arc<ThreadIndex>> {
        self.index.as_ref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn cached_tree_count(&self) -> usize {
        self.tree_cache.len()
    }

    pub fn max_ancestor_hops(&self) -> usize {
        self.max_ancestor_hops
    }

    // ===== Accessors over the current index (never rebuild) =====

    pub fn get_children(&self, id: &str) -> &[String] {
        self.index
            .as_deref()
            .map(|index| index.children(id))
            .unwrap_or(&[])
    }

    pub fn get_parent(&self, id: &str) -> Option<&str> {
        self.index.as_deref().and_then(|index| index.parent(id))
    }

    pub fn get_depth(&self, id: &str) -> usize {
        self.index.as_deref().map(|index| index.depth(id)).unwrap_or(0)
    }

    pub fn get_descendant_count(&self, id: &str) -> usize {
        self.index
            .as_deref()
            .map(|index| index.descendant_count(id))
            .unwrap_or(0)
    }

    pub fn get_ancestors(&self, id: &str) -> Vec<String> {
        self.index
            .as_deref()
            .map(|index| index.ancestors(id, self.max_ancestor_hops))
            .unwrap_or_default()
    }

    pub fn get_descendants(&self, id: &str) -> Vec<String> {
        self.index
            .as_deref()
            .map(|index| index.descendants(id))
            .unwrap_or_default()
    }
}

/// Cloneable, thread-safe handle to one [`IndexCache`].
///
/// Each method holds the lock for its whole body, so the
/// signature-check-then-rebuild in `get_index` cannot interleave with another
/// caller.
#[derive(Debug, Clone, Default)]
pub struct SharedIndexCache {
    inner: Arc<Mutex<IndexCache>>,
}

impl SharedIndexCache {
    pub fn new(cache: IndexCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn get_index<N: ThreadNote>(&self, notes: &[N]) -> Arc<ThreadIndex> {
        self.inner.lock().get_index(notes)
    }

    pub fn rebuild<N: ThreadNote>(&self, notes: &[N]) -> Arc<ThreadIndex> {
        self.inner.lock().rebuild(notes)
    }

    pub fn get_thread_tree<L: NoteLookup>(
        &self,
        root_id: &str,
        index: &ThreadIndex,
        lookup: &L,
    ) -> Arc<ThreadTree> {
        self.inner.lock().get_thread_tree(root_id, index, lookup)
    }

    pub fn invalidate_tree(&self, root_id: &str) -> bool {
        self.inner.lock().invalidate_tree(root_id)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn is_built(&self) -> bool {
        self.inner.lock().is_built()
    }

    pub fn get_children(&self, id: &str) -> Vec<String> {
        self.inner.lock().get_children(id).to_vec()
    }

    pub fn get_parent(&self, id: &str) -> Option<String> {
        self.inner.lock().get_parent(id).map(str::to_string)
    }

    pub fn get_depth(&self, id: &str) -> usize {
        self.inner.lock().get_depth(id)
    }

    pub fn get_descendant_count(&self, id: &str) -> usize {
        self.inner.lock().get_descendant_count(id)
    }

    pub fn get_ancestors(&self, id: &str) -> Vec<String> {
        self.inner.lock().get_ancestors(id)
    }

    pub fn get_descendants(&self, id: &str) -> Vec<String> {
        self.inner.lock().get_descendants(id)
    }

    pub fn current_index(&self) -> Option<Arc<ThreadIndex>> {
        self.inner.lock().current_index().cloned()
    }

    pub fn signature(&self) -> Option<String> {
        self.inner.lock().signature().map(str::to_string)
    }

    pub fn cached_tree_count(&self) -> usize {
        self.inner.lock().cached_tree_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{lookup_by_id, Note};
    use crate::thread_index::test_support::sample_notes;

    #[test]
    fn test_same_notes_return_same_index() {
        let notes = sample_notes();
        let mut cache = IndexCache::new();

        let first = cache.get_index(&notes);
        let second = cache.get_index(&notes);
        assert!(Arc::ptr_eq(&first, &second));

        // Iteration order does not matter either
        let mut reordered = notes.clone();
        reordered.reverse();
        assert!(Arc::ptr_eq(&first, &cache.get_index(&reordered)));
    }

    #[test]
    fn test_changed_notes_rebuild_and_drop_trees() {
        let notes = sample_notes();
        let mut cache = IndexCache::new();

        let first = cache.get_index(&notes);
        cache.get_thread_tree("root", &first, &lookup_by_id(&notes));
        assert_eq!(cache.cached_tree_count(), 1);

        let mut moved = notes.clone();
        moved[3].parent_id = Some("c2".to_string());
        let second = cache.get_index(&moved);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.cached_tree_count(), 0);
        assert_eq!(cache.get_children("c2"), ["g1"]);
    }

    #[test]
    fn test_timestamp_change_rebuilds() {
        let notes = sample_notes();
        let mut cache = IndexCache::new();
        let first = cache.get_index(&notes);

        let mut edited = notes.clone();
        edited[0].timestamp += 1;
        assert!(!Arc::ptr_eq(&first, &cache.get_index(&edited)));
    }

    #[test]
    fn test_tree_is_cached_per_root() {
        let notes = sample_notes();
        let lookup = lookup_by_id(&notes);
        let mut cache = IndexCache::new();
        let index = cache.get_index(&notes);

        let a = cache.get_thread_tree("root", &index, &lookup);
        let b = cache.get_thread_tree("root", &index, &lookup);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.total_count, 4);

        let c1 = cache.get_thread_tree("c1", &index, &lookup);
        assert_eq!(c1.total_count, 2);
        assert_eq!(cache.cached_tree_count(), 2);
    }

    #[test]
    fn test_invalidate_tree_drops_only_that_root() {
        let notes = sample_notes();
        let lookup = lookup_by_id(&notes);
        let mut cache = IndexCache::new();
        let index = cache.get_index(&notes);

        let root_tree = cache.get_thread_tree("root", &index, &lookup);
        let c1_tree = cache.get_thread_tree("c1", &index, &lookup);

        assert!(cache.invalidate_tree("root"));
        assert!(!cache.invalidate_tree("root"));
        assert_eq!(cache.cached_tree_count(), 1);

        assert!(!Arc::ptr_eq(&root_tree, &cache.get_thread_tree("root", &index, &lookup)));
        assert!(Arc::ptr_eq(&c1_tree, &cache.get_thread_tree("c1", &index, &lookup)));
        // Index itself untouched
        assert!(Arc::ptr_eq(&index, &cache.get_index(&notes)));
    }

    #[test]
    fn test_rebuild_bypasses_signature() {
        let notes = sample_notes();
        let mut cache = IndexCache::new();
        let index = cache.get_index(&notes);
        cache.get_thread_tree("root", &index, &lookup_by_id(&notes));

        let rebuilt = cache.rebuild(&notes);
        assert!(!Arc::ptr_eq(&index, &rebuilt));
        assert_eq!(*index, *rebuilt);
        assert_eq!(cache.cached_tree_count(), 0);
        // Later calls hit the rebuilt index
        assert!(Arc::ptr_eq(&rebuilt, &cache.get_index(&notes)));
    }

    #[test]
    fn test_clear() {
        let notes = sample_notes();
        let mut cache = IndexCache::new();
        let index = cache.get_index(&notes);
        cache.get_thread_tree("root", &index, &lookup_by_id(&notes));

        cache.clear();
        assert!(!cache.is_built());
        assert!(cache.signature().is_none());
        assert_eq!(cache.cached_tree_count(), 0);
        assert!(cache.get_children("root").is_empty());
    }

    #[test]
    fn test_accessors_before_build_use_defaults() {
        let cache = IndexCache::new();
        assert!(cache.get_children("x").is_empty());
        assert_eq!(cache.get_parent("x"), None);
        assert_eq!(cache.get_depth("x"), 0);
        assert_eq!(cache.get_descendant_count("x"), 0);
        assert!(cache.get_ancestors("x").is_empty());
        assert!(cache.current_index().is_none());
    }

    #[test]
    fn test_accessors_read_current_index() {
        let notes = sample_notes();
        let mut cache = IndexCache::new();
        cache.get_index(&notes);

        assert_eq!(cache.get_children("root"), ["c1", "c2"]);
        assert_eq!(cache.get_parent("g1"), Some("c1"));
        assert_eq!(cache.get_parent("root"), None);
        assert_eq!(cache.get_depth("g1"), 2);
        assert_eq!(cache.get_descendant_count("root"), 3);
        assert_eq!(cache.get_ancestors("g1"), vec!["c1".to_string(), "root".to_string()]);
        assert_eq!(cache.get_descendants("c1"), vec!["g1".to_string()]);
    }

    #[test]
    fn test_accessors_do_not_rebuild() {
        let notes = sample_notes();
        let mut cache = IndexCache::new();
        cache.get_index(&notes);

        // New note exists only in the caller's list until get_index runs
        let mut more = notes.clone();
        more.push(Note::reply("c3", "root", 500));
        assert_eq!(cache.get_children("root").len(), 2);

        cache.get_index(&more);
        assert_eq!(cache.get_children("root").len(), 3);
    }

    #[test]
    fn test_with_config_hop_cap() {
        let config = CoreConfig::new("/tmp/unused").with_max_ancestor_hops(1);
        let mut cache = IndexCache::with_config(&config);
        cache.get_index(&sample_notes());

        assert_eq!(cache.max_ancestor_hops(), 1);
        assert_eq!(cache.get_ancestors("g1"), vec!["c1".to_string()]);
    }

    #[test]
    fn test_shared_cache_across_threads() {
        let notes = sample_notes();
        let shared = SharedIndexCache::new(IndexCache::new());
        let first = shared.get_index(&notes);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let notes = notes.clone();
                std::thread::spawn(move || shared.get_index(&notes))
            })
            .collect();

        for handle in handles {
            let index = handle.join().unwrap();
            assert!(Arc::ptr_eq(&first, &index));
        }

        assert_eq!(shared.get_children("root"), vec!["c1", "c2"]);
        assert_eq!(shared.get_parent("c1").as_deref(), Some("root"));
        assert_eq!(shared.get_depth("g1"), 2);
        assert_eq!(shared.get_descendant_count("c1"), 1);

        let tree = shared.get_thread_tree("root", &first, &lookup_by_id(&notes));
        assert_eq!(tree.total_count, 4);
        assert_eq!(shared.cached_tree_count(), 1);
        assert!(shared.invalidate_tree("root"));

        shared.clear();
        assert!(!shared.is_built());
    }

    #[test]
    fn test_shared_cache_index_accessors() {
        let notes = sample_notes();
        let shared = SharedIndexCache::default();
        assert!(shared.current_index().is_none());
        assert!(shared.signature().is_none());
        assert!(shared.get_ancestors("g1").is_empty());

        let index = shared.get_index(&notes);
        assert!(Arc::ptr_eq(&index, &shared.current_index().unwrap()));
        assert_eq!(shared.signature(), Some(compute_signature(&notes)));
        assert_eq!(shared.get_ancestors("g1"), vec!["c1".to_string(), "root".to_string()]);
        assert_eq!(shared.get_descendants("root"), vec!["c1", "c2", "g1"]);
    }
}
