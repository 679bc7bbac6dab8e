//! Thread index and tree cache.
//!
//! Turns a flat note collection (each note carrying an optional parent id)
//! into reply threads: adjacency maps, depths, descendant counts and
//! per-root tree views, all cached behind a content signature of the
//! collection.
//!
//! Every graph walk in here is iterative and visited-guarded. Parent chains
//! come from user data and may dangle or loop; nothing may recurse, hang or
//! panic on them.

pub mod builder;
pub mod cache;
pub mod cycle;
pub mod orphans;
pub mod reparent;
pub mod signature;
pub mod tree;

pub use builder::{build_index, ThreadIndex};
pub use cache::{IndexCache, SharedIndexCache};
pub use cycle::would_introduce_cycle;
pub use orphans::{find_orphan_ids, find_orphans, repair_all_orphans, repair_orphans};
pub use reparent::change_parent;
pub use signature::{compute_signature, signature_digest};
pub use tree::{build_thread_tree, ThreadNode, ThreadTree};
