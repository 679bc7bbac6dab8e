pub mod config;
pub mod constants;
pub mod models;
pub mod store;
pub mod thread_index;
pub mod tracing_setup;

// Re-export the core types at crate root for convenience
pub use config::CoreConfig;
pub use models::{Note, NoteLookup, ThreadNote};
pub use thread_index::{
    IndexCache, SharedIndexCache, ThreadIndex, ThreadNode, ThreadTree,
};
