use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_DATA_DIR, MAX_ANCESTOR_HOPS};
use crate::store::notes_path;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    /// Cap applied to every ancestor walk (cycle guard, thread-root lookup)
    pub max_ancestor_hops: usize,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            max_ancestor_hops: MAX_ANCESTOR_HOPS,
        }
    }

    pub fn with_max_ancestor_hops(mut self, max_ancestor_hops: usize) -> Self {
        // Zero would make every walk abort immediately
        self.max_ancestor_hops = max_ancestor_hops.max(1);
        self
    }

    /// Location of the persisted note collection
    pub fn notes_path(&self) -> PathBuf {
        notes_path(&self.data_dir)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("notethread_data"));
        assert_eq!(config.max_ancestor_hops, MAX_ANCESTOR_HOPS);
        assert_eq!(
            config.notes_path(),
            PathBuf::from("notethread_data").join("notes.json")
        );
    }

    #[test]
    fn test_hop_cap_never_zero() {
        let config = CoreConfig::new("/tmp/x").with_max_ancestor_hops(0);
        assert_eq!(config.max_ancestor_hops, 1);
    }
}
