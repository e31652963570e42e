//! Incremental build bookkeeping.
//!
//! The compiler never owns a cache. Callers pass one into
//! [`Compiler::from_file`](crate::compiler::Compiler::from_file) and ask it
//! whether a file needs building at all.

use ahash::AHashMap;
use std::path::{Path, PathBuf};

/// The narrow interface a build needs from an incremental cache.
pub trait BuildCache {
    /// Whether `path` was registered by an earlier build.
    fn has_seen(&self, path: &Path) -> bool;

    /// Records a build of `path`. Registering a known path refreshes its entry.
    fn register(&mut self, path: &Path);

    /// Records a file derived from or depending on `path`, such as rendered output.
    fn register_related(&mut self, path: &Path, related: &Path);

    /// Files registered as related to `path`, in registration order.
    fn related(&self, path: &Path) -> Vec<PathBuf>;
}

#[derive(Debug, Clone, Default)]
struct CacheEntry {
    builds: usize,
    related: Vec<PathBuf>,
}

/// In-memory [`BuildCache`] for a single process.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: AHashMap<PathBuf, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `path` has been registered.
    pub fn build_count(&self, path: &Path) -> usize {
        self.entries.get(path).map_or(0, |entry| entry.builds)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BuildCache for MemoryCache {
    fn has_seen(&self, path: &Path) -> bool {
        self.entries.get(path).is_some_and(|entry| entry.builds > 0)
    }

    fn register(&mut self, path: &Path) {
        let entry = self.entries.entry(path.to_path_buf()).or_default();
        entry.builds += 1;
        tracing::debug!("Registered build of '{}' ({})", path.display(), entry.builds);
    }

    fn register_related(&mut self, path: &Path, related: &Path) {
        let entry = self.entries.entry(path.to_path_buf()).or_default();
        if !entry.related.iter().any(|p| p == related) {
            entry.related.push(related.to_path_buf());
        }
    }

    fn related(&self, path: &Path) -> Vec<PathBuf> {
        self.entries
            .get(path)
            .map(|entry| entry.related.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_marks_a_path_as_seen() {
        let mut cache = MemoryCache::new();
        let path = Path::new("conversations/greeting.chatModule");
        assert!(!cache.has_seen(path));

        cache.register(path);
        cache.register(path);
        assert!(cache.has_seen(path));
        assert_eq!(cache.build_count(path), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn related_paths_do_not_count_as_builds() {
        let mut cache = MemoryCache::new();
        let path = Path::new("greeting.chatModule");
        cache.register_related(path, Path::new("out/greeting.top"));
        cache.register_related(path, Path::new("out/greeting.top"));
        cache.register_related(path, Path::new("out/greeting_data.csv"));

        assert!(!cache.has_seen(path));
        assert_eq!(
            cache.related(path),
            vec![
                PathBuf::from("out/greeting.top"),
                PathBuf::from("out/greeting_data.csv")
            ]
        );
        assert!(cache.related(Path::new("other")).is_empty());
    }
}
