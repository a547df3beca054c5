// Client-side mirror of the paths known to exist on the hub.
//
// Only leaf paths are stored. A directory "exists" when some cached path
// starts with it, so there are no explicit directory entries.

use crate::utils;
use std::collections::BTreeSet;
use std::ops::Bound;

#[derive(Debug, Default, Clone)]
pub struct FileCache {
    paths: BTreeSet<String>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set.
    pub fn populate<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.paths.clear();
        for p in paths {
            self.add(p.as_ref());
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Exact membership.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// True if any cached path starts with `prefix` (plain string prefix).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.paths
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .map_or(false, |p| p.starts_with(prefix))
    }

    /// Insert a path, normalizing it first so the set only ever holds
    /// absolute paths without empty or `..` segments.
    pub fn add(&mut self, path: &str) {
        let abs = utils::resolve("/", path);
        debug_assert!(utils::is_normalized(&abs));
        self.paths.insert(abs);
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_replaces_previous_content() {
        let mut cache = FileCache::new();
        cache.populate(["/old.py"]);
        cache.populate(["/main.py", "/projects/10000.py"]);
        assert!(cache.contains("/main.py"));
        assert!(cache.contains("/projects/10000.py"));
        assert!(!cache.contains("/old.py"));
        assert!(!cache.contains("/projects"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn entries_are_normalized_on_insert() {
        let mut cache = FileCache::new();
        cache.populate(["/a//b/", "c.py", "/x/../y"]);
        let all: Vec<&str> = cache.iter().collect();
        assert_eq!(all, vec!["/a/b", "/c.py", "/y"]);
    }

    #[test]
    fn prefix_match_finds_directories() {
        let mut cache = FileCache::new();
        cache.populate(["/projects/10005.py", "/util/a.mpy"]);
        assert!(cache.has_prefix("/projects"));
        assert!(cache.has_prefix("/proj"));
        assert!(cache.has_prefix("/util"));
        assert!(!cache.has_prefix("/system"));
        assert!(!cache.has_prefix("/projects/10006"));
    }

    #[test]
    fn add_and_remove_are_incremental() {
        let mut cache = FileCache::new();
        cache.add("/a.py");
        assert!(cache.contains("/a.py"));
        assert!(cache.remove("/a.py"));
        assert!(!cache.remove("/a.py"));
        assert!(cache.is_empty());
    }
}
