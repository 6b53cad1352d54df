/// Append-only, key-indexed store of every directory created in a session.
///
/// All directories live in a single `Vec<Directory>` and `DirKey` is the
/// position in that vec, so `registry[d.key] == d` holds by construction.
/// Entries are never removed; dropping the registry (i.e. the session) is
/// the only teardown.
use super::compression::CompressionType;
use super::directory::{DirKey, Directory};
use super::file_entry::FileEntry;
use compact_str::CompactString;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A registry shared between the analyzer and concurrent readers.
///
/// Writers hold the lock only while committing a finished directory pass;
/// filesystem I/O always happens outside the lock.
pub type SharedRegistry = Arc<RwLock<Registry>>;

#[derive(Debug, Default)]
pub struct Registry {
    dirs: Vec<Directory>,

    /// Full path -> directory, so a path maps to one entity per session.
    by_path: HashMap<PathBuf, DirKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with pre-allocated capacity.
    pub fn with_capacity(estimated_dirs: usize) -> Self {
        Self {
            dirs: Vec::with_capacity(estimated_dirs),
            by_path: HashMap::with_capacity(estimated_dirs),
        }
    }

    /// Reserve the next key and append a zero-valued directory under it.
    pub fn new_directory(&mut self) -> DirKey {
        let key = DirKey::new(self.dirs.len());
        self.dirs.push(Directory::new(key));
        key
    }

    /// Append a populated directory and index it by path.
    ///
    /// If `path_of(name, parent_path)` is already indexed to a directory that
    /// has no parent yet (e.g. one opened directly by path before its parent
    /// was scanned), that entity is adopted instead of creating a duplicate.
    pub fn create_directory(
        &mut self,
        name: CompactString,
        parent_path: PathBuf,
        parent: Option<DirKey>,
        is_drive: bool,
    ) -> DirKey {
        let path = path_of(&name, &parent_path);
        if let Some(existing) = self.by_path.get(&path).copied() {
            let dir = &mut self.dirs[existing.idx()];
            if dir.parent.is_none() && !dir.is_drive && parent.is_some() {
                dir.parent = parent;
                dir.name = name;
                dir.parent_path = parent_path;
                return existing;
            }
        }

        let key = self.new_directory();
        let dir = &mut self.dirs[key.idx()];
        dir.name = name;
        dir.parent_path = parent_path;
        dir.parent = parent;
        dir.is_drive = is_drive;
        // First entity for a path keeps the index entry (a volume mounted
        // inside another volume is both a drive root and a subdirectory).
        self.by_path.entry(path).or_insert(key);
        key
    }

    /// Move `key` to a new location and re-point the path index at it.
    ///
    /// The old path is unindexed only if it pointed at `key`; the new path
    /// is indexed only if no other entity already claims it.
    pub fn relocate(&mut self, key: DirKey, name: CompactString, parent_path: PathBuf) -> bool {
        let Some(dir) = self.dirs.get_mut(key.idx()) else {
            return false;
        };
        let old_path = dir.path();
        dir.name = name;
        dir.parent_path = parent_path;
        let new_path = dir.path();

        if self.by_path.get(&old_path) == Some(&key) {
            self.by_path.remove(&old_path);
        }
        if !new_path.as_os_str().is_empty() {
            self.by_path.entry(new_path).or_insert(key);
        }
        true
    }

    /// Directory representing `path`, if one has been created.
    pub fn lookup_path(&self, path: &Path) -> Option<DirKey> {
        self.by_path.get(path).copied()
    }

    #[inline]
    pub fn get(&self, key: DirKey) -> Option<&Directory> {
        self.dirs.get(key.idx())
    }

    #[inline]
    pub fn get_mut(&mut self, key: DirKey) -> Option<&mut Directory> {
        self.dirs.get_mut(key.idx())
    }

    /// Number of directories ever created.
    #[inline]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Directory> {
        self.dirs.iter()
    }

    /// Full path of a directory.
    pub fn full_path(&self, key: DirKey) -> Option<PathBuf> {
        self.get(key).map(Directory::path)
    }

    /// Direct subdirectories, largest analyzed size first.
    pub fn children_sorted_by_size(&self, key: DirKey) -> Vec<DirKey> {
        let Some(dir) = self.get(key) else {
            return Vec::new();
        };
        let mut children = dir.sub_directories.clone();
        children.sort_by(|a, b| {
            let a_size = self.get(*a).map_or(0, |d| d.analyzed_size);
            let b_size = self.get(*b).map_or(0, |d| d.analyzed_size);
            b_size.cmp(&a_size)
        });
        children
    }

    /// Descendants of `key` (not `key` itself) that were never analyzed.
    ///
    /// Their sizes are missing from every ancestor's `analyzed_size`, so a
    /// non-empty result means the total under `key` is a lower bound.
    pub fn unanalyzed_descendants(&self, key: DirKey) -> Vec<DirKey> {
        let mut missing = Vec::new();
        let mut stack: Vec<DirKey> = match self.get(key) {
            Some(dir) => dir.sub_directories.iter().rev().copied().collect(),
            None => return missing,
        };
        while let Some(k) = stack.pop() {
            let Some(dir) = self.get(k) else { continue };
            if !dir.analyzed {
                missing.push(k);
            }
            stack.extend(dir.sub_directories.iter().rev().copied());
        }
        missing
    }

    /// Nested, owned copy of the subtree at `key`, for display or JSON.
    ///
    /// `max_depth` limits how many levels of subdirectories are expanded;
    /// `Some(0)` yields the directory alone.
    pub fn tree_snapshot(&self, key: DirKey, max_depth: Option<usize>) -> Option<TreeSnapshot> {
        let dir = self.get(key)?;
        let expand = max_depth.map_or(true, |d| d > 0);
        let children = if expand {
            let next = max_depth.map(|d| d - 1);
            dir.sub_directories
                .iter()
                .filter_map(|child| self.tree_snapshot(*child, next))
                .collect()
        } else {
            Vec::new()
        };
        Some(TreeSnapshot {
            key: dir.key,
            name: dir.name.clone(),
            path: dir.path(),
            is_drive: dir.is_drive,
            analyzed: dir.analyzed,
            analyzed_size: dir.analyzed_size,
            compression: dir.compression,
            auto_compress: dir.auto_compress,
            files: dir.files.clone(),
            children,
        })
    }
}

fn path_of(name: &str, parent_path: &Path) -> PathBuf {
    if parent_path.as_os_str().is_empty() {
        PathBuf::from(name)
    } else {
        parent_path.join(name)
    }
}

/// Owned, nested view of a directory subtree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeSnapshot {
    pub key: DirKey,
    pub name: CompactString,
    pub path: PathBuf,
    pub is_drive: bool,
    pub analyzed: bool,
    pub analyzed_size: u64,
    pub compression: CompressionType,
    pub auto_compress: bool,
    pub files: Vec<FileEntry>,
    pub children: Vec<TreeSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_strictly_increase() {
        let mut reg = Registry::new();
        let keys: Vec<DirKey> = (0..5).map(|_| reg.new_directory()).collect();
        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for key in &keys {
            assert_eq!(reg.get(*key).map(|d| d.key), Some(*key));
        }
        assert_eq!(reg.len(), 5);
    }

    #[test]
    fn test_create_directory_indexes_path() {
        let mut reg = Registry::new();
        let root = reg.create_directory("data".into(), PathBuf::from("/"), None, false);
        let sub = reg.create_directory("sub".into(), PathBuf::from("/data"), Some(root), false);

        assert_eq!(reg.lookup_path(Path::new("/data")), Some(root));
        assert_eq!(reg.lookup_path(Path::new("/data/sub")), Some(sub));
        assert_eq!(reg.full_path(sub), Some(PathBuf::from("/data/sub")));
        assert_eq!(reg.get(sub).and_then(|d| d.parent), Some(root));
    }

    #[test]
    fn test_orphan_is_adopted_by_parent_scan() {
        let mut reg = Registry::new();
        let orphan = reg.create_directory("sub".into(), PathBuf::from("/data"), None, false);
        let parent = reg.create_directory("data".into(), PathBuf::from("/"), None, false);
        let adopted = reg.create_directory("sub".into(), PathBuf::from("/data"), Some(parent), false);

        assert_eq!(adopted, orphan);
        assert_eq!(reg.get(orphan).and_then(|d| d.parent), Some(parent));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_relocate_moves_path_index() {
        let mut reg = Registry::new();
        let blank = reg.new_directory();
        assert!(reg.relocate(blank, "data".into(), PathBuf::from("/srv")));
        assert_eq!(reg.lookup_path(Path::new("/srv/data")), Some(blank));

        assert!(reg.relocate(blank, "other".into(), PathBuf::from("/srv")));
        assert_eq!(reg.lookup_path(Path::new("/srv/data")), None);
        assert_eq!(reg.lookup_path(Path::new("/srv/other")), Some(blank));

        assert!(!reg.relocate(DirKey(42), "x".into(), PathBuf::new()));
    }

    #[test]
    fn test_children_sorted_and_unanalyzed() {
        let mut reg = Registry::new();
        let root = reg.create_directory("r".into(), PathBuf::from("/"), None, false);
        let small = reg.create_directory("small".into(), PathBuf::from("/r"), Some(root), false);
        let big = reg.create_directory("big".into(), PathBuf::from("/r"), Some(root), false);
        let deep = reg.create_directory("deep".into(), PathBuf::from("/r/big"), Some(big), false);
        {
            let dir = reg.get_mut(root).unwrap();
            dir.sub_directories = vec![small, big];
        }
        reg.get_mut(big).unwrap().sub_directories = vec![deep];
        for (key, size) in [(small, 10), (big, 500)] {
            let dir = reg.get_mut(key).unwrap();
            dir.analyzed = true;
            dir.analyzed_size = size;
        }

        assert_eq!(reg.children_sorted_by_size(root), vec![big, small]);
        assert_eq!(reg.unanalyzed_descendants(root), vec![deep]);
    }

    #[test]
    fn test_tree_snapshot_depth_limit() {
        let mut reg = Registry::new();
        let root = reg.create_directory("r".into(), PathBuf::from("/"), None, false);
        let sub = reg.create_directory("s".into(), PathBuf::from("/r"), Some(root), false);
        let leaf = reg.create_directory("l".into(), PathBuf::from("/r/s"), Some(sub), false);
        reg.get_mut(root).unwrap().sub_directories.push(sub);
        reg.get_mut(sub).unwrap().sub_directories.push(leaf);

        let full = reg.tree_snapshot(root, None).unwrap();
        assert_eq!(full.children[0].children[0].path, PathBuf::from("/r/s/l"));

        let shallow = reg.tree_snapshot(root, Some(1)).unwrap();
        assert_eq!(shallow.children.len(), 1);
        assert!(shallow.children[0].children.is_empty());
    }
}
