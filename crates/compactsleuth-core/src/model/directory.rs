/// Directory records and the key type used to address them.
///
/// A parent owns its direct children through the keys in
/// `sub_directories`; a child points back at its parent only by key.
/// Nothing holds a reference into the registry, so there are no cycles.
use super::compression::CompressionType;
use super::file_entry::FileEntry;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Registry key of a directory.
///
/// Assigned in creation order and never reused. Uses `u32` like a plain
/// arena index: ~4 billion directories per session is plenty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirKey(pub u32);

impl DirKey {
    /// Create a key from a registry position.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "DirKey overflow");
        Self(index as u32)
    }

    /// Return the key as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DirKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub key: DirKey,

    /// Base name. For drive roots this is the whole mount point, e.g. "C:\".
    pub name: CompactString,

    /// Path of the containing directory. Empty for roots.
    pub parent_path: PathBuf,

    /// Parent directory, resolved through the registry. `None` for roots.
    pub parent: Option<DirKey>,

    /// `true` only for synthetic top-level volume roots.
    pub is_drive: bool,

    /// Volume label reported by the volume enumerator (drive roots only).
    pub volume_label: Option<CompactString>,

    /// Direct children in discovery order.
    pub sub_directories: Vec<DirKey>,

    /// Files directly inside this directory, in discovery order.
    pub files: Vec<FileEntry>,

    pub compression: CompressionType,

    /// Compression choice is delegated to an external policy engine.
    pub auto_compress: bool,

    /// Set once a scan of the immediate contents has completed. Never reset.
    pub analyzed: bool,

    /// Own file sizes plus the analyzed sizes of analyzed descendants.
    pub analyzed_size: u64,
}

impl Directory {
    /// Create a zero-valued directory bound to `key`.
    pub fn new(key: DirKey) -> Self {
        Self {
            key,
            name: CompactString::default(),
            parent_path: PathBuf::new(),
            parent: None,
            is_drive: false,
            volume_label: None,
            sub_directories: Vec::new(),
            files: Vec::new(),
            compression: CompressionType::None,
            auto_compress: false,
            analyzed: false,
            analyzed_size: 0,
        }
    }

    /// Filesystem path this directory stands for.
    ///
    /// `parent_path` joined with `name`, or `name` alone for roots.
    pub fn path(&self) -> PathBuf {
        if self.parent_path.as_os_str().is_empty() {
            PathBuf::from(self.name.as_str())
        } else {
            self.parent_path.join(self.name.as_str())
        }
    }

    /// Sum of the sizes of the files directly inside this directory.
    pub fn own_files_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
