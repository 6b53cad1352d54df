/// A single file recorded in its parent directory.
///
/// Files are not independently addressable: they live by value inside
/// their parent's `files` list and have no registry key.
use super::compression::CompressionType;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name only (NOT the full path).
    pub name: CompactString,

    /// Path of the directory that contains this file.
    pub parent_path: PathBuf,

    /// Extension without the leading dot, empty when there is none.
    pub extension: CompactString,

    /// Logical size in bytes, from the entry metadata.
    pub size: u64,

    /// Per-file override. Defaults to `None`.
    pub compression: CompressionType,
}

impl FileEntry {
    /// Create a zero-valued file record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a populated record, deriving the extension from `name`.
    pub fn with_size(name: CompactString, parent_path: PathBuf, size: u64) -> Self {
        let extension = extension_of(&name);
        Self {
            name,
            parent_path,
            extension,
            size,
            compression: CompressionType::None,
        }
    }

    /// Full path of the file.
    pub fn path(&self) -> PathBuf {
        self.parent_path.join(self.name.as_str())
    }
}

fn extension_of(name: &str) -> CompactString {
    Path::new(name)
        .extension()
        .map(|ext| CompactString::new(ext.to_string_lossy()))
        .unwrap_or_default()
}
