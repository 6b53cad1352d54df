/// Filesystem access used by the analyzer.
///
/// `DirectoryReader` is the seam between the analyzer and the OS. The
/// default `WalkReader` lists one level with `jwalk` on the calling thread;
/// tests substitute readers that inject failures.
use crate::error::{Result, ScanError};
use crate::scanner::options::ScanOptions;
use compact_str::CompactString;
use std::fs;
use std::path::{Path, PathBuf};

/// One immediate entry of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: CompactString,
    pub path: PathBuf,
    pub is_dir: bool,
}

pub trait DirectoryReader: Send + Sync {
    /// List the immediate entries of `path`.
    ///
    /// `Err` means the directory itself could not be enumerated. An `Err`
    /// item inside the `Ok` list is a single unreadable entry.
    fn read_dir(&self, path: &Path) -> Result<Vec<Result<RawEntry>>>;

    /// Size in bytes of the file at `path`.
    fn file_size(&self, path: &Path) -> Result<u64>;
}

/// Single-level, single-threaded `jwalk` reader, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct WalkReader {
    follow_links: bool,
    skip_hidden: bool,
}

impl WalkReader {
    pub fn new(options: &ScanOptions) -> Self {
        Self {
            follow_links: options.follow_links,
            skip_hidden: options.skip_hidden,
        }
    }
}

impl DirectoryReader for WalkReader {
    fn read_dir(&self, path: &Path) -> Result<Vec<Result<RawEntry>>> {
        let meta = fs::metadata(path).map_err(|err| ScanError::enumeration(path, err))?;
        if !meta.is_dir() {
            return Err(ScanError::enumeration(path, "not a directory"));
        }

        let walker = jwalk::WalkDir::new(path)
            .max_depth(1)
            .sort(true)
            .skip_hidden(self.skip_hidden)
            .follow_links(self.follow_links)
            .parallelism(jwalk::Parallelism::Serial);

        let mut entries = Vec::new();
        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    // Depth 0 is the directory being listed.
                    if entry.depth == 0 {
                        if let Some(err) = &entry.read_children_error {
                            return Err(ScanError::enumeration(path, err));
                        }
                        continue;
                    }
                    entries.push(Ok(RawEntry {
                        name: CompactString::new(entry.file_name().to_string_lossy()),
                        path: entry.path(),
                        is_dir: entry.file_type().is_dir(),
                    }));
                }
                Err(err) => {
                    // An error on the listed path itself means its contents
                    // could not be read at all.
                    if err.path() == Some(path) {
                        return Err(ScanError::enumeration(path, err));
                    }
                    let err_path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| path.to_path_buf());
                    entries.push(Err(ScanError::entry_read(err_path, err)));
                }
            }
        }
        Ok(entries)
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        let meta = if self.follow_links {
            fs::metadata(path)
        } else {
            fs::symlink_metadata(path)
        };
        meta.map(|m| m.len())
            .map_err(|err| ScanError::entry_read(path, err))
    }
}
