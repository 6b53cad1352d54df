/// Browse API: the read operations a host shell calls.
///
/// Both operations return nothing while processing is paused. Failures
/// never reach the caller: they are logged, and show up as empty results
/// or as directories with `analyzed == false`.
use crate::model::{DirKey, Directory};
use crate::scanner::ScanSession;
use compact_str::CompactString;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// Whether `path` names the synthetic "root of everything".
///
/// The empty path always does. On Windows "/" does too, since it is not a
/// drive of its own there.
pub fn is_root_sentinel(path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        return true;
    }
    cfg!(windows) && (path == Path::new("/") || path == Path::new("\\"))
}

/// Lexically clean a path: drop `.` segments and repeated or trailing
/// separators, and resolve `..` against preceding segments.
///
/// The filesystem is not consulted, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // ".." at the root stays at the root.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Absolute, lexically normalised form of `path`.
///
/// Relative paths are joined onto the current directory first, so "sub",
/// "./sub" and the absolute spelling all index the same directory.
pub fn resolve_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|err| {
        warn!("Could not make {} absolute: {err}", path.display());
        path.to_path_buf()
    });
    normalize_path(&absolute)
}

impl ScanSession {
    /// One drive-flagged directory per mounted volume.
    ///
    /// With `recursive`, each volume is fully analyzed before returning.
    /// A failed volume enumeration yields an empty list.
    pub fn list_roots(&self, recursive: bool) -> Vec<Directory> {
        if !self.is_processing() {
            return Vec::new();
        }
        info!("Listing volume roots");

        let volumes = match self.volumes.volumes() {
            Ok(volumes) => volumes,
            Err(err) => {
                warn!("{err}");
                return Vec::new();
            }
        };

        let keys: Vec<DirKey> = {
            let registry = self.registry();
            let mut registry = registry.write();
            volumes
                .iter()
                .map(|volume| {
                    let mount = volume.mount_point.as_path();
                    let key = registry.lookup_path(mount).unwrap_or_else(|| {
                        registry.create_directory(
                            CompactString::new(mount.to_string_lossy()),
                            PathBuf::new(),
                            None,
                            true,
                        )
                    });
                    // A mount point opened earlier by path becomes a drive root.
                    if let Some(dir) = registry.get_mut(key) {
                        dir.is_drive = true;
                        if !volume.label.is_empty() {
                            dir.volume_label = Some(CompactString::new(&volume.label));
                        }
                    }
                    key
                })
                .collect()
        };

        let roots: Vec<Directory> = keys
            .into_iter()
            .filter_map(|key| {
                if recursive {
                    if let Err(err) = self.analyze(key, true) {
                        warn!("Skipping volume {key}: {err}");
                    }
                }
                self.directory(key)
            })
            .collect();

        info!("Returning {} roots", roots.len());
        roots
    }

    /// Subdirectories of `path` after analyzing it.
    ///
    /// The root sentinel (see [`is_root_sentinel`]) lists volumes instead.
    /// Relative paths resolve against the current directory. Repeated calls
    /// for the same path reuse the same directory entity.
    pub fn list_children(&self, path: impl AsRef<Path>, recursive: bool) -> Vec<Directory> {
        if !self.is_processing() {
            return Vec::new();
        }
        let path = path.as_ref();
        if is_root_sentinel(path) {
            return self.list_roots(recursive);
        }

        let path = resolve_path(path);
        info!("Getting directory: {}", path.display());

        let key = self.directory_for_path(&path);
        let dir = match self.analyze(key, recursive) {
            Ok(dir) => dir,
            Err(err) => {
                warn!("Could not analyze {}: {err}", path.display());
                return Vec::new();
            }
        };

        let children: Vec<Directory> = {
            let registry = self.registry();
            let registry = registry.read();
            dir.sub_directories
                .iter()
                .filter_map(|child| registry.get(*child).cloned())
                .collect()
        };

        info!(
            "Returning {} directories on {}",
            children.len(),
            path.display()
        );
        children
    }
}
