/// End-to-end tests for the browse operations (`list_roots`, `list_children`).
///
/// Volumes are injected so the tests do not depend on the machine's mounts;
/// each fake volume is a temporary directory.
use compactsleuth_core::error::{Result, ScanError};
use compactsleuth_core::platform::{VolumeInfo, VolumeSource};
use compactsleuth_core::scanner::options::ScanOptions;
use compactsleuth_core::scanner::reader::WalkReader;
use compactsleuth_core::ScanSession;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

/// ```text
/// root/
///   docs/
///     notes.md (120 bytes)
///   media/
///     clip.mp4 (900 bytes)
///   top.log    (30 bytes)
/// ```
fn make_volume() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("docs")).unwrap();
    fs::create_dir_all(tmp.path().join("media")).unwrap();
    write_bytes(&tmp.path().join("docs").join("notes.md"), 120);
    write_bytes(&tmp.path().join("media").join("clip.mp4"), 900);
    write_bytes(&tmp.path().join("top.log"), 30);
    tmp
}

struct FixedVolumes(Vec<VolumeInfo>);

impl VolumeSource for FixedVolumes {
    fn volumes(&self) -> Result<Vec<VolumeInfo>> {
        Ok(self.0.clone())
    }
}

struct BrokenVolumes;

impl VolumeSource for BrokenVolumes {
    fn volumes(&self) -> Result<Vec<VolumeInfo>> {
        Err(ScanError::VolumeEnumeration("disk service unavailable".into()))
    }
}

fn session_with_volumes(paths: &[&Path]) -> ScanSession {
    let volumes = paths
        .iter()
        .enumerate()
        .map(|(i, p)| VolumeInfo::new(p.to_path_buf(), format!("Volume {i}")))
        .collect();
    let options = ScanOptions::default();
    ScanSession::with_sources(WalkReader::new(&options), FixedVolumes(volumes), options)
}

// ── Roots ─────────────────────────────────────────────────────────────────────

/// Two mounted volumes give exactly two unanalyzed drive roots.
#[test]
fn list_roots_returns_one_drive_per_volume() {
    let a = make_volume();
    let b = make_volume();
    let session = session_with_volumes(&[a.path(), b.path()]);

    let roots = session.list_roots(false);
    assert_eq!(roots.len(), 2);
    for root in &roots {
        assert!(root.is_drive);
        assert!(!root.analyzed);
        assert!(root.parent.is_none());
    }
    assert_eq!(roots[0].path(), a.path());
    assert_eq!(roots[1].volume_label.as_deref(), Some("Volume 1"));
}

/// Recursive root listing analyzes every volume completely.
#[test]
fn list_roots_recursive_sizes_each_volume() {
    let a = make_volume();
    let session = session_with_volumes(&[a.path()]);

    let roots = session.list_roots(true);
    assert_eq!(roots.len(), 1);
    assert!(roots[0].analyzed);
    assert_eq!(roots[0].analyzed_size, 1_050);
    assert_eq!(roots[0].sub_directories.len(), 2);
}

/// Listing roots twice reuses the same drive entities.
#[test]
fn list_roots_reuses_drives() {
    let a = make_volume();
    let session = session_with_volumes(&[a.path()]);

    let first = session.list_roots(false);
    let second = session.list_roots(false);
    assert_eq!(first[0].key, second[0].key);
    assert_eq!(session.registry().read().len(), 1);
}

/// A volume enumeration failure is an empty list, not an error.
#[test]
fn broken_volume_source_lists_nothing() {
    let options = ScanOptions::default();
    let session = ScanSession::with_sources(WalkReader::new(&options), BrokenVolumes, options);
    assert!(session.list_roots(false).is_empty());
    assert!(session.list_children("", false).is_empty());
}

// ── Children ──────────────────────────────────────────────────────────────────

/// The empty path lists volumes.
#[test]
fn empty_path_lists_roots() {
    let a = make_volume();
    let session = session_with_volumes(&[a.path()]);

    let roots = session.list_children("", false);
    assert_eq!(roots.len(), 1);
    assert!(roots[0].is_drive);
}

/// Children of a path are its subdirectories, in name order.
#[test]
fn list_children_returns_subdirectories() {
    let tmp = make_volume();
    let session = ScanSession::new();

    let children = session.list_children(tmp.path(), false);
    let names: Vec<&str> = children.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["docs", "media"]);
    for child in &children {
        assert_eq!(child.parent_path, tmp.path());
        assert!(!child.analyzed);
    }

    let parent = session
        .registry()
        .read()
        .lookup_path(tmp.path())
        .and_then(|k| session.directory(k))
        .unwrap();
    assert_eq!(parent.files.len(), 1);
    assert_eq!(parent.analyzed_size, 30);
}

/// Recursive listing returns analyzed children with their sizes.
#[test]
fn list_children_recursive_sizes_children() {
    let tmp = make_volume();
    let session = ScanSession::new();

    let children = session.list_children(tmp.path(), true);
    let sizes: Vec<u64> = children.iter().map(|d| d.analyzed_size).collect();
    assert_eq!(sizes, [120, 900]);
    assert!(children.iter().all(|d| d.analyzed));
}

/// Equivalent spellings of a path resolve to one directory entity.
#[test]
fn list_children_normalises_and_reuses() {
    let tmp = make_volume();
    let session = ScanSession::new();

    let plain = session.list_children(tmp.path(), false);
    let registry_len = session.registry().read().len();

    let messy: PathBuf = tmp.path().join(".").join("docs").join("..");
    let again = session.list_children(&messy, false);

    assert_eq!(
        plain.iter().map(|d| d.key).collect::<Vec<_>>(),
        again.iter().map(|d| d.key).collect::<Vec<_>>()
    );
    assert_eq!(session.registry().read().len(), registry_len);
}

/// A directory placed by hand is the one later listings of its path use.
#[test]
fn list_children_reuses_manually_placed_directory() {
    let tmp = make_volume();
    let session = ScanSession::new();

    let dir = session.new_directory();
    let name = tmp.path().file_name().unwrap().to_string_lossy();
    session
        .set_location(dir.key, &name, tmp.path().parent().unwrap())
        .unwrap();
    let analyzed = session.analyze(dir.key, false).unwrap();
    let registry_len = session.registry().read().len();

    let children = session.list_children(tmp.path(), false);
    assert_eq!(
        children.iter().map(|d| d.key).collect::<Vec<_>>(),
        analyzed.sub_directories
    );
    assert_eq!(session.registry().read().len(), registry_len);
}

/// Drilling into a child path reuses the entity found by the parent scan.
#[test]
fn list_children_drills_into_existing_child() {
    let tmp = make_volume();
    let session = ScanSession::new();

    let children = session.list_children(tmp.path(), false);
    let docs = children.iter().find(|d| d.name == "docs").unwrap().key;

    session.list_children(tmp.path().join("docs"), false);
    let docs_dir = session.directory(docs).unwrap();
    assert!(docs_dir.analyzed);
    assert_eq!(docs_dir.analyzed_size, 120);
}

/// Pausing before any browse call returns nothing and analyzes nothing.
#[test]
fn pause_before_browse_is_safe() {
    let tmp = make_volume();
    let session = session_with_volumes(&[tmp.path()]);
    session.pause();

    assert!(session.list_children(tmp.path(), true).is_empty());
    assert!(session.list_roots(true).is_empty());
    assert!(session.registry().read().iter().all(|d| !d.analyzed));

    session.resume();
    assert_eq!(session.list_children(tmp.path(), true).len(), 2);
}

/// A path that does not exist lists nothing and stays retryable.
#[test]
fn missing_path_lists_nothing() {
    let tmp = TempDir::new().unwrap();
    let session = ScanSession::new();
    assert!(session.list_children(tmp.path().join("nope"), true).is_empty());
}
