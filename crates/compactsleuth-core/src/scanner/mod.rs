/// Scanner module: the session object and the analyzer it drives.
///
/// A `ScanSession` owns everything a scan needs: the directory registry,
/// the processing gate, and the filesystem / volume collaborators. There is
/// no global state; independent sessions never see each other's entities.
///
/// All methods take `&self`, so a session can sit in an `Arc` and be shared
/// between a scanning thread and a UI thread that pauses or reads the tree.
pub mod analyzer;
pub mod gate;
pub mod options;
pub mod progress;
pub mod reader;

use crate::error::{Result, ScanError};
use crate::model::{
    CompressionType, DirKey, Directory, FileEntry, Registry, SharedRegistry, TreeSnapshot,
};
use crate::platform::{SystemVolumes, VolumeSource};
use analyzer::Analyzer;
use compact_str::CompactString;
use crossbeam_channel::{Receiver, Sender};
use gate::ProcessingGate;
use options::ScanOptions;
use parking_lot::{Mutex, RwLock};
use progress::{ScanProgress, PROGRESS_CHANNEL_CAPACITY};
use reader::{DirectoryReader, WalkReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct ScanSession {
    registry: SharedRegistry,
    gate: ProcessingGate,
    reader: Box<dyn DirectoryReader>,
    pub(crate) volumes: Box<dyn VolumeSource>,
    options: ScanOptions,
    progress_tx: Mutex<Option<Sender<ScanProgress>>>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    /// Session backed by the real filesystem and the OS volume list.
    pub fn new() -> Self {
        Self::with_options(ScanOptions::default())
    }

    pub fn with_options(options: ScanOptions) -> Self {
        let reader = WalkReader::new(&options);
        Self::with_sources(reader, SystemVolumes, options)
    }

    /// Session with injected collaborators.
    pub fn with_sources(
        reader: impl DirectoryReader + 'static,
        volumes: impl VolumeSource + 'static,
        options: ScanOptions,
    ) -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::with_capacity(1_024))),
            gate: ProcessingGate::new(),
            reader: Box::new(reader),
            volumes: Box::new(volumes),
            options,
            progress_tx: Mutex::new(None),
        }
    }

    /// Use `gate` instead of a private one, so several sessions (or a
    /// reader) can be paused together.
    pub fn with_gate(mut self, gate: ProcessingGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Shared handle to the registry, for readers that want to hold a lock
    /// across several lookups.
    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// A handle to this session's gate, e.g. for a UI thread.
    pub fn gate(&self) -> ProcessingGate {
        self.gate.clone()
    }

    /// Receive progress for subsequent `analyze` / browse calls.
    ///
    /// Replaces any earlier subscription.
    pub fn subscribe_progress(&self) -> Receiver<ScanProgress> {
        let (tx, rx) = crossbeam_channel::bounded(PROGRESS_CHANNEL_CAPACITY);
        *self.progress_tx.lock() = Some(tx);
        rx
    }

    // ── Entities ───────────────────────────────────────────

    /// Register a zero-valued directory under the next key.
    pub fn new_directory(&self) -> Directory {
        let mut registry = self.registry.write();
        let key = registry.new_directory();
        Directory::new(key)
    }

    /// A zero-valued file record. Files are not registered.
    pub fn new_file(&self) -> FileEntry {
        FileEntry::new()
    }

    /// Snapshot of a registered directory.
    pub fn directory(&self, key: DirKey) -> Option<Directory> {
        self.registry.read().get(key).cloned()
    }

    /// The directory representing `path`, creating it if needed.
    ///
    /// `path` is used as given; normalise it first (see
    /// [`crate::browse::normalize_path`]).
    pub fn directory_for_path(&self, path: &Path) -> DirKey {
        if let Some(key) = self.registry.read().lookup_path(path) {
            return key;
        }
        let (name, parent_path) = split_path(path);
        let mut registry = self.registry.write();
        // Re-check: another caller may have created it between the locks.
        if let Some(key) = registry.lookup_path(path) {
            return key;
        }
        registry.create_directory(name, parent_path, None, false)
    }

    /// Place a directory created with [`Self::new_directory`] at a path.
    ///
    /// The path index follows, so later lookups of that path find it.
    pub fn set_location(&self, key: DirKey, name: &str, parent_path: &Path) -> Result<()> {
        let moved = self.registry.write().relocate(
            key,
            CompactString::new(name),
            parent_path.to_path_buf(),
        );
        if moved {
            Ok(())
        } else {
            Err(ScanError::UnknownDirectory(key))
        }
    }

    // ── Analysis ───────────────────────────────────────────

    /// Scan `key`'s immediate contents, and its whole subtree if `recursive`.
    ///
    /// Already-analyzed directories are returned unchanged. Returns the
    /// directory as it stands afterwards; `analyzed == false` on the result
    /// means the pass was paused or the directory could not be read.
    pub fn analyze(&self, key: DirKey, recursive: bool) -> Result<Directory> {
        let progress_tx = self.progress_tx.lock().clone();
        Analyzer::new(
            &self.registry,
            &self.gate,
            self.reader.as_ref(),
            progress_tx,
            self.options.progress_interval,
        )
        .run(key, recursive)
    }

    // ── Processing gate ────────────────────────────────────

    pub fn pause(&self) {
        self.gate.pause();
    }

    pub fn resume(&self) {
        self.gate.resume();
    }

    pub fn is_processing(&self) -> bool {
        self.gate.is_open()
    }

    // ── Compression assignment ─────────────────────────────

    pub fn set_compression(&self, key: DirKey, compression: CompressionType) -> Result<()> {
        self.update(key, |dir| dir.compression = compression)
    }

    pub fn set_auto_compress(&self, key: DirKey, auto_compress: bool) -> Result<()> {
        self.update(key, |dir| dir.auto_compress = auto_compress)
    }

    /// Override the scheme of one file. Returns `false` if no file in the
    /// directory has that name.
    pub fn set_file_compression(
        &self,
        key: DirKey,
        file_name: &str,
        compression: CompressionType,
    ) -> Result<bool> {
        let mut found = false;
        self.update(key, |dir| {
            if let Some(file) = dir.files.iter_mut().find(|f| f.name == file_name) {
                file.compression = compression;
                found = true;
            }
        })?;
        Ok(found)
    }

    // ── Read-out ───────────────────────────────────────────

    pub fn full_path(&self, key: DirKey) -> Option<PathBuf> {
        self.registry.read().full_path(key)
    }

    pub fn children_sorted_by_size(&self, key: DirKey) -> Vec<DirKey> {
        self.registry.read().children_sorted_by_size(key)
    }

    pub fn unanalyzed_descendants(&self, key: DirKey) -> Vec<DirKey> {
        self.registry.read().unanalyzed_descendants(key)
    }

    pub fn tree_snapshot(&self, key: DirKey, max_depth: Option<usize>) -> Option<TreeSnapshot> {
        self.registry.read().tree_snapshot(key, max_depth)
    }

    fn update(&self, key: DirKey, f: impl FnOnce(&mut Directory)) -> Result<()> {
        let mut registry = self.registry.write();
        let dir = registry
            .get_mut(key)
            .ok_or(ScanError::UnknownDirectory(key))?;
        f(dir);
        Ok(())
    }
}

/// Split a path into (base name, parent path). Paths without a final
/// component ("/", "C:\") become their own name with an empty parent.
fn split_path(path: &Path) -> (CompactString, PathBuf) {
    match (path.file_name(), path.parent()) {
        (Some(name), Some(parent)) => (
            CompactString::new(name.to_string_lossy()),
            parent.to_path_buf(),
        ),
        _ => (CompactString::new(path.to_string_lossy()), PathBuf::new()),
    }
}
