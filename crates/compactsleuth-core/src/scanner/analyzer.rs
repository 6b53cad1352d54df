/// Tree analyzer: one-level or recursive scan of a registered directory.
///
/// A single-level pass lists the directory, stats its files and stages the
/// results locally. Nothing touches the registry until the whole pass has
/// finished; the commit then happens under one write lock. A pass that is
/// cut short by the processing gate or fails to enumerate therefore leaves
/// the directory exactly as it was (no children, no size, not analyzed) and
/// ready to be retried.
///
/// Recursive mode runs depth-first on the calling thread, in discovery
/// order, and rolls each analyzed child's size up into its parent once the
/// whole subtree has been walked without a pause.
use crate::error::{Result, ScanError};
use crate::model::{DirKey, Directory, FileEntry, SharedRegistry};
use crate::scanner::gate::ProcessingGate;
use crate::scanner::progress::ScanProgress;
use crate::scanner::reader::DirectoryReader;
use compact_str::CompactString;
use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// How a single-level pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassOutcome {
    /// Results committed, or the directory was already analyzed.
    Completed,
    /// The gate closed before the pass finished. Nothing was committed.
    Cancelled,
    /// The directory could not be enumerated. Nothing was committed.
    Failed,
}

/// Running totals for one `analyze` call.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ScanStats {
    files_found: u64,
    dirs_found: u64,
    total_size: u64,
    entries_seen: u64,
    error_count: u64,
}

pub(crate) struct Analyzer<'a> {
    registry: &'a SharedRegistry,
    gate: &'a ProcessingGate,
    reader: &'a dyn DirectoryReader,
    progress_tx: Option<Sender<ScanProgress>>,
    progress_interval: u64,
    stats: ScanStats,
    cancelled: bool,
}

impl<'a> Analyzer<'a> {
    pub(crate) fn new(
        registry: &'a SharedRegistry,
        gate: &'a ProcessingGate,
        reader: &'a dyn DirectoryReader,
        progress_tx: Option<Sender<ScanProgress>>,
        progress_interval: u64,
    ) -> Self {
        Self {
            registry,
            gate,
            reader,
            progress_tx,
            progress_interval,
            stats: ScanStats::default(),
            cancelled: false,
        }
    }

    /// Analyze `key` and return a snapshot of it afterwards.
    ///
    /// Fails only with `InvalidDirectory` (empty name) or `UnknownDirectory`.
    /// Enumeration failures and pauses are logged and show up as
    /// `analyzed == false` on the returned snapshot.
    pub(crate) fn run(mut self, key: DirKey, recursive: bool) -> Result<Directory> {
        let start = Instant::now();
        self.analyze_dir(key, recursive)?;

        let snapshot = self
            .registry
            .read()
            .get(key)
            .cloned()
            .ok_or(ScanError::UnknownDirectory(key))?;

        let duration = start.elapsed();
        debug!(
            "Analyzed {} ({} files, {} dirs, {} errors) in {:?}",
            snapshot.path().display(),
            self.stats.files_found,
            self.stats.dirs_found,
            self.stats.error_count,
            duration
        );

        if let Some(tx) = &self.progress_tx {
            let msg = if self.cancelled {
                ScanProgress::Cancelled
            } else {
                ScanProgress::Complete {
                    duration,
                    files_found: self.stats.files_found,
                    dirs_found: self.stats.dirs_found,
                    error_count: self.stats.error_count,
                }
            };
            let _ = tx.try_send(msg);
        }

        Ok(snapshot)
    }

    fn analyze_dir(&mut self, key: DirKey, recursive: bool) -> Result<()> {
        let (path, already_analyzed) = {
            let registry = self.registry.read();
            let dir = registry
                .get(key)
                .ok_or(ScanError::UnknownDirectory(key))?;
            if dir.name.is_empty() {
                return Err(ScanError::InvalidDirectory);
            }
            (dir.path(), dir.analyzed)
        };

        if !already_analyzed && self.scan_level(key, &path)? != PassOutcome::Completed {
            return Ok(());
        }
        if !recursive {
            return Ok(());
        }

        // Analyzed subtrees are walked again without I/O so that a retry
        // resumes whatever an earlier, paused pass left unanalyzed.
        let children = self
            .registry
            .read()
            .get(key)
            .map(|d| d.sub_directories.clone())
            .unwrap_or_default();

        for child in &children {
            if !self.gate.is_open() {
                self.cancelled = true;
                break;
            }
            if let Err(err) = self.analyze_dir(*child, true) {
                warn!("Skipping subdirectory {child} of {}: {err}", path.display());
            }
        }

        // A paused walk commits no roll-up; the next recursive call redoes it.
        if self.cancelled {
            return Ok(());
        }
        self.roll_up(key, &children);
        Ok(())
    }

    /// Recompute `key`'s size from its own files and its analyzed children.
    ///
    /// Recomputing instead of accumulating keeps repeated recursive calls
    /// from counting a child twice.
    fn roll_up(&self, key: DirKey, children: &[DirKey]) {
        let mut registry = self.registry.write();
        let children_size: u64 = children
            .iter()
            .filter_map(|child| registry.get(*child))
            .filter(|d| d.analyzed)
            .map(|d| d.analyzed_size)
            .sum();
        if let Some(dir) = registry.get_mut(key) {
            dir.analyzed_size = dir.own_files_size() + children_size;
        }
    }

    /// Scan the immediate entries of `path` and commit them to `key`.
    fn scan_level(&mut self, key: DirKey, path: &Path) -> Result<PassOutcome> {
        if !self.gate.is_open() {
            self.cancelled = true;
            return Ok(PassOutcome::Cancelled);
        }

        let listing = match self.reader.read_dir(path) {
            Ok(listing) => listing,
            Err(err) => {
                warn!("{err}");
                self.stats.error_count += 1;
                return Ok(PassOutcome::Failed);
            }
        };

        let mut staged_dirs: Vec<CompactString> = Vec::new();
        let mut staged_files: Vec<FileEntry> = Vec::new();
        let mut staged_size: u64 = 0;

        for entry_result in listing {
            if !self.gate.is_open() {
                debug!("Processing paused; abandoning pass over {}", path.display());
                self.cancelled = true;
                return Ok(PassOutcome::Cancelled);
            }

            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping entry: {err}");
                    self.stats.error_count += 1;
                    continue;
                }
            };

            if entry.is_dir {
                staged_dirs.push(entry.name);
                self.stats.dirs_found += 1;
            } else {
                match self.reader.file_size(&entry.path) {
                    Ok(size) => {
                        staged_files.push(FileEntry::with_size(
                            entry.name,
                            path.to_path_buf(),
                            size,
                        ));
                        staged_size += size;
                        self.stats.files_found += 1;
                        self.stats.total_size += size;
                    }
                    Err(err) => {
                        warn!("Skipping entry: {err}");
                        self.stats.error_count += 1;
                        continue;
                    }
                }
            }

            self.tick(&entry.path);
        }

        self.commit(key, path.to_path_buf(), staged_dirs, staged_files, staged_size)?;
        Ok(PassOutcome::Completed)
    }

    fn commit(
        &self,
        key: DirKey,
        path: PathBuf,
        staged_dirs: Vec<CompactString>,
        staged_files: Vec<FileEntry>,
        staged_size: u64,
    ) -> Result<()> {
        let mut registry = self.registry.write();

        // Another caller may have finished the same directory meanwhile.
        let dir = registry
            .get(key)
            .ok_or(ScanError::UnknownDirectory(key))?;
        if dir.analyzed {
            return Ok(());
        }

        let mut children = Vec::with_capacity(staged_dirs.len());
        for name in staged_dirs {
            children.push(registry.create_directory(name, path.clone(), Some(key), false));
        }

        let dir = registry
            .get_mut(key)
            .ok_or(ScanError::UnknownDirectory(key))?;
        dir.sub_directories.extend(children);
        dir.files.extend(staged_files);
        dir.analyzed_size += staged_size;
        dir.analyzed = true;
        Ok(())
    }

    fn tick(&mut self, current: &Path) {
        self.stats.entries_seen += 1;
        let Some(tx) = &self.progress_tx else {
            return;
        };
        if self.progress_interval == 0
            || !self.stats.entries_seen.is_multiple_of(self.progress_interval)
        {
            return;
        }
        let _ = tx.try_send(ScanProgress::Update {
            files_found: self.stats.files_found,
            dirs_found: self.stats.dirs_found,
            total_size: self.stats.total_size,
            current_path: current.to_string_lossy().into_owned(),
        });
    }
}
