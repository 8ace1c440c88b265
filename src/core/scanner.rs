use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::scan_config::ScanConfig;
use crate::config::settings::ScanMode;
use crate::error::EntryAccessError;
use crate::models::record::{FileRecord, FolderRecord, Report};
use crate::models::scan_result::ScanResult;

use super::classifier::ExclusionSet;
use super::predicate::{FileCandidate, FilePredicate};
use super::progress::ProgressTracker;

pub struct Scanner {
    semaphore: Arc<Semaphore>,
    progress: Arc<ProgressTracker>,
    config: Arc<ScanConfig>,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        let max_io = config.max_concurrent_io();
        Self {
            semaphore: Arc::new(Semaphore::new(max_io)),
            progress: Arc::new(ProgressTracker::new()),
            config: Arc::new(config),
        }
    }

    /// Walk the configured root once and return the unranked records.
    ///
    /// Unreadable entries are skipped and only show up in the counters.
    pub async fn scan(&self) -> anyhow::Result<ScanResult> {
        let root = self.config.root().to_path_buf();
        info!(path = %root.display(), mode = ?self.config.mode(), "scan started");

        let report = match self.config.mode() {
            ScanMode::LargeFiles => Report::Files(self.scan_large_files().await?),
            ScanMode::FolderSizes => Report::Folders(self.scan_folders().await?),
        };

        let snapshot = self.progress.snapshot();
        let result = ScanResult {
            report,
            mode: self.config.mode(),
            scan_path: root,
            files_scanned: snapshot.files_scanned,
            dirs_scanned: snapshot.dirs_scanned,
            bytes_seen: snapshot.bytes_seen,
            files_per_second: snapshot.files_per_second,
            skipped_entries: snapshot.skipped_entries,
            pruned_dirs: snapshot.pruned_dirs,
            scan_duration: snapshot.elapsed,
            timestamp: SystemTime::now(),
        };

        info!(
            records = result.report.len(),
            files = result.files_scanned,
            dirs = result.dirs_scanned,
            skipped = result.skipped_entries,
            duration_ms = result.scan_duration.as_millis() as u64,
            "scan completed"
        );

        Ok(result)
    }

    async fn scan_large_files(&self) -> anyhow::Result<Vec<FileRecord>> {
        let config = Arc::clone(&self.config);
        let progress = Arc::clone(&self.progress);

        let records = tokio::task::spawn_blocking(move || {
            let predicate = FilePredicate::from_config(&config);
            let walk = LargeFileWalk {
                exclusions: config.exclude_dirs(),
                predicate: &predicate,
                max_depth: config.max_depth(),
                progress: &progress,
            };
            let mut records = Vec::new();
            walk.run(config.root(), &mut records);
            records
        })
        .await?;

        Ok(records)
    }

    /// One worker per immediate child directory, bounded by the semaphore.
    /// Workers share nothing but the counters; results are collected in
    /// the order the children were listed.
    async fn scan_folders(&self) -> anyhow::Result<Vec<FolderRecord>> {
        let root = self.config.root().to_path_buf();
        let progress = Arc::clone(&self.progress);
        let children = tokio::task::spawn_blocking(move || {
            progress.increment_dirs();
            match read_dir_batch(&root) {
                Ok(entries) => entries,
                Err(e) => {
                    skip(&progress, &e);
                    Vec::new()
                }
            }
        })
        .await?;

        let mut handles = Vec::new();
        for entry in children {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    skip(&self.progress, &e);
                    continue;
                }
            };
            if !entry.metadata.is_dir() {
                continue;
            }
            if self.config.exclude_dirs().is_excluded(&entry.name) {
                debug!(path = %entry.path.display(), "excluded directory pruned");
                self.progress.increment_pruned();
                continue;
            }

            let semaphore = Arc::clone(&self.semaphore);
            let config = Arc::clone(&self.config);
            let progress = Arc::clone(&self.progress);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                let record = tokio::task::spawn_blocking(move || {
                    measure_folder(entry.path, config.exclude_dirs(), &progress)
                })
                .await?;
                anyhow::Ok(record)
            }));
        }

        let mut records = Vec::with_capacity(handles.len());
        for handle in handles {
            records.push(handle.await??);
        }
        Ok(records)
    }
}

/// Collected directory entry from batch I/O.
#[derive(Debug)]
pub(crate) struct DirEntryData {
    pub path: PathBuf,
    pub name: OsString,
    pub metadata: std::fs::Metadata,
}

/// Read all entries and their metadata from a directory in one blocking call.
///
/// The outer error means the directory itself could not be listed; each
/// inner error is one entry that could not be stat'ed.
pub(crate) fn read_dir_batch(
    dir_path: &Path,
) -> Result<Vec<Result<DirEntryData, EntryAccessError>>, EntryAccessError> {
    let reader = std::fs::read_dir(dir_path)
        .map_err(|e| EntryAccessError::from_io(dir_path.to_path_buf(), &e))?;

    let mut entries = Vec::new();
    for entry_result in reader {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                entries.push(Err(EntryAccessError::from_io(dir_path.to_path_buf(), &e)));
                continue;
            }
        };
        let path = entry.path();
        match std::fs::symlink_metadata(&path) {
            Ok(metadata) => entries.push(Ok(DirEntryData {
                path,
                name: entry.file_name(),
                metadata,
            })),
            Err(e) => entries.push(Err(EntryAccessError::from_io(path, &e))),
        }
    }

    Ok(entries)
}

fn skip(progress: &ProgressTracker, err: &EntryAccessError) {
    debug!(path = %err.path.display(), kind = ?err.kind, error = %err.message, "skipping unreadable entry");
    progress.increment_skipped();
}

/// Depth-first walk for large-file mode. The caller owns the accumulator.
pub(crate) struct LargeFileWalk<'a> {
    pub exclusions: &'a ExclusionSet,
    pub predicate: &'a FilePredicate,
    pub max_depth: Option<usize>,
    pub progress: &'a ProgressTracker,
}

impl LargeFileWalk<'_> {
    pub fn run(&self, root: &Path, out: &mut Vec<FileRecord>) {
        let mut pending = vec![(root.to_path_buf(), 0usize)];

        while let Some((dir, depth)) = pending.pop() {
            self.progress.increment_dirs();
            match read_dir_batch(&dir) {
                Ok(entries) => self.visit(entries, depth, &mut pending, out),
                Err(e) => skip(self.progress, &e),
            }
        }
    }

    /// Apply the classifier to subdirectories and the predicate to files
    /// of one listed directory at `depth`.
    pub fn visit(
        &self,
        entries: Vec<Result<DirEntryData, EntryAccessError>>,
        depth: usize,
        pending: &mut Vec<(PathBuf, usize)>,
        out: &mut Vec<FileRecord>,
    ) {
        let mut subdirs = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    skip(self.progress, &e);
                    continue;
                }
            };
            let file_type = entry.metadata.file_type();

            if file_type.is_dir() {
                if self.exclusions.is_excluded(&entry.name) {
                    debug!(path = %entry.path.display(), "excluded directory pruned");
                    self.progress.increment_pruned();
                    continue;
                }
                // Root is depth 0; `max_depth` is the deepest level entered.
                let child_depth = depth + 1;
                if self.max_depth.is_some_and(|max| child_depth > max) {
                    continue;
                }
                subdirs.push((entry.path, child_depth));
            } else if file_type.is_file() {
                let size = entry.metadata.len();
                self.progress.record_file(size);

                let extension = entry.path.extension().map(|e| e.to_string_lossy());
                let candidate = FileCandidate {
                    size,
                    modified: entry.metadata.modified().ok(),
                    extension: extension.as_deref(),
                };
                if self.predicate.accepts(&candidate) {
                    out.push(FileRecord::from_metadata(&entry.path, &entry.metadata));
                }
            }
            // Symlinks and special files are neither followed nor reported.
        }

        // Reversed so the stack pops subdirectories in listing order.
        pending.extend(subdirs.into_iter().rev());
    }
}

/// Recursive size and entry count of one directory. Holds running sums
/// only; no per-file state survives past the entry that produced it.
pub(crate) fn measure_folder(
    folder: PathBuf,
    exclusions: &ExclusionSet,
    progress: &ProgressTracker,
) -> FolderRecord {
    let mut record = FolderRecord::new(folder.clone());
    let mut pending = vec![folder];

    while let Some(dir) = pending.pop() {
        progress.increment_dirs();
        let entries = match read_dir_batch(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                skip(progress, &e);
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    skip(progress, &e);
                    continue;
                }
            };
            let file_type = entry.metadata.file_type();

            if file_type.is_dir() {
                if exclusions.is_excluded(&entry.name) {
                    debug!(path = %entry.path.display(), "excluded directory pruned");
                    progress.increment_pruned();
                    continue;
                }
                record.item_count += 1;
                pending.push(entry.path);
            } else {
                record.item_count += 1;
                if file_type.is_file() {
                    let size = entry.metadata.len();
                    progress.record_file(size);
                    record.total_size_bytes += size;
                }
            }
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntryErrorKind;

    fn make_test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("disksift_scanner_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sparse(path: &Path, len: u64) {
        let file = std::fs::File::create(path).unwrap();
        file.set_len(len).unwrap();
    }

    fn entry(path: PathBuf) -> Result<DirEntryData, EntryAccessError> {
        let metadata = std::fs::symlink_metadata(&path).unwrap();
        let name = path.file_name().unwrap().to_os_string();
        Ok(DirEntryData {
            path,
            name,
            metadata,
        })
    }

    #[test]
    fn unreadable_entry_is_skipped_not_fatal() {
        let dir = make_test_dir("unreadable_entry");
        sparse(&dir.join("a.bin"), 600);
        sparse(&dir.join("b.bin"), 700);

        let batch = vec![
            entry(dir.join("a.bin")),
            Err(EntryAccessError {
                path: dir.join("locked.bin"),
                kind: EntryErrorKind::PermissionDenied,
                message: "permission denied".into(),
            }),
            entry(dir.join("b.bin")),
        ];

        let exclusions = ExclusionSet::empty();
        let predicate = FilePredicate::new(500, None, vec![]);
        let progress = ProgressTracker::new();
        let walk = LargeFileWalk {
            exclusions: &exclusions,
            predicate: &predicate,
            max_depth: None,
            progress: &progress,
        };

        let mut pending = Vec::new();
        let mut out = Vec::new();
        walk.visit(batch, 0, &mut pending, &mut out);

        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.bin", "b.bin"]);
        assert_eq!(progress.snapshot().skipped_entries, 1);
        assert!(pending.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn excluded_directory_is_never_queued() {
        let dir = make_test_dir("prune_queue");
        std::fs::create_dir_all(dir.join("node_modules")).unwrap();
        std::fs::create_dir_all(dir.join("src")).unwrap();

        let exclusions = ExclusionSet::new(["node_modules"]).unwrap();
        let predicate = FilePredicate::new(0, None, vec![]);
        let progress = ProgressTracker::new();
        let walk = LargeFileWalk {
            exclusions: &exclusions,
            predicate: &predicate,
            max_depth: None,
            progress: &progress,
        };

        let mut pending = Vec::new();
        let mut out = Vec::new();
        walk.visit(
            vec![entry(dir.join("node_modules")), entry(dir.join("src"))],
            0,
            &mut pending,
            &mut out,
        );

        assert_eq!(pending, vec![(dir.join("src"), 1)]);
        assert_eq!(progress.snapshot().pruned_dirs, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn max_depth_limits_descent() {
        let dir = make_test_dir("max_depth");
        std::fs::create_dir_all(dir.join("one/two/three")).unwrap();
        sparse(&dir.join("top.bin"), 10);
        sparse(&dir.join("one/mid.bin"), 10);
        sparse(&dir.join("one/two/deep.bin"), 10);
        sparse(&dir.join("one/two/three/deepest.bin"), 10);

        let exclusions = ExclusionSet::empty();
        let predicate = FilePredicate::new(0, None, vec![]);
        let found = |max_depth: Option<usize>| {
            let progress = ProgressTracker::new();
            let walk = LargeFileWalk {
                exclusions: &exclusions,
                predicate: &predicate,
                max_depth,
                progress: &progress,
            };
            let mut out = Vec::new();
            walk.run(&dir, &mut out);
            let mut names: Vec<String> = out.into_iter().map(|r| r.name).collect();
            names.sort();
            names
        };

        assert_eq!(found(Some(0)), vec!["top.bin"]);
        assert_eq!(found(Some(1)), vec!["mid.bin", "top.bin"]);
        assert_eq!(found(Some(2)), vec!["deep.bin", "mid.bin", "top.bin"]);
        assert_eq!(
            found(None),
            vec!["deep.bin", "deepest.bin", "mid.bin", "top.bin"]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_extension_can_be_excluded() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = make_test_dir("non_utf8_ext");
        let odd = dir.join(OsStr::from_bytes(b"clip.\xffraw"));
        sparse(&odd, 10);
        sparse(&dir.join("keep.bin"), 10);

        let exclusions = ExclusionSet::empty();
        // Lossy decoding turns the invalid byte into U+FFFD.
        let predicate = FilePredicate::new(0, None, vec![".\u{FFFD}raw".to_string()]);
        let progress = ProgressTracker::new();
        let walk = LargeFileWalk {
            exclusions: &exclusions,
            predicate: &predicate,
            max_depth: None,
            progress: &progress,
        };

        let mut out = Vec::new();
        walk.run(&dir, &mut out);
        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["keep.bin"]);
        assert_eq!(progress.snapshot().files_scanned, 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn folder_totals_are_recursive() {
        let dir = make_test_dir("folder_totals");
        let folder = dir.join("A");
        std::fs::create_dir_all(folder.join("nested/deeper")).unwrap();
        sparse(&folder.join("one.bin"), 100);
        sparse(&folder.join("nested/two.bin"), 200);
        sparse(&folder.join("nested/deeper/three.bin"), 300);

        let progress = ProgressTracker::new();
        let record = measure_folder(folder.clone(), &ExclusionSet::empty(), &progress);

        assert_eq!(record.folder_path, folder);
        assert_eq!(record.total_size_bytes, 600);
        // three files + two directories
        assert_eq!(record.item_count, 5);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn folder_totals_skip_excluded_subtrees() {
        let dir = make_test_dir("folder_excluded");
        let folder = dir.join("A");
        std::fs::create_dir_all(folder.join(".cache")).unwrap();
        sparse(&folder.join("keep.bin"), 100);
        sparse(&folder.join(".cache/huge.bin"), 1_000_000);

        let exclusions = ExclusionSet::new([".CACHE"]).unwrap();
        let record = measure_folder(folder, &exclusions, &ProgressTracker::new());
        assert_eq!(record.total_size_bytes, 100);
        assert_eq!(record.item_count, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_folder_measures_as_empty() {
        let dir = make_test_dir("folder_missing");
        let progress = ProgressTracker::new();
        let record = measure_folder(dir.join("gone"), &ExclusionSet::empty(), &progress);
        assert_eq!(record.total_size_bytes, 0);
        assert_eq!(record.item_count, 0);
        assert_eq!(progress.snapshot().skipped_entries, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
