use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by every traversal worker of one scan.
pub struct ProgressTracker {
    pub files_scanned: AtomicUsize,
    pub dirs_scanned: AtomicUsize,
    pub bytes_seen: AtomicU64,
    pub skipped_entries: AtomicUsize,
    pub pruned_dirs: AtomicUsize,
    pub start_time: Instant,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            files_scanned: AtomicUsize::new(0),
            dirs_scanned: AtomicUsize::new(0),
            bytes_seen: AtomicU64::new(0),
            skipped_entries: AtomicUsize::new(0),
            pruned_dirs: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_file(&self, size: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        self.bytes_seen.fetch_add(size, Ordering::Relaxed);
    }

    pub fn increment_dirs(&self) {
        self.dirs_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_skipped(&self) {
        self.skipped_entries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_pruned(&self) {
        self.pruned_dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn files_per_second(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < f64::EPSILON {
            return 0.0;
        }
        self.files_scanned.load(Ordering::Relaxed) as f64 / elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            dirs_scanned: self.dirs_scanned.load(Ordering::Relaxed),
            bytes_seen: self.bytes_seen.load(Ordering::Relaxed),
            skipped_entries: self.skipped_entries.load(Ordering::Relaxed),
            pruned_dirs: self.pruned_dirs.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
            files_per_second: self.files_per_second(),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub files_scanned: usize,
    pub dirs_scanned: usize,
    pub bytes_seen: u64,
    pub skipped_entries: usize,
    pub pruned_dirs: usize,
    pub elapsed: Duration,
    pub files_per_second: f64,
}
