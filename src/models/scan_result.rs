use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use super::record::Report;
use crate::config::settings::ScanMode;
use crate::error::ExportError;

/// Output of one traversal, before and after ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub report: Report,
    pub mode: ScanMode,
    pub scan_path: PathBuf,
    pub files_scanned: usize,
    pub dirs_scanned: usize,
    /// Sum of every regular file's size seen, before any filter.
    pub bytes_seen: u64,
    pub files_per_second: f64,
    pub skipped_entries: usize,
    pub pruned_dirs: usize,
    pub scan_duration: Duration,
    pub timestamp: SystemTime,
}

/// A finished run: the ranked result plus whatever happened to the export.
///
/// An export failure is carried here as a warning; `result` is still valid.
#[derive(Debug)]
pub struct ScanOutcome {
    pub result: ScanResult,
    pub exported_to: Option<PathBuf>,
    pub export_error: Option<ExportError>,
}

impl ScanOutcome {
    pub fn export_failed(&self) -> bool {
        self.export_error.is_some()
    }
}
