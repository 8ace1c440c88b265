use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::units::{GB, KB, MB, TB};

/// Anything the ranker can order by size.
pub trait SizeMetric {
    fn size_metric(&self) -> u64;
}

/// One file that survived filtering in large-file mode.
///
/// `size_bytes` is canonical; MB/GB figures are derived when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub full_path: PathBuf,
    pub parent_directory: PathBuf,
    pub name: String,
    /// Dot-prefixed as found on disk (`.ISO`), empty when the file has none.
    pub extension: String,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
}

impl FileRecord {
    pub fn from_metadata(path: &Path, metadata: &std::fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            full_path: path.to_path_buf(),
            parent_directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            name,
            extension,
            size_bytes: metadata.len(),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            created: metadata.created().ok().map(DateTime::<Utc>::from),
        }
    }

    pub fn size_mb(&self) -> f64 {
        to_unit(self.size_bytes, MB)
    }

    pub fn size_gb(&self) -> f64 {
        to_unit(self.size_bytes, GB)
    }
}

impl SizeMetric for FileRecord {
    fn size_metric(&self) -> u64 {
        self.size_bytes
    }
}

/// Recursive totals for one immediate child directory of the scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub folder_path: PathBuf,
    pub total_size_bytes: u64,
    pub item_count: u64,
}

impl FolderRecord {
    pub fn new(folder_path: PathBuf) -> Self {
        Self {
            folder_path,
            total_size_bytes: 0,
            item_count: 0,
        }
    }

    pub fn size_mb(&self) -> f64 {
        to_unit(self.total_size_bytes, MB)
    }

    pub fn size_gb(&self) -> f64 {
        to_unit(self.total_size_bytes, GB)
    }
}

impl SizeMetric for FolderRecord {
    fn size_metric(&self) -> u64 {
        self.total_size_bytes
    }
}

/// Rounded to two decimals for display and export.
fn to_unit(bytes: u64, unit: u64) -> f64 {
    (bytes as f64 / unit as f64 * 100.0).round() / 100.0
}

pub fn human_readable_size(bytes: u64) -> String {
    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// The records of one scan. The two shapes are never mixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "kebab-case")]
pub enum Report {
    Files(Vec<FileRecord>),
    Folders(Vec<FolderRecord>),
}

impl Report {
    pub fn len(&self) -> usize {
        match self {
            Report::Files(records) => records.len(),
            Report::Folders(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the size metric over every record in the report.
    pub fn total_bytes(&self) -> u64 {
        match self {
            Report::Files(records) => records.iter().map(|r| r.size_bytes).sum(),
            Report::Folders(records) => records.iter().map(|r| r.total_size_bytes).sum(),
        }
    }
}
