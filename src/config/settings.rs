use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which shape of report a scan produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// One record per file that passes the size/age/extension filters.
    LargeFiles,
    /// One record per immediate child directory of the root.
    FolderSizes,
}

impl ScanMode {
    /// Threshold used when the user gives no `--min-size`.
    pub fn default_min_size(&self) -> &'static str {
        match self {
            ScanMode::LargeFiles => "500MB",
            ScanMode::FolderSizes => "0",
        }
    }
}

/// Raw, unvalidated options as they arrive from the command line.
///
/// Turned into a [`ScanConfig`](super::scan_config::ScanConfig) exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub mode: ScanMode,
    pub root: PathBuf,
    pub min_size: Option<String>,
    pub older_than_days: Option<u64>,
    pub top: Option<usize>,
    pub exclude_dirs: Vec<String>,
    pub exclude_extensions: Vec<String>,
    pub export: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub max_concurrent_io: usize,
}

impl Settings {
    pub fn new(mode: ScanMode, root: PathBuf) -> Self {
        Self {
            mode,
            root,
            ..Self::default()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let max_concurrent_io = match detect_storage_type() {
            StorageType::SSD => 16,
            StorageType::HDD => 2,
            StorageType::Unknown => 8,
        };

        // Cap concurrency to avoid "too many open files" (EMFILE)
        let max_concurrent_io = cap_by_fd_limit(max_concurrent_io);

        Self {
            mode: ScanMode::LargeFiles,
            root: PathBuf::from("."),
            min_size: None,
            older_than_days: None,
            top: None,
            exclude_dirs: vec![],
            exclude_extensions: vec![],
            export: None,
            max_depth: None,
            max_concurrent_io,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    SSD,
    HDD,
    Unknown,
}

pub fn detect_storage_type() -> StorageType {
    #[cfg(target_os = "macos")]
    {
        detect_storage_type_macos()
    }
    #[cfg(target_os = "linux")]
    {
        detect_storage_type_linux()
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        StorageType::Unknown
    }
}

#[cfg(target_os = "macos")]
fn detect_storage_type_macos() -> StorageType {
    use std::process::Command;

    let output = Command::new("system_profiler")
        .arg("SPStorageDataType")
        .output();

    match output {
        Ok(out) => {
            let text = String::from_utf8_lossy(&out.stdout).to_lowercase();
            if text.contains("solid state") || text.contains("ssd") || text.contains("nvme") {
                StorageType::SSD
            } else if text.contains("rotational") || text.contains("hdd") {
                StorageType::HDD
            } else {
                StorageType::Unknown
            }
        }
        Err(_) => StorageType::Unknown,
    }
}

#[cfg(target_os = "linux")]
fn detect_storage_type_linux() -> StorageType {
    use std::fs;

    let entries = match fs::read_dir("/sys/block") {
        Ok(e) => e,
        Err(_) => return StorageType::Unknown,
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if !name_str.starts_with("sd") && !name_str.starts_with("nvme") {
            continue;
        }

        let rotational_path = format!("/sys/block/{}/queue/rotational", name_str);
        if let Ok(val) = fs::read_to_string(&rotational_path) {
            return match val.trim() {
                "0" => StorageType::SSD,
                "1" => StorageType::HDD,
                _ => StorageType::Unknown,
            };
        }
    }

    StorageType::Unknown
}

/// Each folder worker holds at most one directory handle open at a time
/// per recursion level, so keep well under the soft fd limit.
fn cap_by_fd_limit(max_io: usize) -> usize {
    #[cfg(unix)]
    {
        let mut rlim = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        let ret = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut rlim) };
        if ret == 0 && rlim.rlim_cur != libc::RLIM_INFINITY {
            let fd_limit = rlim.rlim_cur as usize;
            let usable = fd_limit / 8;
            return max_io.min(usable).max(1);
        }
    }
    max_io
}
