use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::config::scan_config::ScanConfig;

/// What the predicate needs to know about a file.
#[derive(Debug, Clone, Copy)]
pub struct FileCandidate<'a> {
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Extension without the leading dot, as the filesystem reports it.
    pub extension: Option<&'a str>,
}

/// Size, age and extension filter applied to every regular file in
/// large-file mode.
#[derive(Debug, Clone)]
pub struct FilePredicate {
    min_size: u64,
    cutoff: Option<SystemTime>,
    excluded_extensions: Vec<String>,
}

impl FilePredicate {
    /// `excluded_extensions` must already be normalized (see [`normalize_extension`]).
    pub fn new(
        min_size: u64,
        older_than: Option<DateTime<Utc>>,
        excluded_extensions: Vec<String>,
    ) -> Self {
        Self {
            min_size,
            cutoff: older_than.map(SystemTime::from),
            excluded_extensions,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            config.min_size_bytes(),
            config.older_than(),
            config.exclude_extensions().to_vec(),
        )
    }

    /// Cheapest check first: size, then age, then extension.
    pub fn accepts(&self, file: &FileCandidate<'_>) -> bool {
        if file.size < self.min_size {
            return false;
        }

        if let Some(cutoff) = self.cutoff {
            match file.modified {
                Some(modified) if modified <= cutoff => {}
                _ => return false,
            }
        }

        if !self.excluded_extensions.is_empty() {
            if let Some(ext) = file.extension {
                let ext = ext.to_lowercase();
                if self
                    .excluded_extensions
                    .iter()
                    .any(|excluded| excluded.strip_prefix('.') == Some(ext.as_str()))
                {
                    return false;
                }
            }
        }

        true
    }
}

/// Turn `bak`, `.BAK` or `*.bak` into `.bak`. Blank input yields `None`.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('*').trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}
