use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use super::settings::{ScanMode, Settings};
use super::units::parse_size;
use crate::core::classifier::ExclusionSet;
use crate::core::predicate::normalize_extension;
use crate::error::ConfigError;

/// Validated, immutable configuration for one scan.
///
/// The root directory is checked here and nowhere else. The export
/// destination is deliberately not touched until the report is written.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    mode: ScanMode,
    root: PathBuf,
    min_size_bytes: u64,
    older_than: Option<DateTime<Utc>>,
    top_n: Option<NonZeroUsize>,
    exclude_dirs: ExclusionSet,
    exclude_extensions: Vec<String>,
    export_path: Option<PathBuf>,
    max_depth: Option<usize>,
    max_concurrent_io: usize,
}

impl ScanConfig {
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        Self::with_now(settings, Utc::now())
    }

    /// Same as [`ScanConfig::new`] with an explicit clock for the age cutoff.
    pub fn with_now(settings: Settings, now: DateTime<Utc>) -> Result<Self, ConfigError> {
        let root = validate_root(&settings.root)?;

        let min_size_bytes = parse_size(
            settings
                .min_size
                .as_deref()
                .unwrap_or_else(|| settings.mode.default_min_size()),
        )?;

        let older_than = match settings.older_than_days {
            Some(days) => {
                let days_i64 =
                    i64::try_from(days).map_err(|_| ConfigError::AgeOutOfRange(days))?;
                let span =
                    Duration::try_days(days_i64).ok_or(ConfigError::AgeOutOfRange(days))?;
                Some(
                    now.checked_sub_signed(span)
                        .ok_or(ConfigError::AgeOutOfRange(days))?,
                )
            }
            None => None,
        };

        let top_n = match settings.top {
            Some(n) => Some(NonZeroUsize::new(n).ok_or(ConfigError::ZeroTop)?),
            None => None,
        };

        let exclude_dirs = ExclusionSet::new(&settings.exclude_dirs)?;

        let mut exclude_extensions: Vec<String> = settings
            .exclude_extensions
            .iter()
            .filter_map(|e| normalize_extension(e))
            .collect();
        exclude_extensions.sort();
        exclude_extensions.dedup();

        Ok(Self {
            mode: settings.mode,
            root,
            min_size_bytes,
            older_than,
            top_n,
            exclude_dirs,
            exclude_extensions,
            export_path: settings.export,
            max_depth: settings.max_depth,
            max_concurrent_io: settings.max_concurrent_io.max(1),
        })
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn min_size_bytes(&self) -> u64 {
        self.min_size_bytes
    }

    pub fn older_than(&self) -> Option<DateTime<Utc>> {
        self.older_than
    }

    pub fn top_n(&self) -> Option<NonZeroUsize> {
        self.top_n
    }

    pub fn exclude_dirs(&self) -> &ExclusionSet {
        &self.exclude_dirs
    }

    pub fn exclude_extensions(&self) -> &[String] {
        &self.exclude_extensions
    }

    pub fn export_path(&self) -> Option<&Path> {
        self.export_path.as_deref()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn max_concurrent_io(&self) -> usize {
        self.max_concurrent_io
    }
}

fn validate_root(path: &Path) -> Result<PathBuf, ConfigError> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::RootNotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(ConfigError::RootUnreadable {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if !meta.is_dir() {
        return Err(ConfigError::RootNotDirectory(path.to_path_buf()));
    }
    std::fs::canonicalize(path).map_err(|source| ConfigError::RootUnreadable {
        path: path.to_path_buf(),
        source,
    })
}
