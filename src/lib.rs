//! disksift - find large files and heavy folders.
//!
//! One pass over a directory tree produces either a list of files that pass
//! size/age/extension filters, or recursive totals per top-level folder.
//! Results are ranked by size, printed as a table and optionally exported
//! as CSV or JSON.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod models;

pub use config::scan_config::ScanConfig;
pub use config::settings::{ScanMode, Settings};
pub use error::{ConfigError, EntryAccessError, ExportError};
pub use models::record::{FileRecord, FolderRecord, Report};
pub use models::scan_result::{ScanOutcome, ScanResult};
