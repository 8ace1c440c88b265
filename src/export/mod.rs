pub mod csv;
pub mod json;
pub mod table;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ExportError;
use crate::models::record::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// `.json` selects JSON; anything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Persist `report` at `path`, creating missing parent directories.
///
/// Rows go to a hidden sibling file first and are renamed into place, so a
/// failed export never leaves a truncated file at `path`.
pub fn export_report(report: &Report, path: &Path) -> Result<PathBuf, ExportError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|source| ExportError::CreateDir {
        path: parent.clone(),
        source,
    })?;

    let tmp_path = temp_path(&parent, path);

    let written = write_to(report, &tmp_path, ExportFormat::from_path(path))
        .and_then(|()| {
            std::fs::rename(&tmp_path, path).map_err(|source| ExportError::Write {
                path: path.to_path_buf(),
                source,
            })
        });
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    info!(path = %path.display(), records = report.len(), "report exported");
    Ok(path.to_path_buf())
}

/// Hidden sibling named after the target and this process, so concurrent
/// runs exporting to the same path never share a temp file.
fn temp_path(parent: &Path, target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    parent.join(format!(".{}.{}.tmp", file_name, std::process::id()))
}

fn write_to(report: &Report, tmp_path: &Path, format: ExportFormat) -> Result<(), ExportError> {
    let write_err = |source| ExportError::Write {
        path: tmp_path.to_path_buf(),
        source,
    };

    let file = File::create(tmp_path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    match format {
        ExportFormat::Csv => self::csv::write_csv(report, &mut writer).map_err(|source| {
            ExportError::Csv {
                path: tmp_path.to_path_buf(),
                source,
            }
        })?,
        ExportFormat::Json => self::json::write_json(report, &mut writer).map_err(|source| {
            ExportError::Json {
                path: tmp_path.to_path_buf(),
                source,
            }
        })?,
    }
    writer.flush().map_err(write_err)?;
    writer.get_ref().sync_all().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::FolderRecord;

    fn make_test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("disksift_export_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn report() -> Report {
        Report::Folders(vec![FolderRecord {
            folder_path: PathBuf::from("/srv/a"),
            total_size_bytes: 42,
            item_count: 1,
        }])
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("r.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("r.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("r.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("report")), ExportFormat::Csv);
    }

    #[test]
    fn creates_missing_parents() {
        let dir = make_test_dir("parents");
        let target = dir.join("nested/deeper/report.csv");

        let written = export_report(&report(), &target).unwrap();
        assert_eq!(written, target);
        let text = std::fs::read_to_string(&target).unwrap();
        assert!(text.starts_with("folderPath,"));
        let tmp = format!(".report.csv.{}.tmp", std::process::id());
        assert!(!dir.join("nested/deeper").join(tmp).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn temp_file_is_unique_per_process() {
        let parent = Path::new("/out");
        let tmp = temp_path(parent, Path::new("/out/report.csv"));
        assert_eq!(tmp.parent(), Some(parent));
        assert_eq!(
            tmp.file_name().unwrap().to_string_lossy(),
            format!(".report.csv.{}.tmp", std::process::id())
        );
        assert_ne!(tmp, parent.join(".report.csv.tmp"));
    }

    #[test]
    fn json_by_extension() {
        let dir = make_test_dir("json");
        let target = dir.join("report.json");
        export_report(&report(), &target).unwrap();

        let back: Report = serde_json::from_slice(&std::fs::read(&target).unwrap()).unwrap();
        assert_eq!(back, report());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_destination_is_reported() {
        let dir = make_test_dir("blocked");
        // A regular file where a directory is needed.
        std::fs::write(dir.join("blocker"), "x").unwrap();
        let target = dir.join("blocker/report.csv");

        let err = export_report(&report(), &target).unwrap_err();
        assert!(matches!(err, ExportError::CreateDir { .. }));
        assert!(err.to_string().contains("blocker"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn existing_file_is_replaced_whole() {
        let dir = make_test_dir("replace");
        let target = dir.join("report.csv");
        std::fs::write(&target, "stale contents that are much longer than the new report").unwrap();

        export_report(&report(), &target).unwrap();
        let text = std::fs::read_to_string(&target).unwrap();
        assert!(!text.contains("stale"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
