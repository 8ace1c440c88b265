use std::io::{Read, Write};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::record::{FileRecord, FolderRecord, Report};

pub const FILE_COLUMNS: [&str; 9] = [
    "fullPath",
    "parentDirectory",
    "name",
    "extension",
    "sizeBytes",
    "sizeMB",
    "sizeGB",
    "lastModified",
    "created",
];

pub const FOLDER_COLUMNS: [&str; 5] = [
    "folderPath",
    "totalSizeBytes",
    "sizeMB",
    "sizeGB",
    "itemCount",
];

/// Write the report as comma-separated rows with a header line.
///
/// `sizeMB`/`sizeGB` are rounded display columns; the byte columns are the
/// values to trust when reading the file back.
pub fn write_csv<W: Write>(report: &Report, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    match report {
        Report::Files(records) => {
            wtr.write_record(FILE_COLUMNS)?;
            for r in records {
                wtr.write_record([
                    r.full_path.to_string_lossy().into_owned(),
                    r.parent_directory.to_string_lossy().into_owned(),
                    r.name.clone(),
                    r.extension.clone(),
                    r.size_bytes.to_string(),
                    format!("{:.2}", r.size_mb()),
                    format!("{:.2}", r.size_gb()),
                    format_timestamp(r.last_modified),
                    format_timestamp(r.created),
                ])?;
            }
        }
        Report::Folders(records) => {
            wtr.write_record(FOLDER_COLUMNS)?;
            for r in records {
                wtr.write_record([
                    r.folder_path.to_string_lossy().into_owned(),
                    r.total_size_bytes.to_string(),
                    format!("{:.2}", r.size_mb()),
                    format!("{:.2}", r.size_gb()),
                    r.item_count.to_string(),
                ])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_file_records<R: Read>(reader: R) -> Result<Vec<FileRecord>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}

pub fn read_folder_records<R: Read>(reader: R) -> Result<Vec<FolderRecord>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}

fn format_timestamp(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_default()
}
