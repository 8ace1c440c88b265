use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use unicode_width::UnicodeWidthStr;

use crate::models::record::{human_readable_size, FileRecord, FolderRecord, Report};
use crate::models::scan_result::ScanResult;

/// Render a ranked report as an aligned plain-text table.
///
/// An empty report renders a single line saying so, which is distinct from
/// any error output.
pub fn render_table(report: &Report) -> String {
    if report.is_empty() {
        return match report {
            Report::Files(_) => "No files matched the filters.\n".to_string(),
            Report::Folders(_) => "No folders matched the filters.\n".to_string(),
        };
    }

    let (header, rows) = match report {
        Report::Files(records) => (
            vec!["Size", "Modified", "Path"],
            records.iter().map(file_row).collect::<Vec<_>>(),
        ),
        Report::Folders(records) => (
            vec!["Size", "Items", "Folder"],
            records.iter().map(folder_row).collect::<Vec<_>>(),
        ),
    };

    let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

/// One-line summary of the scan that produced `result`.
pub fn render_summary(result: &ScanResult) -> String {
    let noun = match result.report {
        Report::Files(_) => "file",
        Report::Folders(_) => "folder",
    };
    let count = result.report.len();
    let mut line = format!(
        "{} {}{} totalling {}",
        count,
        noun,
        if count == 1 { "" } else { "s" },
        human_readable_size(result.report.total_bytes()),
    );
    let _ = write!(
        line,
        " | scanned {} files ({}) in {} directories in {:.2}s, {:.0} files/s",
        result.files_scanned,
        human_readable_size(result.bytes_seen),
        result.dirs_scanned,
        result.scan_duration.as_secs_f64(),
        result.files_per_second,
    );
    if result.skipped_entries > 0 {
        let _ = write!(line, ", {} unreadable entries skipped", result.skipped_entries);
    }
    if result.pruned_dirs > 0 {
        let _ = write!(line, ", {} excluded directories pruned", result.pruned_dirs);
    }
    line
}

fn file_row(record: &FileRecord) -> Vec<String> {
    vec![
        human_readable_size(record.size_bytes),
        format_time(record.last_modified),
        record.full_path.display().to_string(),
    ]
}

fn folder_row(record: &FolderRecord) -> Vec<String> {
    vec![
        human_readable_size(record.total_size_bytes),
        record.item_count.to_string(),
        record.folder_path.display().to_string(),
    ]
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// First column right-aligned (sizes), last column unpadded.
fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, cell) in cells.iter().enumerate() {
        let pad = widths[i].saturating_sub(cell.width());
        if i == 0 {
            out.push_str(&" ".repeat(pad));
            out.push_str(cell);
        } else if i == last {
            out.push_str(cell);
        } else {
            out.push_str(cell);
            out.push_str(&" ".repeat(pad));
        }
        if i != last {
            out.push_str("  ");
        }
    }
    out.push('\n');
}
