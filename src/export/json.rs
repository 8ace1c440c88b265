use std::io::Write;

use crate::models::record::Report;

pub fn write_json<W: Write>(report: &Report, writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, report)
}
