use std::io::Write;

use tracing::warn;

use crate::config::scan_config::ScanConfig;
use crate::core::ranker::{RankOptions, Ranker};
use crate::core::scanner::Scanner;
use crate::export::export_report;
use crate::export::table::{render_summary, render_table};
use crate::models::scan_result::ScanOutcome;

/// Scan, rank, print, then export. In that order: the printed report never
/// depends on the export succeeding.
pub struct App {
    config: ScanConfig,
}

impl App {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub async fn run<W: Write>(self, out: &mut W) -> anyhow::Result<ScanOutcome> {
        let options = RankOptions {
            min_size: self.config.min_size_bytes(),
            top_n: self.config.top_n(),
        };
        let export_path = self.config.export_path().map(|p| p.to_path_buf());

        let scanner = Scanner::new(self.config);
        let mut result = scanner.scan().await?;
        result.report = Ranker::rank_report(result.report, options);

        out.write_all(render_table(&result.report).as_bytes())?;
        writeln!(out)?;
        writeln!(out, "{}", render_summary(&result))?;
        out.flush()?;

        let mut outcome = ScanOutcome {
            result,
            exported_to: None,
            export_error: None,
        };

        if let Some(path) = export_path {
            match export_report(&outcome.result.report, &path) {
                Ok(written) => {
                    writeln!(out, "Exported to: {}", written.display())?;
                    outcome.exported_to = Some(written);
                }
                Err(e) => {
                    warn!(path = %e.path().display(), error = %e, "export failed");
                    outcome.export_error = Some(e);
                }
            }
        }

        Ok(outcome)
    }
}
