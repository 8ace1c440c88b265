use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use disksift::config::scan_config::ScanConfig;
use disksift::config::settings::{ScanMode, Settings};
use disksift::{ConfigError, ScanOutcome};

#[derive(Parser, Debug)]
#[command(name = "disksift", version, about = "Find large files and heavy folders")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the largest files under a directory
    LargeFiles(LargeFilesArgs),
    /// Total size and item count of each folder directly under a directory
    FolderSizes(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Path to scan (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Minimum size, in bytes or with a unit (500MB, 1.5GB)
    #[arg(short = 's', long)]
    min_size: Option<String>,

    /// Show only the N largest entries
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Directory names or globs to skip entirely (comma-separated)
    #[arg(short = 'x', long, value_delimiter = ',')]
    exclude_dirs: Vec<String>,

    /// Maximum number of folders measured in parallel
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Write the report to a file (.csv, or .json for JSON)
    #[arg(short = 'o', long)]
    export: Option<PathBuf>,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Args, Debug)]
struct LargeFilesArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Only files last modified at least N days ago
    #[arg(short = 'a', long)]
    older_than_days: Option<u64>,

    /// Extensions to ignore, with or without the dot (comma-separated)
    #[arg(short = 'e', long, value_delimiter = ',')]
    exclude_extensions: Vec<String>,

    /// Maximum directory depth to descend
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,
}

impl CommonArgs {
    fn into_settings(self, mode: ScanMode) -> (Settings, bool) {
        let mut settings = Settings::new(mode, self.path);
        settings.min_size = self.min_size;
        settings.top = self.top;
        settings.exclude_dirs = self.exclude_dirs;
        settings.export = self.export;
        if let Some(conc) = self.concurrency {
            settings.max_concurrent_io = conc;
        }
        (settings, self.print_config)
    }
}

impl Command {
    fn into_settings(self) -> (Settings, bool) {
        match self {
            Command::LargeFiles(args) => {
                let (mut settings, print_config) = args.common.into_settings(ScanMode::LargeFiles);
                settings.older_than_days = args.older_than_days;
                settings.exclude_extensions = args.exclude_extensions;
                settings.max_depth = args.max_depth;
                (settings, print_config)
            }
            Command::FolderSizes(common) => common.into_settings(ScanMode::FolderSizes),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing (logs to stderr)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();
    let (settings, print_config) = cli.command.into_settings();

    if print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(ExitCode::SUCCESS);
    }

    // Root path and numeric ranges are checked here, before any traversal
    let run = match ScanConfig::new(settings) {
        Ok(config) => {
            let mut stdout = std::io::stdout().lock();
            Ok(disksift::app::App::new(config).run(&mut stdout).await?)
        }
        Err(e) => Err(e),
    };

    match &run {
        Err(e) => eprintln!("error: {}", e),
        Ok(outcome) => {
            if let Some(e) = &outcome.export_error {
                eprintln!("warning: export failed: {}", e);
            }
        }
    }
    Ok(ExitCode::from(exit_status(&run)))
}

/// 0 for a finished scan (even an empty one), 1 when the configuration is
/// rejected, 2 when the report printed but the export failed.
fn exit_status(run: &Result<ScanOutcome, ConfigError>) -> u8 {
    match run {
        Err(_) => 1,
        Ok(outcome) if outcome.export_failed() => 2,
        Ok(_) => 0,
    }
}
