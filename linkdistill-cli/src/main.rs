use clap::Parser;
use colored::Colorize;
use linkdistill::{distill, ConfigOverrides, DistillConfig, DistillError, DistillSummary};
use std::{num::NonZeroUsize, path::PathBuf, process, time::Duration};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, DistillError>;

/// Extracts alternative links from piuparts LOG-ALTERNATIVES lines
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing piuparts logfiles
    #[arg(short = 'd', long = "logs-dir", visible_alias = "logs_dir")]
    logs_dir: Option<PathBuf>,

    /// Path to write the (gzip-compressed, json-encoded) distilled links file to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of logfiles to read in parallel [default: 10]
    #[arg(short = 'j', long)]
    parallel: Option<NonZeroUsize>,

    /// Only files whose name ends with this suffix are read [default: .log]
    #[arg(long)]
    suffix: Option<String>,

    /// Maximum line length in bytes before a file is skipped [default: 5 MiB]
    #[arg(long)]
    max_line_len: Option<usize>,

    /// Patterns to ignore (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Show run statistics after writing
    #[arg(short, long)]
    stats: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let file_config = DistillConfig::load_from(cli.config.as_deref())
        .map_err(|e| DistillError::config_error(e.to_string()))?;

    let config = file_config.merge_with_cli(ConfigOverrides {
        logs_dir: cli.logs_dir,
        output: cli.output,
        parallel: cli.parallel,
        log_suffix: cli.suffix,
        max_line_len: cli.max_line_len,
        ignore_patterns: cli.ignore,
        log_level: cli.log_level,
    });

    setup_logging(&config.log_level);

    let summary = distill(&config)?;
    print_summary(&summary, cli.stats);
    Ok(())
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(summary: &DistillSummary, show_stats: bool) {
    let elapsed = Duration::from_millis(summary.elapsed.as_millis() as u64);

    println!(
        "Wrote {} links to {} in {}",
        summary.unique_links.to_string().green(),
        summary.output.display().to_string().blue(),
        humantime::format_duration(elapsed)
    );

    if summary.stats.files_failed > 0 {
        println!(
            "{} of {} log files could not be read",
            summary.stats.files_failed.to_string().red(),
            summary.stats.files_processed + summary.stats.files_failed
        );
    }

    if show_stats {
        let stats = &summary.stats;
        println!("Files processed: {}", stats.files_processed);
        println!("Files failed: {}", stats.files_failed);
        println!("Lines scanned: {}", stats.lines_scanned);
        println!("Candidate lines: {}", stats.candidate_lines);
        println!("Links found: {}", stats.records_emitted);
        println!("Unique links: {}", summary.unique_links);
    }
}
