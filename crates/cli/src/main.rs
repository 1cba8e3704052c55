//! # autotrans-cli
//!
//! Translates one column of CSV, TSV and XLSX files into another.

use anyhow::{bail, Context, Result};
use autotrans_core::AppConfig;
use autotrans_pipeline::{collect_files, Pipeline, RunSummary};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// autotrans - batch translation of table columns
#[derive(Parser)]
#[command(name = "autotrans")]
#[command(author, version, about = "Translate a column of CSV/TSV/XLSX files", long_about = None)]
struct Cli {
    /// File or directory to translate
    #[arg(value_name = "PATH", required_unless_present = "init")]
    path: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Write a starter configuration file and exit
    #[arg(long)]
    init: bool,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.init {
        AppConfig::write_template(&cli.config)
            .with_context(|| format!("Failed to write {}", cli.config.display()))?;
        println!(
            "{} {}",
            "Wrote".green().bold(),
            cli.config.display()
        );
        return Ok(());
    }

    let Some(path) = cli.path else {
        bail!("No input path given");
    };

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let translator = autotrans_translate::from_config(&config.translation)
        .context("Failed to set up the translation service")?;
    let files = collect_files(&path)
        .with_context(|| format!("Failed to list files under {}", path.display()))?;

    info!(
        target: "system",
        service = translator.name(),
        files = files.len(),
        "Starting translation"
    );

    let summary = Pipeline::new(&config, translator.as_ref())
        .run(&files)
        .await;
    print_summary(&summary);

    if !summary.is_success() {
        bail!(
            "{} of {} files could not be processed",
            summary.failures.len(),
            summary.files()
        );
    }

    Ok(())
}

/// Print the end-of-run summary to stdout.
fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        let status = if report.failed() == 0 {
            "ok".green()
        } else {
            "partial".yellow()
        };
        println!("[{status}] {report}");
    }

    for failure in &summary.failures {
        println!(
            "[{}] {}: {}",
            "failed".red(),
            failure.path.display(),
            failure.error
        );
    }

    println!(
        "{} {} files, {} rows translated, {} skipped, {} failed",
        "Done:".bold(),
        summary.files(),
        summary.translated().to_string().green(),
        summary.skipped(),
        summary.failed_rows().to_string().red()
    );
}
