use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use sss_compare::{PipelineConfig, ReportFormat, run_pipeline};

/// Compare Self-Sufficiency Standard costs across publication years in
/// reference-year dollars
#[derive(Debug, Parser)]
#[command(name = "sss-compare", version, about)]
struct Cli {
    /// JSON pipeline configuration
    #[arg(short, long, required_unless_present = "print_default_config")]
    config: Option<PathBuf>,

    /// Report format (text, markdown or html)
    #[arg(short, long)]
    format: Option<ReportFormat>,

    /// Write the report to this file instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the adjusted line items as a tidy CSV file
    #[arg(long)]
    long_output: Option<PathBuf>,

    /// Add a first-to-last-year change column
    #[arg(long)]
    include_change: bool,

    /// Print the default configuration as JSON and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.print_default_config {
        println!(
            "{}",
            serde_json::to_string_pretty(&PipelineConfig::default())
                .context("Failed to serialize default configuration")?
        );
        return Ok(());
    }

    let config_path = cli
        .config
        .context("A configuration file is required (--config)")?;
    let mut config = PipelineConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load configuration {}", config_path.display()))?;

    if let Some(format) = cli.format {
        config.report.format = format;
    }
    if let Some(output) = cli.output {
        config.report.output = Some(output);
    }
    if let Some(long_output) = cli.long_output {
        config.long_output = Some(long_output);
    }
    config.report.include_change |= cli.include_change;

    info!(
        "Comparing {} counties and {} family types across {} sources",
        config.selected_counties.len(),
        config.selected_family_types.len(),
        config.sources.len()
    );

    let output = run_pipeline(&config).context("Pipeline run failed")?;

    if output.table.is_empty() {
        warn!("No line items matched the selection");
    }
    if config.report.output.is_none() {
        print!("{}", output.report);
    }

    info!(
        "Reported {} line items from {} raw rows",
        output.table.rows().len(),
        output.raw_rows
    );
    Ok(())
}
