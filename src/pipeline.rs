//! End-to-end run: CPI series, raw standard tables, normalization, report.

use std::time::Instant;

use crate::config::PipelineConfig;
use crate::cpi::{AdjustmentFactors, CpiTable};
use crate::error::Result;
use crate::reader::load_standards;
use crate::report::{RenderedReport, render};
use crate::transform::{LineItemRecord, ReportTable, normalize, write_line_items_csv};
use crate::utils::logging::{log_stage_complete, log_stage_start};

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Rows in the unioned raw dataset
    pub raw_rows: usize,
    /// Adjusted long-form line items
    pub line_items: Vec<LineItemRecord>,
    /// Year-per-column table
    pub table: ReportTable,
    /// Rendered report
    pub report: RenderedReport,
}

/// CPI stage: load the configured series with its provisional reference value
fn load_cpi(config: &PipelineConfig) -> Result<CpiTable> {
    let start = Instant::now();
    log_stage_start("CPI loader", &config.cpi_path.display().to_string());
    let cpi = CpiTable::load(&config.cpi_path, config.reference_cpi_value)?;
    log_stage_complete("CPI loader", cpi.years().len(), Some(start.elapsed()));
    Ok(cpi)
}

/// Run every stage for a configuration.
///
/// Loader failures abort immediately; an empty selection yields an empty
/// report. Configured output files are written before returning.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput> {
    let start = Instant::now();
    config.validate()?;

    let cpi = load_cpi(config)?;
    let raw = load_standards(&config.sources)?;
    let factors = AdjustmentFactors::compute(&cpi, &raw.years()?, config.reference_year)?;

    let normalized = normalize(&raw, &config.selection(), &factors, config.sort)?;
    let report = render(&normalized.table, &config.render_options())?;

    if let Some(path) = &config.long_output {
        write_line_items_csv(&normalized.line_items, path)?;
    }
    if let Some(path) = &config.report.output {
        report.write_to(path)?;
    }

    log::info!("Pipeline finished in {:?}", start.elapsed());
    Ok(PipelineOutput {
        raw_rows: raw.num_rows(),
        line_items: normalized.line_items,
        table: normalized.table,
        report,
    })
}
