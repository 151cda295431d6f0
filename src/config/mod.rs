//! Configuration for the comparison pipeline.
//!
//! Everything the pipeline needs is carried in an explicit [`PipelineConfig`]
//! passed to [`crate::pipeline::run_pipeline`]; there is no global state.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::util::safe_read_to_string;
use crate::error::{Result, SssError};
use crate::filter::Selection;
use crate::reader::SourceSpec;
use crate::report::{RenderOptions, ReportFormat};
use crate::transform::SortKey;
use crate::utils::logging::log_warning;

/// Report rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format
    pub format: ReportFormat,
    /// Title override
    pub title: Option<String>,
    /// Add a first-to-last-year change column
    pub include_change: bool,
    /// Write the report here instead of standard output
    pub output: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            title: None,
            include_change: false,
            output: None,
        }
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Provisional estimate of the reference year's CPI. The official annual
    /// figure is often unpublished when reports are produced, so this value is
    /// expected to be revised.
    pub reference_cpi_value: f64,
    /// Publication year everything is converted into; its rows are not adjusted
    pub reference_year: i32,
    /// County names to keep
    pub selected_counties: Vec<String>,
    /// Compact family-type codes to keep
    pub selected_family_types: Vec<String>,
    /// CSV file with a `year,cpi` header
    pub cpi_path: PathBuf,
    /// One sheet per publication year
    pub sources: Vec<SourceSpec>,
    /// Row ordering of the report table
    pub sort: SortKey,
    /// Report rendering settings
    pub report: ReportConfig,
    /// Optional tidy CSV export of the adjusted line items
    pub long_output: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_cpi_value: 304.7,
            reference_year: 2023,
            selected_counties: vec!["Wayne County".to_string(), "Marquette County".to_string()],
            selected_family_types: vec![
                "a1i0p0s0t0".to_string(),
                "a1i0p1s1t0".to_string(),
                "a2i1p1s0t0".to_string(),
            ],
            cpi_path: PathBuf::from("data/cpi.csv"),
            sources: Vec::new(),
            sort: SortKey::default(),
            report: ReportConfig::default(),
            long_output: None,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing keys take their defaults
    /// and relative paths are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = safe_read_to_string(path, "pipeline configuration")?;
        let mut config: Self = serde_json::from_str(&content)?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Make relative input and output paths relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        resolve(&mut self.cpi_path);
        for source in &mut self.sources {
            resolve(&mut source.path);
        }
        if let Some(output) = self.report.output.as_mut() {
            resolve(output);
        }
        if let Some(output) = self.long_output.as_mut() {
            resolve(output);
        }
    }

    /// Check the configuration before any file is read
    pub fn validate(&self) -> Result<()> {
        if !(self.reference_cpi_value.is_finite() && self.reference_cpi_value > 0.0) {
            return Err(SssError::Config(format!(
                "reference_cpi_value must be positive, got {}",
                self.reference_cpi_value
            )));
        }
        if self.sources.is_empty() {
            return Err(SssError::Config("at least one source is required".to_string()));
        }

        let mut years = HashSet::new();
        for source in &self.sources {
            if !years.insert(source.year) {
                return Err(SssError::Config(format!(
                    "more than one source for year {}",
                    source.year
                )));
            }
        }

        if !years.contains(&self.reference_year) {
            log_warning(
                &format!(
                    "Reference year {} has no source; every year will be adjusted",
                    self.reference_year
                ),
                None,
            );
        }
        if self.selected_counties.is_empty() || self.selected_family_types.is_empty() {
            log_warning("Empty county or family type selection; the report will be empty", None);
        }

        Ok(())
    }

    /// Selection filter for the configured counties and family types
    #[must_use]
    pub fn selection(&self) -> Selection {
        Selection::new(
            self.selected_counties.iter().cloned(),
            self.selected_family_types.iter().cloned(),
        )
    }

    /// Render options for the configured report
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            format: self.report.format,
            title: self.report.title.clone(),
            counties: self.selected_counties.clone(),
            reference_year: self.reference_year,
            include_change: self.report.include_change,
        }
    }
}
