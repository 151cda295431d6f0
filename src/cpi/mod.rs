//! Consumer Price Index series and inflation adjustment factors.
//!
//! Costs published for different years are converted into reference-year
//! dollars by multiplying with `reference_cpi / cpi[year]`. The reference CPI
//! is supplied by configuration because the current year's official index is
//! often unpublished when a report is produced; it is provisional and expected
//! to be revised.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, Float64Array, Int32Array};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow_schema::{DataType, Field, Schema};
use rustc_hash::FxHashMap;

use crate::error::util::safe_open_file;
use crate::error::{Result, SssError};
use crate::schema::normalize_column_name;

/// Published CPI value for a calendar year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpiRecord {
    /// Calendar year
    pub year: i32,
    /// Index value, always positive
    pub cpi: f64,
}

/// A CPI time series paired with the reference index value
#[derive(Debug, Clone)]
pub struct CpiTable {
    series: FxHashMap<i32, f64>,
    reference_cpi: f64,
}

impl CpiTable {
    /// Build a table from records.
    ///
    /// Rejects duplicate years and non-positive index values.
    pub fn from_records(
        records: impl IntoIterator<Item = CpiRecord>,
        reference_cpi: f64,
    ) -> Result<Self> {
        if !(reference_cpi.is_finite() && reference_cpi > 0.0) {
            return Err(SssError::InvalidCpiSeries(format!(
                "reference CPI must be positive, got {reference_cpi}"
            )));
        }

        let mut series = FxHashMap::default();
        for record in records {
            if !(record.cpi.is_finite() && record.cpi > 0.0) {
                return Err(SssError::InvalidCpiSeries(format!(
                    "CPI for {} must be positive, got {}",
                    record.year, record.cpi
                )));
            }
            if series.insert(record.year, record.cpi).is_some() {
                return Err(SssError::InvalidCpiSeries(format!(
                    "duplicate CPI entry for {}",
                    record.year
                )));
            }
        }

        Ok(Self {
            series,
            reference_cpi,
        })
    }

    /// Load a CPI series from a CSV file with a `year,cpi` header
    pub fn load(path: &Path, reference_cpi: f64) -> Result<Self> {
        let format = Format::default().with_header(true);
        let (header, _) = format.infer_schema(safe_open_file(path, "CPI series")?, Some(0))?;
        let columns: Vec<String> = header
            .fields()
            .iter()
            .map(|f| normalize_column_name(f.name()))
            .collect();
        if columns != ["year", "cpi"] {
            return Err(SssError::InvalidCpiSeries(format!(
                "{}: expected columns [year, cpi], found {columns:?}",
                path.display()
            )));
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("year", DataType::Int32, false),
            Field::new("cpi", DataType::Float64, false),
        ]));
        let reader = ReaderBuilder::new(schema)
            .with_header(true)
            .build(safe_open_file(path, "CPI series")?)?;

        let mut records = Vec::new();
        for batch in reader {
            let batch = batch?;
            let years = batch
                .column(0)
                .as_any()
                .downcast_ref::<Int32Array>()
                .ok_or_else(|| SssError::InvalidCpiSeries("year column is not Int32".into()))?;
            let values = batch
                .column(1)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| SssError::InvalidCpiSeries("cpi column is not Float64".into()))?;

            for i in 0..batch.num_rows() {
                if years.is_null(i) || values.is_null(i) {
                    return Err(SssError::InvalidCpiSeries(format!(
                        "{}: empty value on data row {}",
                        path.display(),
                        records.len() + 1
                    )));
                }
                records.push(CpiRecord {
                    year: years.value(i),
                    cpi: values.value(i),
                });
            }
        }

        log::debug!("Loaded {} CPI records from {}", records.len(), path.display());
        Self::from_records(records, reference_cpi)
    }

    /// The configured reference index value
    #[must_use]
    pub fn reference_cpi(&self) -> f64 {
        self.reference_cpi
    }

    /// CPI value for a year, if present
    #[must_use]
    pub fn cpi(&self, year: i32) -> Option<f64> {
        self.series.get(&year).copied()
    }

    /// Years covered by the series, ascending
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.series.keys().copied().collect();
        years.sort_unstable();
        years
    }

    /// Multiplier converting `year` dollars into reference dollars
    pub fn factor_for(&self, year: i32) -> Result<f64> {
        self.cpi(year)
            .map(|cpi| self.reference_cpi / cpi)
            .ok_or(SssError::MissingYear { year })
    }
}

/// Adjustment factors precomputed for every source year of a dataset
#[derive(Debug, Clone)]
pub struct AdjustmentFactors {
    reference_year: i32,
    factors: FxHashMap<i32, f64>,
}

impl AdjustmentFactors {
    /// Compute the factor for each year that differs from `reference_year`.
    ///
    /// Fails with [`SssError::MissingYear`] if the CPI series lacks any of them.
    pub fn compute(cpi: &CpiTable, years: &[i32], reference_year: i32) -> Result<Self> {
        let mut factors = FxHashMap::default();
        for &year in years.iter().filter(|&&y| y != reference_year) {
            let factor = cpi.factor_for(year)?;
            log::info!("Adjustment factor for {year} -> {reference_year} dollars: {factor:.4}");
            factors.insert(year, factor);
        }

        Ok(Self {
            reference_year,
            factors,
        })
    }

    /// The year whose dollars everything is converted into
    #[must_use]
    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Factor for a year; the reference year is always `1.0`
    #[must_use]
    pub fn factor(&self, year: i32) -> Option<f64> {
        if year == self.reference_year {
            Some(1.0)
        } else {
            self.factors.get(&year).copied()
        }
    }

    /// Convert an amount in `year` dollars into reference dollars.
    ///
    /// Reference-year amounts are returned untouched.
    pub fn adjust(&self, amount: f64, year: i32) -> Result<f64> {
        if year == self.reference_year {
            return Ok(amount);
        }
        self.factor(year)
            .map(|factor| amount * factor)
            .ok_or(SssError::MissingYear { year })
    }
}
