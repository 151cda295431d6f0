//! Loading of yearly "by family" standard tables.
//!
//! Each source is validated against its declared [`SchemaDescriptor`], read
//! into the declared Arrow types, tagged with its publication year, aligned to
//! a common column order and unioned into a single [`RawStandardTable`].
//! Any failing source aborts the whole load.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{Array, ArrayRef, Int32Array};
use arrow::compute::{CastOptions, cast_with_options, concat_batches};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::error::util::safe_open_file;
use crate::error::{Result, SssError};
use crate::schema::{BY_FAMILY_V1, SchemaDescriptor, columns, normalize_column_name};
use crate::utils::logging::{
    create_source_progress_bar, finish_and_clear, log_source_loaded, log_stage_complete,
    log_stage_start,
};

fn default_schema_version() -> String {
    BY_FAMILY_V1.to_string()
}

/// One publication year's "by family" sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Sheet exported as CSV, or a Parquet file
    pub path: PathBuf,
    /// Publication year the rows are tagged with
    pub year: i32,
    /// Registered schema version the sheet must match
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
}

impl SourceSpec {
    /// Source using the published layout
    pub fn new(path: impl Into<PathBuf>, year: i32) -> Self {
        Self {
            path: path.into(),
            year,
            schema_version: default_schema_version(),
        }
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// File formats a sheet can be supplied in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated export of the sheet
    Csv,
    /// Parquet conversion of the sheet
    Parquet,
}

impl SourceFormat {
    /// Detect the format from the file extension
    pub fn detect(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") | Some("pq") => Ok(Self::Parquet),
            _ => Err(SssError::UnsupportedSource(path.to_path_buf())),
        }
    }
}

/// All sources unioned into one year-tagged dataset
#[derive(Debug, Clone)]
pub struct RawStandardTable {
    batch: RecordBatch,
}

impl RawStandardTable {
    /// Wrap an already unioned batch
    #[must_use]
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// The unioned rows
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Schema of the unioned rows, including the `year` tag
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Total number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Distinct publication years, ascending
    pub fn years(&self) -> Result<Vec<i32>> {
        let idx = self.batch.schema().index_of(columns::YEAR)?;
        let years = self
            .batch
            .column(idx)
            .as_any()
            .downcast_ref::<Int32Array>()
            .ok_or_else(|| ArrowError::SchemaError("year column is not Int32".to_string()))?;

        let mut distinct: Vec<i32> = years.iter().flatten().collect();
        distinct.sort_unstable();
        distinct.dedup();
        Ok(distinct)
    }
}

/// Read the header of a CSV sheet as normalized column names
fn read_csv_columns(path: &Path) -> Result<Vec<String>> {
    let format = Format::default().with_header(true);
    let (header, _) = format.infer_schema(safe_open_file(path, "standard table header")?, Some(0))?;
    Ok(header
        .fields()
        .iter()
        .map(|f| normalize_column_name(f.name()))
        .collect())
}

fn read_csv_source(spec: &SourceSpec, descriptor: &SchemaDescriptor) -> Result<Vec<RecordBatch>> {
    let columns = read_csv_columns(&spec.path)?;
    descriptor.validate_columns(&columns, &spec.name(), spec.year)?;

    let reader = ReaderBuilder::new(descriptor.arrow_schema())
        .with_header(true)
        .build(safe_open_file(&spec.path, "standard table")?)?;

    reader
        .collect::<std::result::Result<Vec<_>, ArrowError>>()
        .map_err(|e| coercion_error(spec, &e))
}

fn read_parquet_source(
    spec: &SourceSpec,
    descriptor: &SchemaDescriptor,
) -> Result<Vec<RecordBatch>> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(safe_open_file(&spec.path, "standard table")?)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| normalize_column_name(f.name()))
        .collect();
    descriptor.validate_columns(&columns, &spec.name(), spec.year)?;

    let target = descriptor.arrow_schema();
    // Unparseable values must fail rather than turn into nulls
    let strict = CastOptions {
        safe: false,
        ..Default::default()
    };
    let mut batches = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        let coerced: Vec<ArrayRef> = batch
            .columns()
            .iter()
            .zip(target.fields())
            .map(|(column, field)| cast_with_options(column, field.data_type(), &strict))
            .collect::<std::result::Result<_, ArrowError>>()
            .map_err(|e| coercion_error(spec, &e))?;
        batches.push(RecordBatch::try_new(target.clone(), coerced)?);
    }

    Ok(batches)
}

fn coercion_error(spec: &SourceSpec, error: &ArrowError) -> SssError {
    SssError::schema_mismatch(
        spec.name(),
        spec.year,
        format!("values do not match declared column types: {error}"),
    )
}

/// Append the publication year to every row
fn tag_with_year(batch: &RecordBatch, year: i32) -> Result<RecordBatch> {
    let mut fields: Vec<Arc<Field>> = batch.schema().fields().iter().cloned().collect();
    fields.push(Arc::new(Field::new(columns::YEAR, DataType::Int32, false)));

    let mut arrays: Vec<ArrayRef> = batch.columns().to_vec();
    arrays.push(Arc::new(Int32Array::from(vec![year; batch.num_rows()])));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Read one source, validated against its schema and tagged with its year
pub fn read_source(spec: &SourceSpec) -> Result<RecordBatch> {
    let descriptor = SchemaDescriptor::for_version(&spec.schema_version)?;
    read_source_with(spec, &descriptor)
}

/// Read one source against an explicit descriptor
pub fn read_source_with(spec: &SourceSpec, descriptor: &SchemaDescriptor) -> Result<RecordBatch> {
    let batches = match SourceFormat::detect(&spec.path)? {
        SourceFormat::Csv => read_csv_source(spec, descriptor)?,
        SourceFormat::Parquet => read_parquet_source(spec, descriptor)?,
    };

    let combined = concat_batches(&descriptor.arrow_schema(), &batches)?;
    tag_with_year(&combined, spec.year)
}

/// Reorder a batch's columns to `target`, matching by name and type
fn align_to(batch: &RecordBatch, target: &SchemaRef, spec: &SourceSpec) -> Result<RecordBatch> {
    let schema = batch.schema();
    if schema.fields().len() != target.fields().len() {
        return Err(SssError::schema_mismatch(
            spec.name(),
            spec.year,
            format!(
                "has {} columns but earlier sources have {}",
                schema.fields().len(),
                target.fields().len()
            ),
        ));
    }

    let mut arrays = Vec::with_capacity(target.fields().len());
    for field in target.fields() {
        let idx = schema.index_of(field.name()).map_err(|_| {
            SssError::schema_mismatch(
                spec.name(),
                spec.year,
                format!("column '{}' present in earlier sources is missing", field.name()),
            )
        })?;
        if schema.field(idx).data_type() != field.data_type() {
            return Err(SssError::schema_mismatch(
                spec.name(),
                spec.year,
                format!(
                    "column '{}' is {} but earlier sources have {}",
                    field.name(),
                    schema.field(idx).data_type(),
                    field.data_type()
                ),
            ));
        }
        arrays.push(batch.column(idx).clone());
    }

    Ok(RecordBatch::try_new(target.clone(), arrays)?)
}

/// Read every source and union them into one dataset.
///
/// Sources are read in order; the first source fixes the column order the
/// others are aligned to.
pub fn load_standards(sources: &[SourceSpec]) -> Result<RawStandardTable> {
    load_standards_with(sources, read_source)
}

/// Union sources using a caller-supplied reader, typically for custom
/// descriptors
pub fn load_standards_with<F>(sources: &[SourceSpec], mut read: F) -> Result<RawStandardTable>
where
    F: FnMut(&SourceSpec) -> Result<RecordBatch>,
{
    if sources.is_empty() {
        return Err(SssError::Config("no standard table sources configured".to_string()));
    }

    let start = Instant::now();
    log_stage_start("Raw standard loader", &format!("{} sources", sources.len()));
    let pb = create_source_progress_bar(sources.len() as u64);

    let mut target: Option<SchemaRef> = None;
    let mut batches = Vec::with_capacity(sources.len());
    for spec in sources {
        pb.set_message(spec.name());
        let batch = match read(spec) {
            Ok(batch) => batch,
            Err(e) => {
                finish_and_clear(&pb);
                log::error!("Failed to load {} ({}): {e}", spec.name(), spec.year);
                return Err(e);
            }
        };
        log_source_loaded(&spec.path, spec.year, batch.num_rows());

        let batch = match &target {
            Some(schema) => align_to(&batch, schema, spec),
            None => {
                target = Some(batch.schema());
                Ok(batch)
            }
        };
        match batch {
            Ok(batch) => batches.push(batch),
            Err(e) => {
                finish_and_clear(&pb);
                return Err(e);
            }
        }
        pb.inc(1);
    }
    finish_and_clear(&pb);

    let schema = target.ok_or_else(|| SssError::Config("no sources were read".to_string()))?;
    let union = concat_batches(&schema, &batches)?;
    log_stage_complete("Raw standard loader", union.num_rows(), Some(start.elapsed()));

    Ok(RawStandardTable::new(union))
}
