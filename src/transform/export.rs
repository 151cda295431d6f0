//! Tidy (long-form) export of normalized line items

use std::path::Path;

use arrow::csv::WriterBuilder;
use arrow::datatypes::FieldRef;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use super::reshape::LineItemRecord;
use crate::error::Result;
use crate::error::util::safe_create_file;

/// Flat row written to the tidy export
#[derive(Debug, Serialize, Deserialize)]
struct TidyRow {
    year: i32,
    county: String,
    family_code: String,
    family_type: String,
    line_item: String,
    line_group: String,
    cost: f64,
}

impl From<&LineItemRecord> for TidyRow {
    fn from(record: &LineItemRecord) -> Self {
        Self {
            year: record.year,
            county: record.county.clone(),
            family_code: record.family_code.clone(),
            family_type: record.family_type.clone(),
            line_item: record.line_item.clone(),
            line_group: record.line_group.to_string(),
            cost: record.cost,
        }
    }
}

/// Convert line items into an Arrow record batch
pub fn line_items_to_batch(records: &[LineItemRecord]) -> Result<RecordBatch> {
    let rows: Vec<TidyRow> = records.iter().map(TidyRow::from).collect();
    let fields = Vec::<FieldRef>::from_type::<TidyRow>(TracingOptions::default())?;
    Ok(serde_arrow::to_record_batch(&fields, &rows)?)
}

/// Write line items as a CSV file with a header row
pub fn write_line_items_csv(records: &[LineItemRecord], path: &Path) -> Result<()> {
    let batch = line_items_to_batch(records)?;
    let file = safe_create_file(path, "long-form export")?;

    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(&batch)?;

    log::info!("Wrote {} line items to {}", batch.num_rows(), path.display());
    Ok(())
}
