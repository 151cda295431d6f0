//! Long reshape, classification and inflation adjustment of line items

use arrow::array::{Array, Float64Array, Int32Array, StringArray};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::family::decode_family_type;
use super::groups::LineGroup;
use super::labels::display_label;
use crate::cpi::AdjustmentFactors;
use crate::error::Result;
use crate::schema::columns;

/// One (row, cost column) pair before labelling
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    /// Publication year
    pub year: i32,
    /// County name
    pub county: String,
    /// Compact family-type code
    pub family_type: String,
    /// Original column name
    pub line_item: String,
    /// Cell value in publication-year dollars
    pub cost: f64,
}

/// A labelled, classified line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemRecord {
    /// Publication year
    pub year: i32,
    /// County name
    pub county: String,
    /// Compact family-type code the label was decoded from
    pub family_code: String,
    /// Decoded family-type label
    pub family_type: String,
    /// Display label of the line item
    pub line_item: String,
    /// Group the line item is shown under
    pub line_group: LineGroup,
    /// Annual amount in dollars
    pub cost: f64,
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let idx = batch.schema().index_of(name)?;
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ArrowError::SchemaError(format!("Column '{name}' is not a string array")).into())
}

/// Pivot every cost column into `(line_item, cost)` records.
///
/// `year`, `county` and `family_type` are carried onto every record; every
/// other column must be numeric. Records are emitted row by row in column
/// order. Blank cells produce no record.
pub fn melt(batch: &RecordBatch) -> Result<Vec<LongRecord>> {
    let schema = batch.schema();
    let year_idx = schema.index_of(columns::YEAR)?;
    let years = batch
        .column(year_idx)
        .as_any()
        .downcast_ref::<Int32Array>()
        .ok_or_else(|| ArrowError::SchemaError("year column is not Int32".to_string()))?;
    let counties = string_column(batch, columns::COUNTY)?;
    let family_types = string_column(batch, columns::FAMILY_TYPE)?;

    let id_columns = [columns::YEAR, columns::COUNTY, columns::FAMILY_TYPE];
    let cost_columns: Vec<(&str, &Float64Array)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| !id_columns.contains(&field.name().as_str()))
        .map(|(i, field)| {
            batch
                .column(i)
                .as_any()
                .downcast_ref::<Float64Array>()
                .map(|values| (field.name().as_str(), values))
                .ok_or_else(|| {
                    ArrowError::SchemaError(format!("Cost column '{}' is not Float64", field.name()))
                })
        })
        .collect::<std::result::Result<_, _>>()?;

    let mut records = Vec::with_capacity(batch.num_rows() * cost_columns.len());
    let mut skipped = 0usize;
    for row in 0..batch.num_rows() {
        if years.is_null(row) || counties.is_null(row) || family_types.is_null(row) {
            log::warn!("Skipping row {row} with a blank year, county or family type");
            continue;
        }

        for (name, values) in &cost_columns {
            if values.is_null(row) {
                skipped += 1;
                continue;
            }
            records.push(LongRecord {
                year: years.value(row),
                county: counties.value(row).to_string(),
                family_type: family_types.value(row).to_string(),
                line_item: (*name).to_string(),
                cost: values.value(row),
            });
        }
    }

    if skipped > 0 {
        log::debug!("Dropped {skipped} blank cost cells");
    }

    Ok(records)
}

/// Label each record, assign its group and decode its family type
#[must_use]
pub fn classify(records: Vec<LongRecord>) -> Vec<LineItemRecord> {
    let mut labels: FxHashMap<String, (String, LineGroup)> = FxHashMap::default();
    let mut families: FxHashMap<String, String> = FxHashMap::default();

    records
        .into_iter()
        .map(|record| {
            let (line_item, line_group) = labels
                .entry(record.line_item)
                .or_insert_with_key(|column| {
                    let label = display_label(column);
                    let group = LineGroup::classify(&label);
                    (label, group)
                })
                .clone();
            let family_type = families
                .entry(record.family_type.clone())
                .or_insert_with_key(|code| decode_family_type(code))
                .clone();

            LineItemRecord {
                year: record.year,
                county: record.county,
                family_code: record.family_type,
                family_type,
                line_item,
                line_group,
                cost: record.cost,
            }
        })
        .collect()
}

/// Convert every non-reference-year cost into reference-year dollars
pub fn adjust(records: Vec<LineItemRecord>, factors: &AdjustmentFactors) -> Result<Vec<LineItemRecord>> {
    records
        .into_iter()
        .map(|record| {
            let cost = factors.adjust(record.cost, record.year)?;
            Ok(LineItemRecord { cost, ..record })
        })
        .collect()
}
