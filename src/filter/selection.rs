//! County and family-type selection

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{Array, BooleanArray, StringArray};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;

use super::core::{AndFilter, BatchFilter, filter_record_batch};
use crate::error::Result;
use crate::schema::columns;

/// Keeps rows whose string column value is in a set
#[derive(Debug, Clone)]
pub struct ColumnInFilter {
    column: String,
    values: FxHashSet<String>,
}

impl ColumnInFilter {
    /// Create a filter on `column` accepting any of `values`
    pub fn new<S: Into<String>>(column: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    fn create_mask(&self, array: &StringArray) -> BooleanArray {
        array
            .iter()
            .map(|value| Some(value.is_some_and(|v| self.values.contains(v))))
            .collect()
    }
}

impl BatchFilter for ColumnInFilter {
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let idx = batch.schema().index_of(&self.column)?;
        let array = batch
            .column(idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                ArrowError::SchemaError(format!("Column '{}' is not a string array", self.column))
            })?;

        let mask = self.create_mask(array);
        filter_record_batch(batch, &mask)
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.column.clone()])
    }
}

/// The counties and family types a report covers
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// County names to retain
    pub counties: FxHashSet<String>,
    /// Compact family-type codes to retain
    pub family_types: FxHashSet<String>,
}

impl Selection {
    /// Create a selection from county names and family-type codes
    pub fn new<C, F>(counties: C, family_types: F) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            counties: counties.into_iter().map(Into::into).collect(),
            family_types: family_types.into_iter().map(Into::into).collect(),
        }
    }

    fn as_filter(&self) -> AndFilter {
        AndFilter::new(vec![
            Arc::new(ColumnInFilter::new(
                columns::FAMILY_TYPE,
                self.family_types.iter().cloned(),
            )),
            Arc::new(ColumnInFilter::new(columns::COUNTY, self.counties.iter().cloned())),
        ])
    }
}

/// Keep only rows for the selected counties and family types.
///
/// Matching nothing is not an error: an empty batch is returned and a warning
/// logged, since a county may simply be absent from a year's table.
pub fn filter_by_selection(batch: &RecordBatch, selection: &Selection) -> Result<RecordBatch> {
    let filter = selection.as_filter();
    let schema = batch.schema();
    if let Some(missing) = filter
        .required_columns()
        .into_iter()
        .find(|c| schema.index_of(c).is_err())
    {
        return Err(ArrowError::SchemaError(format!("selection needs missing column '{missing}'")).into());
    }

    let filtered = filter.filter(batch)?;

    if filtered.num_rows() == 0 {
        log::warn!(
            "No rows matched {} counties and {} family types; the report will be empty",
            selection.counties.len(),
            selection.family_types.len()
        );
    } else {
        log::debug!("Selection kept {} of {} rows", filtered.num_rows(), batch.num_rows());
    }

    Ok(filtered)
}

/// Project to `year`, `county`, `family_type` plus the contiguous cost block
/// from `housing_costs` through `emergency_savings`
pub fn select_cost_columns(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let first = schema.index_of(columns::FIRST_COST)?;
    let last = schema.index_of(columns::LAST_COST)?;
    if first > last {
        return Err(ArrowError::SchemaError(format!(
            "'{}' comes after '{}'",
            columns::FIRST_COST,
            columns::LAST_COST
        ))
        .into());
    }

    let mut indices = vec![
        schema.index_of(columns::YEAR)?,
        schema.index_of(columns::COUNTY)?,
        schema.index_of(columns::FAMILY_TYPE)?,
    ];
    indices.extend(first..=last);

    Ok(batch.project(&indices)?)
}
