//! Normalization of raw standard tables into report-ready line items
//!
//! The stages run strictly in order, each producing a fresh dataset:
//! selection filter, cost-column projection, long reshape, labelling and
//! classification, inflation adjustment, and the wide re-pivot.

pub mod export;
pub mod family;
pub mod groups;
pub mod labels;
pub mod pivot;
pub mod reshape;

use std::time::Instant;

pub use export::{line_items_to_batch, write_line_items_csv};
pub use family::{FAMILY_TYPE_LABELS, FamilyComposition, decode_family_type};
pub use groups::LineGroup;
pub use labels::display_label;
pub use pivot::{ReportGroup, ReportRow, ReportTable, SortKey};
pub use reshape::{LineItemRecord, LongRecord, adjust, classify, melt};

use crate::cpi::AdjustmentFactors;
use crate::error::Result;
use crate::filter::{Selection, filter_by_selection, select_cost_columns};
use crate::reader::RawStandardTable;
use crate::utils::logging::{log_stage_complete, log_stage_start};

/// Output of the normalizer
#[derive(Debug, Clone)]
pub struct NormalizedStandard {
    /// Adjusted long-form line items
    pub line_items: Vec<LineItemRecord>,
    /// Year-per-column table built from the line items
    pub table: ReportTable,
}

/// Run every normalization stage over the unioned raw dataset
pub fn normalize(
    raw: &RawStandardTable,
    selection: &Selection,
    factors: &AdjustmentFactors,
    sort: SortKey,
) -> Result<NormalizedStandard> {
    let start = Instant::now();
    log_stage_start(
        "Normalizer",
        &format!(
            "{} rows, reference year {}",
            raw.num_rows(),
            factors.reference_year()
        ),
    );

    let filtered = filter_by_selection(raw.batch(), selection)?;
    let selected = select_cost_columns(&filtered)?;
    let long = melt(&selected)?;
    let line_items = adjust(classify(long), factors)?;
    let table = ReportTable::pivot(&line_items, sort);

    log_stage_complete("Normalizer", table.rows().len(), Some(start.elapsed()));
    Ok(NormalizedStandard { line_items, table })
}
