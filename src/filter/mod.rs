//! Row filtering and column selection for standard tables
//!
//! Rows are filtered with Arrow boolean masks; the selection filter keeps the
//! configured counties and family types, and the column selection keeps the
//! identifying columns plus the contiguous cost block.

pub mod core;
pub mod selection;

pub use self::core::{AndFilter, BatchFilter, filter_record_batch};
pub use self::selection::{ColumnInFilter, Selection, filter_by_selection, select_cost_columns};
