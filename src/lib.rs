//! A Rust library for comparing Self-Sufficiency Standard tables across
//! publication years, with schema-validated loading, CPI normalization and
//! report rendering.

pub mod config;
pub mod cpi;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod schema;
pub mod transform;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{PipelineConfig, ReportConfig};
pub use error::{Result, SssError};
pub use pipeline::{PipelineOutput, run_pipeline};

// Loading
pub use cpi::{AdjustmentFactors, CpiRecord, CpiTable};
pub use reader::{RawStandardTable, SourceSpec, load_standards, read_source};
pub use schema::{FieldKind, SchemaDescriptor, normalize_column_name};

// Normalization
pub use filter::Selection;
pub use transform::{
    FamilyComposition, LineGroup, LineItemRecord, NormalizedStandard, ReportTable, SortKey,
    normalize,
};

// Rendering
pub use report::{RenderOptions, RenderedReport, ReportFormat, render};

// Arrow types
pub use arrow::record_batch::RecordBatch;
