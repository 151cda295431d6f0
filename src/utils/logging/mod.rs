//! Logging utilities for pipeline stages and progress tracking

pub mod log;
pub mod progress;

pub use log::{log_source_loaded, log_stage_complete, log_stage_start, log_warning};
pub use progress::{create_source_progress_bar, finish_and_clear};
