//! Logging utilities
//!
//! Consistent log lines for the start and end of each pipeline stage.

use std::path::Path;
use std::time::Duration;

/// Log the start of a pipeline stage
///
/// # Arguments
/// * `stage` - Name of the stage
/// * `detail` - What the stage is working on
pub fn log_stage_start(stage: &str, detail: &str) {
    log::info!("{stage}: {detail}");
}

/// Log the completion of a pipeline stage
///
/// # Arguments
/// * `stage` - Name of the stage
/// * `items` - Number of items the stage produced
/// * `elapsed` - Optional elapsed time
pub fn log_stage_complete(stage: &str, items: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!("{stage}: produced {items} items in {duration:?}");
    } else {
        log::info!("{stage}: produced {items} items");
    }
}

/// Log a loaded source table
pub fn log_source_loaded(path: &Path, year: i32, rows: usize) {
    log::info!("Loaded {rows} rows for {year} from {}", path.display());
}

/// Log a warning, optionally tied to a file
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}
