//! Progress reporting for source loading, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Style for the source loading bar
pub const SOURCE_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Create a progress bar that ticks once per loaded source
///
/// # Arguments
/// * `sources` - Number of sources to load
#[must_use]
pub fn create_source_progress_bar(sources: u64) -> ProgressBar {
    let pb = ProgressBar::new(sources);
    let style = ProgressStyle::default_bar()
        .template(SOURCE_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message("Loading standard tables");
    pb
}

/// Finish a progress bar and clear it from display
pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
