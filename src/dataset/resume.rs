//! Checkpoint/resume: continue past pages the dataset already covers

use crate::dataset::Dataset;

/// Computes the effective start page for a run
///
/// When the dataset already contains pages at or past the requested start,
/// the run continues from the page after the highest one persisted, so
/// re-running the same command after an interruption picks up where it
/// stopped instead of re-scraping. A requested start beyond everything
/// persisted is honored unchanged.
pub fn resume_start_page(dataset: &Dataset, requested_start_page: u32) -> u32 {
    let max_page = dataset.max_page();
    if max_page > 0 && requested_start_page <= max_page {
        max_page + 1
    } else {
        requested_start_page
    }
}
