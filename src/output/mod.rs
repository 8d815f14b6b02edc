//! Operator-facing output for a harvest run

mod summary;

pub use summary::{print_summary, HarvestSummary};
