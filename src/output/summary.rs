//! Run summary printed at the end of a harvest
//!
//! The same summary is produced for a completed run and for an interrupted
//! one; only the heading differs. Counts here come from the merge engine
//! and the cover downloader and are informational, never control flow.

use std::path::PathBuf;

/// Final (or interrupt-time partial) accounting of one harvest run
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    /// Records in the dataset after the run
    pub total_records: usize,

    /// Records added by this run
    pub new_records: usize,

    /// Pre-existing records whose cover id was filled in by this run
    pub covers_updated: usize,

    /// Cover files actually fetched over the network this run
    pub covers_downloaded: u64,

    /// Records in the dataset that have a cover on disk
    pub records_with_covers: usize,

    /// Highest page index represented after the run
    pub highest_page: u32,

    /// Where the dataset was written
    pub output_file: PathBuf,

    /// Where covers were stored
    pub covers_dir: PathBuf,

    /// Whether the run ended on an operator interrupt
    pub interrupted: bool,

    /// Records that were already in the dataset before the run
    pub existing_records: usize,
}

/// Prints the summary to stdout
pub fn print_summary(summary: &HarvestSummary) {
    if summary.interrupted {
        println!("\nPARTIAL SUMMARY (interrupted):");
    } else {
        println!("\nFINAL SUMMARY:");
    }

    println!("  Total records: {}", summary.total_records);
    println!("  New records added: {}", summary.new_records);
    if summary.covers_updated > 0 {
        println!("  Covers filled in on existing records: {}", summary.covers_updated);
    }
    println!(
        "  Covers downloaded this run: {} ({} records have covers)",
        summary.covers_downloaded, summary.records_with_covers
    );
    println!("  Highest page reached: {}", summary.highest_page);
    println!("  Dataset file: {}", summary.output_file.display());
    println!("  Covers directory: {}", summary.covers_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_are_independent() {
        let summary = HarvestSummary {
            total_records: 150,
            new_records: 50,
            covers_updated: 3,
            covers_downloaded: 9,
            records_with_covers: 12,
            highest_page: 7,
            output_file: PathBuf::from("dataset/out.csv"),
            covers_dir: PathBuf::from("covers"),
            interrupted: false,
            existing_records: 100,
        };

        assert_eq!(summary.total_records - summary.existing_records, summary.new_records);
    }
}
