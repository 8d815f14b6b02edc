//! Harvest coordinator - the page-by-page crawl loop
//!
//! This module drives one run end to end:
//! - Loading the existing dataset and advancing the start page past it
//! - Fetching, extracting, and cover-downloading each listing page
//! - Merging and persisting after every page (the crash-resilience point)
//! - Observing the cancellation token so an interrupt still flushes state
//!
//! Pages are processed strictly sequentially; the origin rate-limits per
//! client and the harvester self-throttles instead of chasing throughput.

use crate::config::HarvestConfig;
use crate::dataset::{load_dataset, merge, resume_start_page, save_dataset, Dataset, MergeStats};
use crate::harvest::covers::CoverDownloader;
use crate::harvest::extractor::extract_page;
use crate::harvest::fetcher::{build_http_client, fetch_page, RetryPolicy};
use crate::output::HarvestSummary;
use crate::record::Record;
use crate::HarvestError;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Owns all state for one harvest run
///
/// The harvester is the single writer of the dataset for the run's
/// duration. The cancellation token is the interrupt handler's view into
/// the run: cancelling it makes the loop stop at the next suspension point,
/// after which the accumulated dataset is flushed and summarized.
pub struct Harvester {
    config: HarvestConfig,
    client: Client,
    retry_policy: RetryPolicy,
    covers: CoverDownloader,
    dataset: Dataset,
    output_file: PathBuf,
    cancel: CancellationToken,
    stats: MergeStats,
    existing_records: usize,
    highest_page_reached: u32,
}

impl Harvester {
    /// Creates a harvester, loading any previously persisted dataset
    pub fn new(config: HarvestConfig, cancel: CancellationToken) -> Result<Self, HarvestError> {
        let output_file = config.resolved_output_file();
        let dataset = load_dataset(&output_file);
        let existing_records = dataset.len();

        let client = build_http_client(&config)?;
        let retry_policy = RetryPolicy::from_config(&config);
        let covers = CoverDownloader::new(client.clone(), &config)?;

        Ok(Self {
            config,
            client,
            retry_policy,
            covers,
            dataset,
            output_file,
            cancel,
            stats: MergeStats::default(),
            existing_records,
            highest_page_reached: 0,
        })
    }

    /// Runs the harvest to completion, cancellation, or the end boundary
    ///
    /// One misbehaving page never aborts the run: its error is logged,
    /// whatever has been merged so far is saved, and the loop moves to the
    /// next page index. The dataset is persisted after every page, so a
    /// crash after page K resumes at K+1.
    pub async fn run(mut self) -> Result<HarvestSummary, HarvestError> {
        let start_page = resume_start_page(&self.dataset, self.config.start_page);
        if start_page > self.config.start_page {
            tracing::info!(
                "Dataset already covers pages up to {}; continuing from page {}",
                start_page - 1,
                start_page
            );
        }

        tracing::info!(
            "Harvesting list {} (pages {}-{})",
            self.config.list_id,
            start_page,
            self.config.end_page
        );
        if self.config.download_covers {
            tracing::info!(
                "Downloading covers (limit {}/page)",
                self.config.max_covers_per_page
            );
        }

        let mut current_page = start_page;
        let mut has_more = true;

        while has_more && current_page <= self.config.end_page {
            if self.cancel.is_cancelled() {
                tracing::warn!("Interrupted; stopping before page {}", current_page);
                break;
            }

            match self.process_page(current_page).await {
                Ok(page_has_more) => {
                    has_more = page_has_more;
                    self.highest_page_reached = current_page;
                }
                Err(e) => {
                    tracing::error!("Error processing page {}: {}", current_page, e);
                    self.save_best_effort();
                }
            }

            if has_more && current_page < self.config.end_page {
                tracing::info!(
                    "Waiting {}s before next page",
                    self.config.delay_between_pages_secs
                );
                let delay = Duration::from_secs(self.config.delay_between_pages_secs);
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        tracing::warn!("Interrupted during inter-page delay");
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            current_page += 1;
        }

        // Mandatory flush: covers both normal completion and interrupts
        self.save_best_effort();

        Ok(self.into_summary())
    }

    /// Fetches, extracts, merges, and persists one listing page
    ///
    /// Returns the pagination signal. A failed fetch counts as an empty
    /// page with more to come, so one unreachable page does not end the
    /// run.
    async fn process_page(&mut self, page: u32) -> Result<bool, HarvestError> {
        self.covers.reset_budget();

        let url = self.config.page_url(page);
        let Some(body) = fetch_page(&self.client, &url, &self.retry_policy).await else {
            tracing::warn!("No page content for page {}; moving on", page);
            return Ok(true);
        };

        let extracted = extract_page(&body, page);
        tracing::info!("Page {}: {} records", page, extracted.records.len());

        let mut batch = Vec::with_capacity(extracted.records.len());
        for record in extracted.records {
            batch.push(self.enrich_with_cover(record).await);
        }

        if batch.is_empty() {
            tracing::warn!("No records obtained on page {}", page);
        } else {
            let stats = merge(&mut self.dataset, batch);
            self.stats.accumulate(stats);
            tracing::info!(
                "Page {} merged: {} new, {} covers updated (total {})",
                page,
                stats.added,
                stats.covers_updated,
                self.dataset.len()
            );

            // Per-page persistence; a save failure costs durability for
            // this page only, so it is logged rather than propagated
            if let Err(e) = save_dataset(&self.dataset, &self.output_file) {
                tracing::error!("Failed saving dataset after page {}: {}", page, e);
            }
        }

        Ok(extracted.has_more)
    }

    /// Attaches a downloaded cover id to a record when possible
    async fn enrich_with_cover(&mut self, mut record: Record) -> Record {
        if !self.config.download_covers {
            return record;
        }

        let Some(cover_url) = record.cover_url.clone() else {
            return record;
        };
        let label = record.title.clone().unwrap_or_else(|| "untitled".to_string());

        record.cover_id = self.covers.maybe_download(&cover_url, &label).await;
        record
    }

    /// Saves the dataset, logging instead of propagating failure
    fn save_best_effort(&self) {
        if self.dataset.is_empty() {
            return;
        }
        if let Err(e) = save_dataset(&self.dataset, &self.output_file) {
            tracing::error!("Best-effort save failed: {}", e);
        }
    }

    /// Assembles the operator-facing summary for this run
    fn into_summary(self) -> HarvestSummary {
        HarvestSummary {
            total_records: self.dataset.len(),
            new_records: self.stats.added,
            covers_updated: self.stats.covers_updated,
            covers_downloaded: self.covers.total_downloaded(),
            records_with_covers: self.dataset.count_with_covers(),
            highest_page: self.dataset.max_page().max(self.highest_page_reached),
            output_file: self.output_file,
            covers_dir: self.config.covers_dir,
            interrupted: self.cancel.is_cancelled(),
            existing_records: self.existing_records,
        }
    }
}

/// Runs a complete harvest with the given configuration
///
/// This is the library entry point used by the binary: it wires the
/// harvester to the cancellation token and returns the final (or partial,
/// when interrupted) summary.
pub async fn run_harvest(
    config: HarvestConfig,
    cancel: CancellationToken,
) -> Result<HarvestSummary, HarvestError> {
    let harvester = Harvester::new(config, cancel)?;
    harvester.run().await
}
