//! Harvest module: fetching, extraction, covers, and the crawl loop
//!
//! This module contains the run-time core of the harvester:
//! - HTTP fetching with rate-limit cooldown and retry
//! - Pure HTML extraction of records and the pagination signal
//! - Budgeted, idempotent cover downloads
//! - The sequential page loop with per-page persistence

mod coordinator;
mod covers;
mod extractor;
mod fetcher;

pub use coordinator::{run_harvest, Harvester};
pub use covers::{storage_key, CoverDownloader};
pub use extractor::{extract_page, upscale_cover_url, ExtractedPage};
pub use fetcher::{build_http_client, fetch_bytes, fetch_page, RetryPolicy};
