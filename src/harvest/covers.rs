//! Cover downloader with a per-page budget
//!
//! Covers are cached by a filename derived from the book title; the derived
//! name doubles as the existence check, so re-runs skip already-downloaded
//! covers without touching the dataset or the network.

use crate::config::HarvestConfig;
use crate::harvest::extractor::upscale_cover_url;
use crate::harvest::fetcher::fetch_bytes;
use rand::Rng;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

/// Covers get a tighter timeout than listing pages
const COVER_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage keys are truncated to keep filenames manageable
const MAX_KEY_LENGTH: usize = 30;

/// Downloads cover images, at most a configured number per listing page
///
/// The budget counts successful downloads; cache hits and failures do not
/// consume it. `reset_budget` must be called at the start of every page.
pub struct CoverDownloader {
    client: Client,
    covers_dir: PathBuf,
    base_delay_secs: u64,
    max_per_page: u32,
    downloaded_this_page: u32,
    total_downloaded: u64,
}

impl CoverDownloader {
    /// Creates a downloader and ensures the covers directory exists
    pub fn new(client: Client, config: &HarvestConfig) -> std::io::Result<Self> {
        std::fs::create_dir_all(&config.covers_dir)?;

        Ok(Self {
            client,
            covers_dir: config.covers_dir.clone(),
            base_delay_secs: config.delay_between_covers_secs,
            max_per_page: config.max_covers_per_page,
            downloaded_this_page: 0,
            total_downloaded: 0,
        })
    }

    /// Resets the per-page budget; call once per listing page
    pub fn reset_budget(&mut self) {
        self.downloaded_this_page = 0;
    }

    /// Covers successfully downloaded over the whole run
    pub fn total_downloaded(&self) -> u64 {
        self.total_downloaded
    }

    /// Downloads one cover if the budget allows, returning its storage key
    ///
    /// Returns `None` when the page budget is exhausted or the fetch fails;
    /// the record then keeps its sentinel and a later run may fill it in.
    /// If a file already exists under the derived key, that key is returned
    /// without a fetch, a delay, or budget consumption.
    pub async fn maybe_download(&mut self, cover_url: &str, title: &str) -> Option<String> {
        if self.downloaded_this_page >= self.max_per_page {
            return None;
        }

        let filename = format!("{}.jpg", storage_key(title));
        let path = self.covers_dir.join(&filename);

        if path.exists() {
            tracing::debug!("Cover already stored: {}", filename);
            return Some(filename);
        }

        // Jittered delay so cover fetches don't arrive in bursts
        let jitter: f64 = rand::thread_rng().gen_range(0.0..2.0);
        tokio::time::sleep(Duration::from_secs_f64(
            self.base_delay_secs as f64 + jitter,
        ))
        .await;

        let url = upscale_cover_url(cover_url);
        let bytes = match fetch_bytes(&self.client, &url, COVER_FETCH_TIMEOUT).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Cover download failed for '{}': {}", title, e);
                return None;
            }
        };

        if let Err(e) = std::fs::write(&path, &bytes) {
            tracing::warn!("Could not store cover {}: {}", path.display(), e);
            return None;
        }

        self.downloaded_this_page += 1;
        self.total_downloaded += 1;
        tracing::info!(
            "Cover {}/{}: {}",
            self.downloaded_this_page,
            self.max_per_page,
            filename
        );
        Some(filename)
    }

    #[cfg(test)]
    fn cover_path(&self, title: &str) -> PathBuf {
        self.covers_dir.join(format!("{}.jpg", storage_key(title)))
    }

    #[cfg(test)]
    pub(crate) fn for_tests(client: Client, covers_dir: &std::path::Path, max_per_page: u32) -> Self {
        Self {
            client,
            covers_dir: covers_dir.to_path_buf(),
            base_delay_secs: 0,
            max_per_page,
            downloaded_this_page: 0,
            total_downloaded: 0,
        }
    }
}

/// Derives the deterministic storage key for a title
///
/// Lowercases, drops everything that is not a word character or whitespace,
/// collapses whitespace runs to single underscores, and truncates. The key
/// is the cache identity for the cover, so this must stay stable.
pub fn storage_key(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    let joined = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    joined.chars().take(MAX_KEY_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_sanitizes_and_truncates() {
        assert_eq!(
            storage_key("Harry Potter and the Philosopher's Stone (Harry Potter, #1)"),
            "harry_potter_and_the_philosoph"
        );
    }

    #[test]
    fn test_storage_key_collapses_whitespace() {
        assert_eq!(storage_key("A   Spaced\tTitle"), "a_spaced_title");
    }

    #[test]
    fn test_storage_key_drops_punctuation() {
        assert_eq!(storage_key("Q&A: What?!"), "qa_what");
    }

    #[test]
    fn test_storage_key_is_deterministic() {
        assert_eq!(storage_key("Same Title"), storage_key("Same Title"));
    }

    #[tokio::test]
    async fn test_existing_cover_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let client = Client::new();
        let mut downloader = CoverDownloader::for_tests(client, dir.path(), 3);

        std::fs::write(downloader.cover_path("Cached Book"), b"bytes").unwrap();

        // No server is running; a real fetch attempt would fail
        let key = downloader
            .maybe_download("http://127.0.0.1:1/cover.jpg", "Cached Book")
            .await;
        assert_eq!(key.as_deref(), Some("cached_book.jpg"));
        assert_eq!(downloader.total_downloaded(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_budget_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let client = Client::new();
        let mut downloader = CoverDownloader::for_tests(client, dir.path(), 0);

        let key = downloader
            .maybe_download("http://127.0.0.1:1/cover.jpg", "Any Book")
            .await;
        assert_eq!(key, None);
    }
}
