//! HTTP fetcher
//!
//! One shared client carries headers and connection reuse across the run.
//! Rate limiting (HTTP 429) is handled here with a cooldown-and-retry loop
//! and never surfaces to the crawl loop; every other failure is logged and
//! collapses to "no page".

use crate::config::HarvestConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// How to react to repeated HTTP 429 responses for a single request
///
/// The default retries for as long as the origin keeps rate limiting,
/// sleeping the cooldown between attempts; a bounded variant gives up after
/// a fixed number of retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    cooldown: Duration,
    max_retries: Option<u32>,
}

impl RetryPolicy {
    /// Builds the policy described by the configuration
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            cooldown: Duration::from_secs(config.rate_limit_wait_secs),
            max_retries: config.rate_limit_max_retries,
        }
    }

    /// Sleep inserted between rate-limited attempts
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether another retry is permitted after `attempts` failed ones
    pub fn allows_retry(&self, attempts: u32) -> bool {
        match self.max_retries {
            Some(max) => attempts <= max,
            None => true,
        }
    }
}

/// Builds the HTTP client shared by page and cover fetches
///
/// The timeout applies per request; cover fetches override it with their
/// own shorter limit.
pub fn build_http_client(config: &HarvestConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a listing page, returning its body or nothing
///
/// On HTTP 429 the fetcher sleeps the policy cooldown and retries the same
/// URL; as long as the origin keeps answering 429 and the policy permits,
/// it keeps trying. Timeouts, transport errors, and non-success statuses
/// are logged and yield `None` — the caller treats that as an empty page.
pub async fn fetch_page(client: &Client, url: &str, policy: &RetryPolicy) -> Option<String> {
    let mut attempts = 0u32;

    loop {
        tracing::info!("Fetching: {}", url);

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::error!("Timeout fetching {}", url);
                return None;
            }
            Err(e) => {
                tracing::error!("Request error fetching {}: {}", url, e);
                return None;
            }
        };

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            attempts += 1;
            if !policy.allows_retry(attempts) {
                tracing::error!(
                    "Giving up on {} after {} rate-limited attempts",
                    url,
                    attempts
                );
                return None;
            }
            tracing::warn!(
                "Rate limited on {}; cooling down for {:?} before retry {}",
                url,
                policy.cooldown(),
                attempts
            );
            tokio::time::sleep(policy.cooldown()).await;
            continue;
        }

        if !response.status().is_success() {
            tracing::error!("HTTP {} fetching {}", response.status(), url);
            return None;
        }

        match response.text().await {
            Ok(body) => return Some(body),
            Err(e) => {
                tracing::error!("Failed reading body of {}: {}", url, e);
                return None;
            }
        }
    }
}

/// Fetches raw bytes (cover images) with a per-request timeout override
///
/// No 429 handling here: a rate-limited or failed cover fetch is reported
/// to the caller, which records the cover as unavailable and moves on.
pub async fn fetch_bytes(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, reqwest::Error> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}
