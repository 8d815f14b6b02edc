//! Shelf-Harvest: an incremental book-list harvester
//!
//! This crate implements a polite scraper for paginated book catalogue
//! listings. It walks a list page by page, downloads a bounded number of
//! cover images per page, and merges everything into a durable CSV dataset
//! that survives interruption and resumes where the previous run stopped.

pub mod config;
pub mod dataset;
pub mod harvest;
pub mod output;
pub mod record;

use thiserror::Error;

/// Main error type for harvest operations
///
/// Per-page and per-cover failures are recovered locally and never surface
/// here; these variants cover the configuration-level conditions that
/// legitimately abort a run.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset store error: {0}")]
    Store(#[from] dataset::StoreError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::HarvestConfig;
pub use dataset::{merge, resume_start_page, Dataset, MergeStats};
pub use record::Record;
