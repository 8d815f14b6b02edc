use std::path::PathBuf;

/// Desktop-browser user agent sent with every request
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for a harvest run
///
/// Every field maps 1:1 to a CLI flag (or a fixed internal default) and is
/// immutable for the duration of the run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Identifier of the list to harvest (e.g. "1.Best_Books_Ever")
    pub list_id: String,

    /// First page to request (may be advanced by resume)
    pub start_page: u32,

    /// Last page to request (inclusive)
    pub end_page: u32,

    /// Whether cover images are downloaded at all
    pub download_covers: bool,

    /// Per-page cap on cover downloads
    pub max_covers_per_page: u32,

    /// Fixed delay between listing pages, in seconds
    pub delay_between_pages_secs: u64,

    /// Base delay between cover downloads, in seconds (0-2s jitter is added)
    pub delay_between_covers_secs: u64,

    /// Timeout applied to listing page requests, in seconds
    pub request_timeout_secs: u64,

    /// Cooldown after an HTTP 429 before retrying, in seconds
    pub rate_limit_wait_secs: u64,

    /// Cap on consecutive 429 retries for one request; `None` retries for
    /// as long as the origin keeps answering 429
    pub rate_limit_max_retries: Option<u32>,

    /// Directory cover images are stored in
    pub covers_dir: PathBuf,

    /// Output CSV path; derived from the list id when not given
    pub output_file: Option<PathBuf>,

    /// Scheme-and-host the list lives on; overridable in tests
    pub site_root: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            list_id: "1.Best_Books_Ever".to_string(),
            start_page: 1,
            end_page: 50,
            download_covers: true,
            max_covers_per_page: 3,
            delay_between_pages_secs: 15,
            delay_between_covers_secs: 2,
            request_timeout_secs: 10,
            rate_limit_wait_secs: 120,
            rate_limit_max_retries: None,
            covers_dir: PathBuf::from("covers"),
            output_file: None,
            site_root: "https://www.goodreads.com".to_string(),
        }
    }
}

impl HarvestConfig {
    /// Returns the user agent string sent with every request
    pub fn user_agent(&self) -> &'static str {
        USER_AGENT
    }

    /// Returns the bare listing URL for this list
    pub fn base_url(&self) -> String {
        format!("{}/list/show/{}", self.site_root, self.list_id)
    }

    /// Builds the URL for a specific listing page
    ///
    /// Page 1 uses the bare listing URL; later pages append a page query
    /// parameter.
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.base_url()
        } else {
            format!("{}?page={}", self.base_url(), page)
        }
    }

    /// Resolves the output CSV path
    ///
    /// When no explicit path was given, derives
    /// `dataset/goodreads_<list_id>.csv` with dots in the list id replaced
    /// so the filename stays portable.
    pub fn resolved_output_file(&self) -> PathBuf {
        match &self.output_file {
            Some(path) => path.clone(),
            None => PathBuf::from("dataset").join(format!(
                "goodreads_{}.csv",
                self.list_id.replace('.', "_")
            )),
        }
    }
}
