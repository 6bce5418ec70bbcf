use serde::Deserialize;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Browser identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36";

/// Main configuration structure for Catalog-Harvest
///
/// Every table and key is optional; an empty file yields `Config::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub harvester: HarvesterConfig,
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Fetching, pacing and batching behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HarvesterConfig {
    /// Maximum number of requests in flight at once
    pub concurrency_limit: u32,

    /// Retries after the first attempt before a page is given up
    pub max_retries: u32,

    /// Lower bound of the pre-request jitter (milliseconds)
    pub jitter_min_ms: u64,

    /// Upper bound of the pre-request jitter (milliseconds)
    pub jitter_max_ms: u64,

    /// Time unit the backoff formulas are expressed in (milliseconds)
    pub backoff_unit_ms: u64,

    /// Lower bound of the pause between batches (milliseconds)
    pub batch_pause_min_ms: u64,

    /// Upper bound of the pause between batches (milliseconds)
    pub batch_pause_max_ms: u64,

    /// Wall-clock limit for a whole session (seconds)
    pub session_timeout_secs: u64,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Highest page number that will be requested
    pub max_pages: u32,

    /// Pages fetched concurrently before the continuation check
    pub batch_size: u32,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 3,
            max_retries: 3,
            jitter_min_ms: 1000,
            jitter_max_ms: 3000,
            backoff_unit_ms: 1000,
            batch_pause_min_ms: 2000,
            batch_pause_max_ms: 5000,
            session_timeout_secs: 300,
            request_timeout_secs: 30,
            max_pages: 50,
            batch_size: 5,
        }
    }
}

impl HarvesterConfig {
    pub fn jitter_range(&self) -> RangeInclusive<u64> {
        self.jitter_min_ms..=self.jitter_max_ms
    }

    pub fn batch_pause_range(&self) -> RangeInclusive<u64> {
        self.batch_pause_min_ms..=self.batch_pause_max_ms
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where the catalog lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// URL of the first catalog page
    pub root_url: String,

    /// URL of page n >= 2, with `{}` standing for the page number
    pub page_template: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: "https://fashion-studio.dicoding.dev/".to_string(),
            page_template: "https://fashion-studio.dicoding.dev/page{}".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// One of `csv`, `sqlite`, `both`
    pub format: String,

    /// Path of the CSV file; a timestamped name is used when unset
    pub csv_path: Option<String>,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Multiplier applied to scraped prices (USD to IDR by default)
    pub exchange_rate: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "csv".to_string(),
            csv_path: None,
            database_path: "fashion_products.db".to_string(),
            exchange_rate: 16000.0,
        }
    }
}
