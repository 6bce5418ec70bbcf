//! Crawler module for catalog page fetching and processing
//!
//! This module contains the extraction engine, including:
//! - Concurrency limiting shared by all fetches
//! - HTTP fetching with jitter, retry and backoff
//! - Catalog HTML parsing and pagination detection
//! - Batched pagination and overall session control

mod fetcher;
mod limiter;
mod pagination;
mod parser;
mod session;

pub use fetcher::{
    build_http_client, exponential_backoff, linear_backoff, random_millis, FetchOutcome,
    PageFetcher, RetryPolicy,
};
pub use limiter::{ConcurrencyLimiter, LimiterPermit};
pub use pagination::{BatchResult, PageReport, PaginationDriver};
pub use parser::{parse_catalog_page, CatalogParser, PageParser};
pub use session::{run_session, ExtractionSession, Harvest, HarvestReport};

use crate::config::Config;
use crate::url::SiteUrls;
use crate::HarvestError;

/// Runs a complete extraction from a loaded configuration
///
/// This is the main entry point for harvesting. It will:
/// 1. Resolve the catalog URLs
/// 2. Build the HTTP client and concurrency limiter
/// 3. Fetch pages in batches until the catalog ends or the page cap is hit
/// 4. Return every product in page order
///
/// # Returns
///
/// * `Ok(Harvest)` - Harvest completed
/// * `Err(HarvestError)` - Invalid configuration or session timeout
pub async fn harvest(config: &Config) -> Result<Harvest, HarvestError> {
    let site = SiteUrls::from_config(&config.site)?;
    run_session(&config.harvester, &config.user_agent, &site).await
}
