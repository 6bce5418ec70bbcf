//! Extraction session - top-level harvest orchestration
//!
//! A session owns the HTTP client and the concurrency limiter for the length
//! of one `run`, walks the catalog in batches until a page reports no next
//! page or the page cap is reached, and enforces the overall time limit.

use crate::config::{HarvesterConfig, UserAgentConfig};
use crate::crawler::fetcher::{build_http_client, random_millis, PageFetcher, RetryPolicy};
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::crawler::pagination::{BatchResult, PageReport, PaginationDriver};
use crate::crawler::parser::{CatalogParser, PageParser};
use crate::product::RawProduct;
use crate::state::SessionPhase;
use crate::url::SiteUrls;
use crate::{ConfigError, HarvestError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counters describing one completed session
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    /// Batches fetched
    pub batches: u32,

    /// Pages requested across all batches
    pub pages_attempted: u32,

    /// Pages that ended in a terminal fetch failure
    pub pages_failed: u32,

    /// Products collected
    pub products: usize,

    /// Most fetches that held a limiter slot at once
    pub peak_in_flight: usize,

    /// Whether some page reported the end of pagination
    pub reached_end: bool,

    /// Wall-clock duration of the session
    pub elapsed: Duration,

    /// Per-page outcomes in page order
    pub pages: Vec<PageReport>,
}

impl HarvestReport {
    fn record(&mut self, batch: &BatchResult) {
        self.batches += 1;
        self.pages_attempted += batch.pages.len() as u32;
        self.pages_failed += batch.failed_pages() as u32;
        self.products += batch.products.len();
        self.reached_end |= batch.reached_end;
        self.pages.extend(batch.pages.iter().cloned());
    }
}

/// Products of a finished session plus its report
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// All products in page order
    pub products: Vec<RawProduct>,
    pub report: HarvestReport,
}

/// Top-level entry point for harvesting a catalog
pub struct ExtractionSession {
    config: HarvesterConfig,
    user_agent: UserAgentConfig,
    parser: Arc<dyn PageParser>,
}

impl ExtractionSession {
    /// Creates a session using the catalog card parser
    pub fn new(config: HarvesterConfig, user_agent: UserAgentConfig) -> Self {
        Self {
            config,
            user_agent,
            parser: Arc::new(CatalogParser),
        }
    }

    /// Replaces the page parser
    pub fn with_parser(mut self, parser: impl PageParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn config(&self) -> &HarvesterConfig {
        &self.config
    }

    /// Harvests pages `1..=max_pages` in batches of `batch_size`
    ///
    /// # Continuation
    ///
    /// Once any page of a batch reports no next page, the rest of that batch
    /// still completes but no later batch is scheduled. Up to
    /// `batch_size - 1` pages past the real end may therefore be requested.
    ///
    /// # Returns
    ///
    /// * `Ok(Harvest)` - Every scheduled batch finished (possibly with zero products)
    /// * `Err(HarvestError::SessionTimeout)` - The time limit elapsed; in-flight
    ///   fetches are cancelled and collected products are discarded
    /// * `Err(HarvestError)` - Invalid arguments or the client could not be built
    pub async fn run(
        &self,
        site: &SiteUrls,
        max_pages: u32,
        batch_size: u32,
    ) -> Result<Harvest, HarvestError> {
        if max_pages < 1 || batch_size < 1 {
            return Err(ConfigError::Validation(format!(
                "max_pages and batch_size must be >= 1, got {} and {}",
                max_pages, batch_size
            ))
            .into());
        }

        let started = Instant::now();
        let limit = self.config.session_timeout();
        let mut phase = SessionPhase::Init;

        tracing::info!(
            "Harvest started: up to {} pages, batches of {}, {} concurrent, {:?} limit",
            max_pages,
            batch_size,
            self.config.concurrency_limit,
            limit
        );

        // Both live only for this call
        let client = build_http_client(&self.user_agent, &self.config)?;
        let limiter = ConcurrencyLimiter::new(self.config.concurrency_limit as usize);
        let fetcher = PageFetcher::new(
            client,
            limiter.clone(),
            RetryPolicy::from_config(&self.config),
        );

        let result = tokio::time::timeout(
            limit,
            self.run_batches(&fetcher, site, max_pages, batch_size, &mut phase),
        )
        .await;

        limiter.close();
        drop(fetcher);

        match result {
            Ok(Ok(mut harvest)) => {
                phase.advance(SessionPhase::Done)?;
                harvest.report.peak_in_flight = limiter.peak();
                harvest.report.elapsed = started.elapsed();
                tracing::info!(
                    "Harvest finished: {} products from {} pages in {:?}",
                    harvest.products.len(),
                    harvest.report.pages_attempted,
                    harvest.report.elapsed
                );
                Ok(harvest)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                phase.advance(SessionPhase::TimeoutAbort)?;
                tracing::error!(
                    "Harvest aborted after {:?}: time limit of {:?} exceeded",
                    started.elapsed(),
                    limit
                );
                Err(HarvestError::SessionTimeout { limit })
            }
        }
    }

    async fn run_batches(
        &self,
        fetcher: &PageFetcher,
        site: &SiteUrls,
        max_pages: u32,
        batch_size: u32,
        phase: &mut SessionPhase,
    ) -> Result<Harvest, HarvestError> {
        let driver = PaginationDriver::new(fetcher, self.parser.as_ref(), site);
        let mut harvest = Harvest::default();
        let mut cursor = 1u32;

        while cursor <= max_pages {
            if harvest.report.batches > 0 {
                let pause = random_millis(&self.config.batch_pause_range());
                tracing::debug!("Pausing {:?} before the next batch", pause);
                tokio::time::sleep(pause).await;
            }

            phase.advance(SessionPhase::Batching)?;

            let end = cursor.saturating_add(batch_size - 1).min(max_pages);
            tracing::info!(
                "Batch {}: pages {}-{}",
                harvest.report.batches + 1,
                cursor,
                end
            );

            let batch = driver.fetch_range(cursor, end).await;
            harvest.report.record(&batch);
            harvest.products.extend(batch.products);

            if batch.reached_end {
                tracing::info!("End of pagination reached in pages {}-{}", cursor, end);
                break;
            }

            match end.checked_add(1) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        if !harvest.report.reached_end {
            tracing::info!("Stopped at the page cap of {}", max_pages);
        }

        Ok(harvest)
    }
}

/// Runs one session from the harvester settings
pub async fn run_session(
    config: &HarvesterConfig,
    user_agent: &UserAgentConfig,
    site: &SiteUrls,
) -> Result<Harvest, HarvestError> {
    ExtractionSession::new(config.clone(), user_agent.clone())
        .run(site, config.max_pages, config.batch_size)
        .await
}
