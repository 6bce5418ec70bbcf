//! Batch pagination driver
//!
//! Fetches a contiguous range of pages concurrently, parses each one and
//! reassembles the products in page order.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::PageParser;
use crate::product::RawProduct;
use crate::state::PageState;
use crate::url::{PageRequest, SiteUrls};
use futures::future::join_all;

/// What happened to one page of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page_number: u32,
    pub url: String,
    pub state: PageState,
    pub products: usize,
    pub has_next: bool,
}

/// Products and per-page reports for one page range
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Products ordered by page number, then by position on the page
    pub products: Vec<RawProduct>,

    /// One entry per page, in page order
    pub pages: Vec<PageReport>,

    /// Some page in the batch reported no next page
    pub reached_end: bool,
}

impl BatchResult {
    pub fn failed_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.state.is_error()).count()
    }
}

struct PageOutput {
    products: Vec<RawProduct>,
    report: PageReport,
}

/// Drives fetch and parse across page ranges of one catalog
pub struct PaginationDriver<'a> {
    fetcher: &'a PageFetcher,
    parser: &'a dyn PageParser,
    site: &'a SiteUrls,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(fetcher: &'a PageFetcher, parser: &'a dyn PageParser, site: &'a SiteUrls) -> Self {
        Self {
            fetcher,
            parser,
            site,
        }
    }

    /// Fetches pages `start..=end` concurrently and waits for all of them
    ///
    /// Concurrency is capped by the fetcher's limiter. A failed page
    /// contributes nothing and counts as the end of pagination, but never
    /// cancels its siblings.
    pub async fn fetch_range(&self, start: u32, end: u32) -> BatchResult {
        let requests: Vec<PageRequest> = (start.max(1)..=end).map(|n| self.site.request(n)).collect();

        // join_all yields results in input order, not completion order
        let outputs = join_all(requests.iter().map(|request| self.fetch_page(request))).await;

        let mut batch = BatchResult::default();
        for output in outputs {
            if !output.report.has_next {
                batch.reached_end = true;
            }
            batch.products.extend(output.products);
            batch.pages.push(output.report);
        }

        tracing::debug!(
            "Pages {}-{}: {} products, {} failed, end reached: {}",
            start,
            end,
            batch.products.len(),
            batch.failed_pages(),
            batch.reached_end
        );

        batch
    }

    async fn fetch_page(&self, request: &PageRequest) -> PageOutput {
        tracing::info!("Fetching {}", request);

        let outcome = self.fetcher.fetch(&request.url).await;
        let mut state = outcome.page_state();

        let page = match outcome.into_body() {
            Some(body) => self.parser.parse(&body),
            None => {
                tracing::warn!("Failed to fetch content from {}", request.url);
                Default::default()
            }
        };

        if page.malformed {
            tracing::warn!("Page {} has no product grid", request.page_number);
            state = PageState::Unreachable;
        }

        if page.has_next {
            tracing::debug!("Page {} links to a next page", request.page_number);
        } else {
            tracing::info!("No next page found after page {}", request.page_number);
        }

        PageOutput {
            report: PageReport {
                page_number: request.page_number,
                url: request.url.to_string(),
                state,
                products: page.products.len(),
                has_next: page.has_next,
            },
            products: page.products,
        }
    }
}
