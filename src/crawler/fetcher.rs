//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client with a fixed browser user agent
//! - Admission through the shared concurrency limiter
//! - Randomized jitter before each attempt
//! - Bounded retries with exponential (429) or linear (everything else) backoff
//! - Error classification into a tagged outcome

use crate::config::{HarvesterConfig, UserAgentConfig};
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::state::PageState;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::ops::RangeInclusive;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
///
/// A body and an error are never carried together. After retries run out the
/// last failure is returned as-is and callers treat it as "no content".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTTP 200 with the decoded body
    Success {
        /// Page body content
        body: String,
    },

    /// HTTP 429
    RateLimited,

    /// Any other non-200 status
    ServerError {
        /// The HTTP status code
        status: u16,
    },

    /// Connection, timeout or body decoding failure
    TransportError {
        /// Error description
        cause: String,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The body, if the fetch succeeded
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body } => Some(body),
            _ => None,
        }
    }

    /// Page state this outcome leaves the page in
    pub fn page_state(&self) -> PageState {
        match self {
            Self::Success { .. } => PageState::Parsed,
            Self::RateLimited => PageState::RateLimited,
            Self::ServerError { .. } => PageState::Failed,
            Self::TransportError { .. } => PageState::Unreachable,
        }
    }
}

/// Retry ceiling, backoff unit and jitter bounds for one fetcher
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Time unit of the backoff formulas
    pub backoff_unit: Duration,

    /// Pre-attempt jitter bounds in milliseconds
    pub jitter_ms: RangeInclusive<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HarvesterConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &HarvesterConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_unit: config.backoff_unit(),
            jitter_ms: config.jitter_range(),
        }
    }

    /// Wait before retry number `retry_count + 1` after `outcome`
    pub fn backoff(&self, outcome: &FetchOutcome, retry_count: u32) -> Duration {
        let fraction = rand::rng().random::<f64>();
        match outcome {
            FetchOutcome::RateLimited => {
                exponential_backoff(self.backoff_unit, retry_count, fraction)
            }
            _ => linear_backoff(self.backoff_unit, retry_count, fraction),
        }
    }

    /// Random pause drawn uniformly from the jitter bounds
    pub fn jitter(&self) -> Duration {
        random_millis(&self.jitter_ms)
    }
}

/// `2^retry_count + fraction` units, `fraction` in `[0, 1)`
pub fn exponential_backoff(unit: Duration, retry_count: u32, fraction: f64) -> Duration {
    let base = unit.saturating_mul(2u32.saturating_pow(retry_count));
    base.saturating_add(unit.mul_f64(fraction))
}

/// `1 + retry_count + fraction` units, `fraction` in `[0, 1)`
pub fn linear_backoff(unit: Duration, retry_count: u32, fraction: f64) -> Duration {
    let base = unit.saturating_mul(retry_count.saturating_add(1));
    base.saturating_add(unit.mul_f64(fraction))
}

/// Uniform draw from a millisecond range; empty ranges give zero
pub fn random_millis(range: &RangeInclusive<u64>) -> Duration {
    if range.is_empty() {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(range.clone()))
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header to send on every request
/// * `harvester` - Supplies the per-request timeout
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::{HarvesterConfig, UserAgentConfig};
/// use catalog_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &HarvesterConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    harvester: &HarvesterConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.value.as_str())
        .timeout(harvester.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages through the shared limiter with jitter and retries
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    limiter: ConcurrencyLimiter,
    policy: RetryPolicy,
}

impl PageFetcher {
    pub fn new(client: Client, limiter: ConcurrencyLimiter, policy: RetryPolicy) -> Self {
        Self {
            client,
            limiter,
            policy,
        }
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL with full retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Return body immediately |
    /// | HTTP 429 | Retry, wait `2^n + U(0,1)` units |
    /// | Other status | Retry, wait `1 + n + U(0,1)` units |
    /// | Transport error | Retry, wait `1 + n + U(0,1)` units |
    ///
    /// `n` is the number of retries already made. At most `max_retries`
    /// retries follow the first attempt; the last failure is then returned.
    ///
    /// A limiter slot is held from before the first jitter until the function
    /// returns or its future is dropped.
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        let Some(_permit) = self.limiter.acquire().await else {
            return FetchOutcome::TransportError {
                cause: "concurrency limiter closed".to_string(),
            };
        };

        let mut retry_count = 0;
        loop {
            let jitter = self.policy.jitter();
            if !jitter.is_zero() {
                tokio::time::sleep(jitter).await;
            }

            let outcome = self.attempt(url).await;
            if outcome.is_success() {
                return outcome;
            }

            if retry_count >= self.policy.max_retries {
                tracing::warn!(
                    "Giving up on {} after {} attempts: {:?}",
                    url,
                    retry_count + 1,
                    outcome
                );
                return outcome;
            }

            let wait = self.policy.backoff(&outcome, retry_count);
            retry_count += 1;
            tracing::warn!(
                "Fetch of {} failed ({:?}), retry {}/{} in {:?}",
                url,
                outcome,
                retry_count,
                self.policy.max_retries,
                wait
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// One GET with no retry
    async fn attempt(&self, url: &Url) -> FetchOutcome {
        tracing::debug!("GET {}", url);

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return classify_transport_error(&e),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return FetchOutcome::RateLimited;
        }
        if status != StatusCode::OK {
            return FetchOutcome::ServerError {
                status: status.as_u16(),
            };
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Success { body },
            Err(e) => FetchOutcome::TransportError {
                cause: format!("Failed to read body: {}", e),
            },
        }
    }
}

fn classify_transport_error(e: &reqwest::Error) -> FetchOutcome {
    let cause = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };
    FetchOutcome::TransportError { cause }
}
