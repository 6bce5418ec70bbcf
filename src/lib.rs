//! Catalog-Harvest: a paginated product catalog ETL pipeline
//!
//! This crate harvests product listings from a paginated catalog site under a
//! concurrency cap with retry and backoff, cleans the extracted fields, and
//! writes the result to CSV or SQLite.

pub mod config;
pub mod crawler;
pub mod output;
pub mod product;
pub mod state;
pub mod storage;
pub mod transform;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Catalog-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Harvest session exceeded its {limit:?} time limit")]
    SessionTimeout { limit: Duration },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid session transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SessionPhase,
        to: state::SessionPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// True when the session was aborted by its wall-clock limit
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::SessionTimeout { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{ExtractionSession, Harvest, HarvestReport};
pub use product::{PageResult, Product, RawProduct, UNAVAILABLE};
pub use state::SessionPhase;
pub use url::{PageRequest, SiteUrls};
