//! Output sink traits and types
//!
//! This module defines the trait interface for product sinks and the
//! supported output formats.

use crate::product::Product;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported output format '{0}' (expected csv, sqlite or both)")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Where cleaned products are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Sqlite,
    Both,
}

impl OutputFormat {
    pub fn writes_csv(&self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    pub fn writes_sqlite(&self) -> bool {
        matches!(self, Self::Sqlite | Self::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Sqlite => "sqlite",
            Self::Both => "both",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "sqlite" | "db" => Ok(Self::Sqlite),
            "both" => Ok(Self::Both),
            _ => Err(OutputError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for product sinks
///
/// A sink receives the cleaned products of one harvest, in page order.
pub trait ProductSink {
    /// Writes the products
    ///
    /// # Returns
    ///
    /// The number of products written; an empty slice writes nothing
    fn write(&mut self, products: &[Product]) -> OutputResult<usize>;

    /// Short human-readable description of the destination
    fn describe(&self) -> String;
}
