//! Product records flowing through the pipeline
//!
//! `RawProduct` is what the parser captures from a catalog card, field text
//! as-is. `Product` is the cleaned row produced by the transform stage and
//! handed to the sinks.

use serde::Serialize;

/// Placeholder for a field that could not be recovered from the page
pub const UNAVAILABLE: &str = "N/A";

/// Timestamp format used for capture times
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A product card as scraped, before any cleaning
///
/// Every field is always present; unrecoverable fields hold [`UNAVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawProduct {
    pub title: String,
    pub price: String,
    pub rating: String,
    pub colors: String,
    pub size: String,
    pub gender: String,
    /// Capture time, formatted with [`TIMESTAMP_FORMAT`]
    pub timestamp: String,
}

impl RawProduct {
    /// Creates a record with every content field set to the placeholder
    pub fn unavailable(timestamp: impl Into<String>) -> Self {
        Self {
            title: UNAVAILABLE.to_string(),
            price: UNAVAILABLE.to_string(),
            rating: UNAVAILABLE.to_string(),
            colors: UNAVAILABLE.to_string(),
            size: UNAVAILABLE.to_string(),
            gender: UNAVAILABLE.to_string(),
            timestamp: timestamp.into(),
        }
    }
}

/// Products found on one page plus the continuation flag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub products: Vec<RawProduct>,

    /// Whether the page offers a working "next" link. This is the only signal
    /// that ends pagination.
    pub has_next: bool,

    /// The page lacked the catalog structure altogether
    pub malformed: bool,
}

impl PageResult {
    /// A page that contributes nothing and stops traversal
    pub fn end() -> Self {
        Self::default()
    }

    /// A page whose product grid is missing; stops traversal like [`PageResult::end`]
    pub fn malformed() -> Self {
        Self {
            malformed: true,
            ..Self::default()
        }
    }
}

/// A cleaned product row ready for loading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    #[serde(rename = "Title")]
    pub title: String,

    /// Price converted to the target currency
    #[serde(rename = "Price")]
    pub price: f64,

    #[serde(rename = "Rating")]
    pub rating: f64,

    #[serde(rename = "Colors")]
    pub colors: Option<u32>,

    #[serde(rename = "Size")]
    pub size: String,

    #[serde(rename = "Gender")]
    pub gender: String,

    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}
