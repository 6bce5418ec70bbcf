//! Transform stage: cleans scraped records into typed product rows
//!
//! Rows are dropped when they are exact duplicates, carry the site's
//! "Unknown Product" filler title, or lack a usable rating or price.

use crate::product::{Product, RawProduct};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Default USD to IDR conversion applied to prices
pub const DEFAULT_EXCHANGE_RATE: f64 = 16000.0;

/// Title the catalog uses for placeholder cards
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+(\.\d+)?").expect("decimal pattern is valid"))
}

fn integer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("integer pattern is valid"))
}

fn price_noise_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\d.]").expect("price pattern is valid"))
}

/// Cleans raw records, keeping the input order of the survivors
///
/// # Arguments
///
/// * `raw` - Records in page order
/// * `exchange_rate` - Multiplier applied to every price
pub fn transform_products(raw: &[RawProduct], exchange_rate: f64) -> Vec<Product> {
    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(raw.len());
    let mut duplicates = 0usize;
    let mut rejected = 0usize;

    for record in raw {
        if !seen.insert(record) {
            duplicates += 1;
            continue;
        }

        match clean_product(record, exchange_rate) {
            Some(product) => products.push(product),
            None => rejected += 1,
        }
    }

    tracing::info!(
        "Transformed {} raw records into {} products ({} duplicates, {} rejected)",
        raw.len(),
        products.len(),
        duplicates,
        rejected
    );

    products
}

/// Cleans one record, or `None` if it should be dropped
pub fn clean_product(record: &RawProduct, exchange_rate: f64) -> Option<Product> {
    if record.title == UNKNOWN_PRODUCT {
        return None;
    }

    let rating = clean_rating(&record.rating)?;
    let price = convert_price(&record.price, exchange_rate)?;

    Some(Product {
        title: record.title.clone(),
        price,
        rating,
        colors: extract_colors(&record.colors),
        size: strip_label(&record.size, "Size:"),
        gender: strip_label(&record.gender, "Gender:"),
        timestamp: record.timestamp.clone(),
    })
}

/// Score from a rating line such as `"Rating: ⭐ 4.8 / 5"`
///
/// Only the text before the `/` scale is searched, so
/// `"Invalid Rating / 5"` yields `None` rather than the scale.
pub fn clean_rating(text: &str) -> Option<f64> {
    let score = text.split('/').next().unwrap_or(text);
    decimal_pattern()
        .find(score)
        .and_then(|m| m.as_str().parse().ok())
}

/// Color count from a line such as `"3 Colors"`
pub fn extract_colors(text: &str) -> Option<u32> {
    integer_pattern()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Price text such as `"$102.15"` converted with `exchange_rate`
pub fn convert_price(text: &str, exchange_rate: f64) -> Option<f64> {
    let digits = price_noise_pattern().replace_all(text, "");
    let value: f64 = digits.parse().ok()?;
    Some(value * exchange_rate)
}

/// Removes a field label like `"Size:"` and trims the remainder
pub fn strip_label(text: &str, label: &str) -> String {
    text.replace(label, "").trim().to_string()
}
