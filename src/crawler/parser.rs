//! HTML parser for catalog pages
//!
//! This module turns a catalog page body into product records and the
//! continuation flag:
//! - Product cards inside the `#collectionList` grid
//! - Title, price and the detail lines (rating, colors, size, gender) of each card
//! - Whether the pagination bar offers a usable "next" link

use crate::product::{PageResult, RawProduct, TIMESTAMP_FORMAT, UNAVAILABLE};
use scraper::{ElementRef, Html, Selector};

const GRID: &str = "div.collection-grid#collectionList";
const CARD: &str = "div.collection-card";
const TITLE: &str = "h3.product-title";
const PRICE_SPAN: &str = "span.price";
const PRICE_PARAGRAPH: &str = "p.price";
const DETAIL: &str = r#"p[style="font-size: 14px; color: #777;"]"#;
const NEXT_ITEM: &str = "li.page-item.next";
const LINK: &str = "a[href]";

/// Turns a page body into products and a continuation flag
///
/// Implementations never fail: malformed input yields an empty page with
/// `has_next = false`.
pub trait PageParser: Send + Sync {
    fn parse(&self, body: &str) -> PageResult;
}

/// Parser for the catalog card layout, stamping records with the local time
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogParser;

impl PageParser for CatalogParser {
    fn parse(&self, body: &str) -> PageResult {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        parse_catalog_page(body, &timestamp)
    }
}

/// Parses a catalog page, stamping every product with `timestamp`
///
/// A page without the product grid comes back as [`PageResult::malformed`]:
/// no products and no next page.
///
/// # Example
///
/// ```
/// use catalog_harvest::crawler::parse_catalog_page;
///
/// let html = r#"<div class="collection-grid" id="collectionList">
///     <div class="collection-card"><h3 class="product-title">Hoodie</h3></div>
/// </div>"#;
/// let page = parse_catalog_page(html, "2025-04-25 12:00:00");
/// assert_eq!(page.products[0].title, "Hoodie");
/// assert!(!page.has_next);
/// ```
pub fn parse_catalog_page(html: &str, timestamp: &str) -> PageResult {
    let document = Html::parse_document(html);

    let Some(grid) = selector(GRID).and_then(|s| document.select(&s).next()) else {
        tracing::warn!("No collection grid found on the page");
        return PageResult::malformed();
    };

    let products = match selector(CARD) {
        Some(card_selector) => grid
            .select(&card_selector)
            .map(|card| extract_product(card, timestamp))
            .collect(),
        None => Vec::new(),
    };

    tracing::debug!("Found {} products", products.len());

    PageResult {
        products,
        has_next: has_next_link(&document),
        malformed: false,
    }
}

/// Extracts one product from a collection card
fn extract_product(card: ElementRef<'_>, timestamp: &str) -> RawProduct {
    let mut product = RawProduct::unavailable(timestamp);

    if let Some(title) = first_text(card, TITLE) {
        product.title = title;
    }

    if let Some(price) = first_text(card, PRICE_SPAN).or_else(|| first_text(card, PRICE_PARAGRAPH))
    {
        product.price = price;
    }

    if let Some(detail_selector) = selector(DETAIL) {
        for paragraph in card.select(&detail_selector) {
            let text = element_text(paragraph);
            if text.contains("Rating:") {
                product.rating = text;
            } else if text.contains("Colors") {
                product.colors = text;
            } else if text.contains("Size:") {
                product.size = text;
            } else if text.contains("Gender:") {
                product.gender = text;
            }
        }
    }

    product
}

/// True when a "next" pagination item holds a link with a non-empty href
fn has_next_link(document: &Html) -> bool {
    let (Some(next_selector), Some(link_selector)) = (selector(NEXT_ITEM), selector(LINK)) else {
        return false;
    };

    document.select(&next_selector).any(|item| {
        item.select(&link_selector).any(|link| {
            link.value()
                .attr("href")
                .is_some_and(|href| !href.trim().is_empty())
        })
    })
}

fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let sel = selector(css)?;
    scope
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty() && text != UNAVAILABLE)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}
