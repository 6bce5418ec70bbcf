//! Harvest statistics
//!
//! This module turns a session report into a summary and prints it.

use crate::crawler::HarvestReport;
use crate::state::PageState;
use std::collections::BTreeMap;

/// Harvest statistics summary
#[derive(Debug, Clone, Default)]
pub struct HarvestStatistics {
    /// Pages requested
    pub pages_attempted: u32,

    /// Count of pages by final state
    pub pages_by_state: BTreeMap<&'static str, u32>,

    /// Batches fetched
    pub batches: u32,

    /// Records captured by the parser
    pub raw_products: usize,

    /// Rows left after cleaning
    pub clean_products: usize,

    /// Most concurrent fetches observed
    pub peak_in_flight: usize,

    /// Whether the catalog's last page was seen
    pub reached_end: bool,

    /// Session duration in seconds
    pub elapsed_seconds: f64,
}

impl HarvestStatistics {
    /// Builds statistics from a session report and the cleaned row count
    pub fn from_report(report: &HarvestReport, clean_products: usize) -> Self {
        let mut pages_by_state = BTreeMap::new();
        for page in &report.pages {
            *pages_by_state.entry(page.state.as_str()).or_insert(0) += 1;
        }

        Self {
            pages_attempted: report.pages_attempted,
            pages_by_state,
            batches: report.batches,
            raw_products: report.products,
            clean_products,
            peak_in_flight: report.peak_in_flight,
            reached_end: report.reached_end,
            elapsed_seconds: report.elapsed.as_secs_f64(),
        }
    }

    /// Percentage of pages that returned a body
    pub fn success_rate(&self) -> f64 {
        if self.pages_attempted == 0 {
            return 0.0;
        }
        let parsed = self
            .pages_by_state
            .get(PageState::Parsed.as_str())
            .copied()
            .unwrap_or(0);
        (parsed as f64 / self.pages_attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Batches: {}", stats.batches);
    println!("  Pages requested: {}", stats.pages_attempted);
    println!("  Peak concurrent fetches: {}", stats.peak_in_flight);
    println!(
        "  End of catalog reached: {}",
        if stats.reached_end { "yes" } else { "no (page cap)" }
    );
    println!("  Duration: {:.1}s", stats.elapsed_seconds);
    println!();

    println!("Pages by State:");
    for (state, count) in &stats.pages_by_state {
        println!("  {}: {}", state, count);
    }
    println!();

    println!("Products:");
    println!("  Scraped: {}", stats.raw_products);
    println!("  After cleaning: {}", stats.clean_products);
    println!();

    println!(
        "Success Rate: {:.1}% of pages fetched",
        stats.success_rate()
    );
}
