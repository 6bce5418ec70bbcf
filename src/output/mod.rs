//! Output module for the load stage
//!
//! This module handles:
//! - Writing cleaned products to CSV files
//! - Writing cleaned products to SQLite
//! - Summarizing harvest statistics

mod csv_output;
mod sqlite_output;
pub mod stats;
mod traits;

pub use csv_output::{default_csv_name, CsvSink};
pub use sqlite_output::SqliteSink;
pub use stats::{print_statistics, HarvestStatistics};
pub use traits::{OutputError, OutputFormat, OutputResult, ProductSink};

use crate::product::Product;

/// Writes the products to every sink, stopping at the first failure
///
/// # Returns
///
/// * `Ok(usize)` - Rows written per sink (the same count for each)
/// * `Err(OutputError)` - A sink failed
pub fn write_all(sinks: &mut [Box<dyn ProductSink>], products: &[Product]) -> OutputResult<usize> {
    let mut written = 0;
    for sink in sinks.iter_mut() {
        written = sink.write(products)?;
        tracing::info!("Wrote {} products to {}", written, sink.describe());
    }
    Ok(written)
}
