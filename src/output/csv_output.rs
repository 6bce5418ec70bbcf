//! CSV sink
//!
//! Writes one header row followed by one row per product.

use crate::output::traits::{OutputResult, ProductSink};
use crate::product::Product;
use std::path::{Path, PathBuf};

/// Writes products to a CSV file
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sink writing to `fashion_products_<YYYYmmdd_HHMMSS>.csv`
    pub fn timestamped() -> Self {
        Self::new(default_csv_name())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Default file name stamped with the local time
pub fn default_csv_name() -> String {
    format!(
        "fashion_products_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

impl ProductSink for CsvSink {
    fn write(&mut self, products: &[Product]) -> OutputResult<usize> {
        if products.is_empty() {
            tracing::warn!("No data to save");
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        for product in products {
            writer.serialize(product)?;
        }
        writer.flush()?;

        tracing::info!("Data saved to {}", self.path.display());
        Ok(products.len())
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}
