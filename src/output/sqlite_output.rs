//! SQLite-based product sink
//!
//! Each `write` records a run row tagged with the configuration hash and
//! stores the products under it.

use crate::output::traits::{OutputError, OutputResult, ProductSink};
use crate::product::Product;
use crate::storage::{RunStatus, Storage};

/// Writes products into a storage backend as one run
pub struct SqliteSink<S: Storage> {
    storage: S,
    config_hash: String,
    last_run: Option<i64>,
}

impl<S: Storage> SqliteSink<S> {
    /// Creates a new SQLite sink
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `config_hash` - Hash of the configuration, stored with each run
    pub fn new(storage: S, config_hash: impl Into<String>) -> Self {
        Self {
            storage,
            config_hash: config_hash.into(),
            last_run: None,
        }
    }

    /// ID of the run created by the most recent write
    pub fn last_run(&self) -> Option<i64> {
        self.last_run
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Records a run that ended without products, e.g. on session timeout
    ///
    /// # Returns
    ///
    /// The ID of the recorded run
    pub fn record_aborted(&mut self, status: RunStatus) -> OutputResult<i64> {
        let run_id = self
            .storage
            .create_run(&self.config_hash)
            .map_err(storage_error)?;
        self.last_run = Some(run_id);

        self.storage
            .finish_run(run_id, status)
            .map_err(storage_error)?;
        tracing::info!("Recorded run {} as {}", run_id, status.to_db_string());
        Ok(run_id)
    }
}

fn storage_error(e: impl std::fmt::Display) -> OutputError {
    OutputError::Storage(e.to_string())
}

impl<S: Storage> ProductSink for SqliteSink<S> {
    fn write(&mut self, products: &[Product]) -> OutputResult<usize> {
        if products.is_empty() {
            tracing::warn!("No data to save");
            return Ok(0);
        }

        let run_id = self
            .storage
            .create_run(&self.config_hash)
            .map_err(storage_error)?;
        self.last_run = Some(run_id);

        match self.storage.insert_products(run_id, products) {
            Ok(written) => {
                self.storage
                    .finish_run(run_id, RunStatus::Completed)
                    .map_err(storage_error)?;
                tracing::info!("Stored {} products as run {}", written, run_id);
                Ok(written)
            }
            Err(e) => {
                tracing::error!("Failed to store products for run {}: {}", run_id, e);
                // Best effort; the insert error is the one worth reporting
                let _ = self.storage.finish_run(run_id, RunStatus::Failed);
                Err(storage_error(e))
            }
        }
    }

    fn describe(&self) -> String {
        match self.last_run {
            Some(run_id) => format!("SQLite database (run {})", run_id),
            None => "SQLite database".to_string(),
        }
    }
}
