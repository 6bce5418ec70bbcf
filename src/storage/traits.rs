//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::product::Product;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Run {0} is already finished")]
    RunFinished(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the load stage.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new harvest run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration in effect
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run finished with the given status and a finish timestamp
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Products =====

    /// Appends products to a running run, atomically
    ///
    /// # Returns
    ///
    /// The number of rows written
    fn insert_products(&mut self, run_id: i64, products: &[Product]) -> StorageResult<usize>;

    /// Loads the products of a run in insertion order
    fn load_products(&self, run_id: i64) -> StorageResult<Vec<Product>>;

    // ===== Statistics =====

    /// Counts products stored for a run
    fn count_products(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts all runs
    fn count_runs(&self) -> StorageResult<u64>;
}
