//! Local persistence layer.
//!
//! Storage is a string-keyed key-value store holding JSON-encoded values.
//! The backend is injected through [`KeyValueStore`] so the engine can run
//! against SQLite on device and an in-memory map in tests.

mod doses;
mod medications;
mod memory;
mod period;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::Path;

use thiserror::Error;

/// Key for the persisted medication list (JSON array).
pub const MEDICATIONS_KEY: &str = "medications";
/// Key for the persisted dose history (JSON array).
pub const DOSE_HISTORY_KEY: &str = "dose_history";
/// Key for the stored period start date (ISO date-time string).
pub const PERIOD_DATE_KEY: &str = "period_date";

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        StoreError::Backend(format!("Lock poisoned: {}", e))
    }
}

/// Durable string-keyed storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Typed repository over the key-value backend.
///
/// Read accessors degrade to empty defaults on failure; mutating operations
/// propagate errors so callers can surface them.
pub struct LocalStore {
    kv: Box<dyn KeyValueStore>,
}

impl LocalStore {
    /// Open SQLite-backed storage at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Ok(Self {
            kv: Box::new(SqliteStore::open(path)?),
        })
    }

    /// Create in-memory storage (for testing).
    pub fn open_in_memory() -> Self {
        Self {
            kv: Box::new(MemoryStore::new()),
        }
    }

    /// Wrap an externally provided backend.
    pub fn with_backend(kv: Box<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub(crate) fn kv(&self) -> &dyn KeyValueStore {
        self.kv.as_ref()
    }

    /// Remove the medication list and dose history in one sweep.
    ///
    /// The stored period date is left in place, matching the app's
    /// "clear all data" action.
    pub fn clear_all(&self) -> StoreResult<()> {
        self.kv.remove(MEDICATIONS_KEY).inspect_err(log_write_error)?;
        self.kv.remove(DOSE_HISTORY_KEY).inspect_err(log_write_error)?;
        Ok(())
    }
}

pub(crate) fn log_write_error(e: &StoreError) {
    tracing::error!("storage write failed: {e}");
}
