//! Period start date storage operations.

use chrono::NaiveDateTime;

use super::{log_write_error, LocalStore, StoreResult, PERIOD_DATE_KEY};

impl LocalStore {
    /// Get the stored period start date, None when absent or unreadable.
    pub fn period_start(&self) -> Option<NaiveDateTime> {
        let raw = match self.kv().get(PERIOD_DATE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!("failed to read period date: {e}");
                return None;
            }
        };
        match raw.parse() {
            Ok(date) => Some(date),
            Err(_) => {
                tracing::warn!("stored period date is malformed: {raw:?}");
                None
            }
        }
    }

    /// Store the period start date.
    pub fn set_period_start(&self, start: NaiveDateTime) -> StoreResult<()> {
        let value = start.format("%Y-%m-%dT%H:%M:%S").to_string();
        self.kv()
            .set(PERIOD_DATE_KEY, &value)
            .inspect_err(log_write_error)
    }

    /// Forget the stored period start date.
    pub fn clear_period_start(&self) -> StoreResult<()> {
        self.kv()
            .remove(PERIOD_DATE_KEY)
            .inspect_err(log_write_error)
    }
}
