//! Dose history storage operations.

use super::{log_write_error, LocalStore, StoreResult, DOSE_HISTORY_KEY};
use crate::models::DoseRecord;

impl LocalStore {
    /// Get the full dose history, empty on read or decode failure.
    pub fn dose_history(&self) -> Vec<DoseRecord> {
        match self.try_dose_history() {
            Ok(history) => history,
            Err(e) => {
                tracing::error!("failed to read dose history: {e}");
                Vec::new()
            }
        }
    }

    pub(crate) fn try_dose_history(&self) -> StoreResult<Vec<DoseRecord>> {
        match self.kv().get(DOSE_HISTORY_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Persist the full dose history in one write.
    pub fn save_dose_history(&self, history: &[DoseRecord]) -> StoreResult<()> {
        let json = serde_json::to_string(history)?;
        self.kv()
            .set(DOSE_HISTORY_KEY, &json)
            .inspect_err(log_write_error)
    }
}
