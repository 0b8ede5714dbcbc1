//! Medication storage operations.

use super::{log_write_error, LocalStore, StoreResult, MEDICATIONS_KEY};
use crate::models::Medication;

impl LocalStore {
    /// Get all medications, empty on read or decode failure.
    pub fn medications(&self) -> Vec<Medication> {
        match self.try_medications() {
            Ok(meds) => meds,
            Err(e) => {
                tracing::error!("failed to read medications: {e}");
                Vec::new()
            }
        }
    }

    pub(crate) fn try_medications(&self) -> StoreResult<Vec<Medication>> {
        match self.kv().get(MEDICATIONS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Get one medication by ID.
    pub fn medication(&self, id: &str) -> Option<Medication> {
        self.medications().into_iter().find(|m| m.id == id)
    }

    /// Append a medication to the persisted list.
    pub fn add_medication(&self, medication: &Medication) -> StoreResult<()> {
        let mut medications = self.try_medications()?;
        medications.push(medication.clone());
        self.save_medications(&medications)
    }

    /// Replace a stored medication by ID. Unknown IDs are a silent no-op.
    pub fn update_medication(&self, updated: &Medication) -> StoreResult<()> {
        let mut medications = self.try_medications()?;
        if let Some(slot) = medications.iter_mut().find(|m| m.id == updated.id) {
            *slot = updated.clone();
            self.save_medications(&medications)?;
        }
        Ok(())
    }

    /// Remove a medication by ID.
    pub fn delete_medication(&self, id: &str) -> StoreResult<()> {
        let medications: Vec<Medication> = self
            .try_medications()?
            .into_iter()
            .filter(|m| m.id != id)
            .collect();
        self.save_medications(&medications)
    }

    fn save_medications(&self, medications: &[Medication]) -> StoreResult<()> {
        let json = serde_json::to_string(medications)?;
        self.kv()
            .set(MEDICATIONS_KEY, &json)
            .inspect_err(log_write_error)
    }
}
