//! Dose ledger.
//!
//! Generates dose history entries from a medication's schedule and records
//! doses as taken, keeping the supply counter in step.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::models::{DoseRecord, Medication};
use crate::store::LocalStore;

/// Ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(#[from] crate::store::StoreError),

    #[error("Invalid medication data: {0}")]
    InvalidMedication(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger over the shared local store.
pub struct DoseLedger<'a> {
    store: &'a LocalStore,
}

impl<'a> DoseLedger<'a> {
    pub fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// Generate one pending dose per day-of-duration per time slot and
    /// append them to the history in a single batch write.
    ///
    /// Not idempotent: calling this twice for the same medication duplicates
    /// its entries. Returns the number of entries appended.
    pub fn generate_schedule(&self, medication: &Medication) -> LedgerResult<usize> {
        let start: NaiveDate = medication.start_date.parse().map_err(|_| {
            LedgerError::InvalidMedication(format!(
                "unparseable start date: {:?}",
                medication.start_date
            ))
        })?;
        let duration = medication.duration_days().ok_or_else(|| {
            LedgerError::InvalidMedication(format!(
                "unparseable duration: {:?}",
                medication.duration
            ))
        })?;

        let mut history = self.store.try_dose_history()?;
        let mut appended = 0;
        for day in 0..duration {
            let date = start + Duration::days(day as i64);
            for (hour, minute) in medication.parsed_times() {
                if let Some(timestamp) = date.and_hms_opt(hour, minute, 0) {
                    history.push(DoseRecord::new(medication.id.clone(), timestamp));
                    appended += 1;
                }
            }
        }

        self.store.save_dose_history(&history)?;
        Ok(appended)
    }

    /// Mark a dose as taken and draw down the owning medication's supply.
    ///
    /// Silent no-op when the dose is unknown or already taken, so repeated
    /// taps cannot double-decrement. Returns the updated medication when a
    /// dose was newly recorded and its owner was found.
    pub fn record_dose(&self, dose_id: &str) -> LedgerResult<Option<Medication>> {
        let mut history = self.store.try_dose_history()?;
        let Some(dose) = history.iter_mut().find(|d| d.id == dose_id) else {
            return Ok(None);
        };
        if dose.taken {
            return Ok(None);
        }
        dose.taken = true;
        let medication_id = dose.medication_id.clone();
        self.store.save_dose_history(&history)?;

        let Some(mut medication) = self.store.medication(&medication_id) else {
            return Ok(None);
        };
        if medication.consume_one() {
            self.store.update_medication(&medication)?;
        }
        Ok(Some(medication))
    }

    /// Doses whose timestamp falls on the given calendar day.
    pub fn doses_for_day(&self, day: NaiveDate) -> Vec<DoseRecord> {
        self.store
            .dose_history()
            .into_iter()
            .filter(|d| d.is_for_day(day))
            .collect()
    }
}
