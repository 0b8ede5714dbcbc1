#![feature(int_roundings)]
//! WellTrack Core Library
//!
//! Local-first engine behind the WellTrack mobile screens: medication
//! tracking with dose history and supply counts, menstrual-cycle
//! prediction, reminder scheduling, and the guided-breathing session.
//!
//! # Architecture
//!
//! ```text
//!                        Mobile UI (host app)
//!                              │
//!                      [UniFFI boundary]
//!                              │
//!                       WelltrackCore
//!              ┌───────────────┼────────────────┐
//!              ▼               ▼                ▼
//!         DoseLedger     Cycle Calculator  ReminderScheduler
//!              │               │                │
//!              ▼               ▼                ▼
//!          LocalStore (SQLite kv)      NotificationGateway
//!                                      (host-implemented)
//! ```
//!
//! # Core Principle
//!
//! **Reminders are best-effort.** Scheduling failures are logged and
//! swallowed; losing a notification must never break a storage operation.
//!
//! # Modules
//!
//! - [`store`]: key-value persistence (medications, dose history, period date)
//! - [`models`]: domain types (Medication, DoseRecord)
//! - [`cycle`]: pure cycle-day and phase arithmetic
//! - [`reminders`]: notification scheduling over the platform gateway
//! - [`ledger`]: dose schedule generation and dose recording
//! - [`breathing`]: guided-breathing session state machine

pub mod breathing;
pub mod cycle;
pub mod ledger;
pub mod models;
pub mod reminders;
pub mod store;

// Re-export commonly used types
pub use breathing::{BreathingSession, BreathingTimer};
pub use cycle::{CyclePhase, CycleSnapshot};
pub use ledger::DoseLedger;
pub use models::{DoseRecord, Medication};
pub use reminders::{
    AlertPolicy, MemoryGateway, NotificationData, NotificationGateway, NotificationRequest,
    NotificationTrigger, ReminderScheduler, ScheduledNotification,
};
pub use store::{KeyValueStore, LocalStore, MemoryStore, SqliteStore};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex, OnceLock};

use chrono::{Local, NaiveDate, NaiveDateTime};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum WelltrackError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Scheduling error: {0}")]
    SchedulingError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<store::StoreError> for WelltrackError {
    fn from(e: store::StoreError) -> Self {
        WelltrackError::StorageError(e.to_string())
    }
}

impl From<ledger::LedgerError> for WelltrackError {
    fn from(e: ledger::LedgerError) -> Self {
        match e {
            ledger::LedgerError::InvalidMedication(msg) => WelltrackError::InvalidInput(msg),
            other => WelltrackError::StorageError(other.to_string()),
        }
    }
}

impl From<reminders::ScheduleError> for WelltrackError {
    fn from(e: reminders::ScheduleError) -> Self {
        WelltrackError::SchedulingError(e.to_string())
    }
}

impl From<serde_json::Error> for WelltrackError {
    fn from(e: serde_json::Error) -> Self {
        WelltrackError::StorageError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for WelltrackError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        WelltrackError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Logging
// =========================================================================

static LOGGING: OnceLock<()> = OnceLock::new();

/// Install the process-wide tracing subscriber. Safe to call repeatedly.
#[uniffi::export]
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create the tracker database at the given path.
#[uniffi::export]
pub fn open_tracker(
    path: String,
    notifications: Arc<dyn NotificationGateway>,
) -> Result<Arc<WelltrackCore>, WelltrackError> {
    let store = LocalStore::open(&path)?;
    Ok(WelltrackCore::with_parts(store, notifications))
}

/// Create an in-memory tracker (for testing).
#[uniffi::export]
pub fn open_tracker_in_memory(
    notifications: Arc<dyn NotificationGateway>,
) -> Arc<WelltrackCore> {
    WelltrackCore::with_parts(LocalStore::open_in_memory(), notifications)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe engine entry point for FFI.
#[derive(uniffi::Object)]
pub struct WelltrackCore {
    store: Arc<Mutex<LocalStore>>,
    reminders: ReminderScheduler,
}

impl WelltrackCore {
    fn with_parts(store: LocalStore, notifications: Arc<dyn NotificationGateway>) -> Arc<Self> {
        let reminders = ReminderScheduler::new(notifications);
        reminders.apply_default_policy();
        Arc::new(Self {
            store: Arc::new(Mutex::new(store)),
            reminders,
        })
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }
}

#[uniffi::export]
impl WelltrackCore {
    // =========================================================================
    // Medication Operations
    // =========================================================================

    /// Get all stored medications.
    pub fn medications(&self) -> Result<Vec<FfiMedication>, WelltrackError> {
        let store = self.store.lock()?;
        Ok(store.medications().into_iter().map(|m| m.into()).collect())
    }

    /// Add a medication: persist it, generate its dose schedule, then
    /// schedule reminders and run the refill check (both best-effort).
    pub fn add_medication(&self, medication: FfiMedication) -> Result<(), WelltrackError> {
        let store = self.store.lock()?;
        let medication: Medication = medication.into();
        store.add_medication(&medication)?;
        DoseLedger::new(&store).generate_schedule(&medication)?;

        self.reminders
            .schedule_medication_reminder(&medication, Self::now());
        self.reminders.schedule_refill_reminder(&medication);
        Ok(())
    }

    /// Update a stored medication and replace its reminders.
    pub fn update_medication(&self, medication: FfiMedication) -> Result<(), WelltrackError> {
        let store = self.store.lock()?;
        let medication: Medication = medication.into();
        store.update_medication(&medication)?;

        self.reminders
            .update_medication_reminders(&medication, Self::now());
        Ok(())
    }

    /// Delete a medication and cancel all of its reminders.
    pub fn delete_medication(&self, medication_id: String) -> Result<(), WelltrackError> {
        let store = self.store.lock()?;
        store.delete_medication(&medication_id)?;
        self.reminders.cancel_medication_reminders(&medication_id);
        Ok(())
    }

    /// Wipe medications and dose history.
    pub fn clear_all_data(&self) -> Result<(), WelltrackError> {
        let store = self.store.lock()?;
        store.clear_all()?;
        Ok(())
    }

    // =========================================================================
    // Dose Operations
    // =========================================================================

    /// Record a dose as taken and run the refill check for its medication.
    pub fn record_dose(&self, dose_id: String) -> Result<(), WelltrackError> {
        let store = self.store.lock()?;
        let updated = DoseLedger::new(&store).record_dose(&dose_id)?;
        if let Some(medication) = updated {
            self.reminders.schedule_refill_reminder(&medication);
        }
        Ok(())
    }

    /// Get the full dose history.
    pub fn dose_history(&self) -> Result<Vec<FfiDoseRecord>, WelltrackError> {
        let store = self.store.lock()?;
        Ok(store.dose_history().into_iter().map(|d| d.into()).collect())
    }

    /// Get the doses scheduled for today.
    pub fn todays_doses(&self) -> Result<Vec<FfiDoseRecord>, WelltrackError> {
        let store = self.store.lock()?;
        Ok(DoseLedger::new(&store)
            .doses_for_day(Self::today())
            .into_iter()
            .map(|d| d.into())
            .collect())
    }

    // =========================================================================
    // Cycle Operations
    // =========================================================================

    /// Store the period start date picked by the user.
    pub fn set_period_start(&self, start: String) -> Result<(), WelltrackError> {
        let start = parse_date_time(&start)
            .ok_or_else(|| WelltrackError::InvalidInput(format!("unparseable date: {start:?}")))?;
        let store = self.store.lock()?;
        store.set_period_start(start)?;
        Ok(())
    }

    /// Forget the stored period start date.
    pub fn reset_period_date(&self) -> Result<(), WelltrackError> {
        let store = self.store.lock()?;
        store.clear_period_start()?;
        Ok(())
    }

    /// Current derived cycle state, or None when no start date is stored
    /// (the UI prompts for one instead).
    pub fn cycle_snapshot(&self) -> Result<Option<FfiCycleSnapshot>, WelltrackError> {
        let store = self.store.lock()?;
        Ok(store
            .period_start()
            .map(|start| cycle::snapshot(start, Self::now()).into()))
    }

    /// Schedule the period warning and care notifications for the stored
    /// start date. Errors when no date is stored so the UI can prompt.
    pub fn schedule_period_notifications(&self) -> Result<u32, WelltrackError> {
        let start = {
            let store = self.store.lock()?;
            store.period_start()
        };
        let start = start
            .ok_or_else(|| WelltrackError::NotFound("No period date is stored".into()))?;
        Ok(self
            .reminders
            .schedule_period_notifications(start, Self::now()))
    }
}

fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    // Date-only input from the picker lands at midnight.
    s.parse::<NaiveDate>().ok()?.and_hms_opt(0, 0, 0)
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe medication.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub times: Vec<String>,
    pub start_date: String,
    pub duration: String,
    pub color: String,
    pub reminder_enabled: bool,
    pub current_supply: u32,
    pub total_supply: u32,
    pub refill_at: u32,
    pub refill_reminder: bool,
    pub last_refill_date: Option<String>,
    pub notes: Option<String>,
}

impl From<Medication> for FfiMedication {
    fn from(med: Medication) -> Self {
        Self {
            id: med.id,
            name: med.name,
            dosage: med.dosage,
            times: med.times,
            start_date: med.start_date,
            duration: med.duration,
            color: med.color,
            reminder_enabled: med.reminder_enabled,
            current_supply: med.current_supply,
            total_supply: med.total_supply,
            refill_at: med.refill_at,
            refill_reminder: med.refill_reminder,
            last_refill_date: med.last_refill_date,
            notes: med.notes,
        }
    }
}

impl From<FfiMedication> for Medication {
    fn from(med: FfiMedication) -> Self {
        Medication {
            id: med.id,
            name: med.name,
            dosage: med.dosage,
            times: med.times,
            start_date: med.start_date,
            duration: med.duration,
            color: med.color,
            reminder_enabled: med.reminder_enabled,
            current_supply: med.current_supply,
            total_supply: med.total_supply,
            refill_at: med.refill_at,
            refill_reminder: med.refill_reminder,
            last_refill_date: med.last_refill_date,
            notes: med.notes,
        }
    }
}

/// FFI-safe dose record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoseRecord {
    pub id: String,
    pub medication_id: String,
    pub timestamp: String,
    pub taken: bool,
}

impl From<DoseRecord> for FfiDoseRecord {
    fn from(dose: DoseRecord) -> Self {
        Self {
            id: dose.id,
            medication_id: dose.medication_id,
            timestamp: dose.timestamp,
            taken: dose.taken,
        }
    }
}

/// FFI-safe cycle snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCycleSnapshot {
    pub next_period_start: String,
    pub days_left: i64,
    pub current_day: u32,
    pub phase: String,
    pub period_ongoing: bool,
}

impl From<CycleSnapshot> for FfiCycleSnapshot {
    fn from(snap: CycleSnapshot) -> Self {
        Self {
            next_period_start: snap
                .next_period_start
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
            days_left: snap.days_left,
            current_day: snap.current_day,
            phase: snap.phase.to_string(),
            period_ongoing: snap.is_period_ongoing(),
        }
    }
}
