//! Dose history models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One scheduled instance of taking a medication at a specific date-time.
///
/// Records are bulk-created when a medication's schedule is generated and are
/// never individually deleted. Once `taken` is true it stays true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoseRecord {
    /// Unique ID (UUID v4)
    pub id: String,
    /// Owning medication ID
    pub medication_id: String,
    /// Local date-time of the dose, "YYYY-MM-DDTHH:MM:SS"
    pub timestamp: String,
    /// Whether the dose has been recorded as taken
    pub taken: bool,
}

impl DoseRecord {
    /// Create a pending dose for a medication at the given local date-time.
    pub fn new(medication_id: String, timestamp: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            medication_id,
            timestamp: timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            taken: false,
        }
    }

    /// Parse the stored timestamp, if well-formed.
    pub fn timestamp_parsed(&self) -> Option<NaiveDateTime> {
        self.timestamp.parse().ok()
    }

    /// Check whether this dose falls on the given calendar day.
    ///
    /// Unparseable timestamps never match.
    pub fn is_for_day(&self, day: NaiveDate) -> bool {
        self.timestamp_parsed()
            .map(|t| t.date() == day)
            .unwrap_or(false)
    }
}
