//! Medication models.

use serde::{Deserialize, Serialize};

/// A medication the user is tracking, with its dose schedule and supply.
///
/// Serialized camelCase so the persisted JSON matches the mobile app's
/// historical storage format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    /// Unique ID (UUID v4)
    pub id: String,
    /// Display name
    pub name: String,
    /// Dosage as entered by the user (e.g., "500mg")
    pub dosage: String,
    /// Times of day to take a dose, each "HH:MM"
    pub times: Vec<String>,
    /// Calendar date the schedule starts (ISO date)
    pub start_date: String,
    /// Duration in days, kept as text as the app stores it
    pub duration: String,
    /// Display color for the medication card
    pub color: String,
    /// Whether daily reminders are on
    pub reminder_enabled: bool,
    /// Doses remaining on hand
    pub current_supply: u32,
    /// Supply at last refill
    pub total_supply: u32,
    /// Supply level at or below which a refill is due
    pub refill_at: u32,
    /// Whether refill alerts are on
    pub refill_reminder: bool,
    /// Date of the last refill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refill_date: Option<String>,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Medication {
    /// Create a new medication with required fields.
    pub fn new(name: String, dosage: String, times: Vec<String>, start_date: String, duration: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            dosage,
            times,
            start_date,
            duration,
            color: String::new(),
            reminder_enabled: true,
            current_supply: 0,
            total_supply: 0,
            refill_at: 0,
            refill_reminder: false,
            last_refill_date: None,
            notes: None,
        }
    }

    /// Parse the stored duration into whole days.
    pub fn duration_days(&self) -> Option<u32> {
        self.duration.trim().parse().ok()
    }

    /// Time slots parsed to (hour, minute), malformed entries skipped.
    pub fn parsed_times(&self) -> Vec<(u32, u32)> {
        self.times
            .iter()
            .filter_map(|t| parse_time_of_day(t))
            .collect()
    }

    /// Take one dose from the supply, floored at zero.
    ///
    /// Returns true if the supply was actually decremented.
    pub fn consume_one(&mut self) -> bool {
        if self.current_supply > 0 {
            self.current_supply -= 1;
            true
        } else {
            false
        }
    }

    /// Check whether the supply has reached the refill threshold.
    pub fn needs_refill(&self) -> bool {
        self.refill_reminder && self.current_supply <= self.refill_at
    }
}

/// Parse a "HH:MM" time-of-day string.
pub fn parse_time_of_day(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.split_once(':')?;
    let hour: u32 = h.trim().parse().ok()?;
    let minute: u32 = m.trim().parse().ok()?;
    if hour < 24 && minute < 60 {
        Some((hour, minute))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_med() -> Medication {
        Medication::new(
            "Ibuprofen".into(),
            "200mg".into(),
            vec!["08:00".into(), "20:00".into()],
            "2024-01-01".into(),
            "3".into(),
        )
    }

    #[test]
    fn test_new_medication() {
        let med = make_med();
        assert_eq!(med.name, "Ibuprofen");
        assert_eq!(med.id.len(), 36); // UUID format
        assert_eq!(med.duration_days(), Some(3));
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("08:00"), Some((8, 0)));
        assert_eq!(parse_time_of_day("23:59"), Some((23, 59)));
        assert_eq!(parse_time_of_day("24:00"), None);
        assert_eq!(parse_time_of_day("08:60"), None);
        assert_eq!(parse_time_of_day("noon"), None);
    }

    #[test]
    fn test_parsed_times_skips_malformed() {
        let mut med = make_med();
        med.times.push("not-a-time".into());
        assert_eq!(med.parsed_times(), vec![(8, 0), (20, 0)]);
    }

    #[test]
    fn test_consume_one_floors_at_zero() {
        let mut med = make_med();
        med.current_supply = 1;
        assert!(med.consume_one());
        assert_eq!(med.current_supply, 0);
        assert!(!med.consume_one());
        assert_eq!(med.current_supply, 0);
    }

    #[test]
    fn test_needs_refill() {
        let mut med = make_med();
        med.refill_reminder = true;
        med.refill_at = 5;
        med.current_supply = 3;
        assert!(med.needs_refill());
        med.current_supply = 6;
        assert!(!med.needs_refill());
        med.current_supply = 3;
        med.refill_reminder = false;
        assert!(!med.needs_refill());
    }

    #[test]
    fn test_serializes_camel_case() {
        let med = make_med();
        let json = serde_json::to_string(&med).unwrap();
        assert!(json.contains("\"reminderEnabled\""));
        assert!(json.contains("\"currentSupply\""));
        assert!(json.contains("\"startDate\""));
    }
}
