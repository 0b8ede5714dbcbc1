//! Cycle calculator.
//!
//! Pure date arithmetic over the stored period start date. Nothing here
//! touches storage or notifications; the caller supplies both the start
//! date and "now".

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Fixed interval between period starts, in days.
pub const CYCLE_LENGTH_DAYS: i64 = 28;
/// Fixed span of the Period phase, in days.
pub const PERIOD_LENGTH_DAYS: u32 = 5;

/// Phase of the cycle, derived from the current cycle day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CyclePhase {
    Period,
    Follicular,
    Ovulation,
    Luteal,
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CyclePhase::Period => "Period",
            CyclePhase::Follicular => "Follicular",
            CyclePhase::Ovulation => "Ovulation",
            CyclePhase::Luteal => "Luteal",
        };
        f.write_str(name)
    }
}

/// Derived cycle state, recomputed on every read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleSnapshot {
    /// Next predicted period start
    pub next_period_start: NaiveDateTime,
    /// Whole days until the next period, rounded up
    pub days_left: i64,
    /// Start of the cycle containing (or nearest below) the next period
    pub most_recent_period_start: NaiveDateTime,
    /// Current cycle day, 1-based and clamped to at least 1
    pub current_day: u32,
    /// Phase for the current day
    pub phase: CyclePhase,
}

impl CycleSnapshot {
    /// Check whether the period itself is ongoing.
    pub fn is_period_ongoing(&self) -> bool {
        self.current_day <= PERIOD_LENGTH_DAYS
    }
}

/// Compute the derived cycle state for a stored start date at `now`.
///
/// The start date is advanced by whole 28-day jumps while strictly earlier
/// than `now`; a start that lands exactly on `now` is not advanced further.
pub fn snapshot(period_start: NaiveDateTime, now: NaiveDateTime) -> CycleSnapshot {
    let mut next_period_start = period_start;
    while next_period_start < now {
        next_period_start += Duration::days(CYCLE_LENGTH_DAYS);
    }

    let days_left = days_ceil(next_period_start - now);
    let most_recent_period_start = next_period_start - Duration::days(CYCLE_LENGTH_DAYS);

    let day_diff = days_ceil(now - most_recent_period_start);
    let current_day = if day_diff >= 1 { day_diff as u32 } else { 1 };

    CycleSnapshot {
        next_period_start,
        days_left,
        most_recent_period_start,
        current_day,
        phase: phase_for_day(current_day),
    }
}

/// Map a 1-based cycle day onto its phase.
pub fn phase_for_day(day: u32) -> CyclePhase {
    if day <= PERIOD_LENGTH_DAYS {
        CyclePhase::Period
    } else if day <= 14 {
        CyclePhase::Follicular
    } else if day <= 21 {
        CyclePhase::Ovulation
    } else {
        CyclePhase::Luteal
    }
}

/// Ceiling of a duration in whole days.
fn days_ceil(d: Duration) -> i64 {
    d.num_seconds().div_ceil(86_400)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_phase_thresholds() {
        assert_eq!(phase_for_day(1), CyclePhase::Period);
        assert_eq!(phase_for_day(5), CyclePhase::Period);
        assert_eq!(phase_for_day(6), CyclePhase::Follicular);
        assert_eq!(phase_for_day(14), CyclePhase::Follicular);
        assert_eq!(phase_for_day(15), CyclePhase::Ovulation);
        assert_eq!(phase_for_day(21), CyclePhase::Ovulation);
        assert_eq!(phase_for_day(22), CyclePhase::Luteal);
        assert_eq!(phase_for_day(28), CyclePhase::Luteal);
    }

    #[test]
    fn test_start_thirty_days_ago() {
        // Start 30 days ago: one 28-day jump lands 2 days in the past, so a
        // second jump is taken and the next period is 26 days out.
        let now = dt("2024-03-31T12:00:00");
        let start = dt("2024-03-01T12:00:00");

        let snap = snapshot(start, now);
        assert_eq!(snap.next_period_start, dt("2024-04-26T12:00:00"));
        assert_eq!(snap.days_left, 26);
        assert_eq!(snap.most_recent_period_start, dt("2024-03-29T12:00:00"));
        assert_eq!(snap.current_day, 2);
        assert_eq!(snap.phase, CyclePhase::Period);
        assert!(snap.is_period_ongoing());
    }

    #[test]
    fn test_start_equal_to_now_is_not_advanced() {
        let now = dt("2024-03-01T00:00:00");
        let snap = snapshot(now, now);
        assert_eq!(snap.next_period_start, now);
        assert_eq!(snap.days_left, 0);
        // The containing cycle runs a full 28 days behind.
        assert_eq!(snap.current_day, 28);
        assert_eq!(snap.phase, CyclePhase::Luteal);
    }

    #[test]
    fn test_future_start_clamps_current_day() {
        let now = dt("2024-03-01T00:00:00");
        let start = dt("2024-06-01T00:00:00");

        let snap = snapshot(start, now);
        assert_eq!(snap.next_period_start, start);
        assert_eq!(snap.current_day, 1);
    }

    #[test]
    fn test_partial_days_round_up() {
        let now = dt("2024-03-01T12:00:00");
        let start = dt("2024-03-02T00:00:00");

        let snap = snapshot(start, now);
        // 12 hours away counts as one day left.
        assert_eq!(snap.days_left, 1);
    }

    #[test]
    fn test_current_day_advances_through_cycle() {
        let start = dt("2024-03-01T00:00:00");
        let snap = snapshot(start, dt("2024-03-15T10:00:00"));
        assert_eq!(snap.current_day, 15);
        assert_eq!(snap.phase, CyclePhase::Ovulation);
        assert!(!snap.is_period_ongoing());
    }
}
