//! Reminder scheduling.
//!
//! Translates medication and cycle data into concrete trigger requests for
//! the platform gateway. Everything here is best-effort: gateway failures
//! are logged and degrade to empty results, never propagated to the UI.

mod gateway;

pub use gateway::*;

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::cycle::PERIOD_LENGTH_DAYS;
use crate::models::Medication;

/// Rotating body texts for the in-period care notifications.
const CARE_MESSAGES: [&str; 5] = [
    "Stay hydrated! 💧 Your body will thank you.",
    "You're doing great! Take care of yourself. 💖",
    "Drink some water and keep shining! ✨",
    "Reminder: Hydration = Energy 🚰💪",
    "Take a moment to rest and refresh. 🌸",
];

/// Hour of day the in-period care notifications start.
const CARE_START_HOUR: u32 = 9;
/// Care notifications per period day, two hours apart.
const CARE_SLOTS_PER_DAY: u32 = 7;
/// Days of warning before a predicted period start.
const PRE_PERIOD_WARNING_DAYS: i64 = 3;

/// Schedules, cancels, and replaces reminders through the platform gateway.
pub struct ReminderScheduler {
    gateway: Arc<dyn NotificationGateway>,
}

impl ReminderScheduler {
    pub fn new(gateway: Arc<dyn NotificationGateway>) -> Self {
        Self { gateway }
    }

    /// Apply the default presentation policy, logging on failure.
    pub fn apply_default_policy(&self) {
        if let Err(e) = self.gateway.configure(AlertPolicy::default()) {
            tracing::warn!("failed to configure notification policy: {e}");
        }
    }

    /// Schedule dose reminders for every time slot of a medication.
    ///
    /// Per slot: a one-shot for today when the slot is still ahead of `now`,
    /// plus an unconditional daily repeat. Returns the identifiers of the
    /// daily notifications, one per slot; empty when reminders are disabled
    /// or the gateway fails mid-way.
    pub fn schedule_medication_reminder(
        &self,
        medication: &Medication,
        now: NaiveDateTime,
    ) -> Vec<String> {
        if !medication.reminder_enabled {
            return Vec::new();
        }

        let mut identifiers = Vec::new();
        for (hour, minute) in medication.parsed_times() {
            let Some(slot) = now
                .date()
                .and_hms_opt(hour, minute, 0)
            else {
                continue;
            };

            let request = NotificationRequest {
                title: "Medication Reminder".into(),
                body: format!("Time to take {} ({})", medication.name, medication.dosage),
                data: NotificationData {
                    medication_id: Some(medication.id.clone()),
                    kind: None,
                },
                sound: true,
            };

            // Catch-up for today, only while the slot is still ahead.
            let delay_seconds = (slot - now).num_seconds();
            if delay_seconds > 0 {
                let one_shot = self.gateway.schedule(
                    request.clone(),
                    NotificationTrigger::OneShot {
                        delay_seconds: delay_seconds as u64,
                    },
                );
                if let Err(e) = one_shot {
                    tracing::warn!("failed to schedule medication reminder: {e}");
                    return Vec::new();
                }
            }

            let daily = self.gateway.schedule(
                request,
                NotificationTrigger::Daily {
                    hour: slot.hour(),
                    minute: slot.minute(),
                },
            );
            match daily {
                Ok(identifier) => identifiers.push(identifier),
                Err(e) => {
                    tracing::warn!("failed to schedule medication reminder: {e}");
                    return Vec::new();
                }
            }
        }
        identifiers
    }

    /// Cancel every scheduled notification carrying the medication's ID.
    ///
    /// A scan failure aborts the whole operation; individual cancellation
    /// failures are logged and skipped.
    pub fn cancel_medication_reminders(&self, medication_id: &str) {
        let scheduled = match self.gateway.scheduled() {
            Ok(scheduled) => scheduled,
            Err(e) => {
                tracing::error!("failed to enumerate scheduled notifications: {e}");
                return;
            }
        };

        for notification in scheduled {
            if notification.data.medication_id.as_deref() == Some(medication_id) {
                if let Err(e) = self.gateway.cancel(notification.identifier) {
                    tracing::warn!("failed to cancel medication reminder: {e}");
                }
            }
        }
    }

    /// Replace a medication's reminders: full cancel, then reschedule.
    ///
    /// A failure between the two steps leaves no reminders rather than
    /// duplicates.
    pub fn update_medication_reminders(
        &self,
        medication: &Medication,
        now: NaiveDateTime,
    ) -> Vec<String> {
        self.cancel_medication_reminders(&medication.id);
        self.schedule_medication_reminder(medication, now)
    }

    /// Fire an immediate refill alert when the supply is at or below the
    /// threshold. Returns the identifier, or None when nothing was due or
    /// the gateway failed.
    pub fn schedule_refill_reminder(&self, medication: &Medication) -> Option<String> {
        if !medication.needs_refill() {
            return None;
        }

        let request = NotificationRequest {
            title: "Refill Reminder".into(),
            body: format!(
                "Your {} supply is running low. Current supply: {}",
                medication.name, medication.current_supply
            ),
            data: NotificationData {
                medication_id: Some(medication.id.clone()),
                kind: Some("refill".into()),
            },
            sound: false,
        };

        match self.gateway.schedule(request, NotificationTrigger::Immediate) {
            Ok(identifier) => Some(identifier),
            Err(e) => {
                tracing::warn!("failed to schedule refill reminder: {e}");
                None
            }
        }
    }

    /// Schedule the period warning and the in-period care notifications.
    ///
    /// One warning 3 days ahead of `start` when that moment is still future,
    /// then 7 notifications two hours apart from 09:00 on each of the 5
    /// period days, each skipped once its time has passed. Returns how many
    /// were scheduled; a gateway failure stops the run at that count.
    pub fn schedule_period_notifications(&self, start: NaiveDateTime, now: NaiveDateTime) -> u32 {
        let mut scheduled = 0;

        let warning_at = start - Duration::days(PRE_PERIOD_WARNING_DAYS);
        let warning_delay = (warning_at - now).num_seconds();
        if warning_delay > 0 {
            let request = NotificationRequest {
                title: "Period Reminder ⏰".into(),
                body: "Your period may start in 3 days. Get ready and take care! 🩷".into(),
                data: NotificationData::default(),
                sound: true,
            };
            let trigger = NotificationTrigger::OneShot {
                delay_seconds: warning_delay as u64,
            };
            match self.gateway.schedule(request, trigger) {
                Ok(_) => scheduled += 1,
                Err(e) => {
                    tracing::error!("failed to schedule period notifications: {e}");
                    return scheduled;
                }
            }
        }

        for day_offset in 0..PERIOD_LENGTH_DAYS {
            let Some(first_slot) = (start.date() + Duration::days(day_offset as i64))
                .and_hms_opt(CARE_START_HOUR, 0, 0)
            else {
                continue;
            };
            let message = CARE_MESSAGES[day_offset as usize % CARE_MESSAGES.len()];

            for slot in 0..CARE_SLOTS_PER_DAY {
                let fire_at = first_slot + Duration::hours(2 * slot as i64);
                let delay_seconds = (fire_at - now).num_seconds();
                if delay_seconds <= 0 {
                    continue;
                }

                let request = NotificationRequest {
                    title: "Period Care 💞".into(),
                    body: message.into(),
                    data: NotificationData::default(),
                    sound: true,
                };
                let trigger = NotificationTrigger::OneShot {
                    delay_seconds: delay_seconds as u64,
                };
                match self.gateway.schedule(request, trigger) {
                    Ok(_) => scheduled += 1,
                    Err(e) => {
                        tracing::error!("failed to schedule period notifications: {e}");
                        return scheduled;
                    }
                }
            }
        }

        scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    fn make_med() -> Medication {
        let mut med = Medication::new(
            "Ibuprofen".into(),
            "200mg".into(),
            vec!["08:00".into(), "20:00".into()],
            "2024-01-01".into(),
            "3".into(),
        );
        med.reminder_enabled = true;
        med
    }

    fn setup() -> (Arc<MemoryGateway>, ReminderScheduler) {
        let gateway = Arc::new(MemoryGateway::new());
        let scheduler = ReminderScheduler::new(gateway.clone());
        (gateway, scheduler)
    }

    /// A gateway whose every call fails, for the logged-failure paths.
    struct FailingGateway;

    impl NotificationGateway for FailingGateway {
        fn configure(&self, _policy: AlertPolicy) -> ScheduleResult<()> {
            Err(ScheduleError::Backend("down".into()))
        }
        fn schedule(
            &self,
            _request: NotificationRequest,
            _trigger: NotificationTrigger,
        ) -> ScheduleResult<String> {
            Err(ScheduleError::Backend("down".into()))
        }
        fn scheduled(&self) -> ScheduleResult<Vec<ScheduledNotification>> {
            Err(ScheduleError::Backend("down".into()))
        }
        fn cancel(&self, _identifier: String) -> ScheduleResult<()> {
            Err(ScheduleError::Backend("down".into()))
        }
    }

    #[test]
    fn test_disabled_medication_schedules_nothing() {
        let (gateway, scheduler) = setup();
        let mut med = make_med();
        med.reminder_enabled = false;

        let ids = scheduler.schedule_medication_reminder(&med, dt("2024-01-01T07:00:00"));
        assert!(ids.is_empty());
        assert!(gateway.requests().is_empty());
    }

    #[test]
    fn test_both_slots_ahead_get_one_shot_and_daily() {
        let (gateway, scheduler) = setup();
        let ids = scheduler.schedule_medication_reminder(&make_med(), dt("2024-01-01T07:00:00"));

        // One recurring identifier per slot.
        assert_eq!(ids.len(), 2);

        let requests = gateway.requests();
        assert_eq!(requests.len(), 4);
        let one_shots: Vec<_> = requests
            .iter()
            .filter(|(_, _, t)| matches!(t, NotificationTrigger::OneShot { .. }))
            .collect();
        assert_eq!(one_shots.len(), 2);
        // 08:00 is an hour away.
        assert!(matches!(
            one_shots[0].2,
            NotificationTrigger::OneShot { delay_seconds: 3600 }
        ));

        let dailies: Vec<_> = requests
            .iter()
            .filter(|(_, _, t)| matches!(t, NotificationTrigger::Daily { .. }))
            .collect();
        assert_eq!(dailies.len(), 2);
        assert_eq!(
            dailies[1].2,
            NotificationTrigger::Daily { hour: 20, minute: 0 }
        );
    }

    #[test]
    fn test_passed_slot_skips_the_one_shot() {
        let (gateway, scheduler) = setup();
        // 12:00: the 08:00 slot is gone, 20:00 is still ahead.
        let ids = scheduler.schedule_medication_reminder(&make_med(), dt("2024-01-01T12:00:00"));

        assert_eq!(ids.len(), 2);
        let requests = gateway.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests
                .iter()
                .filter(|(_, _, t)| matches!(t, NotificationTrigger::OneShot { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_gateway_failure_returns_empty() {
        let scheduler = ReminderScheduler::new(Arc::new(FailingGateway));
        let ids = scheduler.schedule_medication_reminder(&make_med(), dt("2024-01-01T07:00:00"));
        assert!(ids.is_empty());
    }

    #[test]
    fn test_cancel_only_touches_matching_medication() {
        let (gateway, scheduler) = setup();
        let med_a = make_med();
        let mut med_b = make_med();
        med_b.id = "other-med".into();

        scheduler.schedule_medication_reminder(&med_a, dt("2024-01-01T07:00:00"));
        scheduler.schedule_medication_reminder(&med_b, dt("2024-01-01T07:00:00"));

        scheduler.cancel_medication_reminders(&med_a.id);

        let remaining = gateway.scheduled().unwrap();
        assert!(!remaining.is_empty());
        assert!(remaining
            .iter()
            .all(|n| n.data.medication_id.as_deref() != Some(med_a.id.as_str())));
        assert!(remaining
            .iter()
            .all(|n| n.data.medication_id.as_deref() == Some("other-med")));
    }

    #[test]
    fn test_update_replaces_instead_of_duplicating() {
        let (gateway, scheduler) = setup();
        let med = make_med();
        let now = dt("2024-01-01T07:00:00");

        scheduler.schedule_medication_reminder(&med, now);
        let before = gateway.scheduled().unwrap().len();

        scheduler.update_medication_reminders(&med, now);
        assert_eq!(gateway.scheduled().unwrap().len(), before);
    }

    #[test]
    fn test_refill_due_schedules_one_immediate() {
        let (gateway, scheduler) = setup();
        let mut med = make_med();
        med.refill_reminder = true;
        med.refill_at = 5;
        med.current_supply = 3;

        let id = scheduler.schedule_refill_reminder(&med);
        assert!(id.is_some());

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert!(matches!(requests[0].2, NotificationTrigger::Immediate));
        assert_eq!(requests[0].1.data.kind.as_deref(), Some("refill"));
        assert!(requests[0].1.body.contains("Current supply: 3"));
    }

    #[test]
    fn test_refill_not_due_schedules_none() {
        let (gateway, scheduler) = setup();
        let mut med = make_med();
        med.refill_reminder = true;
        med.refill_at = 5;
        med.current_supply = 6;

        assert!(scheduler.schedule_refill_reminder(&med).is_none());
        assert!(gateway.requests().is_empty());
    }

    #[test]
    fn test_period_notifications_all_future() {
        let (gateway, scheduler) = setup();
        let start = dt("2024-04-10T00:00:00");
        let now = dt("2024-04-01T00:00:00");

        let count = scheduler.schedule_period_notifications(start, now);
        // 1 warning + 5 days x 7 care slots.
        assert_eq!(count, 36);

        let requests = gateway.requests();
        assert_eq!(requests[0].1.title, "Period Reminder ⏰");
        // Day 0 and day 1 rotate through the message list.
        assert_eq!(requests[1].1.body, CARE_MESSAGES[0]);
        assert_eq!(requests[8].1.body, CARE_MESSAGES[1]);
    }

    #[test]
    fn test_period_notifications_skip_past_slots() {
        let (_gateway, scheduler) = setup();
        let start = dt("2024-04-10T00:00:00");
        // Mid-period, day 2 at noon: the warning and days 0-1 are gone, and
        // day 2's 09:00 and 11:00 slots have passed.
        let now = dt("2024-04-12T12:00:00");

        let count = scheduler.schedule_period_notifications(start, now);
        // Day 2: 13:00..21:00 (5 slots) + days 3 and 4 in full (7 each).
        assert_eq!(count, 19);
    }

    #[test]
    fn test_period_notifications_gateway_failure_stops() {
        let scheduler = ReminderScheduler::new(Arc::new(FailingGateway));
        let count =
            scheduler.schedule_period_notifications(dt("2024-04-10T00:00:00"), dt("2024-04-01T00:00:00"));
        assert_eq!(count, 0);
    }
}
