//! Notification gateway contract.
//!
//! Delivery is owned by the host platform. The engine only builds trigger
//! requests, scans what is currently scheduled, and cancels by identifier.

use std::sync::Mutex;

use thiserror::Error;

/// Scheduling errors, raised by the platform gateway.
#[derive(Debug, Error, uniffi::Error)]
pub enum ScheduleError {
    #[error("Scheduler backend error: {0}")]
    Backend(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

impl<T> From<std::sync::PoisonError<T>> for ScheduleError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ScheduleError::Backend(format!("Lock poisoned: {}", e))
    }
}

/// Payload attached to a notification, used for later lookup and cancellation.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct NotificationData {
    /// Owning medication, when the notification belongs to one
    #[uniffi(default = None)]
    pub medication_id: Option<String>,
    /// Discriminator tag (e.g., "refill")
    #[uniffi(default = None)]
    pub kind: Option<String>,
}

/// User-visible content of a notification.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub data: NotificationData,
    pub sound: bool,
}

/// When a notification should fire.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum NotificationTrigger {
    /// Fire once after a delay
    OneShot { delay_seconds: u64 },
    /// Fire every day at the given local time
    Daily { hour: u32, minute: u32 },
    /// Fire immediately
    Immediate,
}

/// A currently scheduled notification, as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ScheduledNotification {
    pub identifier: String,
    pub data: NotificationData,
}

/// Process-wide presentation policy for delivered notifications.
///
/// Replaces the app's implicit load-time notification handler: the host
/// applies it when asked and re-applying the same policy is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct AlertPolicy {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: true,
        }
    }
}

/// Platform notification scheduler, implemented by the host app.
#[uniffi::export(with_foreign)]
pub trait NotificationGateway: Send + Sync {
    /// Apply the presentation policy. Must be idempotent.
    fn configure(&self, policy: AlertPolicy) -> Result<(), ScheduleError>;

    /// Schedule a notification, returning its opaque identifier.
    fn schedule(
        &self,
        request: NotificationRequest,
        trigger: NotificationTrigger,
    ) -> Result<String, ScheduleError>;

    /// Enumerate all currently scheduled notifications.
    fn scheduled(&self) -> Result<Vec<ScheduledNotification>, ScheduleError>;

    /// Cancel one scheduled notification by identifier.
    fn cancel(&self, identifier: String) -> Result<(), ScheduleError>;
}

/// Recording gateway backed by a map (for testing).
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryGatewayState>,
}

#[derive(Default)]
struct MemoryGatewayState {
    next_id: u64,
    policy: Option<AlertPolicy>,
    entries: Vec<(String, NotificationRequest, NotificationTrigger)>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded request with its trigger, in order.
    pub fn requests(&self) -> Vec<(String, NotificationRequest, NotificationTrigger)> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .clone()
    }

    /// The policy last applied through `configure`, if any.
    pub fn policy(&self) -> Option<AlertPolicy> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .policy
            .clone()
    }
}

impl NotificationGateway for MemoryGateway {
    fn configure(&self, policy: AlertPolicy) -> ScheduleResult<()> {
        let mut state = self.state.lock()?;
        state.policy = Some(policy);
        Ok(())
    }

    fn schedule(
        &self,
        request: NotificationRequest,
        trigger: NotificationTrigger,
    ) -> ScheduleResult<String> {
        let mut state = self.state.lock()?;
        state.next_id += 1;
        let identifier = format!("notif-{}", state.next_id);
        state.entries.push((identifier.clone(), request, trigger));
        Ok(identifier)
    }

    fn scheduled(&self) -> ScheduleResult<Vec<ScheduledNotification>> {
        let state = self.state.lock()?;
        Ok(state
            .entries
            .iter()
            .map(|(identifier, request, _)| ScheduledNotification {
                identifier: identifier.clone(),
                data: request.data.clone(),
            })
            .collect())
    }

    fn cancel(&self, identifier: String) -> ScheduleResult<()> {
        let mut state = self.state.lock()?;
        state.entries.retain(|(id, _, _)| *id != identifier);
        Ok(())
    }
}
