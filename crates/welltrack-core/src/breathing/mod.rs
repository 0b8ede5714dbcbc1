//! Breathing exercise session.
//!
//! The guided-breathing screen drives this state machine with wall-clock
//! deltas, so the phase cycle and the session countdown stay correct under
//! timer callback jitter. Rendering and audio stay on the host side.

use std::sync::{Arc, Mutex};

/// One step of the breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

impl std::fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BreathPhase::Inhale => "Inhale",
            BreathPhase::Hold => "Hold",
            BreathPhase::Exhale => "Exhale",
        };
        f.write_str(name)
    }
}

/// The fixed phase cycle: inhale, hold, exhale, hold.
const PHASES: [(BreathPhase, u64); 4] = [
    (BreathPhase::Inhale, 4000),
    (BreathPhase::Hold, 2000),
    (BreathPhase::Exhale, 4000),
    (BreathPhase::Hold, 2000),
];

/// Total session length in milliseconds.
pub const SESSION_DURATION_MS: u64 = 60 * 1000;

/// A pausable one-minute breathing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreathingSession {
    phase_index: usize,
    phase_elapsed_ms: u64,
    remaining_ms: u64,
    running: bool,
    complete: bool,
}

impl Default for BreathingSession {
    fn default() -> Self {
        Self {
            phase_index: 0,
            phase_elapsed_ms: 0,
            remaining_ms: SESSION_DURATION_MS,
            running: false,
            complete: false,
        }
    }
}

impl BreathingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip between running and paused. Completed sessions stay put until
    /// reset, matching the screen's "please reset" alert.
    pub fn toggle(&mut self) {
        if !self.complete {
            self.running = !self.running;
        }
    }

    /// Back to the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance by elapsed wall-clock milliseconds.
    ///
    /// Large deltas roll through as many phases as they cover. No-op while
    /// paused or after completion.
    pub fn advance(&mut self, delta_ms: u64) {
        if !self.running || self.complete {
            return;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(delta_ms);
        if self.remaining_ms == 0 {
            self.complete = true;
            self.running = false;
            return;
        }

        self.phase_elapsed_ms += delta_ms;
        while self.phase_elapsed_ms >= PHASES[self.phase_index].1 {
            self.phase_elapsed_ms -= PHASES[self.phase_index].1;
            self.phase_index = (self.phase_index + 1) % PHASES.len();
        }
    }

    pub fn phase(&self) -> BreathPhase {
        PHASES[self.phase_index].0
    }

    /// Remaining session time in whole seconds, rounded up.
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Point-in-time view of a session, for the FFI boundary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct BreathingSnapshot {
    pub phase: String,
    pub remaining_seconds: u64,
    pub running: bool,
    pub complete: bool,
}

/// FFI wrapper driving one [`BreathingSession`].
#[derive(uniffi::Object)]
pub struct BreathingTimer {
    inner: Mutex<BreathingSession>,
}

#[uniffi::export]
impl BreathingTimer {
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(BreathingSession::new()),
        })
    }

    pub fn toggle(&self) {
        self.lock().toggle();
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn advance(&self, delta_ms: u64) {
        self.lock().advance(delta_ms);
    }

    pub fn snapshot(&self) -> BreathingSnapshot {
        let session = self.lock();
        BreathingSnapshot {
            phase: session.phase().to_string(),
            remaining_seconds: session.remaining_seconds(),
            running: session.is_running(),
            complete: session.is_complete(),
        }
    }
}

impl BreathingTimer {
    fn lock(&self) -> std::sync::MutexGuard<'_, BreathingSession> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
