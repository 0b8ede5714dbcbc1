//! Domain models for the WellTrack engine.

mod dose;
mod medication;

pub use dose::*;
pub use medication::*;
