//! Per-tick systems run by the arena engine.
//!
//! Systems are plain functions over the device table and an [`ArenaHost`]
//! view of the rest of the arena. They hold no state of their own.
//!
//! [`ArenaHost`]: crate::host::ArenaHost

pub mod cleanup;
pub mod damage;
pub mod spawner;
pub mod think;

/// Slack when comparing scheduled times against tick times.
pub(crate) const SCHEDULE_EPSILON: f64 = 1e-9;
