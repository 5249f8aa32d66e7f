//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a trigger device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceState {
    /// Counting down to live; resolving and watching the attachment surface.
    #[default]
    Arming,
    /// Beam active, checking for obstruction and tampering every tick.
    Watching,
    /// Killed; fuse burning until the detonation tick.
    Triggered,
    /// Explosion in progress.
    Detonating,
    /// Terminal. The host has been asked to destroy the entity.
    Removed,
}

impl DeviceState {
    /// Live devices have finished arming (or were killed after doing so).
    pub fn is_live(self) -> bool {
        matches!(
            self,
            DeviceState::Watching | DeviceState::Triggered | DeviceState::Detonating
        )
    }
}

/// Collision mask for spatial queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraceMask {
    /// Everything that blocks a shot, including thin hit volumes.
    Shot,
    /// Solid geometry and bodies only.
    Solid,
}

/// Audio cues a device requests from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Deploy,
    Charge,
    Activate,
}

/// Damage type carried by damage and explosion requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageKind {
    #[default]
    Generic,
    Bullet,
    Blast,
}

/// What happened to a damage request delivered to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Consumed by the device; nothing propagates.
    Absorbed,
    /// Handed to the generic damage pipeline.
    Forwarded,
}
