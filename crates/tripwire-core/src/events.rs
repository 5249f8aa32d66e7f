//! Events reported by devices to their host for logging and UI feedback.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::types::{BeamHandle, EntityHandle};

/// Externally visible device transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeviceEvent {
    /// Device created and arming.
    Spawned {
        device: EntityHandle,
        owner: Option<EntityHandle>,
        arm_time: f64,
    },
    /// Arming pushed back because the beam path or probe was occluded.
    ArmingDelayed { device: EntityHandle, arm_time: f64 },
    /// Attachment surface resolved.
    Attached {
        device: EntityHandle,
        surface: EntityHandle,
    },
    /// Arming complete; beam projected.
    Armed { device: EntityHandle, coverage: f64 },
    BeamCreated {
        device: EntityHandle,
        beam: BeamHandle,
        end: DVec3,
    },
    BeamDestroyed {
        device: EntityHandle,
        beam: BeamHandle,
    },
    /// Beam broken, shortened, or surface tampered with while live.
    Tripped {
        device: EntityHandle,
        culprit: Option<EntityHandle>,
    },
    /// Sub-lethal hit while arming disabled the device.
    Defused { device: EntityHandle },
    /// Kill notification received; fuse started.
    Killed {
        device: EntityHandle,
        attacker: Option<EntityHandle>,
        /// Amount of the killing blow.
        damage: f64,
        detonate_at: f64,
    },
    /// Explosion requested from the host.
    Detonated {
        device: EntityHandle,
        origin: DVec3,
        attacker: Option<EntityHandle>,
    },
    /// Surface moved while arming; a replacement device was requested.
    Replaced {
        device: EntityHandle,
        replacement: Option<EntityHandle>,
    },
    /// Device asked the host to destroy it.
    Removed { device: EntityHandle },
}

impl DeviceEvent {
    /// The device this event concerns.
    pub fn device(&self) -> EntityHandle {
        match self {
            DeviceEvent::Spawned { device, .. }
            | DeviceEvent::ArmingDelayed { device, .. }
            | DeviceEvent::Attached { device, .. }
            | DeviceEvent::Armed { device, .. }
            | DeviceEvent::BeamCreated { device, .. }
            | DeviceEvent::BeamDestroyed { device, .. }
            | DeviceEvent::Tripped { device, .. }
            | DeviceEvent::Defused { device }
            | DeviceEvent::Killed { device, .. }
            | DeviceEvent::Detonated { device, .. }
            | DeviceEvent::Replaced { device, .. }
            | DeviceEvent::Removed { device } => *device,
        }
    }
}
