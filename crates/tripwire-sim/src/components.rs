//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems and in the device crate, not here.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Which trace masks see a collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColliderKind {
    /// World geometry, props and bodies. Seen by every mask.
    Solid,
    /// Thin hit volume. Blocks shots but not solid-only traces.
    HitVolume,
}

/// Axis-aligned box centered on the entity's pose position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub half_extents: DVec3,
    pub kind: ColliderKind,
}

/// A character in the world.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Agent {
    /// Player-controlled (earns kill credit).
    pub player: bool,
    /// Full combat-capable character (trips beams).
    pub combat: bool,
}

/// Hit points of a damageable agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

/// Marks the physical entity of a trigger device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviceBody;

/// Marks an entity the host must not respawn on reset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoRespawn;

/// Marks immovable world geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Static;
