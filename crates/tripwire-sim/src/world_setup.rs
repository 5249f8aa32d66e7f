//! Entity spawn factories for building an arena.
//!
//! Each factory spawns one entity with the component bundle its role needs.

use glam::DVec3;
use hecs::{Entity, World};

use tripwire_core::types::Pose;

use crate::components::{Agent, Collider, ColliderKind, Health, Static};

/// Half-size of an agent's bounding box.
pub const AGENT_HALF_EXTENTS: DVec3 = DVec3::new(16.0, 16.0, 36.0);

/// Hit points agents spawn with.
pub const AGENT_HEALTH: f64 = 100.0;

/// Immovable world geometry.
pub fn spawn_static_box(world: &mut World, center: DVec3, half_extents: DVec3) -> Entity {
    world.spawn((
        Pose::at(center),
        Collider {
            half_extents,
            kind: ColliderKind::Solid,
        },
        Static,
    ))
}

/// Solid prop that can be moved or destroyed (doors, crates).
pub fn spawn_surface(world: &mut World, center: DVec3, half_extents: DVec3) -> Entity {
    world.spawn((
        Pose::at(center),
        Collider {
            half_extents,
            kind: ColliderKind::Solid,
        },
    ))
}

/// Thin volume that stops shots but is invisible to solid-only traces.
pub fn spawn_hit_volume(world: &mut World, center: DVec3, half_extents: DVec3) -> Entity {
    world.spawn((
        Pose::at(center),
        Collider {
            half_extents,
            kind: ColliderKind::HitVolume,
        },
    ))
}

/// A character with a solid body and full health.
pub fn spawn_agent(world: &mut World, position: DVec3, player: bool, combat: bool) -> Entity {
    world.spawn((
        Pose::at(position),
        Collider {
            half_extents: AGENT_HALF_EXTENTS,
            kind: ColliderKind::Solid,
        },
        Agent { player, combat },
        Health {
            current: AGENT_HEALTH,
            max: AGENT_HEALTH,
        },
    ))
}
