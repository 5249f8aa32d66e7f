//! Ports a trigger device uses to reach its host environment.
//!
//! The device never owns world entities. It queries the host for ray casts
//! and poses, asks it to spawn and remove entities, and requests effects.
//! The only resource it owns is the beam it creates, and it must release
//! that beam explicitly on every exit path.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use tripwire_core::enums::{DamageKind, SoundCue, TraceMask};
use tripwire_core::events::DeviceEvent;
use tripwire_core::types::{Angles, BeamHandle, EntityHandle, Pose};

/// Result of a line trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Entity at the end of the trace, if it hit one.
    pub entity: Option<EntityHandle>,
    /// Fraction of the segment travelled before the hit (1.0 = no hit).
    pub fraction: f64,
    /// The segment started inside something matching the mask.
    pub start_solid: bool,
    /// Point where the trace stopped.
    pub end_pos: DVec3,
    /// Surface normal at the hit (zero when nothing was hit).
    pub normal: DVec3,
}

impl TraceResult {
    /// A trace that travelled the whole segment.
    pub fn clear(to: DVec3) -> Self {
        Self {
            entity: None,
            fraction: 1.0,
            start_solid: false,
            end_pos: to,
            normal: DVec3::ZERO,
        }
    }

    pub fn did_hit(&self) -> bool {
        self.fraction < 1.0
    }
}

/// Visual description of a trigger beam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    pub start: DVec3,
    pub end: DVec3,
    pub color: [u8; 3],
    pub width: f64,
    pub scroll_rate: f64,
    pub brightness: u8,
    /// Never persisted by the host.
    pub temporary: bool,
}

/// Area damage requested when a device explodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blast {
    pub origin: DVec3,
    pub normal: DVec3,
    /// Surface the contact probe hit, if any.
    pub surface: Option<EntityHandle>,
    pub damage: f64,
    pub radius: f64,
    pub kind: DamageKind,
    /// Credited with anything the blast kills.
    pub attacker: Option<EntityHandle>,
    pub inflictor: EntityHandle,
}

/// A request to spawn a new device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub origin: DVec3,
    pub angles: Angles,
    pub owner: Option<EntityHandle>,
    pub spawn_fast: bool,
    /// The host must not respawn this device on round reset.
    pub no_respawn: bool,
}

/// A damage delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageInfo {
    pub amount: f64,
    pub attacker: Option<EntityHandle>,
    pub kind: DamageKind,
}

/// Ray casting against the world.
pub trait SpatialQuery {
    /// Trace the segment `from -> to`, skipping the entities in `ignore`.
    fn trace_line(
        &self,
        from: DVec3,
        to: DVec3,
        mask: TraceMask,
        ignore: &[EntityHandle],
    ) -> TraceResult;
}

/// Resolving weak entity references and classifying what they point at.
pub trait EntityLookup {
    /// Current pose, or `None` once the entity is gone.
    fn pose(&self, entity: EntityHandle) -> Option<Pose>;

    /// Damageable, full combat-capable character (not terrain or props).
    fn is_combat_character(&self, entity: EntityHandle) -> bool;

    /// Player-controlled agent.
    fn is_player(&self, entity: EntityHandle) -> bool;
}

/// Creating and destroying world entities.
pub trait EntityLifecycle {
    /// Spawn a new device. `None` if the host refused.
    fn spawn_device(&mut self, request: SpawnRequest) -> Option<EntityHandle>;

    /// Destroy `entity` after `delay` seconds. Its pending ticks are dropped.
    fn remove(&mut self, entity: EntityHandle, delay: f64);

    /// Toggle whether `entity` blocks traces and movement.
    fn set_solid(&mut self, entity: EntityHandle, solid: bool);
}

/// Fire-and-forget audio, visuals and explosions.
pub trait Effects {
    fn play_sound(&mut self, source: EntityHandle, cue: SoundCue);

    fn stop_sound(&mut self, source: EntityHandle, cue: SoundCue);

    fn create_beam(&mut self, owner: EntityHandle, spec: BeamSpec) -> BeamHandle;

    fn destroy_beam(&mut self, beam: BeamHandle);

    /// False once the beam was destroyed, by its owner or externally.
    fn beam_alive(&self, beam: BeamHandle) -> bool;

    fn explode(&mut self, blast: Blast);

    /// Observability hook. Hosts that do not log events can ignore it.
    fn report(&mut self, _event: DeviceEvent) {}
}

/// Everything a device needs from its host.
pub trait DeviceHost: SpatialQuery + EntityLookup + EntityLifecycle + Effects {}

impl<T: SpatialQuery + EntityLookup + EntityLifecycle + Effects> DeviceHost for T {}
