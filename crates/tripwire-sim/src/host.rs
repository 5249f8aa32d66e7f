//! The arena's implementation of the device host ports.
//!
//! `ArenaHost` is a short-lived view over the engine's state, built for each
//! device call. Requests that cannot be served mid-call (new devices,
//! removals, explosions) are queued and drained by the engine after the call.

use std::collections::BTreeMap;

use glam::DVec3;
use hecs::{Entity, World};

use tripwire_core::config::DeviceConfig;
use tripwire_core::enums::{SoundCue, TraceMask};
use tripwire_core::events::DeviceEvent;
use tripwire_core::types::{BeamHandle, EntityHandle, Pose};
use tripwire_device::host::{
    BeamSpec, Blast, Effects, EntityLifecycle, EntityLookup, SpatialQuery, SpawnRequest,
    TraceResult,
};

use crate::components::{Agent, Collider, ColliderKind, DeviceBody, Health, NoRespawn};
use crate::events::ArenaEvent;
use crate::trace;

/// Device handle for an hecs entity.
pub fn handle_of(entity: Entity) -> EntityHandle {
    EntityHandle(entity.to_bits().get())
}

/// hecs entity for a device handle, if the bits are well formed.
pub fn entity_of(handle: EntityHandle) -> Option<Entity> {
    Entity::from_bits(handle.0)
}

/// Spawn the physical body of a device. The device itself is built by the caller.
pub fn spawn_body(world: &mut World, request: &SpawnRequest) -> EntityHandle {
    let pose = Pose::new(request.origin, request.angles);
    let entity = if request.no_respawn {
        world.spawn((pose, DeviceBody, NoRespawn))
    } else {
        world.spawn((pose, DeviceBody))
    };
    handle_of(entity)
}

/// Live trigger beams, keyed by handle.
#[derive(Debug, Default)]
pub struct BeamRegistry {
    beams: BTreeMap<BeamHandle, (EntityHandle, BeamSpec)>,
    next: u64,
}

impl BeamRegistry {
    pub fn create(&mut self, owner: EntityHandle, spec: BeamSpec) -> BeamHandle {
        self.next += 1;
        let handle = BeamHandle(self.next);
        self.beams.insert(handle, (owner, spec));
        handle
    }

    pub fn destroy(&mut self, beam: BeamHandle) -> bool {
        self.beams.remove(&beam).is_some()
    }

    /// Drop every beam owned by `owner`. Returns how many were dropped.
    pub fn destroy_owned_by(&mut self, owner: EntityHandle) -> usize {
        let before = self.beams.len();
        self.beams.retain(|_, (o, _)| *o != owner);
        before - self.beams.len()
    }

    pub fn contains(&self, beam: BeamHandle) -> bool {
        self.beams.contains_key(&beam)
    }

    pub fn len(&self) -> usize {
        self.beams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BeamHandle, EntityHandle, &BeamSpec)> {
        self.beams
            .iter()
            .map(|(handle, (owner, spec))| (*handle, *owner, spec))
    }
}

/// Requests queued by devices during a call.
#[derive(Debug, Default)]
pub struct HostQueue {
    /// Device bodies already in the world, waiting for their device.
    pub spawns: Vec<(EntityHandle, SpawnRequest)>,
    /// (due time, entity)
    pub removals: Vec<(f64, EntityHandle)>,
    pub blasts: Vec<Blast>,
}

/// Borrowed view of the arena handed to devices.
pub struct ArenaHost<'a> {
    pub world: &'a mut World,
    pub beams: &'a mut BeamRegistry,
    pub queue: &'a mut HostQueue,
    pub log: &'a mut Vec<ArenaEvent>,
    pub config: &'a DeviceConfig,
    pub now: f64,
}

impl SpatialQuery for ArenaHost<'_> {
    fn trace_line(
        &self,
        from: DVec3,
        to: DVec3,
        mask: TraceMask,
        ignore: &[EntityHandle],
    ) -> TraceResult {
        trace::trace_line(&*self.world, from, to, mask, ignore)
    }
}

impl EntityLookup for ArenaHost<'_> {
    fn pose(&self, entity: EntityHandle) -> Option<Pose> {
        let entity = entity_of(entity)?;
        self.world.get::<&Pose>(entity).ok().map(|pose| *pose)
    }

    fn is_combat_character(&self, entity: EntityHandle) -> bool {
        let Some(entity) = entity_of(entity) else {
            return false;
        };
        let combat = self
            .world
            .get::<&Agent>(entity)
            .is_ok_and(|agent| agent.combat);
        let alive = self
            .world
            .get::<&Health>(entity)
            .is_ok_and(|health| health.current > 0.0);
        combat && alive
    }

    fn is_player(&self, entity: EntityHandle) -> bool {
        entity_of(entity).is_some_and(|entity| {
            self.world
                .get::<&Agent>(entity)
                .is_ok_and(|agent| agent.player)
        })
    }
}

impl EntityLifecycle for ArenaHost<'_> {
    fn spawn_device(&mut self, request: SpawnRequest) -> Option<EntityHandle> {
        let handle = spawn_body(self.world, &request);
        self.queue.spawns.push((handle, request));
        Some(handle)
    }

    fn remove(&mut self, entity: EntityHandle, delay: f64) {
        self.queue.removals.push((self.now + delay, entity));
    }

    fn set_solid(&mut self, entity: EntityHandle, solid: bool) {
        let Some(entity) = entity_of(entity) else {
            return;
        };
        if solid {
            let collider = Collider {
                half_extents: DVec3::splat(self.config.half_extent),
                kind: ColliderKind::Solid,
            };
            // The body may already be gone; nothing to make solid then.
            let _ = self.world.insert_one(entity, collider);
        } else {
            let _ = self.world.remove_one::<Collider>(entity);
        }
    }
}

impl Effects for ArenaHost<'_> {
    fn play_sound(&mut self, source: EntityHandle, cue: SoundCue) {
        self.log.push(ArenaEvent::SoundStarted {
            time: self.now,
            source,
            cue,
        });
    }

    fn stop_sound(&mut self, source: EntityHandle, cue: SoundCue) {
        self.log.push(ArenaEvent::SoundStopped {
            time: self.now,
            source,
            cue,
        });
    }

    fn create_beam(&mut self, owner: EntityHandle, spec: BeamSpec) -> BeamHandle {
        self.beams.create(owner, spec)
    }

    fn destroy_beam(&mut self, beam: BeamHandle) {
        self.beams.destroy(beam);
    }

    fn beam_alive(&self, beam: BeamHandle) -> bool {
        self.beams.contains(beam)
    }

    fn explode(&mut self, blast: Blast) {
        self.queue.blasts.push(blast);
    }

    fn report(&mut self, event: DeviceEvent) {
        self.log.push(ArenaEvent::Device {
            time: self.now,
            event,
        });
    }
}
