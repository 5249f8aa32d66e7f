//! Arena engine.
//!
//! `Arena` owns the hecs world, the device table, the beam registry and the
//! event log, and advances them at a fixed tick rate. Completely headless
//! and deterministic for a given seed.

use std::collections::BTreeMap;

use glam::DVec3;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tripwire_core::config::{ConfigError, DeviceConfig};
use tripwire_core::constants::TICK_RATE;
use tripwire_core::enums::{DamageKind, DamageOutcome};
use tripwire_core::types::{Angles, BeamHandle, EntityHandle, Pose, SimTime};
use tripwire_device::host::{DamageInfo, SpawnRequest};
use tripwire_device::TriggerDevice;

use crate::components::{Health, Static};
use crate::events::ArenaEvent;
use crate::host::{entity_of, handle_of, spawn_body, ArenaHost, BeamRegistry, HostQueue};
use crate::systems;
use crate::world_setup;

/// Configuration for a new arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same run.
    pub seed: u64,
    /// Ticks per second.
    pub tick_rate: u32,
    /// Tuning for every device spawned in the arena.
    pub device: DeviceConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: TICK_RATE,
            device: DeviceConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::NotPositive {
                field: "tick_rate",
                value: 0.0,
            });
        }
        self.device.validate()
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.tick_rate)
    }
}

/// Headless host for trigger devices.
pub struct Arena {
    world: World,
    devices: BTreeMap<EntityHandle, TriggerDevice>,
    beams: BeamRegistry,
    queue: HostQueue,
    events: Vec<ArenaEvent>,
    config: SimConfig,
    time: SimTime,
    rng: ChaCha8Rng,
}

/// Build an [`ArenaHost`] over the arena's fields, leaving `devices` and
/// `rng` free for the caller.
macro_rules! host {
    ($arena:expr) => {
        ArenaHost {
            world: &mut $arena.world,
            beams: &mut $arena.beams,
            queue: &mut $arena.queue,
            log: &mut $arena.events,
            config: &$arena.config.device,
            now: $arena.time.elapsed_secs,
        }
    };
}

impl Arena {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world: World::new(),
            devices: BTreeMap::new(),
            beams: BeamRegistry::default(),
            queue: HostQueue::default(),
            events: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            time: SimTime::default(),
        })
    }

    // --- Time ---

    /// Advance one tick.
    pub fn tick(&mut self) {
        self.time.advance(self.config.dt());

        // 1. Due removals
        systems::cleanup::run(&mut self.devices, &mut host!(self));
        // 2. Device thinks, in handle order
        systems::think::run(&mut self.devices, &mut host!(self), &mut self.rng);
        // 3. Replacement devices requested during thinks
        systems::spawner::run(&mut self.devices, &mut host!(self));
        // 4. Explosions
        systems::damage::run(&mut self.devices, &mut host!(self), &mut self.rng);
    }

    /// Run for `secs` of sim time, rounded to whole ticks.
    pub fn run_for(&mut self, secs: f64) {
        let ticks = (secs * f64::from(self.config.tick_rate)).round().max(0.0) as u64;
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Current sim time in seconds.
    pub fn now(&self) -> f64 {
        self.time.elapsed_secs
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // --- World building ---

    pub fn spawn_static_box(&mut self, center: DVec3, half_extents: DVec3) -> EntityHandle {
        handle_of(world_setup::spawn_static_box(&mut self.world, center, half_extents))
    }

    pub fn spawn_surface(&mut self, center: DVec3, half_extents: DVec3) -> EntityHandle {
        handle_of(world_setup::spawn_surface(&mut self.world, center, half_extents))
    }

    pub fn spawn_hit_volume(&mut self, center: DVec3, half_extents: DVec3) -> EntityHandle {
        handle_of(world_setup::spawn_hit_volume(&mut self.world, center, half_extents))
    }

    pub fn spawn_agent(&mut self, position: DVec3, player: bool, combat: bool) -> EntityHandle {
        handle_of(world_setup::spawn_agent(&mut self.world, position, player, combat))
    }

    /// Move an entity. Static geometry and unknown entities are refused.
    pub fn set_pose(&mut self, entity: EntityHandle, pose: Pose) -> bool {
        let Some(entity) = entity_of(entity) else {
            return false;
        };
        if self.world.get::<&Static>(entity).is_ok() {
            return false;
        }
        match self.world.get::<&mut Pose>(entity) {
            Ok(mut current) => {
                *current = pose;
                true
            }
            Err(_) => false,
        }
    }

    /// Move an entity to `position`, keeping its orientation.
    pub fn move_to(&mut self, entity: EntityHandle, position: DVec3) -> bool {
        let Some(angles) = self.pose(entity).map(|pose| pose.angles) else {
            return false;
        };
        self.set_pose(entity, Pose::new(position, angles))
    }

    /// Destroy an entity immediately.
    pub fn despawn(&mut self, entity: EntityHandle) -> bool {
        let despawned = entity_of(entity).is_some_and(|e| self.world.despawn(e).is_ok());
        if self.devices.remove(&entity).is_some() {
            self.beams.destroy_owned_by(entity);
        }
        if despawned {
            self.events.push(ArenaEvent::EntityRemoved {
                time: self.now(),
                entity,
            });
        }
        despawned
    }

    pub fn pose(&self, entity: EntityHandle) -> Option<Pose> {
        let entity = entity_of(entity)?;
        self.world.get::<&Pose>(entity).ok().map(|pose| *pose)
    }

    pub fn health(&self, entity: EntityHandle) -> Option<f64> {
        let entity = entity_of(entity)?;
        self.world.get::<&Health>(entity).ok().map(|h| h.current)
    }

    // --- Devices ---

    /// Place a device on behalf of `deployer`, as the placeable weapon does.
    pub fn deploy(&mut self, deployer: EntityHandle, origin: DVec3, angles: Angles) -> EntityHandle {
        let now = self.now();
        let request = SpawnRequest {
            origin,
            angles,
            owner: Some(deployer),
            spawn_fast: false,
            no_respawn: false,
        };
        let handle = spawn_body(&mut self.world, &request);
        let config = &self.config.device;
        let device =
            TriggerDevice::create(handle, deployer, origin, angles, now, config, &mut host!(self));
        self.devices.insert(handle, device);
        handle
    }

    /// Spawn a device from a raw request (level placement, replacements).
    pub fn spawn_device(&mut self, request: SpawnRequest) -> EntityHandle {
        let now = self.now();
        let handle = spawn_body(&mut self.world, &request);
        let config = &self.config.device;
        let device = TriggerDevice::spawn(handle, request, now, config, &mut host!(self));
        self.devices.insert(handle, device);
        handle
    }

    /// Deliver damage to an entity now. Devices run their damage pipeline,
    /// agents lose health. Returns the device outcome, if a device was hit.
    pub fn damage(
        &mut self,
        target: EntityHandle,
        amount: f64,
        attacker: Option<EntityHandle>,
    ) -> Option<DamageOutcome> {
        let now = self.now();
        if let Some(device) = self.devices.get_mut(&target) {
            let info = DamageInfo {
                amount,
                attacker,
                kind: DamageKind::Generic,
            };
            let outcome = device.take_damage(info, now, &mut host!(self), &mut self.rng);
            debug!(device = ?target, amount, outcome = ?outcome, "device damaged");
            return Some(outcome);
        }
        systems::damage::damage_agent(&mut host!(self), target, amount, attacker);
        None
    }

    /// Destroy a beam from outside its device.
    pub fn destroy_beam(&mut self, beam: BeamHandle) -> bool {
        self.beams.destroy(beam)
    }

    pub fn device(&self, handle: EntityHandle) -> Option<&TriggerDevice> {
        self.devices.get(&handle)
    }

    /// Devices still in the arena, in handle order.
    pub fn devices(&self) -> impl Iterator<Item = &TriggerDevice> {
        self.devices.values()
    }

    pub fn live_beams(&self) -> &BeamRegistry {
        &self.beams
    }

    // --- Output ---

    pub fn events(&self) -> &[ArenaEvent] {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only access to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }
}
