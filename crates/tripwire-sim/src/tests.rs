//! Arena scenarios: devices driven end to end through the reference host.

use glam::DVec3;

use tripwire_core::config::{ConfigError, DeviceConfig};
use tripwire_core::enums::{DamageOutcome, DeviceState};
use tripwire_core::events::DeviceEvent;
use tripwire_core::types::{Angles, EntityHandle, Pose};
use tripwire_device::host::SpawnRequest;

use crate::engine::{Arena, SimConfig};
use crate::events::ArenaEvent;

const WALL_HALF: DVec3 = DVec3::new(8.0, 256.0, 256.0);
const FAR_WALL_X: f64 = 1000.0;

/// A wall whose face sits on the x = 0 plane, a far wall at x = 1000 and a
/// deploying player standing well clear of both.
struct Room {
    arena: Arena,
    wall: EntityHandle,
    owner: EntityHandle,
}

fn room_with(config: SimConfig, movable_wall: bool) -> Room {
    let mut arena = Arena::new(config).unwrap();
    let wall_center = DVec3::new(-WALL_HALF.x, 0.0, 0.0);
    let wall = if movable_wall {
        arena.spawn_surface(wall_center, WALL_HALF)
    } else {
        arena.spawn_static_box(wall_center, WALL_HALF)
    };
    arena.spawn_static_box(DVec3::new(FAR_WALL_X + 8.0, 0.0, 0.0), DVec3::new(8.0, 512.0, 512.0));
    let owner = arena.spawn_agent(DVec3::new(200.0, 400.0, 0.0), true, true);
    Room { arena, wall, owner }
}

fn room() -> Room {
    room_with(SimConfig::default(), false)
}

impl Room {
    fn deploy_at(&mut self, origin: DVec3) -> EntityHandle {
        self.arena.deploy(self.owner, origin, Angles::default())
    }

    fn count(&self, pred: impl Fn(&DeviceEvent) -> bool) -> usize {
        self.arena
            .events()
            .iter()
            .filter_map(ArenaEvent::device_event)
            .filter(|event| pred(*event))
            .count()
    }

    fn state(&self, device: EntityHandle) -> Option<DeviceState> {
        self.arena.device(device).map(|d| d.state())
    }
}

fn explosions(arena: &Arena) -> Vec<DVec3> {
    arena
        .events()
        .iter()
        .filter_map(|event| match event {
            ArenaEvent::Explosion { origin, .. } => Some(*origin),
            _ => None,
        })
        .collect()
}

// ---- Configuration ----

#[test]
fn test_arena_rejects_zero_tick_rate() {
    let result = Arena::new(SimConfig {
        tick_rate: 0,
        ..Default::default()
    });
    assert!(matches!(
        result,
        Err(ConfigError::NotPositive {
            field: "tick_rate",
            ..
        })
    ));
}

#[test]
fn test_arena_rejects_invalid_device_config() {
    let result = Arena::new(SimConfig {
        device: DeviceConfig {
            fuse_min_secs: 1.0,
            fuse_max_secs: 0.5,
            ..Default::default()
        },
        ..Default::default()
    });
    assert!(matches!(result, Err(ConfigError::FuseRange { .. })));
}

#[test]
fn test_arena_rejects_non_finite_fuse() {
    for fuse_max_secs in [f64::NAN, f64::INFINITY] {
        let result = Arena::new(SimConfig {
            device: DeviceConfig {
                fuse_max_secs,
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(ConfigError::NotFinite {
                field: "fuse_max_secs",
                ..
            })
        ));
    }
}

#[test]
fn test_static_geometry_cannot_move() {
    let mut room = room();
    let wall = room.wall;
    assert!(!room.arena.set_pose(wall, Pose::at(DVec3::new(-20.0, 0.0, 0.0))));
    let owner = room.owner;
    assert!(room.arena.move_to(owner, DVec3::new(250.0, 400.0, 0.0)));
}

// ---- Arming ----

#[test]
fn test_device_arms_and_projects_one_beam() {
    let mut room = room();
    let device = room.deploy_at(DVec3::ZERO);

    room.arena.run_for(2.0);
    assert_eq!(room.state(device), Some(DeviceState::Arming));
    assert_eq!(room.arena.live_beams().len(), 0, "no beam before arming");

    room.arena.run_for(1.0);
    assert_eq!(room.state(device), Some(DeviceState::Watching));
    assert_eq!(room.arena.live_beams().len(), 1);
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Armed { .. })), 1);

    let d = room.arena.device(device).unwrap();
    assert_eq!(d.attachment(), Some(room.wall));
    assert!(d.is_solid());
    let coverage = d.beam_coverage().unwrap();
    let expected = FAR_WALL_X / d.config().max_range;
    assert!((coverage - expected).abs() < 1e-9, "beam should reach the far wall");
}

#[test]
fn test_quiet_beam_never_trips() {
    let mut room = room();
    let device = room.deploy_at(DVec3::ZERO);
    room.arena.run_for(10.0);

    assert_eq!(room.state(device), Some(DeviceState::Watching));
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Tripped { .. })), 0);
    assert!(explosions(&room.arena).is_empty());
}

#[test]
fn test_owner_in_front_delays_arming() {
    let mut room = room();
    let owner = room.owner;
    room.arena.move_to(owner, DVec3::new(10.0, 0.0, 0.0));
    let device = room.deploy_at(DVec3::ZERO);

    room.arena.run_for(3.0);
    assert_eq!(room.state(device), Some(DeviceState::Arming));
    assert!(room.count(|e| matches!(e, DeviceEvent::ArmingDelayed { .. })) > 0);

    room.arena.move_to(owner, DVec3::new(200.0, 400.0, 0.0));
    room.arena.run_for(4.0);
    assert_eq!(room.state(device), Some(DeviceState::Watching));
}

#[test]
fn test_deploy_in_open_air_removes_device() {
    let mut arena = Arena::new(SimConfig::default()).unwrap();
    let owner = arena.spawn_agent(DVec3::new(0.0, 400.0, 0.0), true, true);
    let device = arena.deploy(owner, DVec3::ZERO, Angles::default());

    arena.run_for(0.5);
    assert!(arena.device(device).is_none(), "device should be gone");
    assert!(arena.live_beams().is_empty());
    assert!(arena
        .events()
        .iter()
        .any(|e| matches!(e, ArenaEvent::EntityRemoved { entity, .. } if *entity == device)));
    assert!(explosions(&arena).is_empty());
}

#[test]
fn test_fast_spawn_without_owner_arms_early_and_silently() {
    let mut room = room();
    let device = room.arena.spawn_device(SpawnRequest {
        origin: DVec3::ZERO,
        angles: Angles::default(),
        owner: None,
        spawn_fast: true,
        no_respawn: false,
    });

    room.arena.run_for(1.5);
    assert_eq!(room.state(device), Some(DeviceState::Watching));
    let sounds = room
        .arena
        .events()
        .iter()
        .filter(|e| matches!(e, ArenaEvent::SoundStarted { source, .. } if *source == device))
        .count();
    assert_eq!(sounds, 1, "only the activation cue plays");
}

#[test]
fn test_surface_moved_while_arming_redeploys() {
    let mut room = room_with(SimConfig::default(), true);
    let wall = room.wall;
    let device = room.deploy_at(DVec3::ZERO);

    room.arena.run_for(1.0);
    room.arena.move_to(wall, DVec3::new(-WALL_HALF.x - 1.0, 0.0, 0.0));
    room.arena.run_for(0.5);

    assert!(room.arena.device(device).is_none(), "the displaced device is removed");
    let replacement = room
        .arena
        .events()
        .iter()
        .filter_map(ArenaEvent::device_event)
        .find_map(|e| match e {
            DeviceEvent::Replaced { replacement, .. } => *replacement,
            _ => None,
        })
        .expect("a replacement was requested");

    let r = room.arena.device(replacement).unwrap();
    assert_eq!(r.real_owner(), None);
    assert!(r.no_respawn());
    assert_eq!(r.position(), DVec3::new(24.0, 0.0, 0.0));

    room.arena.run_for(3.0);
    assert_eq!(room.state(replacement), Some(DeviceState::Watching));
}

// ---- Tripping ----

#[test]
fn test_agent_walking_into_beam_detonates_device() {
    let mut room = room();
    let device = room.deploy_at(DVec3::ZERO);
    room.arena.run_for(4.0);

    let intruder = room.arena.spawn_agent(DVec3::new(300.0, 0.0, 0.0), false, true);
    room.arena.run_for(1.0);

    assert!(room.arena.device(device).is_none());
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Tripped { .. })), 1);
    let owner = room.owner;
    assert_eq!(
        room.count(|e| matches!(e, DeviceEvent::Killed { attacker, damage, .. }
            if *attacker == Some(owner) && *damage == 100.0)),
        1,
        "trip kills with the deployer's trip damage"
    );
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Detonated { .. })), 1);
    let blasts = explosions(&room.arena);
    assert_eq!(blasts.len(), 1);
    assert!(
        blasts[0].distance(DVec3::new(0.6, 0.0, 0.0)) < 1e-9,
        "blast pulled off the wall, got {:?}",
        blasts[0]
    );
    assert!(room.arena.live_beams().is_empty());

    let health = room.arena.health(intruder).unwrap();
    let expected = 100.0 - 150.0 * (1.0 - 299.4 / 375.0);
    assert!((health - expected).abs() < 1e-6, "health {health}, expected {expected}");
    let credited = room.arena.events().iter().any(|e| {
        matches!(e, ArenaEvent::AgentDamaged { agent, attacker, .. }
            if *agent == intruder && *attacker == Some(room.owner))
    });
    assert!(credited, "damage is credited to the deployer");
}

#[test]
fn test_hit_volume_across_live_beam_does_not_trip() {
    let mut room = room();
    let device = room.deploy_at(DVec3::ZERO);
    room.arena.run_for(4.0);

    room.arena
        .spawn_hit_volume(DVec3::new(500.0, 0.0, 0.0), DVec3::new(1.0, 64.0, 64.0));
    room.arena.run_for(2.0);
    assert_eq!(room.state(device), Some(DeviceState::Watching));
}

#[test]
fn test_surface_moved_while_live_trips() {
    let mut room = room_with(SimConfig::default(), true);
    let wall = room.wall;
    let device = room.deploy_at(DVec3::ZERO);
    room.arena.run_for(3.0);
    assert_eq!(room.state(device), Some(DeviceState::Watching));

    room.arena.move_to(wall, DVec3::new(-WALL_HALF.x - 1.0, 0.0, 0.0));
    room.arena.run_for(2.0);
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Detonated { .. })), 1);
}

#[test]
fn test_externally_destroyed_beam_is_restored() {
    let mut room = room();
    let device = room.deploy_at(DVec3::ZERO);
    room.arena.run_for(4.0);

    let beam = room.arena.device(device).and_then(|d| d.beam()).unwrap();
    assert!(room.arena.destroy_beam(beam));
    room.arena.run_for(0.5);

    let d = room.arena.device(device).unwrap();
    assert_eq!(d.state(), DeviceState::Watching);
    assert_eq!(room.arena.live_beams().len(), 1);
    assert_ne!(d.beam(), Some(beam));
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Tripped { .. })), 0);
}

// ---- Damage ----

#[test]
fn test_sub_lethal_hit_while_arming_defuses() {
    let mut room = room();
    let device = room.deploy_at(DVec3::ZERO);
    room.arena.run_for(1.0);

    let outcome = room.arena.damage(device, 0.5, None);
    assert_eq!(outcome, Some(DamageOutcome::Absorbed));
    room.arena.run_for(1.0);

    assert!(room.arena.device(device).is_none());
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Defused { .. })), 1);
    assert!(explosions(&room.arena).is_empty());
}

#[test]
fn test_lethal_hit_while_arming_detonates_once() {
    let mut room = room();
    let shooter = room.arena.spawn_agent(DVec3::new(200.0, -400.0, 0.0), true, true);
    let device = room.deploy_at(DVec3::ZERO);
    room.arena.run_for(1.0);

    let outcome = room.arena.damage(device, 5.0, Some(shooter));
    assert_eq!(outcome, Some(DamageOutcome::Forwarded));
    let again = room.arena.damage(device, 5.0, Some(shooter));
    assert_eq!(again, Some(DamageOutcome::Absorbed), "dead devices ignore damage");

    room.arena.run_for(1.0);
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Detonated { .. })), 1);
    let attacker = room.arena.events().iter().find_map(|e| match e {
        ArenaEvent::Explosion { attacker, .. } => Some(*attacker),
        _ => None,
    });
    assert_eq!(attacker, Some(Some(shooter)), "the shooting player takes credit");
}

#[test]
fn test_blast_sets_off_neighbouring_device() {
    let mut room = room();
    let first = room.deploy_at(DVec3::ZERO);
    let second = room.deploy_at(DVec3::new(0.0, 100.0, 0.0));
    room.arena.run_for(4.0);
    assert_eq!(room.state(second), Some(DeviceState::Watching));

    room.arena.spawn_agent(DVec3::new(300.0, 0.0, 0.0), false, true);
    room.arena.run_for(2.0);

    assert!(room.arena.device(first).is_none());
    assert!(room.arena.device(second).is_none());
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Detonated { .. })), 2);
    assert_eq!(room.count(|e| matches!(e, DeviceEvent::Tripped { .. })), 1);
    assert!(room.arena.live_beams().is_empty());
}

// ---- Determinism ----

fn scripted_run(seed: u64) -> Vec<ArenaEvent> {
    let mut room = room_with(
        SimConfig {
            seed,
            ..Default::default()
        },
        false,
    );
    room.deploy_at(DVec3::ZERO);
    room.deploy_at(DVec3::new(0.0, 100.0, 0.0));
    room.arena.run_for(4.0);
    room.arena.spawn_agent(DVec3::new(300.0, 0.0, 0.0), false, true);
    room.arena.run_for(2.0);
    room.arena.take_events()
}

#[test]
fn test_determinism_same_seed() {
    let a = scripted_run(12345);
    let b = scripted_run(12345);
    assert!(!a.is_empty());
    assert_eq!(a, b, "event logs diverged with same seed");
}

#[test]
fn test_arena_events_serialize_tagged() {
    let event = ArenaEvent::EntityRemoved {
        time: 1.5,
        entity: EntityHandle(7),
    };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"type\":\"EntityRemoved\""), "{json}");
    assert_eq!(event.time(), 1.5);
}
