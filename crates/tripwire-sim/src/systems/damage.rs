//! Damage system: applies queued explosions to agents and devices.
//!
//! Damage falls off linearly from the full amount at the blast origin to
//! zero at the radius. Devices take blast damage through their own damage
//! pipeline, so a blast can start other devices' fuses.

use std::collections::BTreeMap;

use glam::DVec3;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use tripwire_core::enums::DamageKind;
use tripwire_core::types::{EntityHandle, Pose};
use tripwire_device::host::{Blast, DamageInfo};
use tripwire_device::TriggerDevice;

use crate::components::{Agent, Health};
use crate::events::ArenaEvent;
use crate::host::{entity_of, handle_of, ArenaHost};

/// Damage a blast deals at `distance` from its origin.
pub fn falloff(blast: &Blast, distance: f64) -> f64 {
    if blast.radius <= 0.0 || distance >= blast.radius {
        return 0.0;
    }
    blast.damage * (1.0 - distance / blast.radius)
}

/// Drain every queued blast.
pub fn run(
    devices: &mut BTreeMap<EntityHandle, TriggerDevice>,
    host: &mut ArenaHost<'_>,
    rng: &mut ChaCha8Rng,
) {
    while !host.queue.blasts.is_empty() {
        let blasts = std::mem::take(&mut host.queue.blasts);
        for blast in blasts {
            apply_blast(&blast, devices, host, rng);
        }
    }
}

fn apply_blast(
    blast: &Blast,
    devices: &mut BTreeMap<EntityHandle, TriggerDevice>,
    host: &mut ArenaHost<'_>,
    rng: &mut ChaCha8Rng,
) {
    let now = host.now;
    info!(origin = ?blast.origin, inflictor = ?blast.inflictor, "explosion");
    host.log.push(ArenaEvent::Explosion {
        time: now,
        origin: blast.origin,
        damage: blast.damage,
        radius: blast.radius,
        attacker: blast.attacker,
        inflictor: blast.inflictor,
    });

    let mut hits: Vec<(EntityHandle, f64)> = host
        .world
        .query::<(&Pose, &Health, &Agent)>()
        .iter()
        .filter(|(_, (_, health, _))| health.current > 0.0)
        .map(|(entity, (pose, _, _))| {
            let amount = falloff(blast, pose.position.distance(blast.origin));
            (handle_of(entity), amount)
        })
        .filter(|(_, amount)| *amount > 0.0)
        .collect();
    hits.sort_by_key(|(handle, _)| *handle);

    for (agent, amount) in hits {
        damage_agent(host, agent, amount, blast.attacker);
    }

    let in_range: Vec<(EntityHandle, DVec3)> = devices
        .iter()
        .filter(|(handle, _)| **handle != blast.inflictor)
        .map(|(handle, device)| (*handle, device.position()))
        .collect();
    for (handle, position) in in_range {
        let amount = falloff(blast, position.distance(blast.origin));
        if amount <= 0.0 {
            continue;
        }
        if let Some(device) = devices.get_mut(&handle) {
            let info = DamageInfo {
                amount,
                attacker: blast.attacker,
                kind: DamageKind::Blast,
            };
            let outcome = device.take_damage(info, now, host, rng);
            debug!(device = ?handle, amount, outcome = ?outcome, "blast hit device");
        }
    }
}

/// Subtract `amount` from an agent's health, logging the hit and any death.
pub fn damage_agent(
    host: &mut ArenaHost<'_>,
    agent: EntityHandle,
    amount: f64,
    attacker: Option<EntityHandle>,
) {
    let Some(entity) = entity_of(agent) else {
        return;
    };
    let Ok(mut health) = host.world.get::<&mut Health>(entity) else {
        return;
    };
    if health.current <= 0.0 {
        return;
    }
    health.current -= amount;
    let remaining = health.current;
    drop(health);

    host.log.push(ArenaEvent::AgentDamaged {
        time: host.now,
        agent,
        amount,
        remaining,
        attacker,
    });
    if remaining <= 0.0 {
        info!(agent = ?agent, attacker = ?attacker, "agent killed");
        host.log.push(ArenaEvent::AgentKilled {
            time: host.now,
            agent,
            attacker,
        });
    }
}
