//! Cleanup system: despawns entities whose removal has come due.

use std::collections::BTreeMap;

use tracing::debug;

use tripwire_core::types::EntityHandle;
use tripwire_device::TriggerDevice;

use crate::events::ArenaEvent;
use crate::host::{entity_of, ArenaHost};
use crate::systems::SCHEDULE_EPSILON;

/// Despawn due removals, dropping their devices and any beams they still own.
pub fn run(devices: &mut BTreeMap<EntityHandle, TriggerDevice>, host: &mut ArenaHost<'_>) {
    let now = host.now;
    let (due, pending): (Vec<_>, Vec<_>) = host
        .queue
        .removals
        .drain(..)
        .partition(|(at, _)| *at <= now + SCHEDULE_EPSILON);
    host.queue.removals = pending;

    for (_, handle) in due {
        let despawned = entity_of(handle).is_some_and(|entity| host.world.despawn(entity).is_ok());
        let had_device = devices.remove(&handle).is_some();
        let dropped_beams = host.beams.destroy_owned_by(handle);
        if despawned || had_device {
            debug!(entity = ?handle, dropped_beams, "entity removed");
            host.log.push(ArenaEvent::EntityRemoved {
                time: now,
                entity: handle,
            });
        }
    }
}
