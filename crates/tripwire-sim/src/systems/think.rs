//! Think scheduler: runs every device whose next think has come due.

use std::collections::BTreeMap;

use rand_chacha::ChaCha8Rng;

use tripwire_core::types::EntityHandle;
use tripwire_device::TriggerDevice;

use crate::host::ArenaHost;
use crate::systems::SCHEDULE_EPSILON;

/// Run due devices in handle order. Returns how many thought.
pub fn run(
    devices: &mut BTreeMap<EntityHandle, TriggerDevice>,
    host: &mut ArenaHost<'_>,
    rng: &mut ChaCha8Rng,
) -> usize {
    let now = host.now;
    let mut ran = 0;
    for device in devices.values_mut() {
        let due = device
            .next_think()
            .is_some_and(|at| at <= now + SCHEDULE_EPSILON);
        if due {
            device.think(now, host, rng);
            ran += 1;
        }
    }
    ran
}
