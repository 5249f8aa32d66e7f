//! Materializes devices whose bodies were spawned during the tick.

use std::collections::BTreeMap;

use tracing::debug;

use tripwire_core::types::EntityHandle;
use tripwire_device::TriggerDevice;

use crate::host::ArenaHost;

/// Build a device for every queued spawn request.
pub fn run(devices: &mut BTreeMap<EntityHandle, TriggerDevice>, host: &mut ArenaHost<'_>) {
    let pending = std::mem::take(&mut host.queue.spawns);
    for (handle, request) in pending {
        let config = host.config;
        let device = TriggerDevice::spawn(handle, request, host.now, config, host);
        debug!(device = ?handle, origin = ?request.origin, "device materialized");
        devices.insert(handle, device);
    }
}
