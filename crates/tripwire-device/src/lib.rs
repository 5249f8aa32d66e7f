//! Tethered proximity-trigger device for TRIPWIRE.
//!
//! Implements the arming / watching / triggered / detonating state machine
//! and the host ports it drives. No host dependency: ray casts, entity
//! lifecycle, damage and effects are reached only through [`host`] traits.

pub mod device;
pub mod host;

pub use device::TriggerDevice;
pub use host::DeviceHost;
pub use tripwire_core as core;
