//! Simulation constants and tuning defaults.
//!
//! Device tuning lives in [`crate::config::DeviceConfig`]; these are the
//! defaults it falls back to.

/// Default host tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Longest trace the host supports (world units). Length of the diagonal of
/// a 32768-unit cube.
pub const MAX_TRACE_LENGTH: f64 = 1.732_050_807_569 * 2.0 * 16384.0;

// --- Arming ---

/// Arming countdown for a normally deployed device (seconds).
pub const ARM_DELAY_SECS: f64 = 2.5;

/// Arming countdown when spawned with the fast flag (seconds).
pub const FAST_ARM_DELAY_SECS: f64 = 1.0;

/// Delay from spawn to the first arming tick (seconds).
pub const FIRST_THINK_DELAY_SECS: f64 = 0.2;

/// Normal tick interval while arming or watching (seconds).
pub const THINK_INTERVAL_SECS: f64 = 0.1;

/// Added to the arm time each tick the device is occluded (seconds).
pub const ARM_RETRY_SECS: f64 = 0.1;

/// Delay from beam creation to the first watching tick (seconds).
pub const BEAM_SETTLE_SECS: f64 = 1.0;

// --- Probes (world units) ---

/// Forward probe checking whether the deployer stands in the beam path.
pub const OWNER_PROBE_DISTANCE: f64 = 8.0;

/// Attachment probe start, in front of the device.
pub const ATTACH_PROBE_FRONT: f64 = 8.0;

/// Attachment probe end, behind the device.
pub const ATTACH_PROBE_BACK: f64 = 32.0;

/// Backward probe used to re-resolve the surface after the beam was lost.
pub const RESTICK_PROBE_DISTANCE: f64 = 12.0;

/// Detonation contact probe start, in front of the device.
pub const DETONATION_PROBE_FRONT: f64 = 8.0;

/// Detonation contact probe end, behind the device.
pub const DETONATION_PROBE_BACK: f64 = 64.0;

/// Replacement device offset along the facing direction.
pub const REPLACEMENT_OFFSET: f64 = 24.0;

// --- Beam ---

/// Fraction change that trips the beam.
pub const BEAM_TOLERANCE: f64 = 0.001;

pub const BEAM_COLOR: [u8; 3] = [255, 0, 0];
pub const BEAM_WIDTH: f64 = 1.0;
pub const BEAM_SCROLL_RATE: f64 = 25.5;
pub const BEAM_BRIGHTNESS: u8 = 255;

// --- Damage ---

pub const INITIAL_HEALTH: i32 = 1;

/// Damage recorded on a beam-trip kill.
pub const TRIP_DAMAGE: f64 = 100.0;

pub const BLAST_DAMAGE: f64 = 150.0;
pub const BLAST_RADIUS: f64 = BLAST_DAMAGE * 2.5;

/// Removal delay on cleanup, replacement and defuse (seconds).
pub const REMOVAL_DELAY_SECS: f64 = 0.1;

/// Detonation fuse range (seconds).
pub const FUSE_MIN_SECS: f64 = 0.1;
pub const FUSE_MAX_SECS: f64 = 0.3;

/// Device bounding box half size (world units).
pub const DEVICE_HALF_EXTENT: f64 = 8.0;
