//! Fundamental geometric and simulation types.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Opaque handle to a host-owned world entity (surface, agent, device).
///
/// The device only ever holds these as weak references: resolving one
/// through the host may fail once the entity is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

/// Handle to a trigger-beam visual owned by exactly one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BeamHandle(pub u64);

/// Euler orientation in degrees (pitch, yaw, roll).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Angles {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Angles {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Unit facing vector. Positive pitch looks down.
    pub fn forward(&self) -> DVec3 {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        DVec3::new(cp * cy, cp * sy, -sp)
    }

    /// Orientation whose forward vector points along `dir`. Roll is zero.
    pub fn from_direction(dir: DVec3) -> Self {
        let horiz = (dir.x * dir.x + dir.y * dir.y).sqrt();
        let yaw = if horiz < f64::EPSILON {
            0.0
        } else {
            dir.y.atan2(dir.x).to_degrees()
        };
        let pitch = (-dir.z).atan2(horiz).to_degrees();
        Self::new(pitch, yaw, 0.0)
    }
}

/// Position plus orientation of a world entity.
///
/// Equality is exact: any change in either component counts as movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub angles: Angles,
}

impl Pose {
    pub fn new(position: DVec3, angles: Angles) -> Self {
        Self { position, angles }
    }

    /// Pose at `position` with zero rotation.
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            angles: Angles::default(),
        }
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 * dt;
    }
}
