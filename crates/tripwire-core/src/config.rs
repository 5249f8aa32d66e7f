//! Device tuning configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// NaN or infinite value.
    #[error("'{field}' must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    /// A duration or distance that must not be negative.
    #[error("'{field}' must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// A value that must be strictly positive.
    #[error("'{field}' must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// Fuse bounds out of order.
    #[error("fuse range is empty: min {min} > max {max}")]
    FuseRange { min: f64, max: f64 },

    /// Devices start with at least one hit point.
    #[error("initial health must be at least 1, got {0}")]
    Health(i32),
}

/// Timing, geometry and damage tuning for trigger devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub arm_delay_secs: f64,
    pub fast_arm_delay_secs: f64,
    pub first_think_delay_secs: f64,
    pub think_interval_secs: f64,
    pub arm_retry_secs: f64,
    pub beam_settle_secs: f64,
    pub max_range: f64,
    pub beam_tolerance: f64,
    pub owner_probe_distance: f64,
    pub attach_probe_front: f64,
    pub attach_probe_back: f64,
    pub restick_probe_distance: f64,
    pub detonation_probe_front: f64,
    pub detonation_probe_back: f64,
    pub replacement_offset: f64,
    pub removal_delay_secs: f64,
    pub fuse_min_secs: f64,
    pub fuse_max_secs: f64,
    pub initial_health: i32,
    pub trip_damage: f64,
    pub blast_damage: f64,
    pub blast_radius: f64,
    pub half_extent: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            arm_delay_secs: ARM_DELAY_SECS,
            fast_arm_delay_secs: FAST_ARM_DELAY_SECS,
            first_think_delay_secs: FIRST_THINK_DELAY_SECS,
            think_interval_secs: THINK_INTERVAL_SECS,
            arm_retry_secs: ARM_RETRY_SECS,
            beam_settle_secs: BEAM_SETTLE_SECS,
            max_range: MAX_TRACE_LENGTH,
            beam_tolerance: BEAM_TOLERANCE,
            owner_probe_distance: OWNER_PROBE_DISTANCE,
            attach_probe_front: ATTACH_PROBE_FRONT,
            attach_probe_back: ATTACH_PROBE_BACK,
            restick_probe_distance: RESTICK_PROBE_DISTANCE,
            detonation_probe_front: DETONATION_PROBE_FRONT,
            detonation_probe_back: DETONATION_PROBE_BACK,
            replacement_offset: REPLACEMENT_OFFSET,
            removal_delay_secs: REMOVAL_DELAY_SECS,
            fuse_min_secs: FUSE_MIN_SECS,
            fuse_max_secs: FUSE_MAX_SECS,
            initial_health: INITIAL_HEALTH,
            trip_damage: TRIP_DAMAGE,
            blast_damage: BLAST_DAMAGE,
            blast_radius: BLAST_RADIUS,
            half_extent: DEVICE_HALF_EXTENT,
        }
    }
}

impl DeviceConfig {
    /// Arming countdown for the given spawn flag.
    pub fn arm_delay(&self, spawn_fast: bool) -> f64 {
        if spawn_fast {
            self.fast_arm_delay_secs
        } else {
            self.arm_delay_secs
        }
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.float_fields() {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        let non_negative = [
            ("arm_delay_secs", self.arm_delay_secs),
            ("fast_arm_delay_secs", self.fast_arm_delay_secs),
            ("first_think_delay_secs", self.first_think_delay_secs),
            ("arm_retry_secs", self.arm_retry_secs),
            ("beam_settle_secs", self.beam_settle_secs),
            ("beam_tolerance", self.beam_tolerance),
            ("owner_probe_distance", self.owner_probe_distance),
            ("attach_probe_front", self.attach_probe_front),
            ("attach_probe_back", self.attach_probe_back),
            ("restick_probe_distance", self.restick_probe_distance),
            ("detonation_probe_front", self.detonation_probe_front),
            ("detonation_probe_back", self.detonation_probe_back),
            ("replacement_offset", self.replacement_offset),
            ("removal_delay_secs", self.removal_delay_secs),
            ("fuse_min_secs", self.fuse_min_secs),
            ("fuse_max_secs", self.fuse_max_secs),
            ("trip_damage", self.trip_damage),
            ("blast_damage", self.blast_damage),
            ("blast_radius", self.blast_radius),
            ("half_extent", self.half_extent),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("think_interval_secs", self.think_interval_secs),
            ("max_range", self.max_range),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.fuse_min_secs > self.fuse_max_secs {
            return Err(ConfigError::FuseRange {
                min: self.fuse_min_secs,
                max: self.fuse_max_secs,
            });
        }

        if self.initial_health < 1 {
            return Err(ConfigError::Health(self.initial_health));
        }

        Ok(())
    }

    fn float_fields(&self) -> [(&'static str, f64); 22] {
        [
            ("arm_delay_secs", self.arm_delay_secs),
            ("fast_arm_delay_secs", self.fast_arm_delay_secs),
            ("first_think_delay_secs", self.first_think_delay_secs),
            ("think_interval_secs", self.think_interval_secs),
            ("arm_retry_secs", self.arm_retry_secs),
            ("beam_settle_secs", self.beam_settle_secs),
            ("max_range", self.max_range),
            ("beam_tolerance", self.beam_tolerance),
            ("owner_probe_distance", self.owner_probe_distance),
            ("attach_probe_front", self.attach_probe_front),
            ("attach_probe_back", self.attach_probe_back),
            ("restick_probe_distance", self.restick_probe_distance),
            ("detonation_probe_front", self.detonation_probe_front),
            ("detonation_probe_back", self.detonation_probe_back),
            ("replacement_offset", self.replacement_offset),
            ("removal_delay_secs", self.removal_delay_secs),
            ("fuse_min_secs", self.fuse_min_secs),
            ("fuse_max_secs", self.fuse_max_secs),
            ("trip_damage", self.trip_damage),
            ("blast_damage", self.blast_damage),
            ("blast_radius", self.blast_radius),
            ("half_extent", self.half_extent),
        ]
    }
}
