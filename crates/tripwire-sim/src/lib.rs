//! Headless reference host for TRIPWIRE devices.
//!
//! Owns an hecs world of boxes, agents and device bodies, answers the
//! device's host ports, schedules device ticks at a fixed rate and runs the
//! damage pipeline. Deterministic for a given seed.

pub mod components;
pub mod engine;
pub mod events;
pub mod host;
pub mod systems;
pub mod trace;
pub mod world_setup;

pub use engine::{Arena, SimConfig};
pub use tripwire_core as core;

#[cfg(test)]
mod tests;
