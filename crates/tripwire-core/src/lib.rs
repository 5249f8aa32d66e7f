//! Core types and definitions for the TRIPWIRE device simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, handles, enums, tuning config, constants and device events.
//! It has no dependency on any host or runtime framework.

pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod types;
