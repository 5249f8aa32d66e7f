//! Scenario files: an arena layout plus timed actions, loaded from JSON.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use tripwire_core::config::{ConfigError, DeviceConfig};
use tripwire_core::constants::TICK_RATE;
use tripwire_core::types::{Angles, EntityHandle};
use tripwire_device::host::SpawnRequest;
use tripwire_sim::events::ArenaEvent;
use tripwire_sim::{Arena, SimConfig};

/// Sim time played when neither the scenario nor the command line says.
pub const DEFAULT_DURATION_SECS: f64 = 10.0;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("entity name '{0}' is used twice")]
    DuplicateName(String),

    #[error("'{field}' must be non-negative, got {value}")]
    NegativeTime { field: &'static str, value: f64 },
}

/// Immovable box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub center: DVec3,
    pub half_extents: DVec3,
}

/// Movable solid, or a thin hit volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub name: String,
    pub center: DVec3,
    pub half_extents: DVec3,
    #[serde(default)]
    pub hit_volume: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub position: DVec3,
    #[serde(default)]
    pub player: bool,
    #[serde(default = "default_true")]
    pub combat: bool,
}

/// A device placed at the start of the run. With an owner it is deployed
/// on their behalf; without one it is spawned like level placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    pub origin: DVec3,
    #[serde(default)]
    pub angles: Angles,
    #[serde(default)]
    pub spawn_fast: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionKind {
    Move {
        target: String,
        position: DVec3,
    },
    Damage {
        target: String,
        amount: f64,
        #[serde(default)]
        attacker: Option<String>,
    },
    DestroyBeam {
        device: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Sim time the action fires at.
    pub at: f64,
    #[serde(flatten)]
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub boxes: Vec<BoxSpec>,
    #[serde(default)]
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
    #[serde(default)]
    pub devices: Vec<DeviceSpec>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

fn default_true() -> bool {
    true
}

fn default_seed() -> u64 {
    SimConfig::default().seed
}

fn default_tick_rate() -> u32 {
    TICK_RATE
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            seed: self.seed,
            tick_rate: self.tick_rate,
            device: self.device.clone(),
        }
    }

    /// Check configuration, times and every name reference.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.sim_config().validate()?;

        if let Some(duration) = self.duration {
            non_negative("duration", duration)?;
        }

        let mut names: Vec<&str> = Vec::new();
        let declared = self
            .boxes
            .iter()
            .filter_map(|b| b.name.as_deref())
            .chain(self.surfaces.iter().map(|s| s.name.as_str()))
            .chain(self.agents.iter().map(|a| a.name.as_str()))
            .chain(self.devices.iter().map(|d| d.name.as_str()));
        for name in declared {
            if names.contains(&name) {
                return Err(ScenarioError::DuplicateName(name.to_string()));
            }
            names.push(name);
        }
        let known = |name: &str| -> Result<(), ScenarioError> {
            if names.contains(&name) {
                Ok(())
            } else {
                Err(ScenarioError::UnknownEntity(name.to_string()))
            }
        };

        for device in &self.devices {
            if let Some(owner) = &device.owner {
                known(owner.as_str())?;
            }
        }
        for action in &self.actions {
            non_negative("at", action.at)?;
            match &action.kind {
                ActionKind::Move { target, .. } => known(target.as_str())?,
                ActionKind::Damage {
                    target, attacker, ..
                } => {
                    known(target.as_str())?;
                    if let Some(attacker) = attacker {
                        known(attacker.as_str())?;
                    }
                }
                ActionKind::DestroyBeam { device } => known(device.as_str())?,
            }
        }
        Ok(())
    }

    /// Build the arena, run it and hand every event to `sink` in order.
    /// Returns how many events were emitted.
    pub fn play(
        &self,
        duration: Option<f64>,
        mut sink: impl FnMut(&ArenaEvent) -> Result<(), ScenarioError>,
    ) -> Result<usize, ScenarioError> {
        let (mut arena, names) = self.build()?;
        let lookup = |name: &str| {
            names
                .get(name)
                .copied()
                .ok_or_else(|| ScenarioError::UnknownEntity(name.to_string()))
        };

        let end = duration.or(self.duration).unwrap_or(DEFAULT_DURATION_SECS);
        let mut actions: Vec<&Action> = self.actions.iter().collect();
        actions.sort_by(|a, b| a.at.total_cmp(&b.at));

        let mut emitted = 0;
        let mut flush = |arena: &mut Arena| -> Result<(), ScenarioError> {
            for event in arena.take_events() {
                sink(&event)?;
                emitted += 1;
            }
            Ok(())
        };
        flush(&mut arena)?;

        for action in actions.into_iter().filter(|a| a.at <= end) {
            run_until(&mut arena, action.at);
            match &action.kind {
                ActionKind::Move { target, position } => {
                    if !arena.move_to(lookup(target.as_str())?, *position) {
                        warn!(target = %target, "entity cannot be moved");
                    }
                }
                ActionKind::Damage {
                    target,
                    amount,
                    attacker,
                } => {
                    let attacker = attacker.as_deref().map(lookup).transpose()?;
                    arena.damage(lookup(target.as_str())?, *amount, attacker);
                }
                ActionKind::DestroyBeam { device } => {
                    let beam = arena.device(lookup(device.as_str())?).and_then(|d| d.beam());
                    match beam {
                        Some(beam) => {
                            arena.destroy_beam(beam);
                        }
                        None => warn!(device = %device, "device has no beam to destroy"),
                    }
                }
            }
            flush(&mut arena)?;
        }

        run_until(&mut arena, end);
        flush(&mut arena)?;
        info!(events = emitted, end, "scenario finished");
        Ok(emitted)
    }

    fn build(&self) -> Result<(Arena, HashMap<String, EntityHandle>), ScenarioError> {
        let mut arena = Arena::new(self.sim_config())?;
        let mut names = HashMap::new();

        for b in &self.boxes {
            let handle = arena.spawn_static_box(b.center, b.half_extents);
            if let Some(name) = &b.name {
                names.insert(name.clone(), handle);
            }
        }
        for s in &self.surfaces {
            let handle = if s.hit_volume {
                arena.spawn_hit_volume(s.center, s.half_extents)
            } else {
                arena.spawn_surface(s.center, s.half_extents)
            };
            names.insert(s.name.clone(), handle);
        }
        for a in &self.agents {
            let handle = arena.spawn_agent(a.position, a.player, a.combat);
            names.insert(a.name.clone(), handle);
        }
        for d in &self.devices {
            let owner = match &d.owner {
                Some(owner) => Some(
                    names
                        .get(owner)
                        .copied()
                        .ok_or_else(|| ScenarioError::UnknownEntity(owner.clone()))?,
                ),
                None => None,
            };
            let handle = match owner {
                Some(owner) if !d.spawn_fast => arena.deploy(owner, d.origin, d.angles),
                _ => arena.spawn_device(SpawnRequest {
                    origin: d.origin,
                    angles: d.angles,
                    owner,
                    spawn_fast: d.spawn_fast,
                    no_respawn: false,
                }),
            };
            names.insert(d.name.clone(), handle);
        }
        Ok((arena, names))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ScenarioError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ScenarioError::NegativeTime { field, value })
    }
}

/// Tick until sim time reaches `t`.
fn run_until(arena: &mut Arena, t: f64) {
    let half_tick = arena.config().dt() * 0.5;
    while arena.now() + half_tick < t {
        arena.tick();
    }
}
