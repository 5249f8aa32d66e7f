//! Arena event log.
//!
//! Everything observable that happened in the arena, stamped with sim time.
//! Device transitions are wrapped as-is; the rest are host-side effects.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use tripwire_core::enums::SoundCue;
use tripwire_core::events::DeviceEvent;
use tripwire_core::types::EntityHandle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArenaEvent {
    /// A transition reported by a device.
    Device { time: f64, event: DeviceEvent },
    SoundStarted {
        time: f64,
        source: EntityHandle,
        cue: SoundCue,
    },
    SoundStopped {
        time: f64,
        source: EntityHandle,
        cue: SoundCue,
    },
    Explosion {
        time: f64,
        origin: DVec3,
        damage: f64,
        radius: f64,
        attacker: Option<EntityHandle>,
        inflictor: EntityHandle,
    },
    AgentDamaged {
        time: f64,
        agent: EntityHandle,
        amount: f64,
        remaining: f64,
        attacker: Option<EntityHandle>,
    },
    AgentKilled {
        time: f64,
        agent: EntityHandle,
        attacker: Option<EntityHandle>,
    },
    /// An entity left the world.
    EntityRemoved { time: f64, entity: EntityHandle },
}

impl ArenaEvent {
    pub fn time(&self) -> f64 {
        match self {
            ArenaEvent::Device { time, .. }
            | ArenaEvent::SoundStarted { time, .. }
            | ArenaEvent::SoundStopped { time, .. }
            | ArenaEvent::Explosion { time, .. }
            | ArenaEvent::AgentDamaged { time, .. }
            | ArenaEvent::AgentKilled { time, .. }
            | ArenaEvent::EntityRemoved { time, .. } => *time,
        }
    }

    /// The wrapped device event, if this is one.
    pub fn device_event(&self) -> Option<&DeviceEvent> {
        match self {
            ArenaEvent::Device { event, .. } => Some(event),
            _ => None,
        }
    }
}
