//! The trigger device state machine.
//!
//! A device is driven entirely by its host: the host calls [`TriggerDevice::think`]
//! whenever [`TriggerDevice::next_think`] comes due, and routes damage through
//! [`TriggerDevice::take_damage`]. Each call runs to completion; the state tag
//! selects which per-state handler runs.

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use tripwire_core::config::DeviceConfig;
use tripwire_core::constants::{BEAM_BRIGHTNESS, BEAM_COLOR, BEAM_SCROLL_RATE, BEAM_WIDTH};
use tripwire_core::enums::{DamageKind, DamageOutcome, DeviceState, SoundCue, TraceMask};
use tripwire_core::events::DeviceEvent;
use tripwire_core::types::{Angles, BeamHandle, EntityHandle, Pose};

use crate::host::{BeamSpec, Blast, DamageInfo, DeviceHost, SpawnRequest};

/// Distance an explosion is pulled off the surface it hit.
const BLAST_SURFACE_OFFSET: f64 = 0.6;

/// A placed explosive that arms against a surface and projects a trigger beam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerDevice {
    id: EntityHandle,
    position: DVec3,
    angles: Angles,
    facing: DVec3,
    /// Far point of the full-range beam ray.
    beam_end: DVec3,
    arm_time: f64,
    /// Fraction of `max_range` the beam reached when it was created.
    beam_coverage: Option<f64>,
    attachment: Option<EntityHandle>,
    /// Surface pose snapshot taken when the attachment was resolved.
    attachment_pose: Option<Pose>,
    beam: Option<BeamHandle>,
    /// The deploying agent.
    real_owner: Option<EntityHandle>,
    /// Whoever gets credit for the explosion.
    credit_owner: Option<EntityHandle>,
    health: i32,
    takes_damage: bool,
    solid: bool,
    no_respawn: bool,
    state: DeviceState,
    next_think: Option<f64>,
    config: DeviceConfig,
}

impl TriggerDevice {
    /// Initialize a device the host has just allocated as `id`.
    pub fn spawn<H: DeviceHost + ?Sized>(
        id: EntityHandle,
        request: SpawnRequest,
        now: f64,
        config: &DeviceConfig,
        host: &mut H,
    ) -> Self {
        let facing = request.angles.forward();
        let arm_time = now + config.arm_delay(request.spawn_fast);

        let device = Self {
            id,
            position: request.origin,
            angles: request.angles,
            facing,
            beam_end: request.origin + facing * config.max_range,
            arm_time,
            beam_coverage: None,
            attachment: None,
            attachment_pose: None,
            beam: None,
            real_owner: request.owner,
            credit_owner: request.owner,
            health: config.initial_health,
            takes_damage: true,
            solid: false,
            no_respawn: request.no_respawn,
            state: DeviceState::Arming,
            next_think: Some(now + config.first_think_delay_secs),
            config: config.clone(),
        };

        if request.owner.is_some() {
            host.play_sound(id, SoundCue::Deploy);
            host.play_sound(id, SoundCue::Charge);
        }

        debug!(device = ?id, owner = ?request.owner, arm_time, "device spawned");
        host.report(DeviceEvent::Spawned {
            device: id,
            owner: request.owner,
            arm_time,
        });
        device
    }

    /// Spawn a device already attributed to `deployer`, as a placeable weapon does.
    pub fn create<H: DeviceHost + ?Sized>(
        id: EntityHandle,
        deployer: EntityHandle,
        origin: DVec3,
        angles: Angles,
        now: f64,
        config: &DeviceConfig,
        host: &mut H,
    ) -> Self {
        let request = SpawnRequest {
            origin,
            angles,
            owner: Some(deployer),
            spawn_fast: false,
            no_respawn: false,
        };
        Self::spawn(id, request, now, config, host)
    }

    // --- Accessors ---

    pub fn id(&self) -> EntityHandle {
        self.id
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state.is_live()
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn angles(&self) -> Angles {
        self.angles
    }

    pub fn facing(&self) -> DVec3 {
        self.facing
    }

    pub fn beam_end(&self) -> DVec3 {
        self.beam_end
    }

    pub fn arm_time(&self) -> f64 {
        self.arm_time
    }

    pub fn beam_coverage(&self) -> Option<f64> {
        self.beam_coverage
    }

    pub fn attachment(&self) -> Option<EntityHandle> {
        self.attachment
    }

    pub fn attachment_pose(&self) -> Option<Pose> {
        self.attachment_pose
    }

    pub fn beam(&self) -> Option<BeamHandle> {
        self.beam
    }

    pub fn real_owner(&self) -> Option<EntityHandle> {
        self.real_owner
    }

    pub fn credit_owner(&self) -> Option<EntityHandle> {
        self.credit_owner
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn takes_damage(&self) -> bool {
        self.takes_damage
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub fn no_respawn(&self) -> bool {
        self.no_respawn
    }

    /// When the host should next call [`Self::think`]. `None` once removed.
    pub fn next_think(&self) -> Option<f64> {
        self.next_think
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    // --- Tick dispatch ---

    /// Run the handler for the current state.
    pub fn think<H, R>(&mut self, now: f64, host: &mut H, rng: &mut R)
    where
        H: DeviceHost + ?Sized,
        R: Rng + ?Sized,
    {
        match self.state {
            DeviceState::Arming => self.arming_tick(now, host),
            DeviceState::Watching => self.watching_tick(now, host, rng),
            DeviceState::Triggered => self.detonate(host),
            DeviceState::Detonating | DeviceState::Removed => self.next_think = None,
        }
    }

    fn arming_tick<H: DeviceHost + ?Sized>(&mut self, now: f64, host: &mut H) {
        // A surface that no longer exists resolves to nothing.
        let surface = self
            .attachment
            .and_then(|surface| host.pose(surface).map(|pose| (surface, pose)));
        if surface.is_none() {
            self.attachment = None;
            self.attachment_pose = None;
        }

        match surface {
            None => {
                if !self.resolve_attachment(now, host) {
                    return;
                }
            }
            Some((_, pose)) if Some(pose) != self.attachment_pose => {
                self.replace(host);
                return;
            }
            Some(_) => {}
        }

        if now > self.arm_time {
            self.make_beam(now, host);
            self.solid = true;
            host.set_solid(self.id, true);
            host.play_sound(self.id, SoundCue::Activate);

            let coverage = self.beam_coverage.unwrap_or(1.0);
            debug!(device = ?self.id, coverage, "device armed");
            host.report(DeviceEvent::Armed {
                device: self.id,
                coverage,
            });
            return;
        }

        self.next_think = Some(now + self.config.think_interval_secs);
    }

    /// Find the surface behind the device. Returns false when the tick is over.
    fn resolve_attachment<H: DeviceHost + ?Sized>(&mut self, now: f64, host: &mut H) -> bool {
        // Don't arm while the deployer stands in front of the beam.
        let probe = host.trace_line(
            self.position,
            self.position + self.facing * self.config.owner_probe_distance,
            TraceMask::Shot,
            &[self.id],
        );
        let owner_blocks = self.real_owner.is_some() && probe.entity == self.real_owner;
        if probe.start_solid || owner_blocks {
            self.delay_arming(now, host);
            return false;
        }

        let mut ignore = vec![self.id];
        ignore.extend(self.real_owner);
        let tr = host.trace_line(
            self.position + self.facing * self.config.attach_probe_front,
            self.position - self.facing * self.config.attach_probe_back,
            TraceMask::Shot,
            &ignore,
        );
        if tr.start_solid {
            self.delay_arming(now, host);
            return false;
        }

        let resolved = tr
            .entity
            .filter(|_| tr.did_hit())
            .and_then(|surface| host.pose(surface).map(|pose| (surface, pose)));
        let Some((surface, pose)) = resolved else {
            // Deployed on nothing, or on something that has since gone.
            host.stop_sound(self.id, SoundCue::Deploy);
            host.stop_sound(self.id, SoundCue::Charge);
            info!(device = ?self.id, position = ?self.position, "no attachment surface, removing");
            self.discard(host);
            return false;
        };

        self.attachment = Some(surface);
        self.attachment_pose = Some(pose);
        debug!(device = ?self.id, surface = ?surface, "attached");
        host.report(DeviceEvent::Attached {
            device: self.id,
            surface,
        });
        true
    }

    fn delay_arming<H: DeviceHost + ?Sized>(&mut self, now: f64, host: &mut H) {
        self.arm_time += self.config.arm_retry_secs;
        self.next_think = Some(now + self.config.arm_retry_secs);
        trace!(device = ?self.id, arm_time = self.arm_time, "arming delayed");
        host.report(DeviceEvent::ArmingDelayed {
            device: self.id,
            arm_time: self.arm_time,
        });
    }

    /// The surface shifted mid-arming: drop a fresh device and discard this one.
    fn replace<H: DeviceHost + ?Sized>(&mut self, host: &mut H) {
        host.stop_sound(self.id, SoundCue::Deploy);
        host.stop_sound(self.id, SoundCue::Charge);

        let request = SpawnRequest {
            origin: self.position + self.facing * self.config.replacement_offset,
            angles: self.angles,
            owner: None,
            spawn_fast: false,
            no_respawn: true,
        };
        let replacement = host.spawn_device(request);
        if replacement.is_none() {
            warn!(device = ?self.id, "host refused replacement spawn");
        }
        info!(device = ?self.id, replacement = ?replacement, "attachment moved, redeploying");
        host.report(DeviceEvent::Replaced {
            device: self.id,
            replacement,
        });
        self.discard(host);
    }

    // --- Beam ---

    /// Measure the beam's reach and project a fresh beam visual.
    ///
    /// Any beam this device still owns is destroyed first. Only an arming or
    /// watching device can (re)project its beam.
    pub(crate) fn make_beam<H: DeviceHost + ?Sized>(&mut self, now: f64, host: &mut H) {
        if !matches!(self.state, DeviceState::Arming | DeviceState::Watching) {
            trace!(device = ?self.id, state = ?self.state, "beam refused");
            return;
        }
        self.kill_beam(host);

        let tr = host.trace_line(self.position, self.beam_end, TraceMask::Shot, &[self.id]);
        self.beam_coverage = Some(tr.fraction);
        self.state = DeviceState::Watching;
        self.next_think = Some(now + self.config.beam_settle_secs);

        let end = self.position + self.facing * self.config.max_range * tr.fraction;
        let beam = host.create_beam(
            self.id,
            BeamSpec {
                start: self.position,
                end,
                color: BEAM_COLOR,
                width: BEAM_WIDTH,
                scroll_rate: BEAM_SCROLL_RATE,
                brightness: BEAM_BRIGHTNESS,
                temporary: true,
            },
        );
        self.beam = Some(beam);
        host.report(DeviceEvent::BeamCreated {
            device: self.id,
            beam,
            end,
        });
    }

    fn kill_beam<H: DeviceHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(beam) = self.beam.take() {
            host.destroy_beam(beam);
            host.report(DeviceEvent::BeamDestroyed {
                device: self.id,
                beam,
            });
        }
    }

    fn watching_tick<H, R>(&mut self, now: f64, host: &mut H, rng: &mut R)
    where
        H: DeviceHost + ?Sized,
        R: Rng + ?Sized,
    {
        // Solid only: thin hit volumes must not trip the beam.
        let tr = host.trace_line(self.position, self.beam_end, TraceMask::Solid, &[self.id]);

        let beam_lost = self.beam.map_or(true, |beam| !host.beam_alive(beam));
        if beam_lost {
            // Destroyed out from under us; the handle is already dead.
            self.beam = None;
            self.make_beam(now, host);
            self.restick(host);
        }

        let coverage = self.beam_coverage.unwrap_or(tr.fraction);
        let agent_on_beam = tr
            .entity
            .is_some_and(|entity| host.is_combat_character(entity));
        let reach_changed = (coverage - tr.fraction).abs() > self.config.beam_tolerance;
        let surface_disturbed = match self.attachment {
            None => true,
            Some(surface) => host
                .pose(surface)
                .map_or(true, |pose| Some(pose) != self.attachment_pose),
        };

        if agent_on_beam || reach_changed || surface_disturbed {
            debug!(
                device = ?self.id,
                culprit = ?tr.entity,
                agent_on_beam,
                reach_changed,
                surface_disturbed,
                "beam tripped"
            );
            host.report(DeviceEvent::Tripped {
                device: self.id,
                culprit: tr.entity,
            });
            self.credit_owner = self.real_owner;
            self.health = 0;
            let info = DamageInfo {
                amount: self.config.trip_damage,
                attacker: self.real_owner,
                kind: DamageKind::Generic,
            };
            self.on_killed(info, now, host, rng);
            return;
        }

        self.next_think = Some(now + self.config.think_interval_secs);
    }

    /// Re-resolve the surface with a short probe behind the device.
    fn restick<H: DeviceHost + ?Sized>(&mut self, host: &mut H) {
        let probe = host.trace_line(
            self.position,
            self.position - self.facing * self.config.restick_probe_distance,
            TraceMask::Solid,
            &[self.id],
        );
        let Some(surface) = probe.entity else {
            return;
        };
        if self.attachment != Some(surface) {
            self.attachment = Some(surface);
            self.attachment_pose = host.pose(surface);
            host.report(DeviceEvent::Attached {
                device: self.id,
                surface,
            });
        }
    }

    // --- Damage ---

    /// Device-specific damage filter.
    ///
    /// A sub-lethal hit while arming disables the device without detonation.
    /// Everything else goes on to the generic pipeline.
    pub fn on_damage<H: DeviceHost + ?Sized>(
        &mut self,
        info: DamageInfo,
        now: f64,
        host: &mut H,
    ) -> DamageOutcome {
        if !self.takes_damage || self.state == DeviceState::Removed || !(info.amount >= 0.0) {
            trace!(device = ?self.id, amount = info.amount, state = ?self.state, "damage ignored");
            return DamageOutcome::Absorbed;
        }

        if now < self.arm_time && info.amount < f64::from(self.health) {
            info!(device = ?self.id, attacker = ?info.attacker, "defused");
            host.report(DeviceEvent::Defused { device: self.id });
            self.discard(host);
            return DamageOutcome::Absorbed;
        }

        DamageOutcome::Forwarded
    }

    /// The generic damage pipeline: filter, subtract health, kill at zero.
    pub fn take_damage<H, R>(
        &mut self,
        info: DamageInfo,
        now: f64,
        host: &mut H,
        rng: &mut R,
    ) -> DamageOutcome
    where
        H: DeviceHost + ?Sized,
        R: Rng + ?Sized,
    {
        let outcome = self.on_damage(info, now, host);
        if outcome == DamageOutcome::Forwarded {
            // Integer health truncates like the engine does.
            self.health = (f64::from(self.health) - info.amount) as i32;
            if self.health <= 0 {
                self.health = 0;
                self.on_killed(info, now, host, rng);
            }
        }
        outcome
    }

    /// Kill notification: start the detonation fuse. Later calls are ignored.
    ///
    /// `info` is the killing blow; a beam trip arrives as the owner's
    /// `trip_damage`.
    pub fn on_killed<H, R>(
        &mut self,
        info: DamageInfo,
        now: f64,
        host: &mut H,
        rng: &mut R,
    ) where
        H: DeviceHost + ?Sized,
        R: Rng + ?Sized,
    {
        if !self.takes_damage || self.state == DeviceState::Removed {
            return;
        }
        self.takes_damage = false;
        let attacker = info.attacker;

        // A player who destroys the device gets credit for what it kills.
        if let Some(player) = attacker.filter(|a| host.is_player(*a)) {
            self.credit_owner = Some(player);
        }

        let fuse = rng.gen_range(self.config.fuse_min_secs..=self.config.fuse_max_secs);
        let detonate_at = now + fuse;
        self.state = DeviceState::Triggered;
        self.next_think = Some(detonate_at);
        host.stop_sound(self.id, SoundCue::Charge);

        debug!(
            device = ?self.id,
            attacker = ?attacker,
            damage = info.amount,
            detonate_at,
            "device killed"
        );
        host.report(DeviceEvent::Killed {
            device: self.id,
            attacker,
            damage: info.amount,
            detonate_at,
        });
    }

    /// Fuse elapsed: explode at the contact point behind the device.
    fn detonate<H: DeviceHost + ?Sized>(&mut self, host: &mut H) {
        self.state = DeviceState::Detonating;
        self.kill_beam(host);

        let tr = host.trace_line(
            self.position + self.facing * self.config.detonation_probe_front,
            self.position - self.facing * self.config.detonation_probe_back,
            TraceMask::Solid,
            &[self.id],
        );
        let (origin, normal, surface) = if tr.did_hit() {
            (
                tr.end_pos + tr.normal * BLAST_SURFACE_OFFSET,
                tr.normal,
                tr.entity,
            )
        } else {
            (self.position, -self.facing, None)
        };

        host.explode(Blast {
            origin,
            normal,
            surface,
            damage: self.config.blast_damage,
            radius: self.config.blast_radius,
            kind: DamageKind::Blast,
            attacker: self.credit_owner,
            inflictor: self.id,
        });
        info!(device = ?self.id, origin = ?origin, attacker = ?self.credit_owner, "detonated");
        host.report(DeviceEvent::Detonated {
            device: self.id,
            origin,
            attacker: self.credit_owner,
        });

        self.release(host, 0.0);
    }

    // --- Removal ---

    /// Leave the world after the configured removal delay.
    fn discard<H: DeviceHost + ?Sized>(&mut self, host: &mut H) {
        self.kill_beam(host);
        self.release(host, self.config.removal_delay_secs);
    }

    fn release<H: DeviceHost + ?Sized>(&mut self, host: &mut H, delay: f64) {
        self.state = DeviceState::Removed;
        self.next_think = None;
        self.attachment = None;
        self.attachment_pose = None;
        self.beam_coverage = None;
        host.remove(self.id, delay);
        host.report(DeviceEvent::Removed { device: self.id });
    }
}
