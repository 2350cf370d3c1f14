//! Per-actor motion integration.
//!
//! The `PhysicsEngine` advances every living actor by one frame:
//!
//! 1. Repair non-finite kinematics (logged, never fatal)
//! 2. Re-kick stalled actors in a random direction
//! 3. Apply friction, then clamp speed into the band
//! 4. Integrate: `position += velocity * (delta / nominal frame) * pace`
//! 5. Reflect off the arena walls, one edge at a time
//! 6. Clamp speed into the band again
//!
//! # Frame Delta
//!
//! Velocities are expressed in units per nominal 60 Hz frame. The delta is
//! clamped to `[0, max_frame_delta_ms]` so a long host stall cannot tunnel an
//! actor through a wall.

use glam::Vec2;
use tracing::debug;

use crate::arena::Arena;
use crate::config::{PhysicsConfig, NOMINAL_FRAME_MS};
use crate::entity::Actor;
use crate::error::StepFault;
use crate::event::FaultStage;
use crate::rng::SimRng;
use crate::simulation::Frame;

use super::{ResolveContext, Resolver};

/// Integrates actor motion and wall bounces.
///
/// # Example
///
/// ```
/// use sawclash_core::arena::Arena;
/// use sawclash_core::config::{ActorConfig, PhysicsConfig};
/// use sawclash_core::entity::{Actor, ActorId};
/// use sawclash_core::resolver::PhysicsEngine;
/// use sawclash_core::rng::SimRng;
/// use glam::Vec2;
///
/// let engine = PhysicsEngine::new(PhysicsConfig::default());
/// let arena = Arena::default();
/// let mut rng = SimRng::new(1);
///
/// let mut actor = Actor::new(ActorId::new(1), "Red", "#f00", None, &ActorConfig::default());
/// actor.position = Vec2::new(200.0, 200.0);
/// actor.velocity = Vec2::new(2.0, 0.0);
///
/// let next = engine.step_actor(&actor, &arena, 1000.0 / 60.0, &mut rng).unwrap();
/// assert!(next.position.x > 200.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PhysicsEngine {
    config: PhysicsConfig,
}

impl PhysicsEngine {
    /// Creates an engine with the given constants.
    #[must_use]
    pub const fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    /// Constants in use.
    #[must_use]
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Converts a frame delta into nominal frames.
    ///
    /// A non-finite delta is passed through so the step reports it as a fault.
    #[must_use]
    pub fn frame_scale(&self, delta_ms: f32) -> f32 {
        if delta_ms.is_finite() {
            delta_ms.clamp(0.0, self.config.max_frame_delta_ms) / NOMINAL_FRAME_MS
        } else {
            delta_ms
        }
    }

    /// Rescales a velocity into `[min_speed, max_speed]`.
    ///
    /// A zero velocity has no direction to rescale; it is returned unchanged.
    #[must_use]
    pub fn clamp_speed(&self, velocity: Vec2) -> Vec2 {
        let speed = velocity.length();
        if speed <= f32::EPSILON {
            velocity
        } else if speed < self.config.min_speed {
            velocity * (self.config.min_speed / speed)
        } else if speed > self.config.max_speed {
            velocity * (self.config.max_speed / speed)
        } else {
            velocity
        }
    }

    /// Advances one actor by one frame.
    ///
    /// Eliminated actors are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StepFault::NonFinitePhysics`] if the step produced a
    /// non-finite position or velocity. The caller keeps the previous actor.
    pub fn step_actor(
        &self,
        actor: &Actor,
        arena: &Arena,
        delta_ms: f32,
        rng: &mut SimRng,
    ) -> Result<Actor, StepFault> {
        if actor.is_eliminated() {
            return Ok(actor.clone());
        }

        let mut next = actor.clone();
        if next.repair(arena.center()) {
            debug!(actor = %next.id, "repaired non-finite kinematics");
        }

        let cfg = &self.config;
        let mut velocity = next.velocity;

        if velocity.length() < cfg.stall_threshold {
            let speed = rng.range(cfg.min_speed, cfg.min_speed + cfg.stall_jitter);
            velocity = rng.direction() * speed;
        }

        velocity = self.clamp_speed(velocity * cfg.friction);
        next.position += velocity * self.frame_scale(delta_ms) * cfg.pace;
        next.velocity = velocity;

        self.reflect_off_walls(&mut next, arena, rng);
        next.velocity = self.enforce_band(next.velocity, rng);

        if !next.is_finite() {
            return Err(StepFault::NonFinitePhysics { actor: actor.id });
        }
        Ok(next)
    }

    /// Reflects an actor that reached or crossed an edge.
    ///
    /// The center is placed one unit inside the legal range, the perpendicular
    /// component points inward scaled by restitution, and the tangential
    /// component is damped with a small random perturbation.
    pub fn reflect_off_walls(&self, actor: &mut Actor, arena: &Arena, rng: &mut SimRng) {
        let cfg = &self.config;
        let min = arena.min_center(actor.radius);
        let max = arena.max_center(actor.radius);

        if actor.position.x <= min.x {
            actor.position.x = min.x + 1.0;
            actor.velocity.x = actor.velocity.x.abs() * cfg.restitution;
            actor.velocity.y = actor.velocity.y * cfg.angular_damping + rng.jitter(cfg.wall_jitter);
        } else if actor.position.x >= max.x {
            actor.position.x = max.x - 1.0;
            actor.velocity.x = -actor.velocity.x.abs() * cfg.restitution;
            actor.velocity.y = actor.velocity.y * cfg.angular_damping + rng.jitter(cfg.wall_jitter);
        }

        if actor.position.y <= min.y {
            actor.position.y = min.y + 1.0;
            actor.velocity.y = actor.velocity.y.abs() * cfg.restitution;
            actor.velocity.x = actor.velocity.x * cfg.angular_damping + rng.jitter(cfg.wall_jitter);
        } else if actor.position.y >= max.y {
            actor.position.y = max.y - 1.0;
            actor.velocity.y = -actor.velocity.y.abs() * cfg.restitution;
            actor.velocity.x = actor.velocity.x * cfg.angular_damping + rng.jitter(cfg.wall_jitter);
        }
    }

    /// Clamps into the speed band, re-kicking a velocity that collapsed to zero.
    ///
    /// Every resolver that changes a velocity finishes with this, so actors
    /// leave each stage within `[min_speed, max_speed]`.
    #[must_use]
    pub fn enforce_band(&self, velocity: Vec2, rng: &mut SimRng) -> Vec2 {
        if velocity.length() <= f32::EPSILON {
            rng.direction() * self.config.min_speed
        } else {
            self.clamp_speed(velocity)
        }
    }
}

impl Resolver for PhysicsEngine {
    fn name(&self) -> &'static str {
        "physics"
    }

    fn resolve(&self, frame: &mut Frame, ctx: &mut ResolveContext<'_>) {
        for slot in &mut frame.players {
            match self.step_actor(slot, ctx.arena, ctx.delta_ms, ctx.rng) {
                Ok(next) => *slot = next,
                Err(fault) => ctx.report_fault(FaultStage::Physics, &fault),
            }
        }
    }
}
