//! Contact resolution: actor-actor, actor-pickup and actor-obstacle.
//!
//! # Processing Order
//!
//! 1. Every overlapping actor pair, in ascending roster index order `(i, j)`
//!    with `i < j`. Each pair sees the state left by earlier pairs, so an
//!    actor eliminated earlier in the tick is skipped by later pairs.
//! 2. Pickups: actors in roster order consume every heal or weapon they
//!    overlap. An item is consumed by at most one actor.
//! 3. Obstacles: each living actor bounces off at most one obstacle (the
//!    first it overlaps in item order).
//!
//! # Weapon Rule
//!
//! | first armed | second armed | result                                      |
//! |-------------|--------------|---------------------------------------------|
//! | yes         | yes          | `Cancel`: both disarmed, no damage          |
//! | yes         | no           | `Hit`: first disarmed, second loses 1 health |
//! | no          | yes          | `Hit`: second disarmed, first loses 1 health |
//! | no          | no           | `Bounce`: no state change                   |

use glam::Vec2;
use tracing::debug;

use crate::arena::Arena;
use crate::config::PhysicsConfig;
use crate::entity::{Actor, Item, ItemKind};
use crate::error::StepFault;
use crate::event::{CollisionKind, FaultStage, SimEvent};
use crate::rng::SimRng;
use crate::simulation::Frame;

use super::{PhysicsEngine, ResolveContext, Resolver};

/// Extra separation added on top of the measured overlap.
const SEPARATION_SLOP: f32 = 0.01;

/// Outcome of one actor-actor collision.
#[derive(Debug, Clone, PartialEq)]
pub struct PairResolution {
    /// First actor after separation, impulse and weapon rule.
    pub first: Actor,
    /// Second actor after separation, impulse and weapon rule.
    pub second: Actor,
    /// Weapon rule result.
    pub kind: CollisionKind,
    /// Midpoint of the two centers before separation.
    pub point: Vec2,
}

/// Applies the weapon rule to a colliding pair.
///
/// Health never drops below zero. Runs after the physical response, so the
/// rule sees exactly the weapon flags the pair carried into the contact.
///
/// # Example
///
/// ```
/// use sawclash_core::config::ActorConfig;
/// use sawclash_core::entity::{Actor, ActorId};
/// use sawclash_core::event::CollisionKind;
/// use sawclash_core::resolver::apply_weapon_rule;
///
/// let config = ActorConfig::default();
/// let mut red = Actor::new(ActorId::new(1), "Red", "#f00", None, &config);
/// let mut blue = Actor::new(ActorId::new(2), "Blue", "#00f", None, &config);
/// red.has_weapon = true;
///
/// let kind = apply_weapon_rule(&mut red, &mut blue);
///
/// assert_eq!(kind, CollisionKind::Hit { attacker: red.id, victim: blue.id });
/// assert!(!red.has_weapon);
/// assert_eq!(blue.health, 4);
/// ```
pub fn apply_weapon_rule(first: &mut Actor, second: &mut Actor) -> CollisionKind {
    match (first.has_weapon, second.has_weapon) {
        (true, true) => {
            first.disarm();
            second.disarm();
            CollisionKind::Cancel
        }
        (true, false) => {
            first.disarm();
            second.take_hit();
            CollisionKind::Hit {
                attacker: first.id,
                victim: second.id,
            }
        }
        (false, true) => {
            second.disarm();
            first.take_hit();
            CollisionKind::Hit {
                attacker: second.id,
                victim: first.id,
            }
        }
        (false, false) => CollisionKind::Bounce,
    }
}

/// Resolves every contact after integration.
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    engine: PhysicsEngine,
    max_health: u8,
}

impl CollisionResolver {
    /// Creates a resolver.
    ///
    /// # Arguments
    ///
    /// * `physics` - Restitution, separation split and obstacle constants
    /// * `max_health` - Ceiling for heal pickups
    #[must_use]
    pub const fn new(physics: PhysicsConfig, max_health: u8) -> Self {
        Self {
            engine: PhysicsEngine::new(physics),
            max_health,
        }
    }

    /// Pushes an overlapping pair apart along `normal` and keeps both inside
    /// the arena.
    ///
    /// The push is split between the actors. If a wall absorbs one actor's
    /// share, the shortfall along the normal is moved onto the other actor.
    fn separate(&self, a: &mut Actor, b: &mut Actor, normal: Vec2, target: f32, arena: &Arena) {
        let overlap = target - (a.position - b.position).dot(normal);
        let split = self.engine.config().separation_split;

        a.position = arena.clamp_circle(a.position + normal * overlap * split, a.radius);
        b.position = arena.clamp_circle(b.position - normal * overlap * (1.0 - split), b.radius);

        let shortfall = target - (a.position - b.position).dot(normal);
        if shortfall > 0.0 {
            b.position = arena.clamp_circle(b.position - normal * shortfall, b.radius);
        }
        let shortfall = target - (a.position - b.position).dot(normal);
        if shortfall > 0.0 {
            a.position = arena.clamp_circle(a.position + normal * shortfall, a.radius);
        }
    }

    /// Resolves one actor pair.
    ///
    /// Returns `Ok(None)` if the actors do not overlap or either one is
    /// eliminated. Otherwise the pair is pushed apart along the contact
    /// normal (a random normal if the centers coincide) without leaving the
    /// arena, given an equal-mass impulse if approaching, brought back into
    /// the speed band and then judged by [`apply_weapon_rule`].
    ///
    /// # Errors
    ///
    /// Returns [`StepFault::NonFiniteCollision`] if the response produced a
    /// non-finite value. Both actors keep their previous state.
    pub fn resolve_pair(
        &self,
        first: &Actor,
        second: &Actor,
        arena: &Arena,
        rng: &mut SimRng,
    ) -> Result<Option<PairResolution>, StepFault> {
        if first.is_eliminated() || second.is_eliminated() {
            return Ok(None);
        }

        let delta = first.position - second.position;
        let distance = delta.length();
        let min_distance = first.radius + second.radius;
        if distance >= min_distance {
            return Ok(None);
        }

        let normal = if distance > f32::EPSILON {
            delta / distance
        } else {
            rng.direction()
        };
        let point = (first.position + second.position) / 2.0;

        let mut a = first.clone();
        let mut b = second.clone();

        self.separate(&mut a, &mut b, normal, min_distance + SEPARATION_SLOP, arena);

        let approach = (a.velocity - b.velocity).dot(normal);
        if approach < 0.0 {
            let impulse = -(1.0 + self.engine.config().restitution) * approach / 2.0;
            a.velocity += normal * impulse;
            b.velocity -= normal * impulse;
        }
        a.velocity = self.engine.enforce_band(a.velocity, rng);
        b.velocity = self.engine.enforce_band(b.velocity, rng);

        let kind = apply_weapon_rule(&mut a, &mut b);

        if !(a.is_finite() && b.is_finite() && point.is_finite()) {
            return Err(StepFault::NonFiniteCollision {
                first: first.id,
                second: second.id,
            });
        }

        Ok(Some(PairResolution {
            first: a,
            second: b,
            kind,
            point,
        }))
    }

    /// Resolves every overlapping pair in roster order.
    pub fn resolve_pairs(
        &self,
        players: &mut [Actor],
        arena: &Arena,
        rng: &mut SimRng,
        events: &mut Vec<SimEvent>,
        faults: &mut Vec<StepFault>,
    ) {
        for i in 0..players.len() {
            for j in (i + 1)..players.len() {
                match self.resolve_pair(&players[i], &players[j], arena, rng) {
                    Ok(Some(resolution)) => {
                        debug!(
                            first = %resolution.first.id,
                            second = %resolution.second.id,
                            kind = resolution.kind.label(),
                            "collision"
                        );
                        events.push(SimEvent::Collision {
                            kind: resolution.kind,
                            point: resolution.point,
                            first: resolution.first.id,
                            second: resolution.second.id,
                        });
                        players[i] = resolution.first;
                        players[j] = resolution.second;
                    }
                    Ok(None) => {}
                    Err(fault) => faults.push(fault),
                }
            }
        }
    }

    /// Lets actors consume the pickups they overlap.
    ///
    /// A heal at full health is still consumed. Obstacles are left alone.
    pub fn resolve_pickups(
        &self,
        players: &mut [Actor],
        items: &mut Vec<Item>,
        events: &mut Vec<SimEvent>,
    ) {
        for actor in players.iter_mut().filter(|a| a.is_alive()) {
            let mut index = 0;
            while index < items.len() {
                let item = &items[index];
                if !item.kind.is_consumable() || !actor.overlaps(item.position, item.radius) {
                    index += 1;
                    continue;
                }

                let item = items.remove(index);
                match item.kind {
                    ItemKind::Heal => {
                        let effective = actor.heal(self.max_health);
                        events.push(SimEvent::HealPickup {
                            actor: actor.id,
                            item: item.id,
                            point: item.position,
                            health: actor.health,
                            effective,
                        });
                    }
                    ItemKind::Weapon => {
                        actor.has_weapon = true;
                        events.push(SimEvent::WeaponPickup {
                            actor: actor.id,
                            item: item.id,
                            point: item.position,
                        });
                    }
                    ItemKind::Obstacle => {}
                }
                debug!(actor = %actor.id, item = %item.id, kind = %item.kind, "pickup");
            }
        }
    }

    /// Bounces one actor off an obstacle it overlaps.
    ///
    /// The actor is pushed out along the center line by the overlap plus the
    /// configured push, its velocity is reflected about the contact normal,
    /// amplified, jittered and brought back into the speed band.
    ///
    /// # Errors
    ///
    /// Returns [`StepFault::NonFiniteBounce`] if the bounce produced a
    /// non-finite value.
    pub fn bounce_off_obstacle(
        &self,
        actor: &Actor,
        obstacle: &Item,
        arena: &Arena,
        rng: &mut SimRng,
    ) -> Result<Actor, StepFault> {
        let cfg = self.engine.config();
        let delta = actor.position - obstacle.position;
        let distance = delta.length();
        let normal = if distance > f32::EPSILON {
            delta / distance
        } else {
            rng.direction()
        };
        let overlap = (actor.radius + obstacle.radius - distance).max(0.0);

        let mut next = actor.clone();
        next.position = arena.clamp_circle(
            actor.position + normal * (overlap + cfg.obstacle_push),
            actor.radius,
        );

        let reflected = actor.velocity - 2.0 * actor.velocity.dot(normal) * normal;
        let kicked = reflected * cfg.obstacle_bounce_multiplier
            + Vec2::new(rng.jitter(cfg.obstacle_jitter), rng.jitter(cfg.obstacle_jitter));
        next.velocity = self.engine.enforce_band(kicked, rng);

        if !next.is_finite() {
            return Err(StepFault::NonFiniteBounce { actor: actor.id });
        }
        Ok(next)
    }

    /// Bounces each living actor off the first obstacle it overlaps.
    pub fn resolve_obstacles(
        &self,
        players: &mut [Actor],
        items: &[Item],
        arena: &Arena,
        rng: &mut SimRng,
        events: &mut Vec<SimEvent>,
        faults: &mut Vec<StepFault>,
    ) {
        for slot in players.iter_mut().filter(|a| a.is_alive()) {
            let Some(obstacle) = items
                .iter()
                .filter(|item| item.kind == ItemKind::Obstacle)
                .find(|item| slot.overlaps(item.position, item.radius))
            else {
                continue;
            };

            match self.bounce_off_obstacle(slot, obstacle, arena, rng) {
                Ok(next) => {
                    events.push(SimEvent::ObstacleBounce {
                        actor: next.id,
                        obstacle: obstacle.id,
                        point: next.position,
                    });
                    *slot = next;
                }
                Err(fault) => faults.push(fault),
            }
        }
    }
}

impl Resolver for CollisionResolver {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn resolve(&self, frame: &mut Frame, ctx: &mut ResolveContext<'_>) {
        let mut faults = Vec::new();
        self.resolve_pairs(&mut frame.players, ctx.arena, ctx.rng, ctx.events, &mut faults);
        for fault in faults.drain(..) {
            ctx.report_fault(FaultStage::Collision, &fault);
        }

        self.resolve_pickups(&mut frame.players, &mut frame.items, ctx.events);

        self.resolve_obstacles(
            &mut frame.players,
            &frame.items,
            ctx.arena,
            ctx.rng,
            ctx.events,
            &mut faults,
        );
        for fault in faults.drain(..) {
            ctx.report_fault(FaultStage::Obstacle, &fault);
        }
    }
}
