//! The actor (player) entity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ActorId;
use crate::config::ActorConfig;

/// A circular combatant.
///
/// Health is kept in `0..=max_health`; an actor at zero health is eliminated.
/// Eliminated actors stay in the roster so the final standings can list
/// them, but physics and collision skip them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier assigned by the match controller.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Display color (opaque to the simulation).
    pub color: String,
    /// Optional avatar reference (opaque to the simulation).
    pub avatar: Option<String>,
    /// Remaining health.
    pub health: u8,
    /// Whether the actor carries a weapon.
    pub has_weapon: bool,
    /// Center position in arena coordinates.
    pub position: Vec2,
    /// Velocity in world units per nominal frame.
    pub velocity: Vec2,
    /// Collision radius.
    pub radius: f32,
}

impl Actor {
    /// Creates an actor at full health with no weapon, at rest at the origin.
    ///
    /// The controller assigns the starting position and velocity.
    #[must_use]
    pub fn new(
        id: ActorId,
        name: impl Into<String>,
        color: impl Into<String>,
        avatar: Option<String>,
        config: &ActorConfig,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            avatar,
            health: config.max_health,
            has_weapon: false,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: config.radius,
        }
    }

    /// Returns true while the actor has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Returns true once the actor has been eliminated.
    #[must_use]
    pub const fn is_eliminated(&self) -> bool {
        self.health == 0
    }

    /// Current speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Returns true if this actor's circle overlaps a circle at `center`.
    #[must_use]
    pub fn overlaps(&self, center: Vec2, radius: f32) -> bool {
        self.position.distance(center) < self.radius + radius
    }

    /// Removes one health point, saturating at zero.
    ///
    /// Returns true if this hit eliminated the actor.
    pub fn take_hit(&mut self) -> bool {
        let was_alive = self.is_alive();
        self.health = self.health.saturating_sub(1);
        was_alive && self.is_eliminated()
    }

    /// Adds one health point up to `max_health`.
    ///
    /// Returns true if health changed.
    pub fn heal(&mut self, max_health: u8) -> bool {
        if self.health < max_health {
            self.health += 1;
            true
        } else {
            false
        }
    }

    /// Removes the weapon, returning whether one was carried.
    pub fn disarm(&mut self) -> bool {
        std::mem::replace(&mut self.has_weapon, false)
    }

    /// Restores full health, drops the weapon and places the actor.
    pub fn reset(&mut self, max_health: u8, position: Vec2, velocity: Vec2) {
        self.health = max_health;
        self.has_weapon = false;
        self.position = position;
        self.velocity = velocity;
    }

    /// Returns true if position and velocity are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }

    /// Replaces non-finite kinematics with safe values.
    ///
    /// A broken position moves to `fallback`; a broken velocity becomes zero,
    /// which the integrator treats as a stall and re-kicks. Returns true if
    /// anything was repaired.
    pub fn repair(&mut self, fallback: Vec2) -> bool {
        let mut repaired = false;
        if !self.position.is_finite() {
            self.position = fallback;
            repaired = true;
        }
        if !self.velocity.is_finite() {
            self.velocity = Vec2::ZERO;
            repaired = true;
        }
        repaired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Actor {
        Actor::new(ActorId::new(1), "Red", "#ff0000", None, &ActorConfig::default())
    }

    #[test]
    fn new_actor_is_full_health_and_unarmed() {
        let a = actor();
        assert_eq!(a.health, 5);
        assert!(!a.has_weapon);
        assert!((a.radius - 20.0).abs() < f32::EPSILON);
        assert!(a.is_alive());
    }

    #[test]
    fn take_hit_saturates_at_zero() {
        let mut a = actor();
        a.health = 1;
        assert!(a.take_hit());
        assert_eq!(a.health, 0);
        assert!(!a.take_hit());
        assert_eq!(a.health, 0);
        assert!(a.is_eliminated());
    }

    #[test]
    fn heal_caps_at_max() {
        let mut a = actor();
        assert!(!a.heal(5));
        a.health = 3;
        assert!(a.heal(5));
        assert_eq!(a.health, 4);
    }

    #[test]
    fn disarm_reports_previous_state() {
        let mut a = actor();
        assert!(!a.disarm());
        a.has_weapon = true;
        assert!(a.disarm());
        assert!(!a.has_weapon);
    }

    #[test]
    fn overlap_uses_strict_inequality() {
        let mut a = actor();
        a.position = Vec2::new(100.0, 100.0);
        assert!(a.overlaps(Vec2::new(129.0, 100.0), 10.0));
        assert!(!a.overlaps(Vec2::new(130.0, 100.0), 10.0));
    }

    #[test]
    fn repair_fixes_non_finite_kinematics() {
        let mut a = actor();
        a.position = Vec2::new(f32::NAN, 3.0);
        a.velocity = Vec2::new(f32::INFINITY, 0.0);
        assert!(a.repair(Vec2::new(200.0, 200.0)));
        assert_eq!(a.position, Vec2::new(200.0, 200.0));
        assert_eq!(a.velocity, Vec2::ZERO);
        assert!(!a.repair(Vec2::ZERO));
    }

    #[test]
    fn reset_restores_match_start_state() {
        let mut a = actor();
        a.health = 1;
        a.has_weapon = true;
        a.reset(5, Vec2::new(50.0, 60.0), Vec2::new(1.2, 0.0));
        assert_eq!(a.health, 5);
        assert!(!a.has_weapon);
        assert_eq!(a.position, Vec2::new(50.0, 60.0));
    }
}
