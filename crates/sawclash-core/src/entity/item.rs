//! Pickups and obstacles.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ItemId;

/// Item classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Restores one health point; consumed on contact.
    Heal,
    /// Arms the actor; consumed on contact.
    Weapon,
    /// Permanent bounce surface.
    Obstacle,
}

impl ItemKind {
    /// All kinds, in scheduling order.
    pub const ALL: [Self; 3] = [Self::Heal, Self::Weapon, Self::Obstacle];

    /// Returns true for kinds that are removed when an actor touches them.
    #[must_use]
    pub const fn is_consumable(self) -> bool {
        !matches!(self, Self::Obstacle)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heal => write!(f, "Heal"),
            Self::Weapon => write!(f, "Weapon"),
            Self::Obstacle => write!(f, "Obstacle"),
        }
    }
}

/// Obstacle outline, for rendering only.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Smooth outline.
    Round,
    /// Irregular outline.
    Jagged,
}

/// Rendering payload carried by obstacles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleStyle {
    /// Fill color.
    pub color: String,
    /// Outline variant.
    pub shape: ObstacleShape,
}

/// A pickup or obstacle lying in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier assigned by the spawner.
    pub id: ItemId,
    /// What the item does on contact.
    pub kind: ItemKind,
    /// Center position.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Spawn timestamp in match-clock milliseconds.
    pub spawned_at_ms: u64,
    /// Rendering payload; present only on obstacles.
    pub style: Option<ObstacleStyle>,
}

impl Item {
    /// Creates a heal or weapon pickup.
    #[must_use]
    pub fn pickup(id: ItemId, kind: ItemKind, position: Vec2, radius: f32, now_ms: u64) -> Self {
        debug_assert!(kind.is_consumable());
        Self {
            id,
            kind,
            position,
            radius,
            spawned_at_ms: now_ms,
            style: None,
        }
    }

    /// Creates an obstacle.
    #[must_use]
    pub fn obstacle(
        id: ItemId,
        position: Vec2,
        radius: f32,
        now_ms: u64,
        style: ObstacleStyle,
    ) -> Self {
        Self {
            id,
            kind: ItemKind::Obstacle,
            position,
            radius,
            spawned_at_ms: now_ms,
            style: Some(style),
        }
    }

    /// Milliseconds since the item spawned.
    #[must_use]
    pub const fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.spawned_at_ms)
    }

    /// Returns true if a consumable item has outlived `lifetime_ms`.
    ///
    /// Obstacles never expire.
    #[must_use]
    pub const fn is_expired(&self, now_ms: u64, lifetime_ms: u64) -> bool {
        self.kind.is_consumable() && self.age_ms(now_ms) > lifetime_ms
    }
}
