//! Entity types for the arena simulation.
//!
//! - [`ActorId`] / [`ItemId`]: opaque, monotonically assigned identifiers
//! - [`Actor`]: a circular combatant
//! - [`Item`]: a pickup (heal, weapon) or a permanent obstacle
//!
//! # Example
//!
//! ```
//! use sawclash_core::entity::{Actor, ActorId};
//! use sawclash_core::config::ActorConfig;
//!
//! let actor = Actor::new(ActorId::new(7), "Red", "#ff0000", None, &ActorConfig::default());
//!
//! assert_eq!(actor.id.as_u64(), 7);
//! assert!(actor.is_alive());
//! assert!(!actor.has_weapon);
//! ```

pub mod actor;
pub mod item;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use actor::Actor;
pub use item::{Item, ItemKind, ObstacleShape, ObstacleStyle};

/// Unique identifier for an actor.
///
/// Ids are assigned by the match controller in join order, so ordering by id
/// matches roster order.
///
/// # Example
///
/// ```
/// use sawclash_core::entity::ActorId;
///
/// let a = ActorId::new(1);
/// let b = ActorId::new(2);
///
/// assert!(a < b);
/// assert_eq!(a.to_string(), "actor:1");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates a new `ActorId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor:{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Unique identifier for an item.
///
/// Item ids grow with spawn order, which the spawner relies on for FIFO
/// eviction.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(u64);

impl ItemId {
    /// Creates a new `ItemId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item:{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_by_value() {
        assert!(ActorId::new(1) < ActorId::new(2));
        assert!(ItemId::new(10) > ItemId::new(9));
    }

    #[test]
    fn ids_format() {
        assert_eq!(format!("{:?}", ActorId::new(4)), "ActorId(4)");
        assert_eq!(ItemId::new(12).to_string(), "item:12");
    }

    #[test]
    fn ids_roundtrip_through_json() {
        let id = ActorId::from(99);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "99");
        let back: ActorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
