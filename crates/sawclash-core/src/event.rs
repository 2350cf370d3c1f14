//! Events emitted by a simulation tick.
//!
//! Events are notifications of things that already happened. They never feed
//! back into the simulation; the renderer uses them for effects and the host
//! uses them for logging and diagnostics.
//!
//! # Example
//!
//! ```
//! use sawclash_core::event::{CollisionKind, SimEvent};
//! use sawclash_core::entity::ActorId;
//! use glam::Vec2;
//!
//! let event = SimEvent::Collision {
//!     kind: CollisionKind::Hit { attacker: ActorId::new(1), victim: ActorId::new(2) },
//!     point: Vec2::new(100.0, 100.0),
//!     first: ActorId::new(1),
//!     second: ActorId::new(2),
//! };
//!
//! assert_eq!(event.label(), "hit");
//! assert!(event.involves(ActorId::new(2)));
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::controller::Outcome;
use crate::entity::{ActorId, ItemId, ItemKind};

/// Result of the weapon rule for one actor-actor collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Both actors were armed; both weapons were destroyed.
    Cancel,
    /// One armed actor struck an unarmed one.
    Hit {
        /// Actor that carried the weapon.
        attacker: ActorId,
        /// Actor that lost a health point.
        victim: ActorId,
    },
    /// Neither actor was armed.
    Bounce,
}

impl CollisionKind {
    /// Short name used by effect layers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Hit { .. } => "hit",
            Self::Bounce => "bounce",
        }
    }
}

/// Why an item left the arena without being picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Outlived its lifetime.
    Expired,
    /// Oldest item evicted to respect the global cap.
    Evicted,
}

/// Stage of the tick in which a fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultStage {
    /// Per-actor integration.
    Physics,
    /// Actor-actor resolution.
    Collision,
    /// Actor-obstacle resolution.
    Obstacle,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Two actors collided.
    Collision {
        /// Weapon rule outcome.
        kind: CollisionKind,
        /// Midpoint between the two centers at contact.
        point: Vec2,
        /// Actor with the lower roster index.
        first: ActorId,
        /// Actor with the higher roster index.
        second: ActorId,
    },
    /// An actor bounced off an obstacle.
    ObstacleBounce {
        /// Actor that bounced.
        actor: ActorId,
        /// Obstacle that was hit.
        obstacle: ItemId,
        /// Actor position after separation.
        point: Vec2,
    },
    /// An actor consumed a heal.
    HealPickup {
        /// Actor that consumed it.
        actor: ActorId,
        /// Item consumed.
        item: ItemId,
        /// Item position.
        point: Vec2,
        /// Health after the pickup.
        health: u8,
        /// False if the actor was already at full health.
        effective: bool,
    },
    /// An actor picked up a weapon.
    WeaponPickup {
        /// Actor that picked it up.
        actor: ActorId,
        /// Item consumed.
        item: ItemId,
        /// Item position.
        point: Vec2,
    },
    /// The spawner placed an item.
    ItemSpawned {
        /// New item.
        item: ItemId,
        /// Its kind.
        kind: ItemKind,
        /// Its position.
        point: Vec2,
    },
    /// An item left the arena uncollected.
    ItemRemoved {
        /// Removed item.
        item: ItemId,
        /// Its kind.
        kind: ItemKind,
        /// Why it was removed.
        reason: RemovalReason,
    },
    /// A due heal spawn was suppressed by the rarity gate.
    HealSkipped,
    /// The late-match weapon burst was scheduled.
    WeaponBlitz {
        /// Number of batches scheduled.
        batches: u32,
    },
    /// Lobby countdown progressed.
    Countdown {
        /// Whole seconds left before the match starts.
        seconds_left: u64,
    },
    /// The match began.
    MatchStarted {
        /// Number of actors in the match.
        players: usize,
    },
    /// The match ended this tick.
    MatchEnded {
        /// Final outcome.
        outcome: Outcome,
    },
    /// A unit of work failed and was skipped.
    Fault {
        /// Tick stage.
        stage: FaultStage,
        /// Affected actor.
        actor: ActorId,
        /// Rendered error.
        message: String,
    },
}

impl SimEvent {
    /// Short name for logging and effect lookup.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Collision { kind, .. } => kind.label(),
            Self::ObstacleBounce { .. } => "obstacle_bounce",
            Self::HealPickup { .. } => "heal",
            Self::WeaponPickup { .. } => "weapon_pickup",
            Self::ItemSpawned { .. } => "item_spawned",
            Self::ItemRemoved { .. } => "item_removed",
            Self::HealSkipped => "heal_skipped",
            Self::WeaponBlitz { .. } => "weapon_blitz",
            Self::Countdown { .. } => "countdown",
            Self::MatchStarted { .. } => "match_started",
            Self::MatchEnded { .. } => "match_ended",
            Self::Fault { .. } => "fault",
        }
    }

    /// Returns true if the event concerns `actor`.
    #[must_use]
    pub fn involves(&self, actor: ActorId) -> bool {
        match self {
            Self::Collision { first, second, .. } => *first == actor || *second == actor,
            Self::ObstacleBounce { actor: a, .. }
            | Self::HealPickup { actor: a, .. }
            | Self::WeaponPickup { actor: a, .. }
            | Self::Fault { actor: a, .. } => *a == actor,
            _ => false,
        }
    }

    /// Returns true for diagnostic events.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }
}
