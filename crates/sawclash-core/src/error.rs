//! Error types for the simulation.
//!
//! - [`ConfigError`]: fatal, raised before any match exists.
//! - [`MatchError`]: a lobby command was rejected; match state is unchanged.
//! - [`StepFault`]: one actor or pair could not be advanced this tick. Faults
//!   never escape a tick; the simulation keeps the unit's previous state and
//!   reports the fault as a diagnostic event.

use thiserror::Error;

use crate::entity::{ActorId, ItemKind};

/// Invalid simulation configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Arena dimensions are not finite or the border is negative.
    #[error("invalid arena {width}x{height} with border {border}")]
    InvalidArena {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
        /// Configured border.
        border: f32,
    },
    /// An actor cannot fit inside the arena.
    #[error("arena {width}x{height} is too small for an actor (needs more than {needed})")]
    ArenaTooSmall {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
        /// Minimum extent required on each axis.
        needed: f32,
    },
    /// Actor radius is zero, negative or not finite.
    #[error("invalid actor radius {0}")]
    InvalidRadius(f32),
    /// Actors would start eliminated.
    #[error("max health must be at least 1")]
    ZeroMaxHealth,
    /// Speed band is empty or non-positive.
    #[error("invalid speed band [{min}, {max}]")]
    InvalidSpeedBand {
        /// Configured minimum speed.
        min: f32,
        /// Configured maximum speed.
        max: f32,
    },
    /// A scalar constant is outside its legal range.
    #[error("{field} out of range: {value}")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// Scheduling constants for an item kind are unusable.
    #[error("invalid scheduling constants for {0:?}")]
    InvalidItemKind(ItemKind),
    /// The global item cap leaves no room for pickups next to the obstacles.
    #[error("max_items {max_items} must exceed the obstacle count {obstacles}")]
    ItemCapTooSmall {
        /// Configured global cap.
        max_items: usize,
        /// Largest possible number of permanent obstacles.
        obstacles: usize,
    },
    /// Obstacle palette has no colors.
    #[error("obstacle color palette is empty")]
    EmptyPalette,
    /// Roster bounds are unusable.
    #[error("invalid roster bounds: min {min}, max {max}")]
    InvalidRoster {
        /// Configured minimum.
        min: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Matches would end immediately.
    #[error("match duration must be positive")]
    ZeroDuration,
}

/// A lobby or lifecycle command that was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The command is only valid in the lobby.
    #[error("command requires the lobby, match is {0}")]
    NotInLobby(&'static str),
    /// A start is already counting down.
    #[error("match start already pending")]
    StartPending,
    /// Not enough players to start.
    #[error("need at least {required} players, have {present}")]
    NotEnoughPlayers {
        /// Configured minimum.
        required: usize,
        /// Current roster size.
        present: usize,
    },
    /// Roster is full.
    #[error("roster is full ({0} players)")]
    RosterFull(usize),
    /// Player names must contain a visible character.
    #[error("player name is blank")]
    BlankName,
    /// No player with this id.
    #[error("unknown player {0}")]
    UnknownPlayer(ActorId),
}

/// A unit of simulation work that could not be completed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepFault {
    /// Integrating an actor produced a non-finite position or velocity.
    #[error("physics step for {actor} produced non-finite state")]
    NonFinitePhysics {
        /// Actor whose step failed.
        actor: ActorId,
    },
    /// Resolving a pair produced a non-finite position or velocity.
    #[error("collision between {first} and {second} produced non-finite state")]
    NonFiniteCollision {
        /// First actor of the pair.
        first: ActorId,
        /// Second actor of the pair.
        second: ActorId,
    },
    /// Resolving an obstacle bounce produced a non-finite state.
    #[error("obstacle bounce for {actor} produced non-finite state")]
    NonFiniteBounce {
        /// Actor whose bounce failed.
        actor: ActorId,
    },
}

impl StepFault {
    /// Actor primarily affected by the fault.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        match self {
            Self::NonFinitePhysics { actor } | Self::NonFiniteBounce { actor } => *actor,
            Self::NonFiniteCollision { first, .. } => *first,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_messages() {
        let err = MatchError::NotEnoughPlayers {
            required: 2,
            present: 1,
        };
        assert_eq!(err.to_string(), "need at least 2 players, have 1");

        let fault = StepFault::NonFinitePhysics {
            actor: ActorId::new(3),
        };
        assert_eq!(fault.actor(), ActorId::new(3));
        assert!(fault.to_string().contains('3'));
    }
}
