//! # SawClash Core
//!
//! Deterministic 2D arena-combat simulation.
//!
//! Circular actors bounce around a bordered arena, pick up weapons and heals,
//! ricochet off obstacles and knock health off each other until one is left
//! standing or the match clock runs out.
//!
//! ## Architecture
//!
//! - **Entities**: actors and items ([`entity`])
//! - **Resolvers**: physics integration and contact resolution ([`resolver`])
//! - **Simulation**: the double-buffered tick pipeline ([`simulation`])
//! - **Spawner**: the item economy ([`spawner`])
//! - **Controller**: lobby, countdown, play and resolution ([`controller`])
//!
//! Rendering, lobby UI and networking are external; they consume
//! [`controller::MatchSnapshot`] and [`event::SimEvent`] values.
//!
//! ## Usage
//!
//! ```
//! use sawclash_core::clock::ManualClock;
//! use sawclash_core::config::SimConfig;
//! use sawclash_core::controller::MatchController;
//!
//! let clock = ManualClock::new();
//! let mut controller =
//!     MatchController::new(SimConfig::default(), 42, Box::new(clock.clone())).unwrap();
//!
//! controller.add_player("Red", "#e53935", None).unwrap();
//! controller.add_player("Blue", "#1e88e5", None).unwrap();
//! controller.start().unwrap();
//!
//! while controller.tick().outcome.is_none() {
//!     clock.advance(16);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod clock;
pub mod config;
pub mod controller;
pub mod entity;
pub mod error;
pub mod event;
pub mod resolver;
pub mod rng;
pub mod simulation;
pub mod spawner;

pub use arena::Arena;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SimConfig;
pub use controller::{MatchController, MatchSnapshot, MatchState, Outcome, TickReport};
pub use entity::{Actor, ActorId, Item, ItemId, ItemKind};
pub use error::{ConfigError, MatchError, StepFault};
pub use event::{CollisionKind, SimEvent};
pub use rng::SimRng;
pub use simulation::{Frame, Simulation};
pub use spawner::ItemSpawner;

#[cfg(test)]
mod tests;
