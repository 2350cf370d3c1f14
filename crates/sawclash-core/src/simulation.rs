//! The per-tick pipeline over a frame of actors and items.
//!
//! A tick runs in three phases:
//!
//! 1. **SNAPSHOT**: the current frame is frozen; nothing writes to it
//! 2. **RESOLUTION**: the next frame is cloned from current, then every
//!    resolver runs on it in order (physics, then collisions)
//! 3. **APPLY**: the buffers are swapped and the tick counter advances
//!
//! [`Simulation::step`] exposes the same pipeline as a pure function for
//! callers that manage their own frames.
//!
//! # Determinism
//!
//! Actors are visited in roster order and items in spawn order; all
//! randomness comes from the caller's [`SimRng`]. Given the same frame, delta
//! sequence and seed, the simulation produces identical frames and events.
//!
//! # Example
//!
//! ```
//! use sawclash_core::config::SimConfig;
//! use sawclash_core::entity::{Actor, ActorId};
//! use sawclash_core::rng::SimRng;
//! use sawclash_core::simulation::{Frame, Simulation};
//! use glam::Vec2;
//!
//! let config = SimConfig::default();
//! let sim = Simulation::new(&config);
//! let mut rng = SimRng::new(1);
//! let mut events = Vec::new();
//!
//! let mut actor = Actor::new(ActorId::new(1), "Red", "#f00", None, &config.actor);
//! actor.position = Vec2::new(200.0, 200.0);
//! actor.velocity = Vec2::new(2.0, 0.0);
//! let frame = Frame { players: vec![actor], items: Vec::new() };
//!
//! let next = sim.step(&frame, 16.0, &mut rng, &mut events);
//!
//! assert!(next.players[0].position.x > 200.0);
//! assert_eq!(frame.players[0].position.x, 200.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::arena::Arena;
use crate::config::SimConfig;
use crate::entity::{Actor, ActorId, Item};
use crate::event::SimEvent;
use crate::resolver::{CollisionResolver, PhysicsEngine, ResolveContext, Resolver};
use crate::rng::SimRng;

// =============================================================================
// Frame
// =============================================================================

/// Everything the resolvers operate on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Actors in roster order, eliminated ones included.
    pub players: Vec<Actor>,
    /// Live items in spawn order.
    pub items: Vec<Item>,
}

impl Frame {
    /// Actors that still have health.
    pub fn living(&self) -> impl Iterator<Item = &Actor> {
        self.players.iter().filter(|actor| actor.is_alive())
    }

    /// Looks up an actor by id.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.players.iter().find(|actor| actor.id == id)
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// Double-buffered tick pipeline.
///
/// # Double Buffering
///
/// - `current`: the frame the last tick produced; read-only during a tick
/// - `next`: scratch frame the resolvers write to
///
/// After each tick the buffers are swapped so no frame is reallocated.
pub struct Simulation {
    arena: Arena,
    current: Frame,
    next: Frame,
    resolvers: Vec<Box<dyn Resolver>>,
    tick: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("arena", &self.arena)
            .field("current", &self.current)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation with the standard resolvers and an empty frame.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        Self {
            arena: Arena::from_config(&config.arena),
            current: Frame::default(),
            next: Frame::default(),
            resolvers: vec![
                Box::new(PhysicsEngine::new(config.physics.clone())),
                Box::new(CollisionResolver::new(
                    config.physics.clone(),
                    config.actor.max_health,
                )),
            ],
            tick: 0,
        }
    }

    /// Runs every resolver over `frame` into `next`.
    fn resolve_into(
        &self,
        frame: &Frame,
        next: &mut Frame,
        delta_ms: f32,
        rng: &mut SimRng,
        events: &mut Vec<SimEvent>,
    ) {
        next.clone_from(frame);
        let mut ctx = ResolveContext {
            arena: &self.arena,
            delta_ms,
            rng,
            events,
        };
        for resolver in &self.resolvers {
            trace!(resolver = resolver.name(), "resolving");
            resolver.resolve(next, &mut ctx);
        }
    }

    /// Advances `frame` by one tick without touching it.
    ///
    /// Events produced by the tick are appended to `events`.
    #[must_use]
    pub fn step(
        &self,
        frame: &Frame,
        delta_ms: f32,
        rng: &mut SimRng,
        events: &mut Vec<SimEvent>,
    ) -> Frame {
        let mut next = Frame::default();
        self.resolve_into(frame, &mut next, delta_ms, rng, events);
        next
    }

    /// Advances the owned frame by one tick and swaps the buffers.
    pub fn advance(&mut self, delta_ms: f32, rng: &mut SimRng, events: &mut Vec<SimEvent>) {
        let mut next = std::mem::take(&mut self.next);
        self.resolve_into(&self.current, &mut next, delta_ms, rng, events);
        self.next = next;

        std::mem::swap(&mut self.current, &mut self.next);
        self.tick += 1;
    }

    /// Frame produced by the last tick.
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.current
    }

    /// Mutable access to the current frame, for setup between ticks.
    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.current
    }

    /// Arena geometry.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Ticks advanced since creation or the last [`Simulation::reset`].
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Clears both frames and the tick counter.
    pub fn reset(&mut self) {
        self.current = Frame::default();
        self.next = Frame::default();
        self.tick = 0;
    }

    /// Appends a resolver; resolvers run in insertion order.
    pub fn add_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    /// Number of resolvers in the pipeline.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
