//! Resolvers advance a frame through one stage of the tick.
//!
//! The simulation runs its resolvers in a fixed order on the `next` frame
//! buffer:
//!
//! 1. [`PhysicsEngine`]: integrate every living actor and bounce it off the
//!    arena walls
//! 2. [`CollisionResolver`]: actor-actor pairs (with the weapon rule), then
//!    pickups, then obstacles
//!
//! # Invariants
//!
//! - Each resolver works unit by unit (one actor, one pair) through pure
//!   functions that return new values; the resolver then writes them into the
//!   frame.
//! - A unit that fails is skipped: its previous state is kept, a
//!   [`SimEvent::Fault`] is emitted and the rest of the stage continues.
//! - Resolvers are deterministic given the same frame, delta and RNG state.

mod collision;
mod physics;

pub use collision::{apply_weapon_rule, CollisionResolver, PairResolution};
pub use physics::PhysicsEngine;

use tracing::warn;

use crate::arena::Arena;
use crate::error::StepFault;
use crate::event::{FaultStage, SimEvent};
use crate::rng::SimRng;
use crate::simulation::Frame;

/// Shared, per-tick inputs handed to every resolver.
#[derive(Debug)]
pub struct ResolveContext<'a> {
    /// Arena geometry.
    pub arena: &'a Arena,
    /// Milliseconds since the previous tick.
    pub delta_ms: f32,
    /// Random source for jitter and tie-breaks.
    pub rng: &'a mut SimRng,
    /// Sink for everything the stage produced.
    pub events: &'a mut Vec<SimEvent>,
}

impl ResolveContext<'_> {
    /// Records a skipped unit.
    pub fn report_fault(&mut self, stage: FaultStage, fault: &StepFault) {
        warn!(?stage, %fault, "simulation unit skipped");
        self.events.push(SimEvent::Fault {
            stage,
            actor: fault.actor(),
            message: fault.to_string(),
        });
    }
}

/// One stage of the tick pipeline.
///
/// # Example
///
/// ```
/// use sawclash_core::resolver::{ResolveContext, Resolver};
/// use sawclash_core::simulation::Frame;
///
/// struct Noop;
///
/// impl Resolver for Noop {
///     fn name(&self) -> &'static str {
///         "noop"
///     }
///
///     fn resolve(&self, _frame: &mut Frame, _ctx: &mut ResolveContext<'_>) {}
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Stage name used in logs.
    fn name(&self) -> &'static str;

    /// Advances `frame` through this stage.
    ///
    /// `frame` is the simulation's `next` buffer; the previous frame is never
    /// touched.
    fn resolve(&self, frame: &mut Frame, ctx: &mut ResolveContext<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn Resolver>) {}
        fn _accepts_slice(_resolvers: &[Box<dyn Resolver>]) {}
    }

    #[test]
    fn report_fault_emits_diagnostic_event() {
        let arena = Arena::default();
        let mut rng = SimRng::new(1);
        let mut events = Vec::new();
        let mut ctx = ResolveContext {
            arena: &arena,
            delta_ms: 16.0,
            rng: &mut rng,
            events: &mut events,
        };
        let fault = StepFault::NonFinitePhysics {
            actor: crate::entity::ActorId::new(2),
        };
        ctx.report_fault(FaultStage::Physics, &fault);

        assert_eq!(events.len(), 1);
        assert!(events[0].is_fault());
    }
}
