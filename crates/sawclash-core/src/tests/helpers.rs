//! Test helpers for building actors, frames and controllers.

use glam::Vec2;

use crate::clock::ManualClock;
use crate::config::SimConfig;
use crate::controller::{MatchController, TickReport};
use crate::entity::{Actor, ActorId};
use crate::simulation::Frame;

/// Nominal 60 Hz tick in whole milliseconds.
pub const TICK_MS: u64 = 16;

// =============================================================================
// Entities
// =============================================================================

/// Creates a full-health, unarmed actor with default size.
pub fn actor_at(id: u64, position: Vec2, velocity: Vec2) -> Actor {
    let mut actor = Actor::new(
        ActorId::new(id),
        format!("Player {id}"),
        "#ffffff",
        None,
        &SimConfig::default().actor,
    );
    actor.position = position;
    actor.velocity = velocity;
    actor
}

/// Two actors on the horizontal center line, 35 units apart and closing.
///
/// Their circles (radius 20) already overlap, so the first tick resolves a
/// collision.
pub fn head_on_pair() -> (Actor, Actor) {
    (
        actor_at(1, Vec2::new(180.0, 200.0), Vec2::new(2.0, 0.0)),
        actor_at(2, Vec2::new(215.0, 200.0), Vec2::new(-2.0, 0.0)),
    )
}

/// A frame holding only `players`.
pub fn frame_with(players: Vec<Actor>) -> Frame {
    Frame {
        players,
        items: Vec::new(),
    }
}

// =============================================================================
// Configurations
// =============================================================================

/// Rules with an instant start.
pub fn instant_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.timing.start_countdown_ms = 0;
    config
}

/// Rules where nothing ever spawns, so actors can only bounce.
pub fn idle_config() -> SimConfig {
    let mut config = instant_config();
    config.spawner.heal.cap = 0;
    config.spawner.weapon.cap = 0;
    config.spawner.obstacle.cap = 0;
    config.spawner.obstacle_field_count = 0;
    config
}

// =============================================================================
// Controllers
// =============================================================================

/// Creates a controller on a manual clock and joins `players` players.
pub fn controller_with_players(
    config: SimConfig,
    seed: u64,
    players: usize,
) -> (MatchController, ManualClock) {
    let clock = ManualClock::new();
    let mut controller =
        MatchController::new(config, seed, Box::new(clock.clone())).expect("valid config");
    for i in 0..players {
        controller
            .add_player(&format!("Player {i}"), "#ffffff", None)
            .expect("lobby accepts player");
    }
    (controller, clock)
}

/// Ticks every `step_ms` until the match ends or `max_ticks` pass.
///
/// Returns every report in order.
pub fn run_match(
    controller: &mut MatchController,
    clock: &ManualClock,
    step_ms: u64,
    max_ticks: usize,
) -> Vec<TickReport> {
    let mut reports = Vec::new();
    for _ in 0..max_ticks {
        clock.advance(step_ms);
        let report = controller.tick();
        let done = report.outcome.is_some();
        reports.push(report);
        if done {
            break;
        }
    }
    reports
}
