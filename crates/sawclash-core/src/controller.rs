//! Match lifecycle: lobby, countdown, play and resolution.
//!
//! The [`MatchController`] owns the roster, the item spawner and the
//! simulation. Hosts drive it with lobby commands and a periodic
//! [`MatchController::tick`]; each tick returns an immutable
//! [`MatchSnapshot`] plus the events the tick produced.
//!
//! # States
//!
//! ```text
//! Lobby --start()--> [countdown] --> Playing --win/draw/timeout--> Ended
//!   ^                                                                |
//!   +-------------------------------- reset() -----------------------+
//! ```
//!
//! # End Conditions
//!
//! Checked once per playing tick, in order:
//!
//! 1. Exactly one survivor among more than one actor: that actor wins
//! 2. No survivors among more than one actor: draw
//! 3. Time is up: the single strictly healthiest survivor wins, otherwise draw
//!
//! # Example
//!
//! ```
//! use sawclash_core::clock::ManualClock;
//! use sawclash_core::config::SimConfig;
//! use sawclash_core::controller::{MatchController, MatchState};
//!
//! let clock = ManualClock::new();
//! let mut config = SimConfig::default();
//! config.timing.start_countdown_ms = 0;
//!
//! let mut controller = MatchController::new(config, 42, Box::new(clock.clone())).unwrap();
//! controller.add_player("Red", "#f00", None).unwrap();
//! controller.add_player("Blue", "#00f", None).unwrap();
//! controller.start().unwrap();
//!
//! clock.advance(16);
//! let report = controller.tick();
//! assert_eq!(report.snapshot.state, MatchState::Playing);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arena::Arena;
use crate::clock::Clock;
use crate::config::SimConfig;
use crate::entity::{Actor, ActorId, Item};
use crate::error::{ConfigError, MatchError};
use crate::event::SimEvent;
use crate::rng::SimRng;
use crate::simulation::Simulation;
use crate::spawner::ItemSpawner;

// =============================================================================
// State types
// =============================================================================

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    /// Players are joining; nothing moves.
    Lobby,
    /// The simulation is running.
    Playing,
    /// The match is over; terminal until reset.
    Ended,
}

impl MatchState {
    /// Lowercase name for logs and errors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::Playing => "playing",
            Self::Ended => "ended",
        }
    }
}

/// Result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The match has not ended.
    Unresolved,
    /// A single actor won.
    Winner(ActorId),
    /// Nobody won.
    Draw,
}

/// Immutable view of a match after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Lifecycle state.
    pub state: MatchState,
    /// Actors in join order, eliminated ones included.
    pub players: Vec<Actor>,
    /// Live items in spawn order.
    pub items: Vec<Item>,
    /// Milliseconds left on the match clock.
    pub time_remaining_ms: u64,
    /// Milliseconds until a pending start, if one is counting down.
    pub countdown_ms: Option<u64>,
    /// Match result so far.
    pub outcome: Outcome,
    /// Simulation ticks since the match began.
    pub tick: u64,
}

/// Everything one call to [`MatchController::tick`] produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// State after the tick.
    pub snapshot: MatchSnapshot,
    /// Events in the order they happened.
    pub events: Vec<SimEvent>,
    /// Set only on the tick the match ended.
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Copy)]
struct PendingStart {
    deadline_ms: u64,
    announced: Option<u64>,
}

// =============================================================================
// MatchController
// =============================================================================

/// Owns one match from lobby to result.
pub struct MatchController {
    config: SimConfig,
    arena: Arena,
    clock: Box<dyn Clock>,
    rng: SimRng,
    simulation: Simulation,
    spawner: ItemSpawner,
    state: MatchState,
    outcome: Outcome,
    next_actor_id: u64,
    pending_start: Option<PendingStart>,
    queued: Vec<SimEvent>,
    started_at_ms: u64,
    last_tick_ms: u64,
    time_remaining_ms: u64,
    blitz_fired: bool,
}

impl std::fmt::Debug for MatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchController")
            .field("state", &self.state)
            .field("outcome", &self.outcome)
            .field("players", &self.players().len())
            .field("items", &self.spawner.items().len())
            .field("time_remaining_ms", &self.time_remaining_ms)
            .field("seed", &self.rng.seed())
            .finish_non_exhaustive()
    }
}

impl MatchController {
    /// Creates a controller in the lobby.
    ///
    /// # Arguments
    ///
    /// * `config` - Rule set; validated before anything else happens
    /// * `seed` - Seed for every random decision in the match
    /// * `clock` - Millisecond time source
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] if `config` does not validate.
    pub fn new(config: SimConfig, seed: u64, clock: Box<dyn Clock>) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let arena = Arena::from_config(&config.arena);
        let duration = config.timing.max_game_duration_ms;
        let now = clock.now_ms();

        Ok(Self {
            simulation: Simulation::new(&config),
            spawner: ItemSpawner::new(config.spawner.clone(), arena, duration),
            arena,
            clock,
            rng: SimRng::new(seed),
            state: MatchState::Lobby,
            outcome: Outcome::Unresolved,
            next_actor_id: 1,
            pending_start: None,
            queued: Vec::new(),
            started_at_ms: now,
            last_tick_ms: now,
            time_remaining_ms: duration,
            blitz_fired: false,
            config,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Rule set in use.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> MatchState {
        self.state
    }

    /// Result so far.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Roster in join order.
    #[must_use]
    pub fn players(&self) -> &[Actor] {
        &self.simulation.frame().players
    }

    /// Live items.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        self.spawner.items()
    }

    /// Milliseconds left on the match clock.
    #[must_use]
    pub const fn time_remaining_ms(&self) -> u64 {
        self.time_remaining_ms
    }

    /// Returns true while a start countdown is running.
    #[must_use]
    pub const fn is_start_pending(&self) -> bool {
        self.pending_start.is_some()
    }

    /// Seed the match was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Builds a snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        let now = self.clock.now_ms();
        MatchSnapshot {
            state: self.state,
            players: self.players().to_vec(),
            items: self.spawner.items().to_vec(),
            time_remaining_ms: self.time_remaining_ms,
            countdown_ms: self
                .pending_start
                .map(|pending| pending.deadline_ms.saturating_sub(now)),
            outcome: self.outcome,
            tick: self.simulation.tick(),
        }
    }

    // =========================================================================
    // Lobby commands
    // =========================================================================

    fn require_lobby(&self, command: &'static str) -> Result<(), MatchError> {
        let error = if self.state != MatchState::Lobby {
            MatchError::NotInLobby(self.state.label())
        } else if self.pending_start.is_some() {
            MatchError::StartPending
        } else {
            return Ok(());
        };
        warn!(command, %error, "command rejected");
        Err(error)
    }

    /// Adds a player to the lobby.
    ///
    /// The player gets a random position away from the others and a small
    /// outward velocity.
    ///
    /// # Errors
    ///
    /// - [`MatchError::NotInLobby`] or [`MatchError::StartPending`] outside an
    ///   idle lobby
    /// - [`MatchError::BlankName`] if `name` has no visible characters
    /// - [`MatchError::RosterFull`] if the roster is at `max_players`
    pub fn add_player(
        &mut self,
        name: &str,
        color: &str,
        avatar: Option<String>,
    ) -> Result<ActorId, MatchError> {
        self.require_lobby("add_player")?;

        let name = name.trim();
        if name.is_empty() {
            warn!("command rejected: blank player name");
            return Err(MatchError::BlankName);
        }
        let max = self.config.lobby.max_players;
        if self.players().len() >= max {
            warn!(max, "command rejected: roster full");
            return Err(MatchError::RosterFull(max));
        }

        let id = ActorId::new(self.next_actor_id);
        self.next_actor_id += 1;

        let mut actor = Actor::new(id, name, color, avatar, &self.config.actor);
        let occupied: Vec<Vec2> = self.players().iter().map(|a| a.position).collect();
        let position = self.spawn_point(&occupied);
        let velocity = self.outward_velocity(position);
        actor.reset(self.config.actor.max_health, position, velocity);

        info!(%id, name, "player joined");
        self.simulation.frame_mut().players.push(actor);
        Ok(id)
    }

    /// Removes a player from the lobby.
    ///
    /// # Errors
    ///
    /// - [`MatchError::NotInLobby`] or [`MatchError::StartPending`] outside an
    ///   idle lobby
    /// - [`MatchError::UnknownPlayer`] if no player has `id`
    pub fn remove_player(&mut self, id: ActorId) -> Result<Actor, MatchError> {
        self.require_lobby("remove_player")?;

        let players = &mut self.simulation.frame_mut().players;
        let Some(index) = players.iter().position(|a| a.id == id) else {
            warn!(%id, "command rejected: unknown player");
            return Err(MatchError::UnknownPlayer(id));
        };
        let actor = players.remove(index);
        info!(%id, "player left");
        Ok(actor)
    }

    /// Starts the match, immediately or after the configured countdown.
    ///
    /// # Errors
    ///
    /// Rejected without side effects outside an idle lobby or with fewer than
    /// `min_players` players. Hosts may ignore the error.
    pub fn start(&mut self) -> Result<(), MatchError> {
        self.require_lobby("start")?;

        let required = self.config.lobby.min_players;
        let present = self.players().len();
        if present < required {
            let error = MatchError::NotEnoughPlayers { required, present };
            warn!(%error, "command rejected");
            return Err(error);
        }

        let now = self.clock.now_ms();
        let countdown = self.config.timing.start_countdown_ms;
        if countdown == 0 {
            let mut events = std::mem::take(&mut self.queued);
            self.begin_match(now, &mut events);
            self.queued = events;
        } else {
            info!(countdown_ms = countdown, "match start pending");
            self.pending_start = Some(PendingStart {
                deadline_ms: now + countdown,
                announced: None,
            });
        }
        Ok(())
    }

    /// Returns to the lobby from any state.
    ///
    /// Cancels a pending start and pending blitz batches, clears all items
    /// and restores every player to full health, unarmed, at a fresh spaced
    /// position.
    pub fn reset(&mut self) {
        self.pending_start = None;
        self.queued.clear();
        self.spawner.reset();

        let players = std::mem::take(&mut self.simulation.frame_mut().players);
        self.simulation.reset();
        let players = self.respawn(players);
        self.simulation.frame_mut().players = players;

        self.state = MatchState::Lobby;
        self.outcome = Outcome::Unresolved;
        self.time_remaining_ms = self.config.timing.max_game_duration_ms;
        self.blitz_fired = false;
        info!("match reset to lobby");
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Reads the clock and advances the match by one tick.
    ///
    /// Infallible: per-unit faults are reported as [`SimEvent::Fault`].
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now_ms();
        let mut events = std::mem::take(&mut self.queued);

        let outcome = match self.state {
            MatchState::Lobby => {
                self.tick_lobby(now, &mut events);
                None
            }
            MatchState::Playing => self.tick_playing(now, &mut events),
            MatchState::Ended => None,
        };

        TickReport {
            snapshot: self.snapshot(),
            events,
            outcome,
        }
    }

    fn tick_lobby(&mut self, now: u64, events: &mut Vec<SimEvent>) {
        let Some(mut pending) = self.pending_start else {
            return;
        };

        if now >= pending.deadline_ms {
            self.pending_start = None;
            self.begin_match(now, events);
            return;
        }

        let seconds_left = (pending.deadline_ms - now).div_ceil(1000);
        if pending.announced != Some(seconds_left) {
            pending.announced = Some(seconds_left);
            debug!(seconds_left, "countdown");
            events.push(SimEvent::Countdown { seconds_left });
        }
        self.pending_start = Some(pending);
    }

    #[allow(clippy::cast_precision_loss)]
    fn tick_playing(&mut self, now: u64, events: &mut Vec<SimEvent>) -> Option<Outcome> {
        let delta_ms = now.saturating_sub(self.last_tick_ms) as f32;
        self.last_tick_ms = now;

        self.sync_items();

        let first_new = events.len();
        self.simulation.advance(delta_ms, &mut self.rng, events);
        for event in &events[first_new..] {
            if let SimEvent::HealPickup { item, .. } | SimEvent::WeaponPickup { item, .. } = event {
                self.spawner.remove(*item);
            }
        }

        self.spawner.update(now, &mut self.rng, events);

        let elapsed = now.saturating_sub(self.started_at_ms);
        self.time_remaining_ms = self.config.timing.max_game_duration_ms.saturating_sub(elapsed);

        if !self.blitz_fired && self.time_remaining_ms <= self.config.timing.blitz_at_remaining_ms {
            self.blitz_fired = true;
            let batches = self.spawner.weapon_blitz(now);
            info!(batches, remaining_ms = self.time_remaining_ms, "weapon blitz");
            events.push(SimEvent::WeaponBlitz { batches });
        }

        self.sync_items();

        let outcome = self.check_end()?;
        self.state = MatchState::Ended;
        self.outcome = outcome;
        info!(?outcome, elapsed_ms = elapsed, "match ended");
        events.push(SimEvent::MatchEnded { outcome });
        Some(outcome)
    }

    /// Copies the spawner's items into the simulation frame.
    fn sync_items(&mut self) {
        let items = &mut self.simulation.frame_mut().items;
        items.clear();
        items.extend_from_slice(self.spawner.items());
    }

    /// Evaluates the end conditions against the current frame.
    fn check_end(&self) -> Option<Outcome> {
        let players = self.players();
        let survivors: Vec<&Actor> = players.iter().filter(|a| a.is_alive()).collect();

        if players.len() > 1 {
            match survivors.as_slice() {
                [winner] => return Some(Outcome::Winner(winner.id)),
                [] => return Some(Outcome::Draw),
                _ => {}
            }
        }

        if self.time_remaining_ms == 0 {
            return Some(resolve_timeout(&survivors));
        }
        None
    }

    // =========================================================================
    // Match setup
    // =========================================================================

    fn begin_match(&mut self, now: u64, events: &mut Vec<SimEvent>) {
        let players = std::mem::take(&mut self.simulation.frame_mut().players);
        self.simulation.reset();
        let players = self.respawn(players);
        let count = players.len();
        self.simulation.frame_mut().players = players;

        self.spawner.start(now);
        self.spawner.force_spawn_all(now, &mut self.rng, events);
        self.sync_items();

        self.state = MatchState::Playing;
        self.outcome = Outcome::Unresolved;
        self.started_at_ms = now;
        self.last_tick_ms = now;
        self.time_remaining_ms = self.config.timing.max_game_duration_ms;
        self.blitz_fired = false;

        info!(players = count, seed = self.rng.seed(), "match started");
        events.push(SimEvent::MatchStarted { players: count });
    }

    /// Restores every actor and places them away from each other.
    fn respawn(&mut self, mut players: Vec<Actor>) -> Vec<Actor> {
        let mut occupied = Vec::with_capacity(players.len());
        for actor in &mut players {
            let position = self.spawn_point(&occupied);
            let velocity = self.outward_velocity(position);
            actor.reset(self.config.actor.max_health, position, velocity);
            occupied.push(position);
        }
        players
    }

    /// Samples a spawn point at least `spawn_spacing` radii from `occupied`,
    /// falling back to the arena center.
    fn spawn_point(&mut self, occupied: &[Vec2]) -> Vec2 {
        let radius = self.config.actor.radius;
        let margin = radius + self.arena.border() + 1.0;
        let spacing = radius * self.config.lobby.spawn_spacing;

        for _ in 0..self.config.lobby.spawn_attempts {
            let candidate = self.arena.random_point(&mut self.rng, margin);
            if occupied.iter().all(|p| p.distance(candidate) >= spacing) {
                return candidate;
            }
        }
        debug!("no spaced spawn point found, using arena center");
        self.arena.center()
    }

    /// Velocity of magnitude `min_speed` pointing away from the arena center.
    fn outward_velocity(&mut self, position: Vec2) -> Vec2 {
        let direction = (position - self.arena.center()).normalize_or_zero();
        let direction = if direction == Vec2::ZERO {
            self.rng.direction()
        } else {
            direction
        };
        direction * self.config.physics.min_speed
    }
}

/// Timeout rule: the strictly healthiest survivor wins; ties and empty
/// arenas are draws.
fn resolve_timeout(survivors: &[&Actor]) -> Outcome {
    let Some(best) = survivors.iter().map(|a| a.health).max() else {
        return Outcome::Draw;
    };
    let mut leaders = survivors.iter().filter(|a| a.health == best);
    match (leaders.next(), leaders.next()) {
        (Some(leader), None) => Outcome::Winner(leader.id),
        _ => Outcome::Draw,
    }
}
