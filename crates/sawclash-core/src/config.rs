//! Simulation configuration.
//!
//! Every tuning constant of the simulation lives in [`SimConfig`]. The
//! [`Default`] implementation is the canonical rule set; hosts may deserialize
//! an alternative, but it must pass [`SimConfig::validate`] before a match is
//! created. Validation failures are fatal: a broken arena or speed band is not
//! something a running match can recover from.
//!
//! # Example
//!
//! ```
//! use sawclash_core::config::SimConfig;
//!
//! let config = SimConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.actor.max_health, 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::entity::ItemKind;
use crate::error::ConfigError;

/// Nominal frame duration in milliseconds that physics constants are tuned for.
pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;

// =============================================================================
// Sections
// =============================================================================

/// Arena geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Arena width in world units.
    pub width: f32,
    /// Arena height in world units.
    pub height: f32,
    /// Border thickness on every edge.
    pub border: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            border: 3.0,
        }
    }
}

/// Per-actor constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Collision radius of every actor.
    pub radius: f32,
    /// Health an actor starts with and can never exceed.
    pub max_health: u8,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            max_health: 5,
        }
    }
}

/// Integrator and bounce constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Multiplicative per-tick velocity factor (close to 1).
    pub friction: f32,
    /// Lower bound of the speed band.
    pub min_speed: f32,
    /// Upper bound of the speed band.
    pub max_speed: f32,
    /// Fraction of the perpendicular speed kept after a bounce.
    pub restitution: f32,
    /// Tangential velocity factor applied on wall bounces.
    pub angular_damping: f32,
    /// Half-width of the random tangential perturbation on wall bounces.
    pub wall_jitter: f32,
    /// Speed below which an actor is considered stalled and re-kicked.
    pub stall_threshold: f32,
    /// Extra speed range above `min_speed` used when re-kicking.
    pub stall_jitter: f32,
    /// Global pace factor applied to displacement.
    pub pace: f32,
    /// Largest frame delta accepted by the integrator, in milliseconds.
    pub max_frame_delta_ms: f32,
    /// Share of an actor-actor overlap moved onto the first actor.
    pub separation_split: f32,
    /// Velocity multiplier after an obstacle bounce.
    pub obstacle_bounce_multiplier: f32,
    /// Half-width of the per-component random kick after an obstacle bounce.
    pub obstacle_jitter: f32,
    /// Extra push distance used when separating an actor from an obstacle.
    pub obstacle_push: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            friction: 0.998,
            min_speed: 1.2,
            max_speed: 3.5,
            restitution: 0.6,
            angular_damping: 0.98,
            wall_jitter: 0.1,
            stall_threshold: 0.3,
            stall_jitter: 0.5,
            pace: 0.9,
            max_frame_delta_ms: 100.0,
            separation_split: 0.5,
            obstacle_bounce_multiplier: 1.3 * 0.8,
            obstacle_jitter: 0.15,
            obstacle_push: 2.0,
        }
    }
}

/// Scheduling constants for one item kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemKindConfig {
    /// Collision radius of items of this kind.
    pub radius: f32,
    /// Base time between spawn attempts, in milliseconds.
    pub interval_ms: u64,
    /// Delay before the first spawn attempt after match start.
    pub initial_delay_ms: u64,
    /// Maximum number of live items of this kind.
    pub cap: usize,
    /// Smallest batch spawned per attempt.
    pub batch_min: usize,
    /// Largest batch spawned per attempt.
    pub batch_max: usize,
}

/// Item economy constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    /// Heal pickups.
    pub heal: ItemKindConfig,
    /// Weapon pickups.
    pub weapon: ItemKindConfig,
    /// Obstacles.
    pub obstacle: ItemKindConfig,
    /// Probability that a due heal spawn actually happens.
    pub heal_spawn_chance: f64,
    /// Multiplier applied to the heal interval.
    pub heal_interval_multiplier: u64,
    /// Whether obstacles also spawn on their own cadence during a match.
    pub obstacles_scheduled: bool,
    /// Hard cap on live items of all kinds.
    pub max_items: usize,
    /// Age after which uncollected pickups disappear.
    pub item_lifetime_ms: u64,
    /// Distance kept free between a spawn point and the arena edge.
    pub spawn_margin: f32,
    /// Candidate points tried before accepting an occupied one.
    pub placement_attempts: u32,
    /// Minimum spacing to existing items, as a multiple of the item radius.
    pub spacing_factor: f32,
    /// Match time after which the weapon interval starts shrinking.
    pub weapon_boost_after_ms: u64,
    /// Interval reduction per second of boost time, in milliseconds.
    pub weapon_boost_rate: f32,
    /// Floor for the boosted weapon interval.
    pub weapon_min_interval_ms: u64,
    /// Weapon batches spawned by a blitz.
    pub blitz_batches: u32,
    /// Delay between consecutive blitz batches.
    pub blitz_stagger_ms: u64,
    /// Obstacles generated at match start.
    pub obstacle_field_count: usize,
    /// Smallest generated obstacle radius.
    pub obstacle_min_radius: f32,
    /// Largest generated obstacle radius.
    pub obstacle_max_radius: f32,
    /// Gap kept between generated obstacles.
    pub obstacle_gap: f32,
    /// Radius around the arena center kept free of generated obstacles.
    pub center_clearance: f32,
    /// Placement attempts per generated obstacle.
    pub obstacle_attempts: u32,
    /// Palette obstacles draw their color from.
    pub obstacle_colors: Vec<String>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            heal: ItemKindConfig {
                radius: 10.0,
                interval_ms: 6_000,
                initial_delay_ms: 8_000,
                cap: 2,
                batch_min: 1,
                batch_max: 1,
            },
            weapon: ItemKindConfig {
                radius: 15.0,
                interval_ms: 4_000,
                initial_delay_ms: 3_000,
                cap: 3,
                batch_min: 1,
                batch_max: 1,
            },
            obstacle: ItemKindConfig {
                radius: 12.0,
                interval_ms: 4_500,
                initial_delay_ms: 1_000,
                cap: 5,
                batch_min: 1,
                batch_max: 2,
            },
            heal_spawn_chance: 0.3,
            heal_interval_multiplier: 3,
            obstacles_scheduled: false,
            max_items: 12,
            item_lifetime_ms: 30_000,
            spawn_margin: 30.0,
            placement_attempts: 10,
            spacing_factor: 1.8,
            weapon_boost_after_ms: 45_000,
            weapon_boost_rate: 30.0,
            weapon_min_interval_ms: 2_500,
            blitz_batches: 2,
            blitz_stagger_ms: 1_500,
            obstacle_field_count: 4,
            obstacle_min_radius: 10.0,
            obstacle_max_radius: 18.0,
            obstacle_gap: 10.0,
            center_clearance: 60.0,
            obstacle_attempts: 50,
            obstacle_colors: ["#8B4513", "#A0522D", "#696969", "#708090"]
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        }
    }
}

impl SpawnerConfig {
    /// Returns the scheduling constants for an item kind.
    #[must_use]
    pub fn kind(&self, kind: ItemKind) -> &ItemKindConfig {
        match kind {
            ItemKind::Heal => &self.heal,
            ItemKind::Weapon => &self.weapon,
            ItemKind::Obstacle => &self.obstacle,
        }
    }
}

/// Match clock constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Length of a match in milliseconds.
    pub max_game_duration_ms: u64,
    /// Remaining time at which the weapon blitz fires.
    pub blitz_at_remaining_ms: u64,
    /// Countdown between `start` and the first playing tick.
    pub start_countdown_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_game_duration_ms: 90_000,
            blitz_at_remaining_ms: 15_000,
            start_countdown_ms: 3_000,
        }
    }
}

/// Roster constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Players required before a match can start.
    pub min_players: usize,
    /// Largest roster accepted.
    pub max_players: usize,
    /// Attempts to find a spawn point away from other actors.
    pub spawn_attempts: u32,
    /// Minimum spawn distance between actors, as a multiple of the radius.
    pub spawn_spacing: f32,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 8,
            spawn_attempts: 10,
            spawn_spacing: 3.0,
        }
    }
}

// =============================================================================
// SimConfig
// =============================================================================

/// Complete, validated rule set for a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Arena geometry.
    pub arena: ArenaConfig,
    /// Actor constants.
    pub actor: ActorConfig,
    /// Physics constants.
    pub physics: PhysicsConfig,
    /// Item economy.
    pub spawner: SpawnerConfig,
    /// Match clock.
    pub timing: TimingConfig,
    /// Roster rules.
    pub lobby: LobbyConfig,
}

impl SimConfig {
    /// Checks that the rule set describes a playable match.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found. Callers should treat any
    /// error as fatal and refuse to create a match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let arena = &self.arena;
        let actor = &self.actor;
        let physics = &self.physics;
        let spawner = &self.spawner;

        if !(arena.width.is_finite() && arena.height.is_finite() && arena.border >= 0.0) {
            return Err(ConfigError::InvalidArena {
                width: arena.width,
                height: arena.height,
                border: arena.border,
            });
        }
        if actor.radius <= 0.0 || !actor.radius.is_finite() {
            return Err(ConfigError::InvalidRadius(actor.radius));
        }
        // One extra unit on each side: wall bounces park actors one unit inside.
        let needed = 2.0 * (actor.radius + arena.border + 1.0);
        if arena.width <= needed || arena.height <= needed {
            return Err(ConfigError::ArenaTooSmall {
                width: arena.width,
                height: arena.height,
                needed,
            });
        }
        if actor.max_health == 0 {
            return Err(ConfigError::ZeroMaxHealth);
        }
        if !(physics.min_speed > 0.0 && physics.min_speed <= physics.max_speed) {
            return Err(ConfigError::InvalidSpeedBand {
                min: physics.min_speed,
                max: physics.max_speed,
            });
        }
        if !(physics.restitution > 0.0 && physics.restitution <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "physics.restitution",
                value: physics.restitution,
            });
        }
        if !(physics.friction > 0.0 && physics.friction <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "physics.friction",
                value: physics.friction,
            });
        }
        if !(0.0..=1.0).contains(&physics.separation_split) {
            return Err(ConfigError::OutOfRange {
                field: "physics.separation_split",
                value: physics.separation_split,
            });
        }
        if !(physics.max_frame_delta_ms > 0.0 && physics.pace > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "physics.max_frame_delta_ms",
                value: physics.max_frame_delta_ms,
            });
        }
        if !(0.0..=1.0).contains(&spawner.heal_spawn_chance) {
            #[allow(clippy::cast_possible_truncation)]
            let value = spawner.heal_spawn_chance as f32;
            return Err(ConfigError::OutOfRange {
                field: "spawner.heal_spawn_chance",
                value,
            });
        }
        for kind in ItemKind::ALL {
            let cfg = spawner.kind(kind);
            if cfg.interval_ms == 0 || cfg.batch_min > cfg.batch_max || cfg.radius <= 0.0 {
                return Err(ConfigError::InvalidItemKind(kind));
            }
            let spawn_extent = 2.0 * (spawner.spawn_margin + cfg.radius);
            if arena.width <= spawn_extent || arena.height <= spawn_extent {
                return Err(ConfigError::InvalidItemKind(kind));
            }
        }
        // The match-start field counts against the obstacle cap.
        if spawner.obstacle_field_count > spawner.obstacle.cap {
            return Err(ConfigError::InvalidItemKind(ItemKind::Obstacle));
        }
        if spawner.max_items <= spawner.obstacle.cap {
            return Err(ConfigError::ItemCapTooSmall {
                max_items: spawner.max_items,
                obstacles: spawner.obstacle.cap,
            });
        }
        if spawner.obstacle_min_radius > spawner.obstacle_max_radius
            || spawner.obstacle_min_radius <= 0.0
        {
            return Err(ConfigError::InvalidItemKind(ItemKind::Obstacle));
        }
        if spawner.obstacle_colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if self.lobby.min_players < 2 || self.lobby.min_players > self.lobby.max_players {
            return Err(ConfigError::InvalidRoster {
                min: self.lobby.min_players,
                max: self.lobby.max_players,
            });
        }
        if self.timing.max_game_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// See [`SimConfig::validate`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}
