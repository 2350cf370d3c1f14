//! Time-driven item scheduler.
//!
//! The [`ItemSpawner`] owns every live item. It keeps one cadence per item
//! kind, places new items away from existing ones, ages out uncollected
//! pickups and enforces both the per-kind and the global caps.
//!
//! Time is passed in on every call as match-clock milliseconds and all
//! randomness comes from the caller's [`SimRng`], so a spawner driven by the
//! same clock readings and seed always produces the same items.
//!
//! # Heal Scarcity
//!
//! Heals are rare. Their interval is multiplied by
//! `heal_interval_multiplier`, and when that interval elapses the spawn only
//! happens with probability `heal_spawn_chance`. The timer resets either way,
//! so a failed roll costs a full interval.
//!
//! # Example
//!
//! ```
//! use sawclash_core::arena::Arena;
//! use sawclash_core::config::SpawnerConfig;
//! use sawclash_core::entity::ItemKind;
//! use sawclash_core::rng::SimRng;
//! use sawclash_core::spawner::ItemSpawner;
//!
//! let mut spawner = ItemSpawner::new(SpawnerConfig::default(), Arena::default(), 90_000);
//! let mut rng = SimRng::new(7);
//! let mut events = Vec::new();
//!
//! spawner.start(0);
//! spawner.force_spawn_all(0, &mut rng, &mut events);
//!
//! assert_eq!(spawner.count(ItemKind::Weapon), 1);
//! assert_eq!(spawner.count(ItemKind::Heal), 0);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::Arena;
use crate::config::SpawnerConfig;
use crate::entity::{Item, ItemId, ItemKind, ObstacleShape, ObstacleStyle};
use crate::event::{RemovalReason, SimEvent};
use crate::rng::SimRng;

/// Match progress as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnProgress {
    /// Milliseconds since `start`.
    pub elapsed_ms: u64,
    /// Milliseconds left in the match.
    pub remaining_ms: u64,
    /// Whether the weapon interval has started shrinking.
    pub weapon_boost: bool,
}

/// Last spawn attempt per kind.
///
/// Signed so the initial delay can place the first attempt before the match
/// start time.
#[derive(Debug, Clone, Copy, Default)]
struct SpawnTimers {
    heal: i64,
    weapon: i64,
    obstacle: i64,
}

impl SpawnTimers {
    fn get(&self, kind: ItemKind) -> i64 {
        match kind {
            ItemKind::Heal => self.heal,
            ItemKind::Weapon => self.weapon,
            ItemKind::Obstacle => self.obstacle,
        }
    }

    fn set(&mut self, kind: ItemKind, ms: i64) {
        match kind {
            ItemKind::Heal => self.heal = ms,
            ItemKind::Weapon => self.weapon = ms,
            ItemKind::Obstacle => self.obstacle = ms,
        }
    }
}

fn signed(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

/// Item scheduler for one match.
#[derive(Debug, Clone)]
pub struct ItemSpawner {
    config: SpawnerConfig,
    arena: Arena,
    match_duration_ms: u64,
    items: Vec<Item>,
    next_item_id: u64,
    started_at_ms: Option<u64>,
    timers: SpawnTimers,
    pending_blitz: Vec<u64>,
}

impl ItemSpawner {
    /// Creates an idle spawner with no items.
    ///
    /// # Arguments
    ///
    /// * `config` - Cadences, caps and placement rules
    /// * `arena` - Geometry used for placement
    /// * `match_duration_ms` - Match length, used by [`ItemSpawner::progress`]
    #[must_use]
    pub const fn new(config: SpawnerConfig, arena: Arena, match_duration_ms: u64) -> Self {
        Self {
            config,
            arena,
            match_duration_ms,
            items: Vec::new(),
            next_item_id: 1,
            started_at_ms: None,
            timers: SpawnTimers {
                heal: 0,
                weapon: 0,
                obstacle: 0,
            },
            pending_blitz: Vec::new(),
        }
    }

    /// Scheduling rules in use.
    #[must_use]
    pub const fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Starts the cadences at `now_ms`, discarding all items.
    ///
    /// Each kind's first attempt is due `initial_delay_ms` after the start,
    /// measured against the kind's base interval.
    pub fn start(&mut self, now_ms: u64) {
        self.reset();
        self.started_at_ms = Some(now_ms);
        for kind in ItemKind::ALL {
            let cfg = self.config.kind(kind);
            let last = signed(now_ms) - signed(cfg.interval_ms) + signed(cfg.initial_delay_ms);
            self.timers.set(kind, last);
        }
        debug!(now_ms, "spawner started");
    }

    /// Returns true between `start` and `reset`.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started_at_ms.is_some()
    }

    /// Clears every item and cancels pending blitz batches.
    pub fn reset(&mut self) {
        self.items.clear();
        self.pending_blitz.clear();
        self.started_at_ms = None;
        self.timers = SpawnTimers::default();
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Advances the scheduler to `now_ms`.
    ///
    /// Expires old pickups, lands due blitz batches, runs each kind's cadence
    /// and finally enforces the global cap. Does nothing before `start`.
    pub fn update(&mut self, now_ms: u64, rng: &mut SimRng, events: &mut Vec<SimEvent>) {
        let Some(started) = self.started_at_ms else {
            return;
        };
        let elapsed = now_ms.saturating_sub(started);

        self.expire(now_ms, events);

        let ready = self.pending_blitz.iter().filter(|&&due| due <= now_ms).count();
        self.pending_blitz.retain(|&due| due > now_ms);
        for _ in 0..ready {
            self.spawn_batch(ItemKind::Weapon, now_ms, rng, events);
        }

        if self.is_due(ItemKind::Heal, now_ms, elapsed) {
            self.timers.set(ItemKind::Heal, signed(now_ms));
            if rng.chance(self.config.heal_spawn_chance) {
                self.spawn_batch(ItemKind::Heal, now_ms, rng, events);
            } else {
                debug!(now_ms, "heal spawn skipped");
                events.push(SimEvent::HealSkipped);
            }
        }

        if self.is_due(ItemKind::Weapon, now_ms, elapsed) {
            self.timers.set(ItemKind::Weapon, signed(now_ms));
            self.spawn_batch(ItemKind::Weapon, now_ms, rng, events);
        }

        if self.config.obstacles_scheduled && self.is_due(ItemKind::Obstacle, now_ms, elapsed) {
            self.timers.set(ItemKind::Obstacle, signed(now_ms));
            self.spawn_batch(ItemKind::Obstacle, now_ms, rng, events);
        }

        self.enforce_global_cap(events);
    }

    /// Interval in force for `kind` after `elapsed_ms` of match time.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn effective_interval(&self, kind: ItemKind, elapsed_ms: u64) -> u64 {
        let base = self.config.kind(kind).interval_ms;
        match kind {
            ItemKind::Heal => base.saturating_mul(self.config.heal_interval_multiplier),
            ItemKind::Weapon if elapsed_ms > self.config.weapon_boost_after_ms => {
                let boost_secs = (elapsed_ms - self.config.weapon_boost_after_ms) as f64 / 1000.0;
                let shrunk = base as f64 - boost_secs * f64::from(self.config.weapon_boost_rate);
                (shrunk.max(0.0) as u64).max(self.config.weapon_min_interval_ms)
            }
            ItemKind::Weapon | ItemKind::Obstacle => base,
        }
    }

    fn is_due(&self, kind: ItemKind, now_ms: u64, elapsed_ms: u64) -> bool {
        let since = signed(now_ms) - self.timers.get(kind);
        since > signed(self.effective_interval(kind, elapsed_ms))
    }

    /// Schedules the late-match weapon burst.
    ///
    /// Batches land at `now_ms + i * blitz_stagger_ms` during later
    /// [`ItemSpawner::update`] calls. Returns the number of batches scheduled.
    pub fn weapon_blitz(&mut self, now_ms: u64) -> u32 {
        let batches = self.config.blitz_batches;
        for i in 0..batches {
            self.pending_blitz
                .push(now_ms + u64::from(i) * self.config.blitz_stagger_ms);
        }
        debug!(now_ms, batches, "weapon blitz scheduled");
        batches
    }

    /// Number of blitz batches not yet landed.
    #[must_use]
    pub fn pending_blitz(&self) -> usize {
        self.pending_blitz.len()
    }

    /// Seeds a new match: one weapon batch plus the obstacle field.
    ///
    /// Never spawns heals.
    pub fn force_spawn_all(&mut self, now_ms: u64, rng: &mut SimRng, events: &mut Vec<SimEvent>) {
        self.spawn_batch(ItemKind::Weapon, now_ms, rng, events);
        self.generate_obstacle_field(now_ms, rng, events);
        self.enforce_global_cap(events);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Live items in spawn order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of live items of `kind`.
    #[must_use]
    pub fn count(&self, kind: ItemKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }

    /// Removes an item (typically after a pickup).
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Match progress at `now_ms`; all zero before `start`.
    #[must_use]
    pub fn progress(&self, now_ms: u64) -> SpawnProgress {
        let elapsed_ms = self
            .started_at_ms
            .map_or(0, |started| now_ms.saturating_sub(started));
        SpawnProgress {
            elapsed_ms,
            remaining_ms: if self.is_started() {
                self.match_duration_ms.saturating_sub(elapsed_ms)
            } else {
                0
            },
            weapon_boost: elapsed_ms > self.config.weapon_boost_after_ms,
        }
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId::new(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    /// Spawns one batch of `kind`, limited by the kind's cap.
    fn spawn_batch(
        &mut self,
        kind: ItemKind,
        now_ms: u64,
        rng: &mut SimRng,
        events: &mut Vec<SimEvent>,
    ) -> usize {
        let cfg = self.config.kind(kind);
        let room = cfg.cap.saturating_sub(self.count(kind));
        if room == 0 {
            debug!(%kind, cap = cfg.cap, "spawn blocked by cap");
            return 0;
        }

        let radius = cfg.radius;
        let batch = rng.count(cfg.batch_min, cfg.batch_max).min(room);
        for _ in 0..batch {
            let position = self.place(radius, rng);
            let id = self.allocate_id();
            let item = if kind == ItemKind::Obstacle {
                let style = self.random_style(rng);
                Item::obstacle(id, position, radius, now_ms, style)
            } else {
                Item::pickup(id, kind, position, radius, now_ms)
            };
            self.push(item, events);
        }
        batch
    }

    fn push(&mut self, item: Item, events: &mut Vec<SimEvent>) {
        debug!(item = %item.id, kind = %item.kind, x = item.position.x, y = item.position.y, "item spawned");
        events.push(SimEvent::ItemSpawned {
            item: item.id,
            kind: item.kind,
            point: item.position,
        });
        self.items.push(item);
    }

    /// Picks a spawn point, preferring one away from live items.
    fn place(&self, radius: f32, rng: &mut SimRng) -> Vec2 {
        let margin = self.config.spawn_margin + radius;
        let spacing = radius * self.config.spacing_factor;
        let mut candidate = self.arena.random_point(rng, margin);
        for _ in 1..self.config.placement_attempts {
            let occupied = self
                .items
                .iter()
                .any(|item| item.position.distance(candidate) < spacing);
            if !occupied {
                break;
            }
            candidate = self.arena.random_point(rng, margin);
        }
        candidate
    }

    fn random_style(&self, rng: &mut SimRng) -> ObstacleStyle {
        let palette = &self.config.obstacle_colors;
        let color = palette
            .get(rng.index(palette.len()))
            .cloned()
            .unwrap_or_default();
        let shape = if rng.chance(0.5) {
            ObstacleShape::Jagged
        } else {
            ObstacleShape::Round
        };
        ObstacleStyle { color, shape }
    }

    /// Scatters the match-start obstacles, keeping the center clear.
    fn generate_obstacle_field(&mut self, now_ms: u64, rng: &mut SimRng, events: &mut Vec<SimEvent>) {
        let center = self.arena.center();
        for _ in 0..self.config.obstacle_field_count {
            let mut placed = None;
            for _ in 0..self.config.obstacle_attempts {
                let radius = rng.range(self.config.obstacle_min_radius, self.config.obstacle_max_radius);
                let position = self
                    .arena
                    .random_point(rng, self.config.spawn_margin + radius);

                let clear_of_rocks = self
                    .items
                    .iter()
                    .filter(|item| item.kind == ItemKind::Obstacle)
                    .all(|rock| {
                        rock.position.distance(position)
                            >= rock.radius + radius + self.config.obstacle_gap
                    });
                let clear_of_center = position.distance(center) >= self.config.center_clearance;

                if clear_of_rocks && clear_of_center {
                    placed = Some((position, radius));
                    break;
                }
            }

            match placed {
                Some((position, radius)) => {
                    let style = self.random_style(rng);
                    let id = self.allocate_id();
                    self.push(Item::obstacle(id, position, radius, now_ms, style), events);
                }
                None => debug!("obstacle placement failed, skipping"),
            }
        }
    }

    // =========================================================================
    // Removal
    // =========================================================================

    fn expire(&mut self, now_ms: u64, events: &mut Vec<SimEvent>) {
        let lifetime = self.config.item_lifetime_ms;
        self.items.retain(|item| {
            if item.is_expired(now_ms, lifetime) {
                debug!(item = %item.id, kind = %item.kind, "item expired");
                events.push(SimEvent::ItemRemoved {
                    item: item.id,
                    kind: item.kind,
                    reason: RemovalReason::Expired,
                });
                false
            } else {
                true
            }
        });
    }

    /// Evicts the oldest consumable items until the global cap holds.
    fn enforce_global_cap(&mut self, events: &mut Vec<SimEvent>) {
        while self.items.len() > self.config.max_items {
            let Some(index) = self.items.iter().position(|item| item.kind.is_consumable()) else {
                break;
            };
            let evicted = self.items.remove(index);
            debug!(item = %evicted.id, kind = %evicted.kind, "item evicted by global cap");
            events.push(SimEvent::ItemRemoved {
                item: evicted.id,
                kind: evicted.kind,
                reason: RemovalReason::Evicted,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spawner() -> ItemSpawner {
        ItemSpawner::new(SpawnerConfig::default(), Arena::default(), 90_000)
    }

    fn run(spawner: &mut ItemSpawner, rng: &mut SimRng, until_ms: u64, step_ms: u64) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let mut now = 0;
        while now <= until_ms {
            spawner.update(now, rng, &mut events);
            now += step_ms;
        }
        events
    }

    mod schedule_tests {
        use super::*;

        #[test]
        fn nothing_happens_before_start() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(1);
            let events = run(&mut spawner, &mut rng, 30_000, 100);
            assert!(events.is_empty());
            assert!(spawner.items().is_empty());
        }

        #[test]
        fn first_weapon_after_initial_delay() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(1);
            let mut events = Vec::new();
            spawner.start(0);

            spawner.update(2_999, &mut rng, &mut events);
            assert_eq!(spawner.count(ItemKind::Weapon), 0);

            spawner.update(3_001, &mut rng, &mut events);
            assert_eq!(spawner.count(ItemKind::Weapon), 1);
        }

        #[test]
        fn heal_gating_over_sixty_seconds() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(2024);
            spawner.start(0);

            let mut events = Vec::new();
            let mut now = 0;
            while now <= 60_000 {
                spawner.update(now, &mut rng, &mut events);
                assert!(spawner.count(ItemKind::Heal) <= 2);
                now += 16;
            }

            // The first heal attempt is due after 20 s, then every 18 s.
            let heal_spawns = events
                .iter()
                .filter(|e| matches!(e, SimEvent::ItemSpawned { kind: ItemKind::Heal, .. }))
                .count();
            let skipped = events
                .iter()
                .filter(|e| matches!(e, SimEvent::HealSkipped))
                .count();
            assert_eq!(heal_spawns + skipped, 3);
        }

        #[test]
        fn weapon_interval_shrinks_after_boost() {
            let spawner = spawner();
            assert_eq!(spawner.effective_interval(ItemKind::Weapon, 10_000), 4_000);
            assert_eq!(spawner.effective_interval(ItemKind::Weapon, 55_000), 3_700);
            assert_eq!(spawner.effective_interval(ItemKind::Weapon, 200_000), 2_500);
            assert_eq!(spawner.effective_interval(ItemKind::Heal, 0), 18_000);
        }

        #[test]
        fn obstacles_not_scheduled_by_default() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(1);
            spawner.start(0);
            run(&mut spawner, &mut rng, 30_000, 50);
            assert_eq!(spawner.count(ItemKind::Obstacle), 0);
        }

        #[test]
        fn scheduled_obstacles_respect_cap() {
            let config = SpawnerConfig {
                obstacles_scheduled: true,
                ..SpawnerConfig::default()
            };
            let mut spawner = ItemSpawner::new(config, Arena::default(), 90_000);
            let mut rng = SimRng::new(1);
            spawner.start(0);
            run(&mut spawner, &mut rng, 80_000, 50);
            assert!(spawner.count(ItemKind::Obstacle) <= 5);
            assert!(spawner.count(ItemKind::Obstacle) > 0);
        }
    }

    mod blitz_tests {
        use super::*;

        #[test]
        fn blitz_batches_land_staggered() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(1);
            let mut events = Vec::new();
            spawner.start(0);

            assert_eq!(spawner.weapon_blitz(1_000), 2);
            spawner.update(1_000, &mut rng, &mut events);
            assert_eq!(spawner.pending_blitz(), 1);
            assert_eq!(spawner.count(ItemKind::Weapon), 1);

            spawner.update(2_500, &mut rng, &mut events);
            assert_eq!(spawner.pending_blitz(), 0);
            assert_eq!(spawner.count(ItemKind::Weapon), 2);
        }

        #[test]
        fn reset_cancels_pending_blitz() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(1);
            let mut events = Vec::new();
            spawner.start(0);
            spawner.weapon_blitz(500);
            spawner.reset();

            spawner.update(5_000, &mut rng, &mut events);
            assert_eq!(spawner.pending_blitz(), 0);
            assert!(events.is_empty());
        }
    }

    mod placement_tests {
        use super::*;

        #[test]
        fn force_spawn_builds_obstacle_field_without_heals() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(11);
            let mut events = Vec::new();
            spawner.start(0);
            spawner.force_spawn_all(0, &mut rng, &mut events);

            assert_eq!(spawner.count(ItemKind::Heal), 0);
            assert_eq!(spawner.count(ItemKind::Weapon), 1);
            assert!(spawner.count(ItemKind::Obstacle) <= 4);

            let center = Arena::default().center();
            let rocks: Vec<_> = spawner
                .items()
                .iter()
                .filter(|i| i.kind == ItemKind::Obstacle)
                .collect();
            for (i, rock) in rocks.iter().enumerate() {
                assert!(rock.position.distance(center) >= 60.0);
                assert!(rock.radius >= 10.0 && rock.radius <= 18.0);
                assert!(rock.style.is_some());
                for other in &rocks[i + 1..] {
                    let gap = rock.position.distance(other.position) - rock.radius - other.radius;
                    assert!(gap >= 10.0 - 1e-3);
                }
            }
        }

        #[test]
        fn items_respect_spawn_margin() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(3);
            spawner.start(0);
            run(&mut spawner, &mut rng, 60_000, 20);
            for item in spawner.items() {
                let margin = 30.0 + item.radius;
                assert!(item.position.x >= margin && item.position.x <= 400.0 - margin);
                assert!(item.position.y >= margin && item.position.y <= 400.0 - margin);
            }
        }

        #[test]
        fn remove_returns_item_once() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(1);
            let mut events = Vec::new();
            spawner.start(0);
            spawner.force_spawn_all(0, &mut rng, &mut events);
            let id = spawner.items()[0].id;

            assert!(spawner.remove(id).is_some());
            assert!(spawner.remove(id).is_none());
        }
    }

    mod removal_tests {
        use super::*;

        #[test]
        fn pickups_expire_obstacles_do_not() {
            let mut spawner = spawner();
            let mut rng = SimRng::new(1);
            let mut events = Vec::new();
            spawner.start(0);
            spawner.force_spawn_all(0, &mut rng, &mut events);
            let rocks = spawner.count(ItemKind::Obstacle);

            events.clear();
            spawner.update(30_001, &mut rng, &mut events);

            assert!(events.iter().any(|e| matches!(
                e,
                SimEvent::ItemRemoved {
                    kind: ItemKind::Weapon,
                    reason: RemovalReason::Expired,
                    ..
                }
            )));
            assert_eq!(spawner.count(ItemKind::Obstacle), rocks);
        }

        #[test]
        fn global_cap_evicts_oldest_pickup() {
            let mut config = SpawnerConfig {
                max_items: 6,
                obstacle_field_count: 0,
                blitz_batches: 8,
                blitz_stagger_ms: 0,
                ..SpawnerConfig::default()
            };
            config.weapon.cap = 10;
            let mut spawner = ItemSpawner::new(config, Arena::default(), 90_000);
            let mut rng = SimRng::new(5);
            let mut events = Vec::new();
            spawner.start(0);

            spawner.weapon_blitz(10);
            spawner.update(10, &mut rng, &mut events);

            assert_eq!(spawner.items().len(), 6);
            let evicted: Vec<_> = events
                .iter()
                .filter_map(|e| match e {
                    SimEvent::ItemRemoved {
                        item,
                        reason: RemovalReason::Evicted,
                        ..
                    } => Some(*item),
                    _ => None,
                })
                .collect();
            assert_eq!(evicted, vec![ItemId::new(1), ItemId::new(2)]);
        }
    }

    proptest! {
        #[test]
        fn caps_hold_for_any_seed(seed in any::<u64>()) {
            let config = SpawnerConfig {
                obstacles_scheduled: true,
                ..SpawnerConfig::default()
            };
            let mut spawner = ItemSpawner::new(config, Arena::default(), 90_000);
            let mut rng = SimRng::new(seed);
            let mut events = Vec::new();
            spawner.start(0);
            spawner.force_spawn_all(0, &mut rng, &mut events);

            let mut now = 0;
            while now <= 90_000 {
                spawner.update(now, &mut rng, &mut events);
                if now == 75_000 {
                    spawner.weapon_blitz(now);
                }
                prop_assert!(spawner.count(ItemKind::Heal) <= 2);
                prop_assert!(spawner.count(ItemKind::Weapon) <= 3);
                prop_assert!(spawner.items().len() <= 12);
                now += 250;
            }
        }
    }
}
