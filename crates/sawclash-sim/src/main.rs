//! Headless SawClash runner.
//!
//! Plays seeded matches to completion on a manual clock and prints a JSON
//! summary per match. Matches run in parallel and share nothing.

use std::str::FromStr;

use anyhow::{bail, Context};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use sawclash_core::config::LobbyConfig;
use sawclash_core::{
    CollisionKind, ManualClock, MatchController, Outcome, SimConfig, SimEvent,
};

const DEFAULT_PLAYERS: usize = 4;

const PALETTE: [&str; 8] = [
    "#e53935", "#1e88e5", "#43a047", "#fdd835", "#8e24aa", "#fb8c00", "#00acc1", "#6d4c41",
];

/// Runner settings read from the environment.
#[derive(Debug, Clone, Copy)]
struct RunSettings {
    seed: u64,
    matches: u64,
    players: usize,
    tick_ms: u64,
}

impl RunSettings {
    fn from_env(lobby: &LobbyConfig) -> Self {
        Self {
            seed: env_or("SAWCLASH_SEED", 42),
            matches: env_or("SAWCLASH_MATCHES", 8),
            players: roster_size(env_or("SAWCLASH_PLAYERS", DEFAULT_PLAYERS), lobby),
            tick_ms: env_or::<u64>("SAWCLASH_TICK_MS", 16).max(1),
        }
    }
}

/// Keeps a requested player count inside the lobby's roster limits.
fn roster_size(requested: usize, lobby: &LobbyConfig) -> usize {
    let allowed = lobby.min_players..=lobby.max_players;
    if allowed.contains(&requested) {
        return requested;
    }
    let fallback = DEFAULT_PLAYERS.clamp(lobby.min_players, lobby.max_players);
    warn!(
        requested,
        min = lobby.min_players,
        max = lobby.max_players,
        fallback,
        "player count outside roster limits, using fallback"
    );
    fallback
}

/// Reads `key` from the environment, warning and falling back on bad values.
fn env_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, %default, "invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[derive(Debug, Default, Serialize)]
struct MatchStats {
    hits: usize,
    cancels: usize,
    bounces: usize,
    heals: usize,
    weapons: usize,
    faults: usize,
}

impl MatchStats {
    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Collision { kind, .. } => match kind {
                CollisionKind::Hit { .. } => self.hits += 1,
                CollisionKind::Cancel => self.cancels += 1,
                CollisionKind::Bounce => self.bounces += 1,
            },
            SimEvent::HealPickup { .. } => self.heals += 1,
            SimEvent::WeaponPickup { .. } => self.weapons += 1,
            SimEvent::Fault { .. } => self.faults += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchSummary {
    seed: u64,
    outcome: Outcome,
    winner: Option<String>,
    ticks: u64,
    duration_ms: u64,
    survivors: usize,
    stats: MatchStats,
}

fn play(config: &SimConfig, seed: u64, settings: RunSettings) -> anyhow::Result<MatchSummary> {
    let clock = ManualClock::new();
    let mut controller = MatchController::new(config.clone(), seed, Box::new(clock.clone()))
        .context("rejected simulation config")?;

    for i in 0..settings.players {
        let color = PALETTE[i % PALETTE.len()];
        controller
            .add_player(&format!("Bot {}", i + 1), color, None)
            .with_context(|| format!("adding player {}", i + 1))?;
    }
    controller.start().context("starting match")?;

    let budget_ms = config.timing.start_countdown_ms + config.timing.max_game_duration_ms;
    let max_ticks = budget_ms / settings.tick_ms + 2;
    let mut stats = MatchStats::default();

    for _ in 0..max_ticks {
        clock.advance(settings.tick_ms);
        let report = controller.tick();
        report.events.iter().for_each(|event| stats.record(event));

        if let Some(outcome) = report.outcome {
            let snapshot = report.snapshot;
            let winner = match outcome {
                Outcome::Winner(id) => snapshot
                    .players
                    .iter()
                    .find(|p| p.id == id)
                    .map(|p| p.name.clone()),
                Outcome::Draw | Outcome::Unresolved => None,
            };
            debug!(seed, ?outcome, ticks = snapshot.tick, "match finished");
            return Ok(MatchSummary {
                seed,
                outcome,
                winner,
                ticks: snapshot.tick,
                duration_ms: config
                    .timing
                    .max_game_duration_ms
                    .saturating_sub(snapshot.time_remaining_ms),
                survivors: snapshot.players.iter().filter(|p| p.is_alive()).count(),
                stats,
            });
        }
    }

    bail!("match with seed {seed} did not end within {max_ticks} ticks")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("SawClash headless runner v{}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::default().validated()?;
    let settings = RunSettings::from_env(&config.lobby);
    info!(
        seed = settings.seed,
        matches = settings.matches,
        players = settings.players,
        tick_ms = settings.tick_ms,
        "running matches"
    );

    let summaries = (0..settings.matches)
        .into_par_iter()
        .map(|i| play(&config, settings.seed.wrapping_add(i), settings))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let draws = summaries
        .iter()
        .filter(|s| s.outcome == Outcome::Draw)
        .count();
    info!(matches = summaries.len(), draws, "all matches finished");

    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod roster_tests {
        use super::*;

        #[test]
        fn counts_inside_limits_are_kept() {
            let lobby = LobbyConfig::default();
            assert_eq!(roster_size(2, &lobby), 2);
            assert_eq!(roster_size(8, &lobby), 8);
        }

        #[test]
        fn counts_outside_limits_fall_back() {
            let lobby = LobbyConfig::default();
            assert_eq!(roster_size(0, &lobby), DEFAULT_PLAYERS);
            assert_eq!(roster_size(1, &lobby), DEFAULT_PLAYERS);
            assert_eq!(roster_size(9, &lobby), DEFAULT_PLAYERS);
        }

        #[test]
        fn fallback_respects_narrow_limits() {
            let lobby = LobbyConfig {
                min_players: 6,
                max_players: 8,
                ..LobbyConfig::default()
            };
            assert_eq!(roster_size(1, &lobby), 6);
        }

        #[test]
        fn fallback_count_plays_to_completion() {
            let config = SimConfig::default();
            let settings = RunSettings {
                seed: 1,
                matches: 1,
                players: roster_size(9, &config.lobby),
                tick_ms: 50,
            };
            let summary = play(&config, settings.seed, settings).unwrap();
            assert_ne!(summary.outcome, Outcome::Unresolved);
        }
    }
}
