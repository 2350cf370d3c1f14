use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use sawclash_core::config::SimConfig;
use sawclash_core::entity::{Actor, ActorId};
use sawclash_core::rng::SimRng;
use sawclash_core::simulation::{Frame, Simulation};
use sawclash_core::{ManualClock, MatchController};

fn crowded_frame(config: &SimConfig, count: u64) -> Frame {
    let mut rng = SimRng::new(17);
    let players = (1..=count)
        .map(|id| {
            let mut actor = Actor::new(ActorId::new(id), format!("P{id}"), "#fff", None, &config.actor);
            actor.position = Vec2::new(rng.range(30.0, 370.0), rng.range(30.0, 370.0));
            actor.velocity = rng.direction() * 2.5;
            actor
        })
        .collect();
    Frame {
        players,
        items: Vec::new(),
    }
}

fn bench_simulation_step(c: &mut Criterion) {
    let config = SimConfig::default();
    let sim = Simulation::new(&config);
    let frame = crowded_frame(&config, 12);
    let mut rng = SimRng::new(1);
    let mut events = Vec::new();

    c.bench_function("simulation_step_12", |b| {
        b.iter(|| {
            events.clear();
            black_box(sim.step(black_box(&frame), 16.0, &mut rng, &mut events))
        })
    });
}

fn bench_controller_tick(c: &mut Criterion) {
    let mut config = SimConfig::default();
    config.timing.start_countdown_ms = 0;
    // Long enough that the benchmark never reaches the end of the match.
    config.timing.max_game_duration_ms = u64::MAX / 2;
    config.timing.blitz_at_remaining_ms = 0;

    let clock = ManualClock::new();
    let mut controller = match MatchController::new(config, 3, Box::new(clock.clone())) {
        Ok(controller) => controller,
        Err(err) => panic!("bench config rejected: {err}"),
    };
    for i in 0..8 {
        let _ = controller.add_player(&format!("P{i}"), "#fff", None);
    }
    let _ = controller.start();

    c.bench_function("controller_tick_8", |b| {
        b.iter(|| {
            clock.advance(16);
            black_box(controller.tick())
        })
    });
}

criterion_group!(benches, bench_simulation_step, bench_controller_tick);
criterion_main!(benches);
