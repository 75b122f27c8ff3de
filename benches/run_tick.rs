use criterion::{black_box, criterion_group, criterion_main, Criterion};

use totem_run::{GameConfig, InputFrame, RunSession, Vec2};
use totem_run::game::room::RoomSequencer;

fn bench_tick(c: &mut Criterion) {
    c.bench_function("run_tick_idle", |b| {
        let mut session = RunSession::new(GameConfig::default(), 42);
        let frame = InputFrame::at(Vec2::new(160.0, 50.0));
        let mut now = 0;
        b.iter(|| {
            now += 16;
            black_box(session.tick(black_box(&frame), now));
        })
    });

    c.bench_function("run_tick_attack_interact", |b| {
        let mut session = RunSession::new(GameConfig::default(), 42);
        let frame = InputFrame::at(Vec2::new(96.0, 96.0)).interact().attack();
        let mut now = 0;
        b.iter(|| {
            now += 16;
            black_box(session.tick(black_box(&frame), now));
        })
    });
}

fn bench_generation(c: &mut Criterion) {
    c.bench_function("generate_run", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            black_box(RoomSequencer::new(black_box(seed)));
        })
    });

    c.bench_function("session_new", |b| {
        b.iter(|| black_box(RunSession::new(GameConfig::default(), black_box(7))))
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let session = RunSession::new(GameConfig::default(), 42);
    c.bench_function("fingerprint", |b| b.iter(|| black_box(session.fingerprint())));
}

criterion_group!(benches, bench_tick, bench_generation, bench_fingerprint);
criterion_main!(benches);
