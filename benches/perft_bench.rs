use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use flintchess::movegen::moves::generate_pseudo_legal;
use flintchess::perft::perft;
use flintchess::Position;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn movegen_benchmark(c: &mut Criterion) {
    flintchess::init_tables();

    let positions = [
        ("startpos", Position::startpos()),
        ("kiwipete", Position::from_descriptor(KIWIPETE).unwrap()),
    ];

    let mut group = c.benchmark_group("Move Generation");
    for (name, pos) in positions {
        let count = generate_pseudo_legal(&pos).len() as u64;
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("pseudo_legal", name), &pos, |b, pos| {
            b.iter(|| black_box(generate_pseudo_legal(black_box(pos))));
        });
    }
    group.finish();
}

fn make_unmake_benchmark(c: &mut Criterion) {
    flintchess::init_tables();

    let pos = Position::from_descriptor(KIWIPETE).unwrap();
    let moves = generate_pseudo_legal(&pos);

    let mut group = c.benchmark_group("Make Unmake");
    group.throughput(Throughput::Elements(moves.len() as u64));
    group.bench_function("apply_revert_kiwipete", |b| {
        let mut pos = pos.clone();
        b.iter(|| {
            for mv in &moves {
                let (undo, _) = pos.apply(mv);
                pos.revert(mv, undo);
            }
            black_box(&mut pos);
        });
    });
    group.finish();
}

fn perft_benchmark(c: &mut Criterion) {
    flintchess::init_tables();

    let mut group = c.benchmark_group("Perft");
    group
        .sample_size(20)
        .measurement_time(Duration::from_secs(20));

    group.bench_function("startpos_4", |b| {
        let mut pos = Position::startpos();
        b.iter(|| black_box(perft(&mut pos, 4)));
    });
    group.bench_function("kiwipete_3", |b| {
        let mut pos = Position::from_descriptor(KIWIPETE).unwrap();
        b.iter(|| black_box(perft(&mut pos, 3)));
    });
    group.finish();
}

criterion_group!(
    name = perft_benches;
    config = Criterion::default().noise_threshold(0.02);
    targets = movegen_benchmark, make_unmake_benchmark, perft_benchmark,
);
criterion_main!(perft_benches);
