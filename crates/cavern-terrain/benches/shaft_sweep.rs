use cavern_terrain::*;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_reference_cave(c: &mut Criterion) {
    let mut params = CaveParams::default();
    bootstrap::apply_reference_shape(&mut params);
    let generator = VerticalCaveGenerator::new(params);
    c.bench_function("reference_cave", |bencher| {
        bencher.iter(|| black_box(generator.generate_seeded()))
    });
}

fn bench_shaft_only(c: &mut Criterion) {
    let params = CaveParams {
        tunnels: TunnelParams {
            count: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    let generator = VerticalCaveGenerator::new(params);
    c.bench_function("shaft_only", |bencher| {
        bencher.iter(|| black_box(generator.generate_seeded()))
    });
}

fn bench_fbm1(c: &mut Criterion) {
    let noise = Fbm::new(42);
    c.bench_function("fbm1_1k", |bencher| {
        bencher.iter(|| {
            let mut acc = 0.0;
            for i in 0..1000 {
                acc += noise.fbm1(black_box(i as f32 * 0.37));
            }
            black_box(acc)
        })
    });
}

fn bench_automata_step(c: &mut Criterion) {
    let grid = VoxelGrid::random_fill([50, 50, 50], 0.45, BoundaryMode::Open, &mut cave_rng(1));
    let policy = SmoothingPolicy::default();
    c.bench_function("automata_step_50", |bencher| {
        bencher.iter(|| black_box(grid.next_generation(&policy)))
    });
}

criterion_group!(
    benches,
    bench_reference_cave,
    bench_shaft_only,
    bench_fbm1,
    bench_automata_step,
);
criterion_main!(benches);
