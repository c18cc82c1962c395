use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use orbit_scene::geometry::build_mesh;
use orbit_scene::{GeometryKind, HeadlessBackend, SceneConfig, SceneRuntime, Viewport};

/// Benchmark: one frame advance for increasing object counts
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [1usize, 3, 16] {
        let config = SceneConfig {
            object_count: Some(count),
            ..SceneConfig::default()
        };
        let mut runtime =
            SceneRuntime::new(&config, Viewport::new(1280, 720), HeadlessBackend::new()).unwrap();
        runtime.controls_mut().0.rotate_left(0.5);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| runtime.tick())
        });
    }

    group.finish();
}

/// Benchmark: alternating resizes, the worst case for the resize path
fn bench_resize(c: &mut Criterion) {
    let mut runtime = SceneRuntime::new(
        &SceneConfig::default(),
        Viewport::new(1280, 720),
        HeadlessBackend::new(),
    )
    .unwrap();
    let mut wide = false;

    c.bench_function("resize_alternating", |b| {
        b.iter(|| {
            wide = !wide;
            let (w, h) = if wide { (1920, 1080) } else { (1280, 720) };
            black_box(runtime.resize(black_box(w), black_box(h)))
        })
    });
}

/// Benchmark: mesh generation for the torus knot
fn bench_torus_knot_mesh(c: &mut Criterion) {
    c.bench_function("torus_knot_mesh", |b| {
        b.iter(|| black_box(build_mesh(black_box(&GeometryKind::TORUS_KNOT))))
    });
}

criterion_group!(benches, bench_tick, bench_resize, bench_torus_knot_mesh);
criterion_main!(benches);
