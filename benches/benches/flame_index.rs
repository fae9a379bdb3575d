// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use canopy_index::{CategoryRegistry, FlameIndex, QueryResult, TimelineIndex};
use canopy_view::{ViewportBounds, ViewportState};

mod trace;

use trace::synthetic_trace;

const WIDTH: f64 = 1_600.0;
const HEIGHT: f64 = 600.0;

fn fit(index: &FlameIndex, zoom_factor: f64) -> ViewportState {
    let span = index.time_span().map_or(1, |r| r.end - r.start).max(1);
    let zoom = WIDTH / span as f64 * zoom_factor;
    ViewportState::new(zoom, 0.0, 0.0, WIDTH, HEIGHT)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("flame_index/build");
    let registry = CategoryRegistry::default();
    for roots in [16_u64, 128, 1_024] {
        let tree = synthetic_trace(0x5eed, roots, 10);
        group.throughput(Throughput::Elements(tree.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tree.len()), &tree, |b, tree| {
            b.iter(|| black_box(FlameIndex::build(tree, &registry)));
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("flame_index/query");
    let registry = CategoryRegistry::default();
    let tree = synthetic_trace(0x5eed, 1_024, 10);
    let index = FlameIndex::build(&tree, &registry);

    // 1.0 shows the whole trace; larger factors zoom into its start.
    for zoom_factor in [1.0, 16.0, 256.0, 4_096.0] {
        let viewport = fit(&index, zoom_factor);
        group.bench_with_input(
            BenchmarkId::new("query_into", zoom_factor),
            &viewport,
            |b, viewport| {
                let mut result = QueryResult::new();
                b.iter(|| {
                    index.query_into(viewport, &mut result);
                    black_box(&result.stats);
                });
            },
        );
    }

    let viewport = fit(&index, 1.0);
    group.bench_function("query_fresh", |b| {
        b.iter_batched(
            || viewport,
            |viewport| black_box(index.query(&viewport)),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("flame_index/region");
    let registry = CategoryRegistry::default();
    let tree = synthetic_trace(0x5eed, 1_024, 10);
    let index = FlameIndex::build(&tree, &registry);
    let timeline = TimelineIndex::new(&tree);
    let bounds = ViewportBounds::new(250_000_000.0, 260_000_000.0, 2, 6);

    group.bench_function("segment_trees", |b| {
        b.iter(|| {
            black_box(index.query_events_in_region(
                bounds.time_start,
                bounds.time_end,
                bounds.depth_start,
                bounds.depth_end,
            ))
        });
    });
    group.bench_function("timeline", |b| {
        b.iter(|| black_box(timeline.find_events_in_region(&bounds)));
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_query, bench_region);
criterion_main!(benches);
