// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_hit::HitTestManager;
use canopy_index::{CategoryRegistry, FlameIndex, Marker, MarkerKind, MarkerSet};
use canopy_nav::{Direction, NavigationMaps, SelectionManager};
use canopy_view::ViewportState;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Point;

mod trace;

use trace::{Rng, synthetic_trace};

const WIDTH: f64 = 1_600.0;
const HEIGHT: f64 = 600.0;

fn random_points(n: usize) -> Vec<Point> {
    let mut rng = Rng::new(0xc0ffee);
    (0..n)
        .map(|_| {
            Point::new(
                rng.below(WIDTH as u64) as f64 + 0.5,
                rng.below(HEIGHT as u64) as f64 + 0.5,
            )
        })
        .collect()
}

fn bench_hit_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_test/point");
    let registry = CategoryRegistry::default();
    let tree = synthetic_trace(0x5eed, 1_024, 10);
    let index = FlameIndex::build(&tree, &registry);
    let markers = MarkerSet::new(
        (0..256_u64)
            .map(|i| Marker::new(i * 4_000_000, i * 4_000_000 + 1_000, MarkerKind::Error, "marker"))
            .collect(),
    );
    let points = random_points(1_024);
    let span = index.time_span().map_or(1, |r| r.end - r.start).max(1);

    for zoom_factor in [1.0, 64.0, 4_096.0] {
        let viewport = ViewportState::new(WIDTH / span as f64 * zoom_factor, 0.0, 0.0, WIDTH, HEIGHT);
        let frame = index.query(&viewport);
        let mut hits = HitTestManager::new(&tree, &index);
        hits.set_markers(Some(&markers));
        hits.update(&frame);

        group.bench_with_input(
            BenchmarkId::new("hit_test_point", zoom_factor),
            &viewport,
            |b, viewport| {
                b.iter(|| {
                    for &p in &points {
                        black_box(hits.hit_test_point(p, viewport));
                    }
                });
            },
        );
        group.bench_with_input(BenchmarkId::new("update", zoom_factor), &frame, |b, frame| {
            let mut hits = HitTestManager::new(&tree, &index);
            b.iter(|| hits.update(frame));
        });
    }
    group.finish();
}

fn bench_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_test/navigation");
    let tree = synthetic_trace(0x5eed, 1_024, 10);
    let markers = MarkerSet::default();

    group.bench_function("maps_build", |b| {
        b.iter(|| black_box(NavigationMaps::new(&tree)));
    });

    let maps = NavigationMaps::new(&tree);
    let first = tree.root_ids().next();
    group.bench_function("walk_right_at_depth", |b| {
        b.iter(|| {
            let mut sel = SelectionManager::new(&maps, &markers);
            if let Some(root) = first {
                sel.select_frame(root);
            }
            sel.navigate(Direction::Up);
            while sel.navigate(Direction::Right).is_some() {}
            black_box(sel.revision())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_hit_test, bench_navigation);
criterion_main!(benches);
