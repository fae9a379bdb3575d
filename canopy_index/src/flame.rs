// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Category-partitioned rectangle index and per-frame culling entry point.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use canopy_view::{LodConfig, ViewportState};
use hashbrown::hash_map::Entry;

use crate::query::{MergeScratch, QueryContext};
use crate::{
    Bucket, CategoryId, CategoryRegistry, DominanceKey, EventId, EventTree, Nanos, QueryResult,
    Rectangle, SegmentTree, dominance_key, resolve_color,
};

/// Culling and level-of-detail index over a whole trace.
///
/// Built once per loaded trace. Every drawable event (non-zero duration,
/// registered category) becomes a [`Rectangle`] in its category's
/// [`SegmentTree`]. Each frame, [`query`](Self::query) asks every tree for the
/// rectangles and buckets inside the viewport, then merges buckets of
/// different categories that land in the same pixel column of the same row.
#[derive(Clone, Debug)]
pub struct FlameIndex {
    registry: CategoryRegistry,
    config: LodConfig,
    trees: Vec<SegmentTree>,
    rect_count: usize,
    max_depth: u32,
    time_span: Option<Range<Nanos>>,
}

impl FlameIndex {
    /// Builds the index with the default [`LodConfig`].
    #[must_use]
    pub fn build(tree: &EventTree, registry: &CategoryRegistry) -> Self {
        Self::build_with_config(tree, registry, LodConfig::default())
    }

    /// Builds the index with explicit level-of-detail parameters.
    #[must_use]
    pub fn build_with_config(
        tree: &EventTree,
        registry: &CategoryRegistry,
        config: LodConfig,
    ) -> Self {
        let mut per_category: Vec<Vec<Rectangle>> = vec![Vec::new(); registry.len()];
        let mut zero_duration = 0_usize;
        let mut unregistered = 0_usize;

        // Arena order is depth-major and time-sorted within a depth, which is
        // exactly the order the segment trees want.
        for (id, event) in tree.iter() {
            if event.duration.total == 0 {
                zero_duration += 1;
                continue;
            }
            let Some(info) = registry.get(event.category) else {
                unregistered += 1;
                continue;
            };
            per_category[event.category.index()].push(Rectangle {
                time_start: event.timestamp,
                time_end: event.end(),
                depth: event.depth,
                category: event.category,
                color: info.color,
                event: id,
            });
        }

        if unregistered > 0 {
            tracing::warn!(
                skipped = unregistered,
                "events with unregistered categories were left out of the flame index"
            );
        }

        let trees: Vec<SegmentTree> = per_category
            .into_iter()
            .zip(registry.iter())
            .filter(|(rects, _)| !rects.is_empty())
            .map(|(rects, (category, info))| {
                tracing::trace!(category = %info.name, rectangles = rects.len(), "indexing category");
                SegmentTree::build(category, rects)
            })
            .collect();
        let rect_count = trees.iter().map(SegmentTree::len).sum();
        let max_depth = trees.iter().map(SegmentTree::max_depth).max().unwrap_or(0);

        tracing::debug!(
            events = tree.len(),
            rectangles = rect_count,
            zero_duration,
            categories = trees.len(),
            max_depth,
            "built flame index"
        );

        Self {
            registry: registry.clone(),
            config,
            trees,
            rect_count,
            max_depth,
            time_span: tree.time_span(),
        }
    }

    /// Culls and aggregates the trace against `viewport`.
    ///
    /// Convenience wrapper around [`query_into`](Self::query_into).
    #[must_use]
    pub fn query(&self, viewport: &ViewportState) -> QueryResult {
        let mut out = QueryResult::new();
        self.query_into(viewport, &mut out);
        out
    }

    /// Culls and aggregates the trace against `viewport`, reusing `out`.
    ///
    /// Invalid viewports produce an empty result.
    pub fn query_into(&self, viewport: &ViewportState, out: &mut QueryResult) {
        out.clear();
        let Some(ctx) = QueryContext::new(viewport, &self.config) else {
            out.drop_empty();
            return;
        };
        out.stats = ctx.stats();

        for tree in &self.trees {
            let visible = out.visible_rects.entry(tree.category()).or_default();
            tree.query_with(&ctx, visible, &mut out.scratch.raw, &mut out.stats);
        }

        self.merge_buckets(&ctx, &mut out.scratch);
        out.stats.bucket_count = out.scratch.merged.len();
        for bucket in out.scratch.merged.drain(..) {
            let Some(category) = bucket.dominant_category else {
                continue;
            };
            out.buckets.entry(category).or_default().push(bucket);
        }
        out.drop_empty();

        tracing::trace!(
            visible = out.stats.visible_count,
            bucketed = out.stats.bucketed_event_count,
            buckets = out.stats.bucket_count,
            threshold_ns = ctx.threshold,
            "flame index query"
        );
    }

    /// Folds raw per-category buckets into one bucket per (depth, pixel column).
    fn merge_buckets(&self, ctx: &QueryContext, scratch: &mut MergeScratch) {
        let MergeScratch { raw, merged, cells } = scratch;
        for bucket in raw.drain(..) {
            let column = ctx.viewport.pixel_column(bucket.time_start as f64);
            match cells.entry((bucket.depth, column)) {
                Entry::Occupied(slot) => self.absorb(ctx, &mut merged[*slot.get()], bucket),
                Entry::Vacant(slot) => {
                    slot.insert(merged.len());
                    merged.push(bucket);
                }
            }
        }

        for bucket in merged.iter_mut().filter(|b| b.by_category.len() > 1) {
            let resolved = resolve_color(&bucket.by_category, &self.registry);
            bucket.color = resolved.color;
            bucket.dominant_category = resolved.dominant;
        }
    }

    fn absorb(&self, ctx: &QueryContext, into: &mut Bucket, other: Bucket) {
        into.time_start = into.time_start.min(other.time_start);
        into.time_end = into.time_end.max(other.time_end);
        into.by_category.merge(&other.by_category);
        into.event_count += other.event_count;
        into.alpha = self.config.bucket_alpha(into.event_count);
        into.representative = match (into.representative, other.representative) {
            (Some(a), Some(b)) => Some(if self.rank(&b) < self.rank(&a) { b } else { a }),
            (a, b) => a.or(b),
        };
        into.place(&ctx.viewport, &self.config);
    }

    fn rank(&self, rect: &Rectangle) -> DominanceKey {
        dominance_key(&self.registry, rect.category, rect.duration(), 1)
    }

    /// Events intersecting a time window and depth range.
    ///
    /// Only events with non-zero duration and
    /// `start < time_end && end > time_start && depth_start <= depth <= depth_end`
    /// are returned, sorted by id.
    #[must_use]
    pub fn query_events_in_region(
        &self,
        time_start: f64,
        time_end: f64,
        depth_start: u32,
        depth_end: u32,
    ) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self
            .trees
            .iter()
            .flat_map(|t| t.events_in_region(time_start, time_end, depth_start, depth_end))
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Rectangles intersecting a time window and depth range, in no particular order.
    pub fn rectangles_in_region(
        &self,
        time_start: f64,
        time_end: f64,
        depth_start: u32,
        depth_end: u32,
    ) -> impl Iterator<Item = &Rectangle> {
        self.trees
            .iter()
            .flat_map(move |t| t.rectangles_in_region(time_start, time_end, depth_start, depth_end))
    }

    /// Number of indexed events (non-zero duration, registered category).
    #[must_use]
    pub fn total_event_count(&self) -> usize {
        self.rect_count
    }

    /// Deepest populated depth, or `0` for an empty trace.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Time extent of the trace, if it has any events.
    #[must_use]
    pub fn time_span(&self) -> Option<Range<Nanos>> {
        self.time_span.clone()
    }

    /// Rectangles of one category, by depth then time.
    pub fn rectangles(&self, category: CategoryId) -> impl Iterator<Item = &Rectangle> {
        self.segment_tree(category)
            .into_iter()
            .flat_map(|t| t.rectangles())
    }

    /// The segment tree of `category`, if it has any rectangles.
    #[must_use]
    pub fn segment_tree(&self, category: CategoryId) -> Option<&SegmentTree> {
        self.trees
            .binary_search_by_key(&category, SegmentTree::category)
            .ok()
            .map(|i| &self.trees[i])
    }

    /// The registry the index was built with.
    #[must_use]
    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// The level-of-detail parameters queries run with.
    #[must_use]
    pub fn config(&self) -> &LodConfig {
        &self.config
    }
}
