// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Temporal segment tree over the rectangles of one category.

use alloc::vec::Vec;

use canopy_view::{LodConfig, ViewportState};
use smallvec::{SmallVec, smallvec};

use crate::model::len_u32;
use crate::query::{QueryContext, QueryStats, TreeQuery};
use crate::{Bucket, CategoryId, CategoryStats, EventId, Nanos, Rectangle};

/// Aggregate cached per node for bucketing decisions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct SpanSummary {
    time_start: Nanos,
    time_end: Nanos,
    count: u32,
    total_duration: Nanos,
    /// Index (within the level) of the longest rectangle; earliest wins ties.
    longest: u32,
    longest_duration: Nanos,
}

impl SpanSummary {
    fn leaf(index: u32, rect: &Rectangle) -> Self {
        Self {
            time_start: rect.time_start,
            time_end: rect.time_end,
            count: 1,
            total_duration: rect.duration(),
            longest: index,
            longest_duration: rect.duration(),
        }
    }

    fn combine(left: Self, right: Self) -> Self {
        let (longest, longest_duration) = if right.longest_duration > left.longest_duration {
            (right.longest, right.longest_duration)
        } else {
            (left.longest, left.longest_duration)
        };
        Self {
            time_start: left.time_start.min(right.time_start),
            time_end: left.time_end.max(right.time_end),
            count: left.count + right.count,
            total_duration: left.total_duration + right.total_duration,
            longest,
            longest_duration,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct SegmentNode {
    summary: SpanSummary,
    /// First rectangle covered; for leaves, the only one.
    lo: u32,
    children: Option<[u32; 2]>,
}

/// Rectangles of one depth row and the tree built over them.
#[derive(Clone, Debug)]
struct DepthLevel {
    depth: u32,
    rects: Vec<Rectangle>,
    nodes: Vec<SegmentNode>,
    root: u32,
}

impl DepthLevel {
    fn new(depth: u32, rects: Vec<Rectangle>) -> Self {
        let mut nodes = Vec::with_capacity(rects.len().saturating_mul(2));
        let root = build_nodes(&rects, 0, len_u32(rects.len()), &mut nodes);
        Self {
            depth,
            rects,
            nodes,
            root,
        }
    }

    fn bucket(&self, node: &SegmentNode, category: CategoryId, ctx: &QueryContext) -> Bucket {
        let s = node.summary;
        let representative = self.rects[s.longest as usize];
        let mut bucket = Bucket {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            time_start: s.time_start,
            time_end: s.time_end,
            depth: self.depth,
            event_count: s.count,
            by_category: CategoryStats::single(category, s.count, s.total_duration),
            color: representative.color,
            dominant_category: Some(category),
            alpha: ctx.config.bucket_alpha(s.count),
            representative: Some(representative),
        };
        bucket.place(&ctx.viewport, &ctx.config);
        bucket
    }

    fn query(
        &self,
        category: CategoryId,
        ctx: &QueryContext,
        visible: &mut Vec<Rectangle>,
        buckets: &mut Vec<Bucket>,
        stats: &mut QueryStats,
    ) {
        // The explicit stack never grows past the tree height plus one.
        let mut stack: SmallVec<[u32; 64]> = smallvec![self.root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            let s = node.summary;
            let (start, end) = (s.time_start as f64, s.time_end as f64);
            if !ctx.bounds.overlaps_time(start, end) {
                continue;
            }
            match node.children {
                None => {
                    let rect = self.rects[node.lo as usize];
                    if rect.duration() as f64 > ctx.threshold {
                        visible.push(rect);
                        stats.visible_count += 1;
                    } else {
                        buckets.push(self.bucket(node, category, ctx));
                        stats.bucketed_event_count += 1;
                        stats.bucket_count += 1;
                    }
                }
                Some([left, right]) => {
                    if end - start <= ctx.threshold && ctx.bounds.contains_time_span(start, end) {
                        buckets.push(self.bucket(node, category, ctx));
                        stats.bucketed_event_count += s.count as usize;
                        stats.bucket_count += 1;
                    } else {
                        stack.push(right);
                        stack.push(left);
                    }
                }
            }
        }
    }

    /// Rectangles overlapping `(time_start, time_end)`, in time order.
    fn overlapping(&self, time_start: f64, time_end: f64) -> impl Iterator<Item = &Rectangle> {
        // Rectangles in one row never overlap, so ends are sorted as well.
        let first = self
            .rects
            .partition_point(|r| r.time_end as f64 <= time_start);
        self.rects[first..]
            .iter()
            .take_while(move |r| (r.time_start as f64) < time_end)
    }
}

fn build_nodes(rects: &[Rectangle], lo: u32, hi: u32, nodes: &mut Vec<SegmentNode>) -> u32 {
    debug_assert!(lo < hi, "segment tree nodes cover at least one rectangle");
    let (summary, children) = if hi - lo == 1 {
        (SpanSummary::leaf(lo, &rects[lo as usize]), None)
    } else {
        let mid = lo + (hi - lo) / 2;
        let left = build_nodes(rects, lo, mid, nodes);
        let right = build_nodes(rects, mid, hi, nodes);
        let summary = SpanSummary::combine(
            nodes[left as usize].summary,
            nodes[right as usize].summary,
        );
        (summary, Some([left, right]))
    };
    nodes.push(SegmentNode {
        summary,
        lo,
        children,
    });
    len_u32(nodes.len() - 1)
}

/// Level-of-detail index over the rectangles of a single category.
///
/// Each populated depth row gets its own balanced binary tree over the row's
/// time-sorted rectangles. Every node caches the time extent, event count,
/// summed duration, and longest rectangle of the rectangles beneath it, so a
/// query can stop at the coarsest node that renders narrower than the density
/// threshold and emit it as one [`Bucket`].
///
/// Trees are immutable once built; loading a new trace builds new trees.
#[derive(Clone, Debug)]
pub struct SegmentTree {
    category: CategoryId,
    levels: Vec<DepthLevel>,
    rect_count: usize,
}

impl SegmentTree {
    /// Builds a tree from rectangles of `category`.
    ///
    /// Rectangles are expected in depth-then-time order, which is the order
    /// [`FlameIndex`](crate::FlameIndex) produces; any other order is sorted
    /// first. Zero-duration rectangles are dropped.
    #[must_use]
    pub fn build(category: CategoryId, mut rects: Vec<Rectangle>) -> Self {
        rects.retain(|r| r.time_end > r.time_start);
        if !rects.is_sorted_by_key(|r| (r.depth, r.time_start)) {
            rects.sort_by_key(|r| (r.depth, r.time_start));
        }
        debug_assert!(
            rects.iter().all(|r| r.category == category),
            "SegmentTree::build: rectangles must all belong to the tree's category"
        );

        let rect_count = rects.len();
        let levels = rects
            .chunk_by(|a, b| a.depth == b.depth)
            .map(|row| DepthLevel::new(row[0].depth, row.to_vec()))
            .collect();
        Self {
            category,
            levels,
            rect_count,
        }
    }

    /// The category this tree indexes.
    #[must_use]
    pub fn category(&self) -> CategoryId {
        self.category
    }

    /// Number of indexed rectangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rect_count
    }

    /// Returns `true` if the tree indexes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rect_count == 0
    }

    /// Deepest populated depth, or `0` for an empty tree.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.levels.last().map_or(0, |l| l.depth)
    }

    /// All rectangles, by depth then time.
    pub fn rectangles(&self) -> impl Iterator<Item = &Rectangle> {
        self.levels.iter().flat_map(|l| l.rects.iter())
    }

    /// Rectangles at one depth, in time order.
    #[must_use]
    pub fn rectangles_at_depth(&self, depth: u32) -> &[Rectangle] {
        self.level_index(depth)
            .map_or(&[], |i| self.levels[i].rects.as_slice())
    }

    /// Culls and aggregates against `viewport`.
    ///
    /// Returns an empty result for viewports that fail validation.
    #[must_use]
    pub fn query(&self, viewport: &ViewportState, config: &LodConfig) -> TreeQuery {
        let mut out = TreeQuery::default();
        if let Some(ctx) = QueryContext::new(viewport, config) {
            out.stats = ctx.stats();
            self.query_with(&ctx, &mut out.visible, &mut out.buckets, &mut out.stats);
        }
        out
    }

    pub(crate) fn query_with(
        &self,
        ctx: &QueryContext,
        visible: &mut Vec<Rectangle>,
        buckets: &mut Vec<Bucket>,
        stats: &mut QueryStats,
    ) {
        for level in self.levels_in(ctx.bounds.depth_start, ctx.bounds.depth_end) {
            level.query(self.category, ctx, visible, buckets, stats);
        }
    }

    /// Rectangles with `start < time_end && end > time_start` and depth in
    /// `depth_start..=depth_end`, by depth then time.
    pub fn rectangles_in_region(
        &self,
        time_start: f64,
        time_end: f64,
        depth_start: u32,
        depth_end: u32,
    ) -> impl Iterator<Item = &Rectangle> {
        self.levels_in(depth_start, depth_end)
            .iter()
            .flat_map(move |l| l.overlapping(time_start, time_end))
    }

    /// Ids of the events in [`rectangles_in_region`](Self::rectangles_in_region).
    pub fn events_in_region(
        &self,
        time_start: f64,
        time_end: f64,
        depth_start: u32,
        depth_end: u32,
    ) -> impl Iterator<Item = EventId> + '_ {
        self.rectangles_in_region(time_start, time_end, depth_start, depth_end)
            .map(|r| r.event)
    }

    fn levels_in(&self, depth_start: u32, depth_end: u32) -> &[DepthLevel] {
        if depth_end < depth_start {
            return &[];
        }
        let first = self.levels.partition_point(|l| l.depth < depth_start);
        let last = self.levels.partition_point(|l| l.depth <= depth_end);
        &self.levels[first..last.max(first)]
    }

    fn level_index(&self, depth: u32) -> Option<usize> {
        self.levels.binary_search_by_key(&depth, |l| l.depth).ok()
    }
}
