// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame query output and the buffers reused between frames.

use alloc::vec::Vec;
use core::ops::RangeInclusive;

use canopy_view::{LodConfig, ViewportBounds, ViewportState};
use hashbrown::HashMap;

use crate::{Bucket, CategoryId, Rectangle};

/// Counters describing one culling query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryStats {
    /// Events returned as individual rectangles.
    pub visible_count: usize,
    /// Events folded into buckets.
    pub bucketed_event_count: usize,
    /// Buckets returned.
    pub bucket_count: usize,
    /// Density threshold in nanoseconds the query ran with.
    pub threshold: f64,
    /// Depth rows covered by the viewport, or `None` if nothing was visible.
    pub visible_depths: Option<RangeInclusive<u32>>,
}

impl QueryStats {
    /// Total events represented by the query, individually or in buckets.
    #[must_use]
    pub fn represented_event_count(&self) -> usize {
        self.visible_count + self.bucketed_event_count
    }
}

/// Output of one [`SegmentTree`](crate::SegmentTree) query.
#[derive(Clone, Debug, Default)]
pub struct TreeQuery {
    /// Rectangles above the density threshold, by depth then time.
    pub visible: Vec<Rectangle>,
    /// Buckets for sub-threshold events, by depth then time.
    pub buckets: Vec<Bucket>,
    /// Counters for this tree alone.
    pub stats: QueryStats,
}

/// Output of [`FlameIndex::query`](crate::FlameIndex::query), keyed by category.
///
/// Keep one `QueryResult` alive and pass it to
/// [`FlameIndex::query_into`](crate::FlameIndex::query_into) each frame; the
/// vectors inside are cleared and refilled rather than reallocated.
#[derive(Clone, Debug, Default)]
pub struct QueryResult {
    /// Rectangles drawn individually, per category.
    pub visible_rects: HashMap<CategoryId, Vec<Rectangle>>,
    /// Buckets, per dominant category.
    pub buckets: HashMap<CategoryId, Vec<Bucket>>,
    /// Counters for the whole query.
    pub stats: QueryStats,
    pub(crate) scratch: MergeScratch,
}

impl QueryResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if neither rectangles nor buckets were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible_rects.values().all(Vec::is_empty) && self.buckets.values().all(Vec::is_empty)
    }

    /// Rectangles of one category.
    #[must_use]
    pub fn rects_for(&self, category: CategoryId) -> &[Rectangle] {
        self.visible_rects.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Buckets whose dominant category is `category`.
    #[must_use]
    pub fn buckets_for(&self, category: CategoryId) -> &[Bucket] {
        self.buckets.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Iterates every visible rectangle, in no particular category order.
    pub fn iter_rects(&self) -> impl Iterator<Item = &Rectangle> {
        self.visible_rects.values().flatten()
    }

    /// Iterates every bucket, in no particular category order.
    pub fn iter_buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.values().flatten()
    }

    /// Empties the result while keeping its allocations.
    pub fn clear(&mut self) {
        for rects in self.visible_rects.values_mut() {
            rects.clear();
        }
        for buckets in self.buckets.values_mut() {
            buckets.clear();
        }
        self.stats = QueryStats::default();
        self.scratch.clear();
    }

    pub(crate) fn drop_empty(&mut self) {
        self.visible_rects.retain(|_, v| !v.is_empty());
        self.buckets.retain(|_, v| !v.is_empty());
    }
}

/// Buffers used while merging per-category buckets into screen cells.
#[derive(Clone, Debug, Default)]
pub(crate) struct MergeScratch {
    pub(crate) raw: Vec<Bucket>,
    pub(crate) merged: Vec<Bucket>,
    pub(crate) cells: HashMap<(u32, i64), usize>,
}

impl MergeScratch {
    fn clear(&mut self) {
        self.raw.clear();
        self.merged.clear();
        self.cells.clear();
    }
}

/// Everything a tree needs to know about the frame being culled.
#[derive(Clone, Copy, Debug)]
pub(crate) struct QueryContext {
    pub(crate) viewport: ViewportState,
    pub(crate) bounds: ViewportBounds,
    pub(crate) config: LodConfig,
    pub(crate) threshold: f64,
}

impl QueryContext {
    /// Validates `viewport`, returning `None` if nothing can be visible.
    pub(crate) fn new(viewport: &ViewportState, config: &LodConfig) -> Option<Self> {
        let bounds = match viewport.bounds(config) {
            Ok(bounds) => bounds,
            Err(err) => {
                tracing::debug!(%err, "rejected viewport; returning an empty frame");
                return None;
            }
        };
        if bounds.is_empty() {
            return None;
        }
        Some(Self {
            viewport: *viewport,
            bounds,
            config: *config,
            threshold: viewport.density_threshold(config),
        })
    }

    pub(crate) fn stats(&self) -> QueryStats {
        QueryStats {
            threshold: self.threshold,
            visible_depths: Some(self.bounds.depth_start..=self.bounds.depth_end),
            ..QueryStats::default()
        }
    }
}
