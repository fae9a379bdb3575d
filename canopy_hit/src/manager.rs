// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::fmt;

use canopy_index::{
    Bucket, EventId, EventTree, FlameIndex, MarkerId, QueryResult, Rectangle, TimelineIndex,
    dominance_key,
};
use canopy_view::ViewportState;
use kurbo::Point;

use crate::{HitConfig, HitSource, HitTestResult, MarkerHitTest};

/// Resolves pointer positions to events and markers.
///
/// The manager caches the rectangles and buckets of the most recently rendered
/// [`QueryResult`], grouped by depth. Call [`update`](Self::update) with the
/// same result that was drawn, every frame; hit testing against a different
/// frame's cache would report what the user cannot see.
///
/// Lookups run in a fixed order and stop at the first success:
///
/// 1. A cached rectangle at the target depth whose time span contains the pointer.
/// 2. The [`TimelineIndex`], with width filtering on. Events whose category
///    the index does not know are never drawn, so they are skipped here too.
/// 3. A cached bucket whose screen footprint contains the pointer, resolved to
///    its most prominent event.
/// 4. The marker hit tester, if one is attached.
pub struct HitTestManager<'a> {
    index: &'a FlameIndex,
    timeline: TimelineIndex<'a>,
    markers: Option<&'a dyn MarkerHitTest>,
    config: HitConfig,
    rects_by_depth: Vec<Vec<Rectangle>>,
    buckets_by_depth: Vec<Vec<Bucket>>,
    rect_count: usize,
    bucket_count: usize,
}

impl fmt::Debug for HitTestManager<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitTestManager")
            .field("config", &self.config)
            .field("has_markers", &self.markers.is_some())
            .field("cached_rects", &self.rect_count)
            .field("cached_buckets", &self.bucket_count)
            .finish_non_exhaustive()
    }
}

impl<'a> HitTestManager<'a> {
    /// Creates a manager over a trace and the index built from it.
    #[must_use]
    pub fn new(tree: &'a EventTree, index: &'a FlameIndex) -> Self {
        Self::with_config(tree, index, HitConfig::default())
    }

    /// Creates a manager with explicit hit-testing parameters.
    #[must_use]
    pub fn with_config(tree: &'a EventTree, index: &'a FlameIndex, config: HitConfig) -> Self {
        Self {
            index,
            timeline: TimelineIndex::with_config(tree, *index.config())
                .with_min_hit_width(config.min_hit_width_px),
            markers: None,
            config,
            rects_by_depth: Vec::new(),
            buckets_by_depth: Vec::new(),
            rect_count: 0,
            bucket_count: 0,
        }
    }

    /// Attaches or detaches the marker hit tester consulted last.
    pub fn set_markers(&mut self, markers: Option<&'a dyn MarkerHitTest>) {
        self.markers = markers;
    }

    /// Returns the hit-testing parameters.
    #[must_use]
    pub fn config(&self) -> &HitConfig {
        &self.config
    }

    /// Replaces both caches with the contents of `result`.
    pub fn update(&mut self, result: &QueryResult) {
        self.clear();
        for rect in result.iter_rects() {
            depth_slot(&mut self.rects_by_depth, rect.depth).push(*rect);
        }
        for bucket in result.iter_buckets() {
            depth_slot(&mut self.buckets_by_depth, bucket.depth).push(bucket.clone());
        }
        for rects in &mut self.rects_by_depth {
            rects.sort_unstable_by_key(|r| r.time_start);
        }
        for buckets in &mut self.buckets_by_depth {
            buckets.sort_unstable_by(|a, b| a.x.total_cmp(&b.x));
        }
        self.rect_count = result.iter_rects().count();
        self.bucket_count = result.iter_buckets().count();
    }

    /// Empties both caches, keeping their allocations.
    pub fn clear(&mut self) {
        self.rects_by_depth.iter_mut().for_each(Vec::clear);
        self.buckets_by_depth.iter_mut().for_each(Vec::clear);
        self.rect_count = 0;
        self.bucket_count = 0;
    }

    /// Number of cached rectangles.
    #[must_use]
    pub fn cached_rect_count(&self) -> usize {
        self.rect_count
    }

    /// Number of cached buckets.
    #[must_use]
    pub fn cached_bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Hit tests `point` at an explicit `depth`.
    ///
    /// `max_depth` is the deepest populated row; the result reports whether
    /// `depth` lies within the event area. Invalid viewports hit nothing.
    #[must_use]
    pub fn hit_test(
        &self,
        point: Point,
        depth: u32,
        viewport: &ViewportState,
        max_depth: u32,
    ) -> HitTestResult {
        let mut result = HitTestResult {
            is_over_event_area: depth <= max_depth,
            ..HitTestResult::default()
        };
        if let Err(err) = viewport.validate() {
            tracing::debug!(%err, "hit test skipped: invalid viewport");
            return result;
        }

        let time = viewport.screen_x_to_time(point.x);
        let found = self
            .cached_rect_at(depth, time)
            .map(|id| (id, HitSource::Rect))
            .or_else(|| {
                self.timeline_event_at(point, depth, viewport)
                    .map(|id| (id, HitSource::Timeline))
            })
            .or_else(|| {
                self.cached_bucket_at(depth, point.x)
                    .map(|id| (id, HitSource::Bucket))
            });

        if let Some((event, source)) = found {
            tracing::trace!(event = event.get(), ?source, depth, "hit event");
            result.event = Some(event);
            result.source = Some(source);
            return result;
        }

        if let Some(marker) = self.marker_at(point.x, viewport) {
            tracing::trace!(marker = marker.index(), "hit marker");
            result.marker = Some(marker);
            result.source = Some(HitSource::Marker);
        }
        result
    }

    /// Hit tests `point`, deriving the depth from its Y coordinate.
    ///
    /// Points below depth `0` can still hit markers.
    #[must_use]
    pub fn hit_test_point(&self, point: Point, viewport: &ViewportState) -> HitTestResult {
        if viewport.validate().is_err() {
            return HitTestResult::default();
        }
        let max_depth = self.index.max_depth();
        match viewport.depth_at_screen_y(point.y, self.index.config()) {
            Some(depth) => self.hit_test(point, depth, viewport, max_depth),
            None => {
                let marker = self.marker_at(point.x, viewport);
                HitTestResult {
                    marker,
                    source: marker.map(|_| HitSource::Marker),
                    ..HitTestResult::default()
                }
            }
        }
    }

    fn cached_rect_at(&self, depth: u32, time: f64) -> Option<EventId> {
        let rects = self.rects_by_depth.get(depth as usize)?;
        let i = rects.partition_point(|r| r.time_end as f64 <= time);
        rects
            .get(i)
            .filter(|r| r.time_start as f64 <= time)
            .map(|r| r.event)
    }

    /// Timeline lookup restricted to events the index draws.
    fn timeline_event_at(
        &self,
        point: Point,
        depth: u32,
        viewport: &ViewportState,
    ) -> Option<EventId> {
        let id = self
            .timeline
            .find_event_at_position(point, viewport, Some(depth), false)?;
        let category = self.timeline.tree().event(id).category;
        if !self.index.registry().contains(category) {
            tracing::trace!(event = id.get(), "timeline hit has an unregistered category");
            return None;
        }
        Some(id)
    }

    fn cached_bucket_at(&self, depth: u32, x: f64) -> Option<EventId> {
        let buckets = self.buckets_by_depth.get(depth as usize)?;
        // Minimum widths can make neighbors overlap; the last one drawn is on top.
        let bucket = buckets.iter().rev().find(|b| b.contains_screen_x(x))?;
        if let Some(rep) = bucket.representative {
            return Some(rep.event);
        }

        let registry = self.index.registry();
        self.index
            .rectangles_in_region(
                bucket.time_start as f64,
                bucket.time_end as f64,
                depth,
                depth,
            )
            .min_by_key(|r| dominance_key(registry, r.category, r.duration(), 1))
            .map(|r| r.event)
    }

    fn marker_at(&self, x: f64, viewport: &ViewportState) -> Option<MarkerId> {
        self.markers?.hit_test_marker(x, viewport, &self.config)
    }
}

fn depth_slot<T>(slots: &mut Vec<Vec<T>>, depth: u32) -> &mut Vec<T> {
    let d = depth as usize;
    if slots.len() <= d {
        slots.resize_with(d + 1, Vec::new);
    }
    &mut slots[d]
}
