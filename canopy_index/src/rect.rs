// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_view::{LodConfig, ViewportState};
use kurbo::Rect;

use crate::{CategoryId, CategoryStats, EventId, Nanos, PackedColor};

/// A drawable event with non-zero duration.
///
/// One rectangle exists per event in the tree whose duration is positive and
/// whose category is registered. Rectangles are in trace coordinates; convert
/// with [`Rectangle::screen_rect`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rectangle {
    /// Start time.
    pub time_start: Nanos,
    /// End time, always greater than `time_start`.
    pub time_end: Nanos,
    /// Nesting level.
    pub depth: u32,
    /// Event category.
    pub category: CategoryId,
    /// Fill color of the category.
    pub color: PackedColor,
    /// The source event.
    pub event: EventId,
}

impl Rectangle {
    /// Duration in nanoseconds.
    #[must_use]
    pub fn duration(&self) -> Nanos {
        self.time_end - self.time_start
    }

    /// Screen-space rectangle for this event under `viewport`.
    #[must_use]
    pub fn screen_rect(&self, viewport: &ViewportState, config: &LodConfig) -> Rect {
        viewport.span_rect(
            self.time_start as f64,
            self.time_end as f64,
            self.depth,
            config,
        )
    }
}

/// Aggregate of one or more sub-threshold events at a single depth.
///
/// Buckets are produced fresh for every query and are never stored by the
/// index.
#[derive(Clone, Debug, PartialEq)]
pub struct Bucket {
    /// Left edge in screen pixels.
    pub x: f64,
    /// Top edge in screen pixels.
    pub y: f64,
    /// On-screen width, at least [`LodConfig::min_bucket_width`].
    pub width: f64,
    /// Earliest start of the aggregated events.
    pub time_start: Nanos,
    /// Latest end of the aggregated events.
    pub time_end: Nanos,
    /// Depth row.
    pub depth: u32,
    /// Number of aggregated events.
    pub event_count: u32,
    /// Per-category breakdown; counts sum to `event_count`.
    pub by_category: CategoryStats,
    /// Resolved fill color.
    pub color: PackedColor,
    /// The category the color was taken from.
    pub dominant_category: Option<CategoryId>,
    /// Density-dimmed opacity, see [`LodConfig::bucket_alpha`].
    pub alpha: f64,
    /// The most prominent aggregated event, used for hover and selection.
    pub representative: Option<Rectangle>,
}

impl Bucket {
    /// Screen-space footprint of this bucket.
    #[must_use]
    pub fn screen_rect(&self, config: &LodConfig) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.x + self.width,
            self.y + config.row_height,
        )
    }

    /// Returns `true` if screen X `x` falls inside `[x, x + width]`.
    #[must_use]
    pub fn contains_screen_x(&self, x: f64) -> bool {
        self.x <= x && x <= self.x + self.width
    }

    /// Recomputes screen placement after the time range changed.
    pub(crate) fn place(&mut self, viewport: &ViewportState, config: &LodConfig) {
        self.x = viewport.time_to_screen_x(self.time_start as f64);
        self.y = viewport.row_top_y(self.depth, config);
        let span = viewport.duration_to_px((self.time_end - self.time_start) as f64);
        self.width = span.max(config.min_bucket_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(time_start: Nanos, time_end: Nanos, depth: u32) -> Bucket {
        Bucket {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            time_start,
            time_end,
            depth,
            event_count: 1,
            by_category: CategoryStats::single(CategoryId::new(0), 1, time_end - time_start),
            color: PackedColor(0),
            dominant_category: Some(CategoryId::new(0)),
            alpha: 1.0,
            representative: None,
        }
    }

    #[test]
    fn narrow_buckets_get_the_minimum_width() {
        let viewport = ViewportState::new(0.1, 0.0, 0.0, 400.0, 150.0);
        let config = LodConfig::default();
        let mut b = bucket(100, 105, 1);
        b.place(&viewport, &config);

        assert_eq!(b.x, 10.0);
        assert_eq!(b.width, config.min_bucket_width);
        // Row 1 sits directly above row 0 at the bottom of the display.
        assert_eq!(b.y, 150.0 - 2.0 * config.row_height);
        assert!(b.contains_screen_x(10.5));
        assert!(!b.contains_screen_x(11.5));

        let r = b.screen_rect(&config);
        assert_eq!(r.height(), config.row_height);
    }

    #[test]
    fn wide_buckets_keep_their_span() {
        let viewport = ViewportState::new(0.1, 0.0, 0.0, 400.0, 150.0);
        let config = LodConfig::default();
        let mut b = bucket(0, 1_000, 0);
        b.place(&viewport, &config);
        assert_eq!(b.width, 100.0);
    }
}
