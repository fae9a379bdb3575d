// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame viewport snapshot and the culling bounds derived from it.

use core::cmp::Ordering;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect};

use crate::LodConfig;

/// Reasons a [`ViewportState`] cannot produce culling bounds.
///
/// Per-frame consumers treat every variant as "nothing is visible"; the error
/// exists so hosts can log or surface a broken viewport controller.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ViewportError {
    /// Zoom was zero, negative, or not finite.
    #[error("zoom must be finite and positive, got {0}")]
    InvalidZoom(f64),
    /// Display width or height was negative or not finite.
    #[error("display size must be finite and non-negative, got {width}x{height}")]
    InvalidDisplaySize {
        /// Offending display width.
        width: f64,
        /// Offending display height.
        height: f64,
    },
    /// A scroll offset was not finite.
    #[error("viewport offset must be finite, got ({x}, {y})")]
    InvalidOffset {
        /// Offending horizontal offset.
        x: f64,
        /// Offending vertical offset.
        y: f64,
    },
    /// The configured row height was zero, negative, or not finite.
    #[error("row height must be finite and positive, got {0}")]
    InvalidRowHeight(f64),
}

/// A snapshot of what the flame chart currently shows.
///
/// - `zoom` is in pixels per nanosecond.
/// - `offset_x` is the horizontal scroll in pixels: time `t` is drawn at
///   `t * zoom - offset_x`.
/// - `offset_y` is the vertical scroll in pixels. Depth `0` sits on the bottom
///   edge of the display and positive offsets reveal deeper rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// Pixels per nanosecond.
    pub zoom: f64,
    /// Horizontal scroll offset in pixels.
    pub offset_x: f64,
    /// Vertical scroll offset in pixels.
    pub offset_y: f64,
    /// Display width in pixels.
    pub display_width: f64,
    /// Display height in pixels.
    pub display_height: f64,
}

impl ViewportState {
    /// Creates a viewport snapshot.
    #[must_use]
    pub const fn new(
        zoom: f64,
        offset_x: f64,
        offset_y: f64,
        display_width: f64,
        display_height: f64,
    ) -> Self {
        Self {
            zoom,
            offset_x,
            offset_y,
            display_width,
            display_height,
        }
    }

    /// Checks that every field is usable for culling.
    pub fn validate(&self) -> Result<(), ViewportError> {
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(ViewportError::InvalidZoom(self.zoom));
        }
        let size_ok = |v: f64| v.is_finite() && v >= 0.0;
        if !size_ok(self.display_width) || !size_ok(self.display_height) {
            return Err(ViewportError::InvalidDisplaySize {
                width: self.display_width,
                height: self.display_height,
            });
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(ViewportError::InvalidOffset {
                x: self.offset_x,
                y: self.offset_y,
            });
        }
        Ok(())
    }

    /// Derives the time and depth ranges used for culling.
    pub fn bounds(&self, config: &LodConfig) -> Result<ViewportBounds, ViewportError> {
        self.validate()?;
        let row = config.row_height;
        if !row.is_finite() || row <= 0.0 {
            return Err(ViewportError::InvalidRowHeight(row));
        }

        let time_start = self.screen_x_to_time(0.0);
        let time_end = self.screen_x_to_time(self.display_width);

        let top = self.offset_y + self.display_height;
        if top <= 0.0 || self.display_height <= 0.0 {
            return Ok(ViewportBounds {
                time_start,
                time_end,
                ..ViewportBounds::EMPTY
            });
        }
        let depth_start = row_index(self.offset_y.max(0.0) / row);
        // A row is visible when any part of it is; `top / row` landing exactly on a
        // row boundary means the next row starts just out of view.
        let depth_end = row_index((top / row).ceil() - 1.0).max(depth_start);

        Ok(ViewportBounds {
            time_start,
            time_end,
            depth_start,
            depth_end,
        })
    }

    /// Nanoseconds whose rendered width equals `config.min_pixel_width`.
    ///
    /// Events at or below this duration are aggregated into buckets.
    #[must_use]
    pub fn density_threshold(&self, config: &LodConfig) -> f64 {
        config.min_pixel_width / self.zoom
    }

    /// Converts a time in nanoseconds into a screen X coordinate.
    #[must_use]
    pub fn time_to_screen_x(&self, time: f64) -> f64 {
        time * self.zoom - self.offset_x
    }

    /// Converts a screen X coordinate into a time in nanoseconds.
    #[must_use]
    pub fn screen_x_to_time(&self, x: f64) -> f64 {
        (x + self.offset_x) / self.zoom
    }

    /// Rendered width in pixels of a duration in nanoseconds.
    #[must_use]
    pub fn duration_to_px(&self, duration: f64) -> f64 {
        duration * self.zoom
    }

    /// Screen-space pixel column containing `time`.
    ///
    /// Used to decide which aggregates share a screen cell.
    #[must_use]
    pub fn pixel_column(&self, time: f64) -> i64 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Pixel columns are bounded by the display width; float-to-int casts saturate"
        )]
        {
            self.time_to_screen_x(time).floor() as i64
        }
    }

    /// Depth row under a screen Y coordinate, or `None` below depth `0`.
    #[must_use]
    pub fn depth_at_screen_y(&self, y: f64, config: &LodConfig) -> Option<u32> {
        let world_y = self.display_height - y + self.offset_y;
        if !world_y.is_finite() || world_y < 0.0 || config.row_height <= 0.0 {
            return None;
        }
        Some(row_index(world_y / config.row_height))
    }

    /// Screen Y coordinate of the top edge of a depth row.
    #[must_use]
    pub fn row_top_y(&self, depth: u32, config: &LodConfig) -> f64 {
        let world_top = (f64::from(depth) + 1.0) * config.row_height;
        self.display_height - (world_top - self.offset_y)
    }

    /// Screen-space rectangle covering `[start, end)` on the given depth row.
    #[must_use]
    pub fn span_rect(&self, start: f64, end: f64, depth: u32, config: &LodConfig) -> Rect {
        let y0 = self.row_top_y(depth, config);
        Rect::new(
            self.time_to_screen_x(start),
            y0,
            self.time_to_screen_x(end),
            y0 + config.row_height,
        )
    }

    /// Converts a screen point into `(time, depth)`.
    #[must_use]
    pub fn screen_to_trace(&self, pt: Point, config: &LodConfig) -> (f64, Option<u32>) {
        (
            self.screen_x_to_time(pt.x),
            self.depth_at_screen_y(pt.y, config),
        )
    }
}

/// Visible time range (nanoseconds) and inclusive depth range of a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportBounds {
    /// First visible nanosecond.
    pub time_start: f64,
    /// End of the visible time range.
    pub time_end: f64,
    /// Shallowest visible depth.
    pub depth_start: u32,
    /// Deepest visible depth (inclusive).
    pub depth_end: u32,
}

impl ViewportBounds {
    /// Bounds that contain nothing.
    pub const EMPTY: Self = Self {
        time_start: 0.0,
        time_end: 0.0,
        depth_start: 1,
        depth_end: 0,
    };

    /// Creates bounds from explicit ranges (used by region queries).
    #[must_use]
    pub const fn new(time_start: f64, time_end: f64, depth_start: u32, depth_end: u32) -> Self {
        Self {
            time_start,
            time_end,
            depth_start,
            depth_end,
        }
    }

    /// Returns `true` when no event can intersect these bounds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // Written as a comparison against `Greater` so NaN ranges count as empty.
        self.time_end.partial_cmp(&self.time_start) != Some(Ordering::Greater)
            || self.depth_end < self.depth_start
    }

    /// Returns `true` if `depth` lies in the inclusive depth range.
    #[must_use]
    pub fn contains_depth(&self, depth: u32) -> bool {
        self.depth_start <= depth && depth <= self.depth_end
    }

    /// Returns `true` if the half-open span `[start, end)` overlaps the time range.
    #[must_use]
    pub fn overlaps_time(&self, start: f64, end: f64) -> bool {
        start < self.time_end && end > self.time_start
    }

    /// Returns `true` if `[start, end)` lies entirely inside the time range.
    #[must_use]
    pub fn contains_time_span(&self, start: f64, end: f64) -> bool {
        start >= self.time_start && end <= self.time_end
    }
}

fn row_index(rows: f64) -> u32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Float-to-int casts saturate; depths beyond u32::MAX are never populated"
    )]
    {
        rows.floor() as u32
    }
}
