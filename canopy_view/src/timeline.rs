// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::modes::{ClampMode, FitMode};
use crate::{LodConfig, ViewportState};

/// Pan/zoom controller for a flame chart.
///
/// `TimelineViewport` owns the mutable pan and zoom state that a host drives
/// from wheel, drag, and keyboard input, and hands out immutable
/// [`ViewportState`] snapshots for culling and hit testing. The horizontal axis
/// is time in nanoseconds; the vertical axis scrolls through depth rows.
#[derive(Clone, Debug)]
pub struct TimelineViewport {
    display_width: f64,
    display_height: f64,
    trace_span: Option<Range<f64>>,
    zoom: f64,
    offset_x: f64,
    offset_y: f64,
    min_zoom: f64,
    max_zoom: f64,
    clamp_mode: ClampMode,
    fit_mode: FitMode,
}

impl TimelineViewport {
    /// Creates a viewport over a display of the given pixel size.
    ///
    /// - Initial zoom is `1.0` pixel per nanosecond.
    /// - Initial offsets are zero (time `0` at the left edge, depth `0` at the bottom).
    /// - Zoom is clamped to `[1e-9, 1e3]` by default.
    #[must_use]
    pub fn new(display_width: f64, display_height: f64) -> Self {
        Self {
            display_width,
            display_height,
            trace_span: None,
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            min_zoom: 1e-9,
            max_zoom: 1e3,
            clamp_mode: ClampMode::default(),
            fit_mode: FitMode::default(),
        }
    }

    /// Returns the current snapshot for this frame.
    #[must_use]
    pub fn state(&self) -> ViewportState {
        ViewportState::new(
            self.zoom,
            self.offset_x,
            self.offset_y,
            self.display_width,
            self.display_height,
        )
    }

    /// Resizes the display. Zoom and offsets are preserved, then clamped.
    pub fn set_display_size(&mut self, width: f64, height: f64) {
        if self.display_width == width && self.display_height == height {
            return;
        }
        self.display_width = width;
        self.display_height = height;
        self.clamp_to_trace();
    }

    /// Sets the trace extent used for clamping and [`fit_trace`](Self::fit_trace).
    ///
    /// Typically `FlameIndex::time_span` converted to `f64`.
    pub fn set_trace_span(&mut self, span: Option<Range<f64>>) {
        if self.trace_span != span {
            self.trace_span = span;
            self.clamp_to_trace();
        }
    }

    /// Returns the trace extent, if one was set.
    #[must_use]
    pub fn trace_span(&self) -> Option<Range<f64>> {
        self.trace_span.clone()
    }

    /// Returns the current zoom in pixels per nanosecond.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom limits in pixels per nanosecond, in either order.
    ///
    /// The current zoom is pulled into the new limits.
    pub fn set_zoom_limits(&mut self, a: f64, b: f64) {
        self.min_zoom = a.min(b);
        self.max_zoom = a.max(b);
        self.set_zoom(self.zoom);
    }

    /// Sets the zoom, clamping it into the configured range.
    ///
    /// The left edge of the display keeps showing the same time.
    pub fn set_zoom(&mut self, zoom: f64) {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (self.zoom - zoom).abs() < f64::EPSILON {
            return;
        }
        let left_time = self.offset_x / self.zoom;
        self.offset_x = left_time * zoom;
        self.zoom = zoom;
        self.clamp_to_trace();
    }

    /// Sets the clamp mode for panning relative to the trace extent.
    pub fn set_clamp_mode(&mut self, mode: ClampMode) {
        let changed = self.clamp_mode != mode;
        self.clamp_mode = mode;
        if changed {
            self.clamp_to_trace();
        }
    }

    /// Returns the current clamp mode.
    #[must_use]
    pub fn clamp_mode(&self) -> ClampMode {
        self.clamp_mode
    }

    /// Sets how fitted ranges are positioned.
    pub fn set_fit_mode(&mut self, mode: FitMode) {
        self.fit_mode = mode;
    }

    /// Returns the current fit mode.
    #[must_use]
    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    /// Pans horizontally by a delta in pixels (positive moves later in time).
    pub fn pan_by_view(&mut self, dx: f64) {
        if dx != 0.0 {
            self.offset_x += dx;
            self.clamp_to_trace();
        }
    }

    /// Scrolls vertically by a delta in pixels (positive reveals deeper rows).
    ///
    /// The offset never goes below zero, so depth `0` stays reachable.
    pub fn scroll_by_view(&mut self, delta: f64) {
        self.offset_y = (self.offset_y + delta).max(0.0);
    }

    /// Scrolls vertically by whole depth rows.
    pub fn scroll_by_rows(&mut self, rows: i32, config: &LodConfig) {
        self.scroll_by_view(f64::from(rows) * config.row_height);
    }

    /// Zooms around an anchor X coordinate in screen space.
    ///
    /// The time under the anchor stays under the anchor as much as the zoom
    /// limits allow.
    pub fn zoom_about_view_point(&mut self, anchor_x: f64, factor: f64) {
        if factor.is_nan() || factor <= 0.0 {
            return;
        }
        let zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor_time = self.view_to_time(anchor_x);
        self.zoom = zoom;
        self.offset_x = anchor_time * zoom - anchor_x;
        self.clamp_to_trace();
    }

    /// Fits the whole trace into the display. Does nothing without a trace span.
    pub fn fit_trace(&mut self) {
        if let Some(span) = self.trace_span.clone() {
            self.fit_range(span);
        }
    }

    /// Fits the given time range into the display width.
    pub fn fit_range(&mut self, range: Range<f64>) {
        let duration = range.end - range.start;
        let fits = duration > 0.0 && self.display_width > 0.0;
        if !fits {
            return;
        }
        let zoom = (self.display_width / duration).clamp(self.min_zoom, self.max_zoom);
        self.offset_x = match self.fit_mode {
            FitMode::AlignMin => range.start * zoom,
            FitMode::Center => (range.start + range.end) * 0.5 * zoom - self.display_width * 0.5,
        };
        self.zoom = zoom;
        self.clamp_to_trace();
    }

    /// Scrolls just enough to bring an event fully into view.
    ///
    /// Events wider than the display are aligned to their start. Returns `true`
    /// if the offsets changed.
    pub fn ensure_visible(
        &mut self,
        start: f64,
        end: f64,
        depth: u32,
        config: &LodConfig,
    ) -> bool {
        let before = (self.offset_x, self.offset_y);

        let visible = self.visible_time_range();
        if start < visible.start || end - start > visible.end - visible.start {
            self.offset_x = start * self.zoom;
        } else if end > visible.end {
            self.offset_x = end * self.zoom - self.display_width;
        }

        let row_bottom = f64::from(depth) * config.row_height;
        let row_top = row_bottom + config.row_height;
        if row_bottom < self.offset_y {
            self.offset_y = row_bottom;
        } else if row_top > self.offset_y + self.display_height {
            self.offset_y = (row_top - self.display_height).max(0.0);
        }

        self.clamp_to_trace();
        before != (self.offset_x, self.offset_y)
    }

    /// Returns the visible time range in nanoseconds.
    #[must_use]
    pub fn visible_time_range(&self) -> Range<f64> {
        let start = self.view_to_time(0.0);
        let end = self.view_to_time(self.display_width);
        if start <= end { start..end } else { end..start }
    }

    fn view_to_time(&self, x: f64) -> f64 {
        (x + self.offset_x) / self.zoom
    }

    /// Pulls the view back so it overlaps the trace span again.
    fn clamp_to_trace(&mut self) {
        let Some(span) = self.trace_span.clone() else {
            return;
        };
        if self.clamp_mode == ClampMode::None || span.is_empty() {
            return;
        }
        let visible = self.visible_time_range();
        let shift = if visible.end < span.start {
            span.start - visible.end
        } else if visible.start > span.end {
            span.end - visible.start
        } else {
            return;
        };
        self.offset_x += shift * self.zoom;
    }
}
