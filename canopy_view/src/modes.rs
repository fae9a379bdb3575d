// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Clamp behavior for panning relative to the optional trace extent.
///
/// Consulted by [`crate::TimelineViewport`] after every pan or zoom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClampMode {
    /// Pan and zoom freely, even far past either end of the trace.
    None,
    /// Keep the visible time range overlapping the trace span, if one is set.
    #[default]
    KeepSomeVisible,
}

/// How a fitted time range should be positioned inside the display.
///
/// This mode is consulted by [`crate::TimelineViewport::fit_trace`] and
/// [`crate::TimelineViewport::fit_range`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Center the fitted range horizontally.
    #[default]
    Center,
    /// Align the start of the fitted range with the left edge of the display.
    AlignMin,
}
