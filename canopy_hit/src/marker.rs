// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_index::{MarkerId, MarkerSet};
use canopy_view::ViewportState;

use crate::HitConfig;

/// Capability to resolve a screen X coordinate to a trace marker.
///
/// [`HitTestManager`](crate::HitTestManager) consults this only after rendered
/// rectangles, the timeline index, and buckets all missed, so markers never
/// shadow events.
pub trait MarkerHitTest {
    /// Returns the marker under screen X `x`, if any.
    fn hit_test_marker(
        &self,
        x: f64,
        viewport: &ViewportState,
        config: &HitConfig,
    ) -> Option<MarkerId>;
}

impl MarkerHitTest for MarkerSet {
    fn hit_test_marker(
        &self,
        x: f64,
        viewport: &ViewportState,
        config: &HitConfig,
    ) -> Option<MarkerId> {
        self.marker_at_screen_x(x, viewport, config.min_marker_width_px)
    }
}
