// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Level-of-detail parameters shared by the index, hit testing, and viewport.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Tunable parameters for culling and level-of-detail aggregation.
///
/// None of these values are invariants; they exist so hosts can match their
/// own rendering density. The defaults mirror a typical flame chart with
/// 15 px rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodConfig {
    /// Rendered width, in pixels, at or below which an event is aggregated
    /// into a bucket instead of being drawn individually.
    pub min_pixel_width: f64,
    /// Height of one depth row, in pixels.
    pub row_height: f64,
    /// Minimum on-screen width of a bucket, in pixels.
    pub min_bucket_width: f64,
    /// Opacity used for the sparsest multi-event buckets.
    pub min_bucket_alpha: f64,
    /// Event count at which a bucket reaches full opacity.
    pub bucket_saturation_count: u32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            min_pixel_width: 2.0,
            row_height: 15.0,
            min_bucket_width: 1.0,
            min_bucket_alpha: 0.35,
            bucket_saturation_count: 64,
        }
    }
}

impl LodConfig {
    /// Density-dimmed opacity for a bucket holding `event_count` events.
    ///
    /// A bucket with a single event is a real event that merely happens to be
    /// thin, so it is always drawn at full opacity. Multi-event buckets ramp
    /// from [`min_bucket_alpha`](Self::min_bucket_alpha) up to `1.0` at
    /// [`bucket_saturation_count`](Self::bucket_saturation_count) events.
    #[must_use]
    pub fn bucket_alpha(&self, event_count: u32) -> f64 {
        if event_count <= 1 {
            return 1.0;
        }
        let saturation = f64::from(self.bucket_saturation_count.max(2));
        let density = (f64::from(event_count) / saturation).min(1.0).sqrt();
        let floor = self.min_bucket_alpha.clamp(0.0, 1.0);
        floor + (1.0 - floor) * density
    }
}
