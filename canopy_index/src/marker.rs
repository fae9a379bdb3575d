// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace-level annotations drawn along the time axis.

use alloc::string::String;
use alloc::vec::Vec;

use canopy_view::ViewportState;

use crate::Nanos;
use crate::model::len_u32;

/// What a [`Marker`] flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// The trace recorded an error.
    Error,
    /// Part of the trace was skipped or truncated by the recorder.
    Skip,
    /// Something unexpected happened that is not an error.
    Unexpected,
}

/// A time-range annotation on the trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker {
    /// Start time.
    pub start: Nanos,
    /// End time; equal to `start` for instantaneous markers.
    pub end: Nanos,
    /// Classification.
    pub kind: MarkerKind,
    /// Short human-readable description.
    pub summary: String,
}

impl Marker {
    /// Creates a marker.
    #[must_use]
    pub fn new(start: Nanos, end: Nanos, kind: MarkerKind, summary: impl Into<String>) -> Self {
        Self {
            start,
            end: end.max(start),
            kind,
            summary: summary.into(),
        }
    }
}

/// Position of a marker within a [`MarkerSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(u32);

impl MarkerId {
    /// Wraps a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index into the set.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The markers of one trace, sorted by start time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    /// Sorts `markers` by start time (stable, so equal starts keep their order).
    #[must_use]
    pub fn new(mut markers: Vec<Marker>) -> Self {
        markers.sort_by_key(|m| m.start);
        Self { markers }
    }

    /// Number of markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if there are no markers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Returns the marker for `id`, if any.
    #[must_use]
    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.index())
    }

    /// Iterates markers with their ids, in start order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (MarkerId, &Marker)> {
        self.markers
            .iter()
            .enumerate()
            .map(|(i, m)| (MarkerId(len_u32(i)), m))
    }

    /// The earliest marker.
    #[must_use]
    pub fn first(&self) -> Option<MarkerId> {
        (!self.markers.is_empty()).then_some(MarkerId(0))
    }

    /// The latest marker.
    #[must_use]
    pub fn last(&self) -> Option<MarkerId> {
        self.markers.len().checked_sub(1).map(|i| MarkerId(len_u32(i)))
    }

    /// The marker after `id`, without wrapping.
    #[must_use]
    pub fn next(&self, id: MarkerId) -> Option<MarkerId> {
        let next = id.index() + 1;
        (next < self.markers.len()).then(|| MarkerId(len_u32(next)))
    }

    /// The marker before `id`, without wrapping.
    #[must_use]
    pub fn prev(&self, id: MarkerId) -> Option<MarkerId> {
        if id.index() >= self.markers.len() {
            return None;
        }
        id.index().checked_sub(1).map(|i| MarkerId(len_u32(i)))
    }

    /// The last marker under screen X `x`.
    ///
    /// Instantaneous or very short markers are widened to `min_width_px` so they
    /// stay hoverable.
    #[must_use]
    pub fn marker_at_screen_x(
        &self,
        x: f64,
        viewport: &ViewportState,
        min_width_px: f64,
    ) -> Option<MarkerId> {
        let half_slop = min_width_px.max(0.0) * 0.5;
        // Markers starting after the pointer (plus slop) cannot match.
        let limit = viewport.screen_x_to_time(x + half_slop);
        let candidates = self.markers.partition_point(|m| m.start as f64 <= limit);
        self.markers[..candidates]
            .iter()
            .rposition(|m| {
                let x0 = viewport.time_to_screen_x(m.start as f64);
                let x1 = viewport.time_to_screen_x(m.end as f64);
                let pad = ((min_width_px - (x1 - x0)) * 0.5).max(0.0);
                x0 - pad <= x && x < x1 + pad
            })
            .map(|i| MarkerId(len_u32(i)))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use canopy_view::ViewportState;

    use super::{Marker, MarkerId, MarkerKind, MarkerSet};

    fn set() -> MarkerSet {
        MarkerSet::new(vec![
            Marker::new(500, 600, MarkerKind::Skip, "skipped"),
            Marker::new(100, 100, MarkerKind::Error, "boom"),
            Marker::new(300, 400, MarkerKind::Unexpected, "odd"),
        ])
    }

    #[test]
    fn markers_are_sorted_and_walk_without_wrapping() {
        let markers = set();
        let first = markers.first().unwrap();
        assert_eq!(markers.get(first).unwrap().summary, "boom");
        assert_eq!(markers.prev(first), None);

        let second = markers.next(first).unwrap();
        let third = markers.next(second).unwrap();
        assert_eq!(markers.next(third), None);
        assert_eq!(Some(third), markers.last());
        assert_eq!(markers.prev(MarkerId::new(9)), None);
    }

    #[test]
    fn screen_hit_widens_instant_markers() {
        let markers = set();
        let vp = ViewportState::new(1.0, 0.0, 0.0, 1000.0, 100.0);
        assert_eq!(markers.marker_at_screen_x(350.0, &vp, 4.0), Some(MarkerId::new(1)));
        assert_eq!(markers.marker_at_screen_x(101.0, &vp, 4.0), Some(MarkerId::new(0)));
        assert_eq!(markers.marker_at_screen_x(200.0, &vp, 4.0), None);
        assert_eq!(markers.marker_at_screen_x(650.0, &vp, 4.0), None);
    }
}
