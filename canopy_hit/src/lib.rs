// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_hit --heading-base-level=0

//! Canopy Hit: pointer hit testing for flame charts.
//!
//! [`HitTestManager`] answers "what is under the pointer?" for a frame rendered
//! from a [`canopy_index::QueryResult`]. It prefers what is drawn: individually
//! rendered rectangles first, then events found by walking the hierarchy, then
//! the representative event of an aggregated bucket, and only then trace
//! markers, through the [`MarkerHitTest`] capability.
//!
//! ## Example
//!
//! ```rust
//! use canopy_hit::{HitSource, HitTestManager};
//! use canopy_index::{CategoryRegistry, EventNode, EventTree, FlameIndex};
//! use canopy_view::ViewportState;
//! use kurbo::Point;
//!
//! let registry = CategoryRegistry::default();
//! let method = registry.lookup("Method").unwrap();
//! let tree = EventTree::new(vec![EventNode::new(0, 1_000, method)]);
//! let index = FlameIndex::build(&tree, &registry);
//!
//! let viewport = ViewportState::new(0.5, 0.0, 0.0, 800.0, 150.0);
//! let frame = index.query(&viewport);
//!
//! let mut hits = HitTestManager::new(&tree, &index);
//! hits.update(&frame);
//!
//! let hit = hits.hit_test(Point::new(100.0, 140.0), 0, &viewport, index.max_depth());
//! assert_eq!(hit.source, Some(HitSource::Rect));
//! assert!(hit.event.is_some());
//! assert!(hit.is_over_event_area);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod manager;
mod marker;

pub use manager::HitTestManager;
pub use marker::MarkerHitTest;

use canopy_index::{EventId, MarkerId, TimelineIndex};

/// Parameters for hit testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitConfig {
    /// On-screen width, in pixels, an event needs before the timeline index
    /// reports it.
    pub min_hit_width_px: f64,
    /// On-screen width, in pixels, that short or instantaneous markers are
    /// widened to.
    pub min_marker_width_px: f64,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            min_hit_width_px: TimelineIndex::DEFAULT_MIN_HIT_WIDTH_PX,
            min_marker_width_px: 4.0,
        }
    }
}

/// Which lookup step produced a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitSource {
    /// A rendered rectangle.
    Rect,
    /// The hierarchical timeline index.
    Timeline,
    /// A rendered bucket's representative event.
    Bucket,
    /// A trace marker.
    Marker,
}

/// Outcome of a hit test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitTestResult {
    /// Event under the pointer.
    pub event: Option<EventId>,
    /// Marker under the pointer; only set when no event was hit.
    pub marker: Option<MarkerId>,
    /// Whether the target row is within the populated depth range.
    pub is_over_event_area: bool,
    /// The step that resolved the hit.
    pub source: Option<HitSource>,
}

impl HitTestResult {
    /// Returns `true` if nothing was hit.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        self.event.is_none() && self.marker.is_none()
    }
}
