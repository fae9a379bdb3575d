// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_index --heading-base-level=0

//! Canopy Index: temporal culling and level-of-detail aggregation for flame charts.
//!
//! A trace is a forest of nested, time-stamped calls. Drawing every call is
//! wasteful once most of them are narrower than a pixel, so this crate answers
//! the per-frame question "what should be drawn for this viewport?" with two
//! kinds of output:
//!
//! - [`Rectangle`]s for events wide enough to draw individually.
//! - [`Bucket`]s standing in for runs of sub-threshold events at one depth,
//!   carrying per-category counts, a resolved color, and a representative event.
//!
//! Core pieces:
//!
//! - [`EventTree`]: an immutable, breadth-first arena built from the parser's
//!   nested [`EventNode`]s and addressed by [`EventId`].
//! - [`CategoryRegistry`]: the closed set of categories with a priority rank and
//!   fill color each.
//! - [`SegmentTree`]: per-category, per-depth aggregation trees.
//! - [`FlameIndex`]: builds the segment trees and answers [`FlameIndex::query`]
//!   and region queries.
//! - [`resolve_color`]: deterministic dominant-category choice for mixed buckets.
//! - [`TimelineIndex`]: binary search down the hierarchy for pointer lookups.
//! - [`MarkerSet`]: sorted trace annotations.
//!
//! For every viewport, `visible_count + bucketed_event_count` equals the number of
//! drawable events intersecting it: nothing is double-counted or dropped, at any
//! zoom level.
//!
//! ## Example
//!
//! ```rust
//! use canopy_index::{CategoryRegistry, EventNode, EventTree, FlameIndex};
//! use canopy_view::ViewportState;
//!
//! let registry = CategoryRegistry::default();
//! let method = registry.lookup("Method").unwrap();
//!
//! let tree = EventTree::new(vec![EventNode::new(0, 100, method).with_children(vec![
//!     EventNode::new(10, 30, method),
//!     EventNode::new(50, 30, method),
//! ])]);
//! let index = FlameIndex::build(&tree, &registry);
//!
//! // 2 px per ns: every event is far wider than the 2 px threshold.
//! let sharp = index.query(&ViewportState::new(2.0, 0.0, 0.0, 400.0, 60.0));
//! assert_eq!(sharp.stats.visible_count, 3);
//! assert_eq!(sharp.stats.bucketed_event_count, 0);
//!
//! // 0.04 px per ns: the threshold is 50 ns, so both 30 ns children are bucketed.
//! let coarse = index.query(&ViewportState::new(0.04, 0.0, 0.0, 400.0, 60.0));
//! assert_eq!(coarse.stats.visible_count, 1);
//! assert_eq!(coarse.stats.bucketed_event_count, 2);
//! ```
//!
//! This crate is `no_std` and uses `alloc`. Diagnostics go through [`tracing`];
//! install a subscriber in the host to see them.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod category;
mod color;
mod flame;
mod marker;
mod model;
mod query;
mod rect;
mod segment_tree;
mod stats;
mod timeline;

pub use category::{CategoryError, CategoryId, CategoryInfo, CategoryRegistry, PackedColor};
pub use color::{DominanceKey, ResolvedColor, UNKNOWN_COLOR, dominance_key, resolve_color};
pub use flame::FlameIndex;
pub use marker::{Marker, MarkerId, MarkerKind, MarkerSet};
pub use model::{EventDuration, EventId, EventNode, EventTree, Nanos, TraceEvent};
pub use query::{QueryResult, QueryStats, TreeQuery};
pub use rect::{Bucket, Rectangle};
pub use segment_tree::SegmentTree;
pub use stats::{CategoryStat, CategoryStats};
pub use timeline::TimelineIndex;
