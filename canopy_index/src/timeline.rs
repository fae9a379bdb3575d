// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point and region lookup that walks the event hierarchy directly.

use alloc::vec::Vec;
use core::ops::Range;

use canopy_view::{LodConfig, ViewportBounds, ViewportState};
use kurbo::Point;
use smallvec::{SmallVec, smallvec};

use crate::model::{TraceEvent, len_u32};
use crate::{EventId, EventTree};

/// Hierarchical event index for pointer lookups.
///
/// Unlike [`FlameIndex`](crate::FlameIndex), this works on the
/// [`EventTree`] itself: at each depth it binary-searches the current sibling
/// list for the event under the pointer and descends into its children. It
/// therefore finds events that culling folded into buckets.
#[derive(Clone, Copy, Debug)]
pub struct TimelineIndex<'a> {
    tree: &'a EventTree,
    config: LodConfig,
    min_hit_width_px: f64,
}

impl<'a> TimelineIndex<'a> {
    /// Default on-screen width an event needs to be hit when width filtering is on.
    pub const DEFAULT_MIN_HIT_WIDTH_PX: f64 = 0.5;

    /// Creates an index over `tree` with the default row height.
    #[must_use]
    pub fn new(tree: &'a EventTree) -> Self {
        Self::with_config(tree, LodConfig::default())
    }

    /// Creates an index that maps screen Y to depth with `config.row_height`.
    #[must_use]
    pub fn with_config(tree: &'a EventTree, config: LodConfig) -> Self {
        Self {
            tree,
            config,
            min_hit_width_px: Self::DEFAULT_MIN_HIT_WIDTH_PX,
        }
    }

    /// Sets the minimum on-screen width used when width filtering is on.
    #[must_use]
    pub fn with_min_hit_width(mut self, px: f64) -> Self {
        self.min_hit_width_px = px;
        self
    }

    /// The tree this index reads from.
    #[must_use]
    pub fn tree(&self) -> &'a EventTree {
        self.tree
    }

    /// Finds the event under a screen point.
    ///
    /// The target depth is `target_depth` if given, otherwise the row under
    /// `point.y`. Time containment is half-open, so zero-duration events are
    /// never hit. Unless `ignore_width` is set, events narrower on screen than
    /// the minimum hit width are rejected.
    #[must_use]
    pub fn find_event_at_position(
        &self,
        point: Point,
        viewport: &ViewportState,
        target_depth: Option<u32>,
        ignore_width: bool,
    ) -> Option<EventId> {
        if viewport.validate().is_err() {
            return None;
        }
        let depth = match target_depth {
            Some(depth) => depth,
            None => viewport.depth_at_screen_y(point.y, &self.config)?,
        };
        let time = viewport.screen_x_to_time(point.x);
        let id = self.descend(self.tree.root_range(), time, depth)?;

        if !ignore_width {
            let width = viewport.duration_to_px(self.tree.event(id).duration.total as f64);
            if width < self.min_hit_width_px {
                return None;
            }
        }
        Some(id)
    }

    /// Narrows from `siblings` down to `depth`, following the event containing `time`.
    fn descend(&self, mut siblings: Range<u32>, time: f64, depth: u32) -> Option<EventId> {
        loop {
            let slice = self.tree.slice(siblings.clone());
            let offset = search_siblings(slice, time)?;
            let event = &slice[offset];
            let id = EventId::new(siblings.start + len_u32(offset));
            if event.depth >= depth {
                return Some(id);
            }
            siblings = event.child_range();
        }
    }

    /// Events with non-zero duration intersecting `bounds`.
    ///
    /// Subtrees outside the time range are pruned, and descent stops below
    /// `bounds.depth_end`. Results come in unspecified order.
    #[must_use]
    pub fn find_events_in_region(&self, bounds: &ViewportBounds) -> Vec<EventId> {
        let mut out = Vec::new();
        if bounds.is_empty() {
            return out;
        }

        let mut stack: SmallVec<[Range<u32>; 32]> = smallvec![self.tree.root_range()];
        while let Some(siblings) = stack.pop() {
            let slice = self.tree.slice(siblings.clone());
            // Siblings never overlap, so their ends are sorted too.
            let first = slice.partition_point(|e| (e.end() as f64) <= bounds.time_start);
            // Offsets are taken before filtering so they stay aligned with ids.
            let hits = slice[first..]
                .iter()
                .enumerate()
                .take_while(|(_, e)| (e.timestamp as f64) < bounds.time_end)
                .filter(|(_, e)| e.duration.total > 0);
            let mut children = SmallVec::<[Range<u32>; 8]>::new();
            for (i, event) in hits {
                if bounds.contains_depth(event.depth) {
                    out.push(EventId::new(siblings.start + len_u32(first + i)));
                }
                if event.depth < bounds.depth_end && !event.is_leaf() {
                    children.push(event.child_range());
                }
            }
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

/// Binary search for the sibling whose half-open span contains `time`.
fn search_siblings(siblings: &[TraceEvent], time: f64) -> Option<usize> {
    let (mut lo, mut hi) = (0, siblings.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let event = &siblings[mid];
        if time < event.timestamp as f64 {
            hi = mid;
        } else if time >= event.end() as f64 {
            lo = mid + 1;
        } else {
            return Some(mid);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use canopy_view::{ViewportBounds, ViewportState};
    use kurbo::Point;

    use super::TimelineIndex;
    use crate::{CategoryRegistry, EventNode, EventTree};

    fn tree() -> EventTree {
        let registry = CategoryRegistry::default();
        let m = registry.lookup("Method").unwrap();
        EventTree::new(vec![
            EventNode::new(0, 100, m).with_children(vec![
                EventNode::new(10, 30, m).with_children(vec![EventNode::new(12, 1, m)]),
                EventNode::new(50, 30, m),
                EventNode::new(90, 0, m),
            ]),
            EventNode::new(200, 100, m),
        ])
    }

    fn timestamp(tree: &EventTree, id: crate::EventId) -> u64 {
        tree.event(id).timestamp
    }

    #[test]
    fn explicit_depth_descends_through_containing_parents() {
        let tree = tree();
        let index = TimelineIndex::new(&tree);
        let vp = ViewportState::new(1.0, 0.0, 0.0, 400.0, 150.0);

        let root = index.find_event_at_position(Point::new(60.0, 0.0), &vp, Some(0), false);
        assert_eq!(root.map(|id| timestamp(&tree, id)), Some(0));

        let child = index.find_event_at_position(Point::new(60.0, 0.0), &vp, Some(1), false);
        assert_eq!(child.map(|id| timestamp(&tree, id)), Some(50));

        // Between children: no depth-1 event under the pointer.
        assert_eq!(index.find_event_at_position(Point::new(45.0, 0.0), &vp, Some(1), false), None);
        // Past the end of a half-open span.
        assert_eq!(index.find_event_at_position(Point::new(300.0, 0.0), &vp, Some(0), false), None);
    }

    #[test]
    fn depth_is_derived_from_screen_y() {
        let tree = tree();
        let index = TimelineIndex::new(&tree);
        // 150 px tall, 15 px rows: y in (120, 135] is depth 1.
        let vp = ViewportState::new(1.0, 0.0, 0.0, 400.0, 150.0);
        let hit = index.find_event_at_position(Point::new(20.0, 130.0), &vp, None, false);
        assert_eq!(hit.map(|id| timestamp(&tree, id)), Some(10));
        // Below depth 0.
        assert_eq!(index.find_event_at_position(Point::new(20.0, 151.0), &vp, None, false), None);
    }

    #[test]
    fn width_filter_rejects_thin_events_unless_ignored() {
        let tree = tree();
        let index = TimelineIndex::new(&tree);
        // 0.1 px per ns: the 1 ns grandchild is 0.1 px wide.
        let vp = ViewportState::new(0.1, 0.0, 0.0, 400.0, 150.0);
        let p = Point::new(1.25, 0.0);
        assert_eq!(index.find_event_at_position(p, &vp, Some(2), false), None);
        let hit = index.find_event_at_position(p, &vp, Some(2), true);
        assert_eq!(hit.map(|id| timestamp(&tree, id)), Some(12));
    }

    #[test]
    fn zero_duration_events_are_never_hit() {
        let tree = tree();
        let index = TimelineIndex::new(&tree);
        let vp = ViewportState::new(1.0, 0.0, 0.0, 400.0, 150.0);
        assert_eq!(index.find_event_at_position(Point::new(90.0, 0.0), &vp, Some(1), true), None);
    }

    #[test]
    fn region_prunes_by_time_and_depth() {
        let tree = tree();
        let index = TimelineIndex::new(&tree);

        let ids = index.find_events_in_region(&ViewportBounds::new(20.0, 60.0, 1, 1));
        let starts: Vec<u64> = ids.iter().map(|&id| timestamp(&tree, id)).collect();
        assert_eq!(starts, [10, 50]);

        let all = index.find_events_in_region(&ViewportBounds::new(0.0, 1_000.0, 0, 10));
        // Every event except the zero-duration one.
        assert_eq!(all.len(), 5);

        assert!(index.find_events_in_region(&ViewportBounds::EMPTY).is_empty());
    }

    #[test]
    fn region_ids_skip_zero_duration_siblings() {
        let registry = CategoryRegistry::default();
        let m = registry.lookup("Method").unwrap();
        let tree = EventTree::new(vec![
            EventNode::new(0, 10, m),
            EventNode::new(10, 0, m),
            EventNode::new(20, 10, m).with_children(vec![
                EventNode::new(20, 2, m),
                EventNode::new(22, 0, m),
                EventNode::new(24, 2, m),
            ]),
        ]);
        let index = TimelineIndex::new(&tree);

        let roots = index.find_events_in_region(&ViewportBounds::new(0.0, 100.0, 0, 0));
        let starts: Vec<u64> = roots.iter().map(|&id| timestamp(&tree, id)).collect();
        assert_eq!(starts, [0, 20]);

        let children = index.find_events_in_region(&ViewportBounds::new(0.0, 100.0, 1, 1));
        let starts: Vec<u64> = children.iter().map(|&id| timestamp(&tree, id)).collect();
        assert_eq!(starts, [20, 24]);
        assert!(children.iter().all(|&id| tree.event(id).duration.total > 0));
    }
}
