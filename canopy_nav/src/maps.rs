// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use canopy_index::{EventId, EventTree};

/// Per-event structure used for constant-time tree traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NavEntry {
    parent: Option<EventId>,
    first_child: Option<EventId>,
    /// Position among the parent's children (or among the roots).
    sibling_index: u32,
    sibling_count: u32,
    depth: u32,
}

/// Parent, sibling, and depth lookups for every event of an [`EventTree`].
///
/// Built once per trace. Parents are only recorded here; events themselves
/// never point back up the tree.
///
/// Because the tree assigns ids breadth-first, the siblings of an event occupy
/// a contiguous id range, and so does every depth level. Sibling and
/// same-depth neighbors are therefore one id away.
#[derive(Clone, Debug, Default)]
pub struct NavigationMaps {
    entries: Vec<NavEntry>,
    depth_starts: Vec<u32>,
}

impl NavigationMaps {
    /// Builds the maps for `tree`.
    #[must_use]
    pub fn new(tree: &EventTree) -> Self {
        let mut entries = Vec::with_capacity(tree.len());
        let root_count = to_u32(tree.root_ids().len());
        let mut parents: Vec<(Option<EventId>, u32, u32)> = Vec::with_capacity(tree.len());
        parents.extend((0..root_count).map(|i| (None, i, root_count)));

        for (id, event) in tree.iter() {
            let children = event.child_ids();
            let count = to_u32(children.len());
            // Children of earlier events always have larger ids, so the parent
            // slots for `children` are appended in id order.
            parents.extend((0..count).map(|i| (Some(id), i, count)));

            let (parent, sibling_index, sibling_count) = parents[id.index()];
            entries.push(NavEntry {
                parent,
                first_child: event.first_child(),
                sibling_index,
                sibling_count,
                depth: event.depth,
            });
        }

        let depth_starts = (0..tree.depth_count())
            .map(|d| tree.ids_at_depth(d).next().map_or(0, EventId::get))
            .collect();

        tracing::debug!(
            events = entries.len(),
            depths = tree.depth_count(),
            "built navigation maps"
        );
        Self {
            entries,
            depth_starts,
        }
    }

    /// Number of events covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the maps cover no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `id` belongs to the mapped tree.
    #[must_use]
    pub fn contains(&self, id: EventId) -> bool {
        id.index() < self.entries.len()
    }

    /// The parent of `id`, or `None` for roots and unknown ids.
    #[must_use]
    pub fn parent(&self, id: EventId) -> Option<EventId> {
        self.entries.get(id.index())?.parent
    }

    /// The earliest child of `id`.
    #[must_use]
    pub fn first_child(&self, id: EventId) -> Option<EventId> {
        self.entries.get(id.index())?.first_child
    }

    /// Depth of `id`.
    #[must_use]
    pub fn depth(&self, id: EventId) -> Option<u32> {
        self.entries.get(id.index()).map(|e| e.depth)
    }

    /// Position of `id` among its siblings, and the number of siblings
    /// (including `id` itself).
    #[must_use]
    pub fn sibling_position(&self, id: EventId) -> Option<(u32, u32)> {
        self.entries
            .get(id.index())
            .map(|e| (e.sibling_index, e.sibling_count))
    }

    /// The sibling just before `id`.
    #[must_use]
    pub fn prev_sibling(&self, id: EventId) -> Option<EventId> {
        let entry = self.entries.get(id.index())?;
        (entry.sibling_index > 0).then(|| EventId::new(id.get() - 1))
    }

    /// The sibling just after `id`.
    #[must_use]
    pub fn next_sibling(&self, id: EventId) -> Option<EventId> {
        let entry = self.entries.get(id.index())?;
        (entry.sibling_index + 1 < entry.sibling_count).then(|| EventId::new(id.get() + 1))
    }

    /// The event before `id` at the same depth, in time order.
    ///
    /// Crosses parent boundaries: for the first child of a parent this is the
    /// last child of the nearest earlier parent that has children.
    #[must_use]
    pub fn prev_at_depth(&self, id: EventId) -> Option<EventId> {
        let depth = self.depth(id)?;
        let start = self.depth_starts[depth as usize];
        (id.get() > start).then(|| EventId::new(id.get() - 1))
    }

    /// The event after `id` at the same depth, in time order.
    #[must_use]
    pub fn next_at_depth(&self, id: EventId) -> Option<EventId> {
        let depth = self.depth(id)?;
        let end = self
            .depth_starts
            .get(depth as usize + 1)
            .copied()
            .unwrap_or_else(|| to_u32(self.entries.len()));
        (id.get() + 1 < end).then(|| EventId::new(id.get() + 1))
    }

    /// Position of `id` within its depth level.
    #[must_use]
    pub fn depth_position(&self, id: EventId) -> Option<u32> {
        let depth = self.depth(id)?;
        Some(id.get() - self.depth_starts[depth as usize])
    }
}

fn to_u32(len: usize) -> u32 {
    u32::try_from(len).expect("navigation maps index events with u32 positions")
}
