// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace input and the immutable, id-addressed event arena built from it.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::CategoryId;

/// Timestamps and durations, in nanoseconds.
pub type Nanos = u64;

/// Stable identifier of an event within one [`EventTree`].
///
/// Ids are dense (`0..tree.len()`) and assigned breadth-first, so every
/// sibling list and every depth level occupies a contiguous id range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u32);

impl EventId {
    /// Wraps a raw arena index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Total and self time of an event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventDuration {
    /// Wall time from start to end, including children.
    pub total: Nanos,
    /// Time not covered by any child.
    pub self_time: Nanos,
}

/// One node of a parsed trace, as handed over by the trace parser.
///
/// Children are ordered by timestamp, do not overlap each other, and lie
/// within their parent's time range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventNode {
    /// Start time.
    pub timestamp: Nanos,
    /// Total and self duration.
    pub duration: EventDuration,
    /// Category from the registry the tree will be indexed with.
    pub category: CategoryId,
    /// Optional display text.
    pub text: Option<String>,
    /// Optional source line number.
    pub line_number: Option<u32>,
    /// Nested calls.
    pub children: Vec<Self>,
}

impl EventNode {
    /// Creates a leaf event. Self time equals total time until children are added.
    #[must_use]
    pub fn new(timestamp: Nanos, total: Nanos, category: CategoryId) -> Self {
        Self {
            timestamp,
            duration: EventDuration {
                total,
                self_time: total,
            },
            category,
            text: None,
            line_number: None,
            children: Vec::new(),
        }
    }

    /// Replaces the children and recomputes self time.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        let covered: Nanos = children.iter().map(|c| c.duration.total).sum();
        self.duration.self_time = self.duration.total.saturating_sub(covered);
        self.children = children;
        self
    }

    /// Sets the display text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the source line number.
    #[must_use]
    pub fn with_line_number(mut self, line: u32) -> Self {
        self.line_number = Some(line);
        self
    }

    /// End time (`timestamp + duration.total`).
    #[must_use]
    pub fn end(&self) -> Nanos {
        self.timestamp.saturating_add(self.duration.total)
    }
}

/// An event as stored in an [`EventTree`].
///
/// Unlike [`EventNode`], the children are referenced by id range, and there is
/// no parent link; parents live in `canopy_nav`'s navigation maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEvent {
    /// Start time.
    pub timestamp: Nanos,
    /// Total and self duration.
    pub duration: EventDuration,
    /// Event category.
    pub category: CategoryId,
    /// Nesting level; roots are at depth `0`.
    pub depth: u32,
    /// Optional display text.
    pub text: Option<String>,
    /// Optional source line number.
    pub line_number: Option<u32>,
    children: Range<u32>,
}

impl TraceEvent {
    /// End time (`timestamp + duration.total`).
    #[must_use]
    pub fn end(&self) -> Nanos {
        self.timestamp.saturating_add(self.duration.total)
    }

    /// Returns `true` if `time` lies in the half-open span `[timestamp, end)`.
    #[must_use]
    pub fn contains_time(&self, time: f64) -> bool {
        self.timestamp as f64 <= time && time < self.end() as f64
    }

    /// Ids of the direct children, in time order.
    pub fn child_ids(&self) -> impl DoubleEndedIterator<Item = EventId> + ExactSizeIterator {
        self.children.clone().map(EventId)
    }

    /// Id of the earliest child, if any.
    #[must_use]
    pub fn first_child(&self) -> Option<EventId> {
        (!self.children.is_empty()).then_some(EventId(self.children.start))
    }

    /// Returns `true` if the event has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn child_range(&self) -> Range<u32> {
        self.children.clone()
    }
}

/// Immutable arena over a parsed trace.
///
/// Built once per loaded trace by [`EventTree::new`]. Events are laid out
/// breadth-first: roots first, then all depth-1 events in time order, and so
/// on. Siblings are sorted by timestamp during construction.
#[derive(Clone, Debug, Default)]
pub struct EventTree {
    events: Vec<TraceEvent>,
    root_count: u32,
    depth_starts: Vec<u32>,
}

impl EventTree {
    /// Consumes the parser output and lays it out breadth-first.
    #[must_use]
    pub fn new(mut roots: Vec<EventNode>) -> Self {
        roots.sort_by_key(|n| n.timestamp);
        let root_count = len_u32(roots.len());

        let mut events: Vec<TraceEvent> = Vec::new();
        let mut depth_starts: Vec<u32> = Vec::new();
        let mut queue: VecDeque<(EventNode, u32)> = roots.into_iter().map(|n| (n, 0)).collect();

        while let Some((mut node, depth)) = queue.pop_front() {
            if depth_starts.len() <= depth as usize {
                depth_starts.push(len_u32(events.len()));
            }

            let mut children = core::mem::take(&mut node.children);
            children.sort_by_key(|c| c.timestamp);
            // Children are enqueued behind everything already waiting, so their
            // ids follow the current node's id plus the queue length.
            let child_start = len_u32(events.len() + 1 + queue.len());
            let child_end = child_start + len_u32(children.len());

            events.push(TraceEvent {
                timestamp: node.timestamp,
                duration: node.duration,
                category: node.category,
                depth,
                text: node.text,
                line_number: node.line_number,
                children: child_start..child_end,
            });
            queue.extend(children.into_iter().map(|c| (c, depth + 1)));
        }

        Self {
            events,
            root_count,
            depth_starts,
        }
    }

    /// Number of events in the trace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the trace has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the event for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn event(&self, id: EventId) -> &TraceEvent {
        assert!(
            id.index() < self.events.len(),
            "EventId {} is out of range for a tree of {} events",
            id.0,
            self.events.len()
        );
        &self.events[id.index()]
    }

    /// Returns the event for `id`, or `None` if it is out of range.
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&TraceEvent> {
        self.events.get(id.index())
    }

    /// Iterates all events with their ids, breadth-first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (EventId, &TraceEvent)> {
        self.events
            .iter()
            .enumerate()
            .map(|(i, e)| (EventId(len_u32(i)), e))
    }

    /// Ids of the root events, in time order.
    pub fn root_ids(&self) -> impl DoubleEndedIterator<Item = EventId> + ExactSizeIterator {
        (0..self.root_count).map(EventId)
    }

    /// Number of populated depth levels.
    #[must_use]
    pub fn depth_count(&self) -> u32 {
        len_u32(self.depth_starts.len())
    }

    /// Deepest populated depth, or `0` for an empty tree.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.depth_count().saturating_sub(1)
    }

    /// Ids of every event at `depth`, in time order.
    pub fn ids_at_depth(&self, depth: u32) -> impl DoubleEndedIterator<Item = EventId> + ExactSizeIterator {
        self.depth_range(depth).map(EventId)
    }

    /// Overall time extent of the trace.
    #[must_use]
    pub fn time_span(&self) -> Option<Range<Nanos>> {
        let roots = self.slice(self.root_range());
        let start = roots.first()?.timestamp;
        let end = roots.iter().map(TraceEvent::end).max()?;
        Some(start..end)
    }

    pub(crate) fn root_range(&self) -> Range<u32> {
        0..self.root_count
    }

    pub(crate) fn depth_range(&self, depth: u32) -> Range<u32> {
        let d = depth as usize;
        let Some(&start) = self.depth_starts.get(d) else {
            return 0..0;
        };
        let end = self
            .depth_starts
            .get(d + 1)
            .copied()
            .unwrap_or_else(|| len_u32(self.events.len()));
        start..end
    }

    pub(crate) fn slice(&self, range: Range<u32>) -> &[TraceEvent] {
        &self.events[range.start as usize..range.end as usize]
    }
}

pub(crate) fn len_u32(len: usize) -> u32 {
    u32::try_from(len).expect("traces are limited to u32::MAX events")
}
