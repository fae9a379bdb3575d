// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_hit::HitTestResult;
use canopy_index::{EventId, MarkerId, MarkerSet};

use crate::{Direction, NavigationMaps};

/// What is currently selected. Frames and markers are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    /// Nothing is selected.
    #[default]
    None,
    /// An event (a frame in the chart).
    Frame(EventId),
    /// A trace marker.
    Marker(MarkerId),
}

/// Selection state for one trace, with keyboard navigation.
///
/// All operations that cannot move (a boundary, nothing selected, an id from
/// another trace) return `None` and leave the selection untouched.
#[derive(Clone, Debug)]
pub struct SelectionManager<'a> {
    maps: &'a NavigationMaps,
    markers: &'a MarkerSet,
    selection: Selection,
    revision: u64,
}

impl<'a> SelectionManager<'a> {
    /// Creates a manager with nothing selected.
    #[must_use]
    pub fn new(maps: &'a NavigationMaps, markers: &'a MarkerSet) -> Self {
        Self {
            maps,
            markers,
            selection: Selection::None,
            revision: 0,
        }
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The selected frame, if a frame is selected.
    #[must_use]
    pub fn selected_frame(&self) -> Option<EventId> {
        match self.selection {
            Selection::Frame(id) => Some(id),
            _ => None,
        }
    }

    /// The selected marker, if a marker is selected.
    #[must_use]
    pub fn selected_marker(&self) -> Option<MarkerId> {
        match self.selection {
            Selection::Marker(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the current revision counter.
    ///
    /// Bumped only when the selection actually changes; re-selecting the
    /// current frame or marker leaves it as is.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Selects a frame, clearing any marker selection.
    ///
    /// Returns `false` (and changes nothing) if `id` is not part of the trace.
    pub fn select_frame(&mut self, id: EventId) -> bool {
        if !self.maps.contains(id) {
            tracing::debug!(event = id.get(), "ignoring selection of unknown event");
            return false;
        }
        self.set(Selection::Frame(id));
        true
    }

    /// Selects a marker, clearing any frame selection.
    ///
    /// Returns `false` (and changes nothing) if `id` is not part of the trace.
    pub fn select_marker(&mut self, id: MarkerId) -> bool {
        if self.markers.get(id).is_none() {
            tracing::debug!(marker = id.index(), "ignoring selection of unknown marker");
            return false;
        }
        self.set(Selection::Marker(id));
        true
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.set(Selection::None);
    }

    /// Applies a hit-test result: a hit event wins over a hit marker, and a
    /// miss leaves the selection unchanged.
    ///
    /// Returns the new selection, or `None` on a miss.
    pub fn select_from_hit(&mut self, hit: &HitTestResult) -> Option<Selection> {
        if let Some(event) = hit.event {
            return self.select_frame(event).then_some(self.selection);
        }
        if let Some(marker) = hit.marker {
            return self.select_marker(marker).then_some(self.selection);
        }
        None
    }

    /// Moves the frame selection one step in `direction`.
    ///
    /// Returns the newly selected frame, or `None` if no frame is selected or
    /// there is nowhere to go.
    pub fn navigate(&mut self, direction: Direction) -> Option<EventId> {
        let current = self.selected_frame()?;
        let maps = self.maps;
        let target = match direction {
            Direction::Up => maps.first_child(current),
            Direction::Down => maps.parent(current),
            Direction::Left => maps
                .prev_sibling(current)
                .or_else(|| maps.prev_at_depth(current)),
            Direction::Right => maps
                .next_sibling(current)
                .or_else(|| maps.next_at_depth(current)),
        }?;
        tracing::trace!(from = current.get(), to = target.get(), ?direction, "navigate");
        self.set(Selection::Frame(target));
        Some(target)
    }

    /// Selects the marker after the current one.
    ///
    /// With no marker selected this starts from the first marker.
    pub fn next_marker(&mut self) -> Option<MarkerId> {
        let target = match self.selection {
            Selection::Marker(current) => self.markers.next(current),
            _ => self.markers.first(),
        }?;
        self.set(Selection::Marker(target));
        Some(target)
    }

    /// Selects the marker before the current one.
    ///
    /// With no marker selected this starts from the last marker.
    pub fn prev_marker(&mut self) -> Option<MarkerId> {
        let target = match self.selection {
            Selection::Marker(current) => self.markers.prev(current),
            _ => self.markers.last(),
        }?;
        self.set(Selection::Marker(target));
        Some(target)
    }

    /// Selects the earliest marker.
    pub fn first_marker(&mut self) -> Option<MarkerId> {
        let target = self.markers.first()?;
        self.set(Selection::Marker(target));
        Some(target)
    }

    /// Selects the latest marker.
    pub fn last_marker(&mut self) -> Option<MarkerId> {
        let target = self.markers.last()?;
        self.set(Selection::Marker(target));
        Some(target)
    }

    fn set(&mut self, selection: Selection) {
        if self.selection == selection {
            return;
        }
        self.selection = selection;
        self.revision = self.revision.wrapping_add(1);
    }
}
