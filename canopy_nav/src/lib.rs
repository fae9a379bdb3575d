// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_nav --heading-base-level=0

//! Canopy Nav: selection and keyboard navigation for flame-chart traces.
//!
//! This crate tracks what the user has selected, either one frame (an event of
//! the trace) or one marker, and moves that selection in response to
//! keyboard input. It knows nothing about rendering; callers scroll the view
//! to the new selection themselves.
//!
//! - [`NavigationMaps`] holds parent, sibling, and depth lookups for every
//!   event, built once per trace.
//! - [`SelectionManager`] owns the selection state and a revision counter that
//!   bumps only when the selection changes.
//!
//! Flame charts grow upward, so [`Direction::Up`] moves to the first child and
//! [`Direction::Down`] to the parent. Left and right walk siblings and, at the
//! ends of a sibling list, continue to the nearest event at the same depth
//! under a neighboring parent.
//!
//! ## Example
//!
//! ```rust
//! use canopy_index::{CategoryId, EventNode, EventTree, MarkerSet};
//! use canopy_nav::{Direction, NavigationMaps, SelectionManager};
//!
//! let cat = CategoryId::new(0);
//! let tree = EventTree::new(vec![
//!     EventNode::new(0, 100, cat).with_children(vec![EventNode::new(10, 20, cat)]),
//!     EventNode::new(200, 100, cat).with_children(vec![EventNode::new(210, 20, cat)]),
//! ]);
//! let maps = NavigationMaps::new(&tree);
//! let markers = MarkerSet::default();
//! let mut selection = SelectionManager::new(&maps, &markers);
//!
//! let root = tree.root_ids().next().unwrap();
//! selection.select_frame(root);
//!
//! // Down from a root goes nowhere.
//! assert_eq!(selection.navigate(Direction::Down), None);
//! assert_eq!(selection.selected_frame(), Some(root));
//!
//! // Up to the child, then right across to the other root's child.
//! let child = selection.navigate(Direction::Up).unwrap();
//! let cousin = selection.navigate(Direction::Right).unwrap();
//! assert_eq!(tree.event(child).timestamp, 10);
//! assert_eq!(tree.event(cousin).timestamp, 210);
//! assert_eq!(selection.revision(), 3);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod maps;
mod selection;

pub use maps::NavigationMaps;
pub use selection::{Selection, SelectionManager};

/// A keyboard navigation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the first child.
    Up,
    /// Towards the parent.
    Down,
    /// Towards the previous sibling, or the previous event at the same depth.
    Left,
    /// Towards the next sibling, or the next event at the same depth.
    Right,
}
