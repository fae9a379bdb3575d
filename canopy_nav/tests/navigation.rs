// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for `SelectionManager`.
//!
//! These exercise the frame/marker state machine, keyboard navigation across
//! parent boundaries, and how the revision counter reacts to no-op changes.

use canopy_hit::{HitSource, HitTestResult};
use canopy_index::{
    CategoryId, EventId, EventNode, EventTree, Marker, MarkerId, MarkerKind, MarkerSet,
};
use canopy_nav::{Direction, NavigationMaps, Selection, SelectionManager};

fn node(ts: u64, dur: u64) -> EventNode {
    EventNode::new(ts, dur, CategoryId::new(0))
}

//   depth 2:        [c1]            [d1]
//   depth 1:   [b1][b2]   (none)  [b3]
//   depth 0: [ a1          ][ a2 ][ a3      ]
fn tree() -> EventTree {
    EventTree::new(vec![
        node(0, 100).with_children(vec![
            node(10, 20).with_children(vec![node(12, 5)]),
            node(40, 20),
        ]),
        node(100, 50),
        node(150, 100).with_children(vec![node(160, 30).with_children(vec![node(170, 5)])]),
    ])
}

fn markers() -> MarkerSet {
    MarkerSet::new(vec![
        Marker::new(300, 310, MarkerKind::Skip, "late"),
        Marker::new(5, 5, MarkerKind::Error, "early"),
        Marker::new(120, 130, MarkerKind::Unexpected, "middle"),
    ])
}

fn at(tree: &EventTree, ts: u64) -> EventId {
    tree.iter()
        .find(|(_, e)| e.timestamp == ts)
        .map(|(id, _)| id)
        .unwrap()
}

#[test]
fn starts_empty() {
    let tree = tree();
    let maps = NavigationMaps::new(&tree);
    let markers = markers();
    let mut sel = SelectionManager::new(&maps, &markers);
    assert_eq!(sel.selection(), Selection::None);
    assert_eq!(sel.revision(), 0);
    assert_eq!(sel.navigate(Direction::Up), None);
    assert_eq!(sel.revision(), 0);
}

#[test]
fn frame_and_marker_selection_are_exclusive() {
    let tree = tree();
    let maps = NavigationMaps::new(&tree);
    let markers = markers();
    let mut sel = SelectionManager::new(&maps, &markers);

    assert!(sel.select_frame(at(&tree, 40)));
    assert_eq!(sel.selected_frame(), Some(at(&tree, 40)));
    assert_eq!(sel.selected_marker(), None);

    assert!(sel.select_marker(MarkerId::new(1)));
    assert_eq!(sel.selected_frame(), None);
    assert_eq!(sel.selected_marker(), Some(MarkerId::new(1)));

    // Navigation needs a selected frame.
    assert_eq!(sel.navigate(Direction::Left), None);
    assert_eq!(sel.selected_marker(), Some(MarkerId::new(1)));
}

#[test]
fn revision_bumps_only_on_change() {
    let tree = tree();
    let maps = NavigationMaps::new(&tree);
    let markers = markers();
    let mut sel = SelectionManager::new(&maps, &markers);

    sel.clear();
    assert_eq!(sel.revision(), 0);

    sel.select_frame(at(&tree, 0));
    sel.select_frame(at(&tree, 0));
    assert_eq!(sel.revision(), 1);

    // Unknown ids are rejected without touching the state.
    assert!(!sel.select_frame(EventId::new(99)));
    assert!(!sel.select_marker(MarkerId::new(7)));
    assert_eq!(sel.revision(), 1);
    assert_eq!(sel.selected_frame(), Some(at(&tree, 0)));

    sel.clear();
    assert_eq!(sel.selection(), Selection::None);
    assert_eq!(sel.revision(), 2);
}

#[test]
fn up_and_down_follow_the_hierarchy() {
    let tree = tree();
    let maps = NavigationMaps::new(&tree);
    let markers = MarkerSet::default();
    let mut sel = SelectionManager::new(&maps, &markers);

    sel.select_frame(at(&tree, 0));
    assert_eq!(sel.navigate(Direction::Up), Some(at(&tree, 10)));
    assert_eq!(sel.navigate(Direction::Up), Some(at(&tree, 12)));
    // Leaf: nowhere further up.
    assert_eq!(sel.navigate(Direction::Up), None);
    assert_eq!(sel.selected_frame(), Some(at(&tree, 12)));

    assert_eq!(sel.navigate(Direction::Down), Some(at(&tree, 10)));
    assert_eq!(sel.navigate(Direction::Down), Some(at(&tree, 0)));
    // Root: nowhere further down.
    let rev = sel.revision();
    assert_eq!(sel.navigate(Direction::Down), None);
    assert_eq!(sel.selected_frame(), Some(at(&tree, 0)));
    assert_eq!(sel.revision(), rev);
}

#[test]
fn left_and_right_cross_parents_at_the_same_depth() {
    let tree = tree();
    let maps = NavigationMaps::new(&tree);
    let markers = MarkerSet::default();
    let mut sel = SelectionManager::new(&maps, &markers);

    sel.select_frame(at(&tree, 10));
    assert_eq!(sel.navigate(Direction::Right), Some(at(&tree, 40)));
    // `a2` has no children, so the next depth-1 event lives under `a3`.
    assert_eq!(sel.navigate(Direction::Right), Some(at(&tree, 160)));
    assert_eq!(sel.navigate(Direction::Right), None);
    assert_eq!(sel.selected_frame(), Some(at(&tree, 160)));

    assert_eq!(sel.navigate(Direction::Left), Some(at(&tree, 40)));

    // Roots are siblings of each other.
    sel.select_frame(at(&tree, 100));
    assert_eq!(sel.navigate(Direction::Left), Some(at(&tree, 0)));
    assert_eq!(sel.navigate(Direction::Left), None);

    // Depth 2 jumps from `c1` straight to `d1`.
    sel.select_frame(at(&tree, 12));
    assert_eq!(sel.navigate(Direction::Right), Some(at(&tree, 170)));
}

#[test]
fn marker_walk_has_no_wraparound() {
    let tree = tree();
    let maps = NavigationMaps::new(&tree);
    let markers = markers();
    let mut sel = SelectionManager::new(&maps, &markers);

    // Markers are ordered by start: early, middle, late.
    assert_eq!(sel.next_marker(), Some(MarkerId::new(0)));
    assert_eq!(markers.get(MarkerId::new(0)).unwrap().summary, "early");
    assert_eq!(sel.next_marker(), Some(MarkerId::new(1)));
    assert_eq!(sel.next_marker(), Some(MarkerId::new(2)));
    assert_eq!(sel.next_marker(), None);
    assert_eq!(sel.selected_marker(), Some(MarkerId::new(2)));

    assert_eq!(sel.first_marker(), Some(MarkerId::new(0)));
    assert_eq!(sel.prev_marker(), None);
    assert_eq!(sel.last_marker(), Some(MarkerId::new(2)));

    // From a frame, stepping back starts at the last marker.
    sel.select_frame(at(&tree, 0));
    assert_eq!(sel.prev_marker(), Some(MarkerId::new(2)));
    assert_eq!(sel.selected_frame(), None);
}

#[test]
fn empty_marker_set() {
    let tree = tree();
    let maps = NavigationMaps::new(&tree);
    let markers = MarkerSet::default();
    let mut sel = SelectionManager::new(&maps, &markers);
    sel.select_frame(at(&tree, 0));
    assert_eq!(sel.next_marker(), None);
    assert_eq!(sel.first_marker(), None);
    assert_eq!(sel.last_marker(), None);
    assert_eq!(sel.selected_frame(), Some(at(&tree, 0)));
}

#[test]
fn hits_prefer_frames_and_misses_keep_the_selection() {
    let tree = tree();
    let maps = NavigationMaps::new(&tree);
    let markers = markers();
    let mut sel = SelectionManager::new(&maps, &markers);

    let both = HitTestResult {
        event: Some(at(&tree, 40)),
        marker: Some(MarkerId::new(0)),
        is_over_event_area: true,
        source: Some(HitSource::Rect),
    };
    assert_eq!(
        sel.select_from_hit(&both),
        Some(Selection::Frame(at(&tree, 40)))
    );

    let marker_only = HitTestResult {
        marker: Some(MarkerId::new(2)),
        source: Some(HitSource::Marker),
        ..HitTestResult::default()
    };
    assert_eq!(
        sel.select_from_hit(&marker_only),
        Some(Selection::Marker(MarkerId::new(2)))
    );

    let rev = sel.revision();
    assert_eq!(sel.select_from_hit(&HitTestResult::default()), None);
    assert_eq!(sel.selected_marker(), Some(MarkerId::new(2)));
    assert_eq!(sel.revision(), rev);
}
