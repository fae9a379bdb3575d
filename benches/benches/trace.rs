// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic traces shared by the benchmarks.

use canopy_index::{CategoryId, CategoryRegistry, EventNode, EventTree};

#[derive(Clone)]
pub(crate) struct Rng(u64);

impl Rng {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub(crate) fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// Fills `[start, start + span)` with non-overlapping children, recursing
/// until `depth` reaches `max_depth`.
fn children(rng: &mut Rng, start: u64, span: u64, depth: u32, max_depth: u32) -> Vec<EventNode> {
    if depth >= max_depth || span < 8 {
        return Vec::new();
    }
    let slots = 1 + rng.below(6);
    let slot = span / slots;
    let mut out = Vec::new();
    for i in 0..slots {
        if rng.below(5) == 0 {
            continue;
        }
        let offset = rng.below(slot / 4 + 1);
        let duration = (slot - offset) * (50 + rng.below(50)) / 100;
        if duration == 0 {
            continue;
        }
        let ts = start + i * slot + offset;
        let category = CategoryId::new((rng.below(7)) as u8);
        out.push(
            EventNode::new(ts, duration, category)
                .with_children(children(rng, ts, duration, depth + 1, max_depth)),
        );
    }
    out
}

/// A trace of `roots` back-to-back root events, one millisecond each.
pub(crate) fn synthetic_trace(seed: u64, roots: u64, max_depth: u32) -> EventTree {
    let mut rng = Rng::new(seed);
    let registry = CategoryRegistry::default();
    let roots = (0..roots)
        .map(|i| {
            let ts = i * 1_000_000;
            let category = CategoryId::new((rng.below(registry.len() as u64)) as u8);
            EventNode::new(ts, 900_000, category)
                .with_children(children(&mut rng, ts, 900_000, 1, max_depth))
        })
        .collect();
    EventTree::new(roots)
}
