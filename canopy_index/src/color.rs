// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic color choice for buckets that mix categories.

use core::cmp::Reverse;

use crate::{CategoryId, CategoryRegistry, CategoryStats, Nanos, PackedColor};

/// Neutral gray used when no category can be resolved.
pub const UNKNOWN_COLOR: PackedColor = PackedColor(0x8A_8A_8A);

/// Outcome of [`resolve_color`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedColor {
    /// Fill color of the winning category, or [`UNKNOWN_COLOR`].
    pub color: PackedColor,
    /// The winning category, or `None` for an empty tally.
    pub dominant: Option<CategoryId>,
}

/// Sort key ranking candidates for dominance; the smallest key wins.
///
/// The order is: registry priority (lower first), then larger total
/// duration, then larger event count, then lower category id.
pub type DominanceKey = (u16, Reverse<Nanos>, Reverse<u32>, CategoryId);

/// Builds the [`DominanceKey`] for one candidate.
#[must_use]
pub fn dominance_key(
    registry: &CategoryRegistry,
    category: CategoryId,
    total_duration: Nanos,
    count: u32,
) -> DominanceKey {
    (
        registry.priority(category),
        Reverse(total_duration),
        Reverse(count),
        category,
    )
}

/// Picks the color of a bucket from its per-category tally.
///
/// The result depends only on `stats` and `registry`, never on iteration or
/// insertion order. An empty tally yields [`UNKNOWN_COLOR`] and no dominant
/// category.
#[must_use]
pub fn resolve_color(stats: &CategoryStats, registry: &CategoryRegistry) -> ResolvedColor {
    let dominant = stats
        .iter()
        .filter(|(_, s)| s.count > 0)
        .min_by_key(|&(c, s)| dominance_key(registry, c, s.total_duration, s.count))
        .map(|(c, _)| c);

    let color = dominant
        .and_then(|c| registry.get(c))
        .map_or(UNKNOWN_COLOR, |info| info.color);
    ResolvedColor { color, dominant }
}

#[cfg(test)]
mod tests {
    use super::{UNKNOWN_COLOR, resolve_color};
    use crate::{CategoryInfo, CategoryRegistry, CategoryStats, PackedColor};

    #[test]
    fn priority_beats_duration() {
        let registry = CategoryRegistry::default();
        let dml = registry.lookup("DML").unwrap();
        let method = registry.lookup("Method").unwrap();

        let mut stats = CategoryStats::new();
        stats.add(method, 40, 1_000_000);
        stats.add(dml, 1, 10);

        let resolved = resolve_color(&stats, &registry);
        assert_eq!(resolved.dominant, Some(dml));
        assert_eq!(resolved.color, registry.get(dml).unwrap().color);
    }

    #[test]
    fn equal_priority_falls_back_to_duration_then_count_then_id() {
        let registry = CategoryRegistry::from_categories([
            CategoryInfo::new("a", 1, PackedColor(0xAA_00_00)),
            CategoryInfo::new("b", 1, PackedColor(0x00_BB_00)),
        ])
        .unwrap();
        let a = registry.lookup("a").unwrap();
        let b = registry.lookup("b").unwrap();

        let mut longer_b = CategoryStats::new();
        longer_b.add(a, 5, 100);
        longer_b.add(b, 1, 200);
        assert_eq!(resolve_color(&longer_b, &registry).dominant, Some(b));

        let mut more_a = CategoryStats::new();
        more_a.add(b, 1, 100);
        more_a.add(a, 2, 100);
        assert_eq!(resolve_color(&more_a, &registry).dominant, Some(a));

        let mut tie = CategoryStats::new();
        tie.add(b, 1, 100);
        tie.add(a, 1, 100);
        assert_eq!(resolve_color(&tie, &registry).dominant, Some(a));
    }

    #[test]
    fn empty_tally_is_neutral() {
        let registry = CategoryRegistry::default();
        let resolved = resolve_color(&CategoryStats::new(), &registry);
        assert_eq!(resolved.dominant, None);
        assert_eq!(resolved.color, UNKNOWN_COLOR);
    }
}
