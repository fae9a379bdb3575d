// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-category event tallies carried by buckets.

use smallvec::SmallVec;

use crate::{CategoryId, Nanos};

/// Count and summed duration of events of one category.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryStat {
    /// Number of events.
    pub count: u32,
    /// Sum of their total durations.
    pub total_duration: Nanos,
}

/// Small map from category to [`CategoryStat`], sorted by category id.
///
/// Most buckets hold one or two categories, so entries are stored inline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryStats {
    entries: SmallVec<[(CategoryId, CategoryStat); 4]>,
}

impl CategoryStats {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tally holding a single category.
    #[must_use]
    pub fn single(category: CategoryId, count: u32, total_duration: Nanos) -> Self {
        let mut stats = Self::new();
        stats.add(category, count, total_duration);
        stats
    }

    /// Adds `count` events totalling `total_duration` to `category`.
    pub fn add(&mut self, category: CategoryId, count: u32, total_duration: Nanos) {
        match self.entries.binary_search_by_key(&category, |(c, _)| *c) {
            Ok(i) => {
                let stat = &mut self.entries[i].1;
                stat.count += count;
                stat.total_duration += total_duration;
            }
            Err(i) => self.entries.insert(
                i,
                (
                    category,
                    CategoryStat {
                        count,
                        total_duration,
                    },
                ),
            ),
        }
    }

    /// Folds another tally into this one.
    pub fn merge(&mut self, other: &Self) {
        for &(category, stat) in &other.entries {
            self.add(category, stat.count, stat.total_duration);
        }
    }

    /// Returns the tally for `category`, if present.
    #[must_use]
    pub fn get(&self, category: CategoryId) -> Option<CategoryStat> {
        self.entries
            .binary_search_by_key(&category, |(c, _)| *c)
            .ok()
            .map(|i| self.entries[i].1)
    }

    /// Iterates entries in category id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (CategoryId, CategoryStat)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of distinct categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no events are tallied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total events over all categories.
    #[must_use]
    pub fn event_count(&self) -> u32 {
        self.entries.iter().map(|(_, s)| s.count).sum()
    }

    /// Total duration over all categories.
    #[must_use]
    pub fn total_duration(&self) -> Nanos {
        self.entries.iter().map(|(_, s)| s.total_duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryId, CategoryStats};

    #[test]
    fn add_keeps_entries_sorted_and_merged() {
        let mut stats = CategoryStats::new();
        stats.add(CategoryId::new(3), 1, 10);
        stats.add(CategoryId::new(1), 2, 5);
        stats.add(CategoryId::new(3), 4, 20);

        let ids: alloc::vec::Vec<_> = stats.iter().map(|(c, _)| c.index()).collect();
        assert_eq!(ids, [1, 3]);
        let three = stats.get(CategoryId::new(3)).unwrap();
        assert_eq!((three.count, three.total_duration), (5, 30));
        assert_eq!(stats.event_count(), 7);
        assert_eq!(stats.total_duration(), 35);
    }

    #[test]
    fn merge_sums_per_category() {
        let mut a = CategoryStats::single(CategoryId::new(0), 1, 100);
        let b = CategoryStats::single(CategoryId::new(0), 2, 50);
        let c = CategoryStats::single(CategoryId::new(2), 1, 1);
        a.merge(&b);
        a.merge(&c);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get(CategoryId::new(0)).unwrap().total_duration, 150);
        assert!(a.get(CategoryId::new(1)).is_none());
    }
}
