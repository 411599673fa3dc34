//! Bounded most-recent-first windows for rolling activity state.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A fixed-capacity deque where new items go to the front and the oldest
/// fall off the back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RecentWindow<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a window from items ordered most recent first, truncating to `capacity`.
    #[must_use]
    pub fn from_recent_first(items: impl IntoIterator<Item = T>, capacity: usize) -> Self {
        let items: VecDeque<T> = items.into_iter().take(capacity).collect();
        Self { items, capacity }
    }

    /// Inserts `item` as the most recent entry, evicting the oldest beyond capacity.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        self.items.push_front(item);
        self.items.truncate(self.capacity);
    }

    /// Iterates from most to least recent.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: PartialEq> RecentWindow<T> {
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

impl<'a, T> IntoIterator for &'a RecentWindow<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
