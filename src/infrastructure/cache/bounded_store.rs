//! Capacity-bounded, insertion-ordered key/value store.

use lru::LruCache;

use crate::domain::entities::ResourceId;

/// Ordered map with a capacity limit and FIFO eviction.
///
/// Backed by an unbounded [`LruCache`] that is only ever accessed through
/// its non-promoting operations (`peek`, `peek_mut`, `contains`, `push`),
/// so its recency order is the insertion order.
pub struct BoundedStore<V> {
    entries: LruCache<ResourceId, V>,
    capacity: usize,
}

impl<V> BoundedStore<V> {
    /// Creates an empty store. A capacity of zero disables storage.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            capacity,
        }
    }

    /// Inserts `value` under `id` and returns the entry evicted to make room.
    ///
    /// Overwriting an existing id replaces its value in place and keeps its
    /// eviction slot. With capacity zero nothing is stored.
    pub fn store(&mut self, id: ResourceId, value: V) -> Option<(ResourceId, V)> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(slot) = self.entries.peek_mut(&id) {
            *slot = value;
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_lru()
        } else {
            None
        };
        self.entries.push(id, value);
        evicted
    }

    /// Reads a value without touching the eviction order.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<&V> {
        self.entries.peek(id)
    }

    /// Returns true if `id` is present.
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.entries.contains(id)
    }

    /// Removes and returns the value stored under `id`.
    pub fn remove(&mut self, id: &ResourceId) -> Option<V> {
        self.entries.pop(id)
    }

    /// Removes and returns the earliest inserted entry.
    pub fn remove_oldest(&mut self) -> Option<(ResourceId, V)> {
        self.entries.pop_lru()
    }

    /// Removes every entry, returning them oldest first.
    pub fn drain(&mut self) -> Vec<(ResourceId, V)> {
        let mut drained = Vec::with_capacity(self.entries.len());
        while let Some(entry) = self.entries.pop_lru() {
            drained.push(entry);
        }
        drained
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Changes the capacity, evicting oldest entries one at a time until the
    /// store fits. Returns the evicted entries, oldest first.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<(ResourceId, V)> {
        let mut evicted = Vec::new();
        while self.entries.len() > capacity {
            match self.entries.pop_lru() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        self.capacity = capacity;
        evicted
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the next insertion of a new id would evict.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &V)> {
        self.entries.iter().rev()
    }
}

impl<V> std::fmt::Debug for BoundedStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedStore")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn id(s: &str) -> ResourceId {
        ResourceId::new(s)
    }

    fn ids<V>(store: &BoundedStore<V>) -> Vec<String> {
        store.iter().map(|(k, _)| k.to_string()).collect()
    }

    #[test]
    fn test_store_evicts_oldest() {
        let mut store = BoundedStore::new(2);
        assert!(store.store(id("A"), 1).is_none());
        assert!(store.store(id("B"), 2).is_none());

        let evicted = store.store(id("C"), 3);

        assert_eq!(evicted, Some((id("A"), 1)));
        assert_eq!(ids(&store), ["B", "C"]);
        assert!(!store.contains(&id("A")));
    }

    #[test_case(1, 5 ; "capacity_one")]
    #[test_case(3, 10 ; "capacity_three")]
    #[test_case(7, 7 ; "exactly_full")]
    #[test_case(10, 4 ; "never_full")]
    fn test_retains_most_recent(capacity: usize, inserts: usize) {
        let mut store = BoundedStore::new(capacity);
        for i in 0..inserts {
            store.store(id(&i.to_string()), i);
            assert!(store.len() <= capacity);
        }

        let expected: Vec<String> = (inserts.saturating_sub(capacity)..inserts)
            .map(|i| i.to_string())
            .collect();
        assert_eq!(ids(&store), expected);
    }

    #[test]
    fn test_get_does_not_change_order() {
        let mut store = BoundedStore::new(2);
        store.store(id("A"), 1);
        store.store(id("B"), 2);

        assert_eq!(store.get(&id("A")), Some(&1));
        assert!(store.contains(&id("A")));
        store.store(id("C"), 3);

        assert!(store.get(&id("A")).is_none());
    }

    #[test]
    fn test_overwrite_keeps_insertion_slot() {
        let mut store = BoundedStore::new(2);
        store.store(id("A"), 1);
        store.store(id("B"), 2);

        assert!(store.store(id("A"), 10).is_none());
        assert_eq!(store.get(&id("A")), Some(&10));
        assert_eq!(store.len(), 2);

        let evicted = store.store(id("C"), 3);
        assert_eq!(evicted, Some((id("A"), 10)));
    }

    #[test]
    fn test_zero_capacity_is_noop() {
        let mut store = BoundedStore::new(0);
        assert!(store.store(id("A"), 1).is_none());
        assert!(store.is_empty());
        assert!(!store.contains(&id("A")));
    }

    #[test]
    fn test_set_capacity_zero_then_store() {
        let mut store = BoundedStore::new(3);
        store.store(id("A"), 1);
        store.store(id("B"), 2);

        let evicted = store.set_capacity(0);
        assert_eq!(evicted.len(), 2);

        store.store(id("C"), 3);
        assert_eq!(store.len(), 0);
        assert!(store.get(&id("C")).is_none());
    }

    #[test]
    fn test_set_capacity_shrinks_from_oldest() {
        let mut store = BoundedStore::new(4);
        for name in ["A", "B", "C", "D"] {
            store.store(id(name), ());
        }

        let evicted: Vec<String> = store
            .set_capacity(2)
            .into_iter()
            .map(|(k, ())| k.to_string())
            .collect();

        assert_eq!(evicted, ["A", "B"]);
        assert_eq!(ids(&store), ["C", "D"]);
        assert_eq!(store.capacity(), 2);
    }

    #[test]
    fn test_remove_and_remove_oldest() {
        let mut store = BoundedStore::new(3);
        assert!(store.remove_oldest().is_none());

        store.store(id("A"), 1);
        store.store(id("B"), 2);
        store.store(id("C"), 3);

        assert_eq!(store.remove(&id("B")), Some(2));
        assert_eq!(store.remove(&id("B")), None);
        assert_eq!(store.remove_oldest(), Some((id("A"), 1)));
        assert_eq!(ids(&store), ["C"]);
    }

    #[test]
    fn test_drain_and_clear() {
        let mut store = BoundedStore::new(3);
        store.store(id("A"), 1);
        store.store(id("B"), 2);

        let drained = store.drain();
        assert_eq!(drained, vec![(id("A"), 1), (id("B"), 2)]);
        assert!(store.is_empty());

        store.store(id("C"), 3);
        store.clear();
        assert!(store.is_empty());
    }
}
