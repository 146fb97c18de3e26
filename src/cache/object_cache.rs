//! Unbounded, Location-ordered object store with binary-search insert and
//! range/point lookup (§4.5).
//!
//! Grounded on the teacher's `object_cache_storage` (moqt-server
//! `modules/object_cache_storage/cache.rs`), which keeps a sorted `Vec` of
//! cache entries per track and binary-searches it; the insertion/range
//! semantics here (stable-after-equal-key insert, half-open `getRange`) are
//! this spec's own contract rather than the teacher's subgroup-stream
//! bookkeeping, which this type does not otherwise need.

use crate::location::Location;
use crate::object::MoqtObject;

#[derive(Debug, Clone, Default)]
pub struct ObjectCache {
    entries: Vec<MoqtObject>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// First index `i` such that `entries[i].location >= loc`, or
    /// `entries.len()` if none. Binary search over the sorted invariant.
    fn lower_bound(&self, loc: Location) -> usize {
        self.entries.partition_point(|obj| obj.location < loc)
    }

    /// Inserts after any existing elements with an equal location, so
    /// arrival order within a key is preserved (§4.5, §9).
    pub fn add(&mut self, obj: MoqtObject) {
        let i = self.entries.partition_point(|existing| existing.location <= obj.location);
        self.entries.insert(i, obj);
    }

    pub fn get_range(&self, start: Option<Location>, end: Option<Location>) -> &[MoqtObject] {
        let lo = start.map(|s| self.lower_bound(s)).unwrap_or(0);
        let hi = end.map(|e| self.lower_bound(e)).unwrap_or(self.entries.len());
        if lo >= hi {
            &[]
        } else {
            &self.entries[lo..hi]
        }
    }

    pub fn get_by_location(&self, loc: Location) -> Option<&MoqtObject> {
        let i = self.lower_bound(loc);
        self.entries.get(i).filter(|obj| obj.location == loc)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes the lowest-Location entry (index 0, by the sorted
    /// invariant). Used by [`crate::cache::RingBufferObjectCache`] to enforce
    /// its capacity bound.
    pub(crate) fn evict_lowest(&mut self) {
        if !self.entries.is_empty() {
            self.entries.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(group: u64, object: u64) -> MoqtObject {
        MoqtObject::new(1, Location::new(group, object), 0, 128, vec![], vec![])
    }

    #[test]
    fn order_invariant_holds_after_shuffled_inserts() {
        let mut cache = ObjectCache::new();
        for (g, o) in [(1, 1), (0, 0), (2, 0), (0, 2), (1, 3)] {
            cache.add(obj(g, o));
        }
        let locations: Vec<Location> = cache.get_range(None, None).iter().map(|o| o.location).collect();
        let mut sorted = locations.clone();
        sorted.sort();
        assert_eq!(locations, sorted);
    }

    #[test]
    fn binary_search_range_and_point_lookup() {
        let mut cache = ObjectCache::new();
        for (g, o) in [(1, 1), (0, 0), (2, 0), (0, 2), (1, 3)] {
            cache.add(obj(g, o));
        }
        let range = cache.get_range(Some(Location::new(0, 1)), Some(Location::new(1, 2)));
        let got: Vec<Location> = range.iter().map(|o| o.location).collect();
        assert_eq!(got, vec![Location::new(0, 2), Location::new(1, 1)]);

        assert!(cache.get_by_location(Location::new(1, 1)).is_some());
        assert!(cache.get_by_location(Location::new(1, 2)).is_none());
    }

    #[test]
    fn duplicate_keys_preserve_arrival_order() {
        let mut cache = ObjectCache::new();
        let first = MoqtObject::new(1, Location::new(0, 0), 0, 1, vec![], vec![b'a']);
        let second = MoqtObject::new(1, Location::new(0, 0), 0, 1, vec![], vec![b'b']);
        cache.add(first.clone());
        cache.add(second.clone());
        let range = cache.get_range(None, None);
        assert_eq!(range[0].payload, first.payload);
        assert_eq!(range[1].payload, second.payload);
    }

    #[test]
    fn empty_range_when_start_after_end() {
        let mut cache = ObjectCache::new();
        cache.add(obj(0, 0));
        cache.add(obj(1, 0));
        let range = cache.get_range(Some(Location::new(5, 0)), Some(Location::new(1, 0)));
        assert!(range.is_empty());
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = ObjectCache::new();
        cache.add(obj(0, 0));
        cache.clear();
        assert_eq!(cache.size(), 0);
    }
}
