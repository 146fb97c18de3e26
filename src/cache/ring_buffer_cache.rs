//! Bounded variant of [`ObjectCache`] that evicts the lowest-Location
//! element once over capacity (§4.5, §9).
//!
//! Grounded on the same `object_cache_storage` pattern as [`ObjectCache`],
//! generalised with a capacity bound the teacher's cache does not itself
//! need (the teacher's server-side cache is bounded by a separate cleanup
//! thread rather than on every insert).

use crate::cache::ObjectCache;
use crate::location::Location;
use crate::object::MoqtObject;

#[derive(Debug, Clone)]
pub struct RingBufferObjectCache {
    inner: ObjectCache,
    capacity: usize,
}

impl RingBufferObjectCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: ObjectCache::new(),
            capacity,
        }
    }

    /// Inserts, then evicts index 0 (the lowest Location, not the oldest
    /// arrival) while over capacity.
    pub fn add(&mut self, obj: MoqtObject) {
        self.inner.add(obj);
        while self.inner.size() > self.capacity {
            self.inner.evict_lowest();
        }
    }

    pub fn get_range(&self, start: Option<Location>, end: Option<Location>) -> &[MoqtObject] {
        self.inner.get_range(start, end)
    }

    pub fn get_by_location(&self, loc: Location) -> Option<&MoqtObject> {
        self.inner.get_by_location(loc)
    }

    pub fn size(&self) -> usize {
        self.inner.size()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
