//! Ordered in-memory object storage: [`ObjectCache`] (unbounded) and
//! [`RingBufferObjectCache`] (bounded, §4.5).

pub mod object_cache;
pub mod ring_buffer_cache;

pub use object_cache::ObjectCache;
pub use ring_buffer_cache::RingBufferObjectCache;
