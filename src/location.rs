//! (group, object) coordinate used to order and look up MoQT objects.
//!
//! Grounded on the teacher's `Location` (moqt `messages/control_messages/location.rs`):
//! same two-varint wire layout, generalised from `pub(super)` to a public,
//! totally-ordered value type since this core's cache and range queries need
//! to compare and sort `Location`s across modules.

use crate::byte_buffer::ByteBuffer;
use crate::error::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub group: u64,
    pub object: u64,
}

impl Location {
    pub fn new(group: u64, object: u64) -> Self {
        Self { group, object }
    }

    pub fn decode(buf: &mut ByteBuffer) -> CoreResult<Self> {
        let group = buf.get_vi()?;
        let object = buf.get_vi()?;
        Ok(Self { group, object })
    }

    pub fn encode(&self, buf: &mut ByteBuffer) {
        buf.put_vi(self.group);
        buf.put_vi(self.object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let loc = Location::new(10, 5);
        let mut buf = ByteBuffer::new();
        loc.encode(&mut buf);
        let mut reader = buf.into_frozen().into_reader();
        assert_eq!(Location::decode(&mut reader).unwrap(), loc);
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Location::new(0, 5) < Location::new(1, 0));
        assert!(Location::new(1, 0) < Location::new(1, 1));
        assert_eq!(Location::new(2, 3), Location::new(2, 3));
    }
}
