//! `FetchHeader`: the data-stream envelope for a fetch response, leading type
//! tag `0x05` (§3/§4.4).
//!
//! Grounded on the teacher's `FetchHeader` (moqt-core
//! `messages/data_streams/fetch_header.rs`) — a single varint field, same
//! name (`subscribe_id`) and wire layout, adapted to this core's
//! `ByteBuffer`/`CoreError` types instead of `anyhow`/`BytesMut`.

use crate::byte_buffer::ByteBuffer;
use crate::error::CoreResult;

pub const FETCH_HEADER_TYPE: u64 = 0x05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchHeader {
    pub subscribe_id: u64,
}

impl FetchHeader {
    pub fn new(subscribe_id: u64) -> Self {
        Self { subscribe_id }
    }

    /// Decodes the fields that follow the leading type tag (already consumed
    /// by the caller, per §4.4).
    pub fn decode(buf: &mut ByteBuffer) -> CoreResult<Self> {
        let subscribe_id = buf.get_vi()?;
        Ok(Self { subscribe_id })
    }

    pub fn encode(&self, buf: &mut ByteBuffer) {
        buf.put_vi(FETCH_HEADER_TYPE);
        buf.put_vi(self.subscribe_id);
    }
}

pub fn is_fetch_header_type(type_tag: u64) -> bool {
    type_tag == FETCH_HEADER_TYPE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let header = FetchHeader::new(42);
        let mut buf = ByteBuffer::new();
        header.encode(&mut buf);
        let mut reader = buf.into_frozen().into_reader();
        assert_eq!(reader.get_vi().unwrap(), FETCH_HEADER_TYPE);
        assert_eq!(FetchHeader::decode(&mut reader).unwrap(), header);
    }
}
