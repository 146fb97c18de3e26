//! Data-stream header dispatch: peeks the leading type tag and routes to
//! [`FetchHeader`] or [`SubgroupHeader`] (§4.4).

pub mod fetch_header;
pub mod subgroup_header;

pub use fetch_header::FetchHeader;
pub use subgroup_header::{SubgroupHeader, SubgroupId, SubgroupObjectField};

use num_enum::TryFromPrimitive;

use crate::byte_buffer::ByteBuffer;
use crate::error::{CoreError, CoreResult};

/// The closed set of leading type tags this core recognises, grounded on
/// the teacher's `DataStreamType` (moqt-core `data_stream_type.rs`), which
/// uses the same `TryFromPrimitive` dispatch for its own (different) set of
/// stream-type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
enum HeaderType {
    Fetch = 0x05,
    SubgroupZeroNoExt = 0x08,
    SubgroupZeroExt = 0x09,
    SubgroupFirstObjectNoExt = 0x0A,
    SubgroupFirstObjectExt = 0x0B,
    SubgroupExplicitNoExt = 0x0C,
    SubgroupExplicitExt = 0x0D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    Fetch(FetchHeader),
    Subgroup(SubgroupHeader),
}

impl Header {
    /// Reads the leading type-tag varint and dispatches on it, per §4.4. On
    /// an unrecognised tag the buffer is rewound to the position passed in so
    /// the caller can decide what to do with the bytes (close the stream,
    /// buffer more data, etc).
    pub fn decode(buf: &mut ByteBuffer) -> CoreResult<Self> {
        buf.checkpoint();
        let type_tag = buf.get_vi()?;
        let recognised = u8::try_from(type_tag)
            .ok()
            .and_then(|tag| HeaderType::try_from_primitive(tag).ok());
        match recognised {
            Some(HeaderType::Fetch) => {
                let header = FetchHeader::decode(buf)?;
                buf.commit();
                Ok(Header::Fetch(header))
            }
            Some(_) => {
                let header = SubgroupHeader::decode(type_tag, buf)?;
                buf.commit();
                Ok(Header::Subgroup(header))
            }
            None => {
                buf.restore();
                Err(CoreError::invalid_type(format!(
                    "{type_tag:#x} is not a known data-stream header type"
                )))
            }
        }
    }

    pub fn encode(&self, buf: &mut ByteBuffer) {
        match self {
            Header::Fetch(header) => header.encode(buf),
            Header::Subgroup(header) => header.encode(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_fetch() {
        let mut buf = ByteBuffer::new();
        FetchHeader::new(7).encode(&mut buf);
        let mut reader = buf.into_frozen().into_reader();
        assert_eq!(
            Header::decode(&mut reader).unwrap(),
            Header::Fetch(FetchHeader::new(7))
        );
    }

    #[test]
    fn dispatches_subgroup() {
        let header = SubgroupHeader {
            track_alias: 1,
            group_id: 2,
            subgroup_id: SubgroupId::Explicit(3),
            publisher_priority: 9,
            extensions_present: true,
        };
        let mut buf = ByteBuffer::new();
        header.encode(&mut buf);
        let mut reader = buf.into_frozen().into_reader();
        assert_eq!(Header::decode(&mut reader).unwrap(), Header::Subgroup(header));
    }

    #[test]
    fn unknown_tag_rewinds_and_errors() {
        let mut buf = ByteBuffer::new();
        buf.put_vi(0xFF);
        buf.put_u8(1);
        let mut reader = buf.into_frozen().into_reader();
        let before = reader.length();
        assert!(Header::decode(&mut reader).is_err());
        assert_eq!(reader.length(), before);
    }
}
