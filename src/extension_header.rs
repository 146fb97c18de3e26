//! The closed set of known LOC header extension variants, built on
//! [`KeyValuePair`].
//!
//! Grounded on the teacher's `LocHeaderExtension` (packages `loc/header_extension.rs`)
//! for the variant set and field shapes, and on `ExtensionHeaders::decode`
//! (moqt `data_plane/object/extension_headers.rs`) for the "parse known, keep
//! the rest around for passthrough" structure. Type IDs are chosen to satisfy
//! the parity contract in §3/§6 (VideoConfig carries a byte string and must
//! therefore use an *odd* tag); the teacher's own LOC ids use an even id for
//! VideoConfig; that mismatch is resolved here in favour of the spec's parity
//! rule (recorded in DESIGN.md).

use crate::error::CoreResult;
use crate::key_value_pair::{KeyValuePair, Value};

pub const CAPTURE_TIMESTAMP_ID: u64 = 2;
pub const VIDEO_FRAME_MARKING_ID: u64 = 4;
pub const AUDIO_LEVEL_ID: u64 = 6;
pub const VIDEO_CONFIG_ID: u64 = 17;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExtensionHeader {
    /// Capture wall-clock time, microseconds since the Unix epoch.
    CaptureTimestamp(u64),
    /// 1 = keyframe, any other value = delta frame.
    VideoFrameMarking(u64),
    /// dBov level.
    AudioLevel(u64),
    /// Codec-specific configuration description.
    VideoConfig(Vec<u8>),
}

impl ExtensionHeader {
    pub fn to_key_value_pair(&self) -> KeyValuePair {
        match self {
            ExtensionHeader::CaptureTimestamp(v) => KeyValuePair {
                type_value: CAPTURE_TIMESTAMP_ID,
                value: Value::VarInt(*v),
            },
            ExtensionHeader::VideoFrameMarking(v) => KeyValuePair {
                type_value: VIDEO_FRAME_MARKING_ID,
                value: Value::VarInt(*v),
            },
            ExtensionHeader::AudioLevel(v) => KeyValuePair {
                type_value: AUDIO_LEVEL_ID,
                value: Value::VarInt(*v),
            },
            ExtensionHeader::VideoConfig(bytes) => KeyValuePair {
                type_value: VIDEO_CONFIG_ID,
                value: Value::Bytes(bytes.clone()),
            },
        }
    }

    /// Attempts each known variant in a fixed order; returns `None` for an
    /// unrecognised type id (non-fatal, per §4.3).
    pub fn from_key_value_pair(pair: &KeyValuePair) -> Option<Self> {
        match (pair.type_value, &pair.value) {
            (CAPTURE_TIMESTAMP_ID, Value::VarInt(v)) => Some(ExtensionHeader::CaptureTimestamp(*v)),
            (VIDEO_FRAME_MARKING_ID, Value::VarInt(v)) => {
                Some(ExtensionHeader::VideoFrameMarking(*v))
            }
            (AUDIO_LEVEL_ID, Value::VarInt(v)) => Some(ExtensionHeader::AudioLevel(*v)),
            (VIDEO_CONFIG_ID, Value::Bytes(bytes)) => Some(ExtensionHeader::VideoConfig(bytes.clone())),
            _ => None,
        }
    }
}

/// A parsed sequence of extension headers alongside the raw key/value pairs
/// they were parsed from, so unknown ids survive on passthrough (§6) without
/// needing to be re-encoded from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionHeaders {
    pub known: Vec<ExtensionHeader>,
    pub raw: Vec<KeyValuePair>,
}

impl ExtensionHeaders {
    /// Maps then filters, preserving input order (§4.3).
    pub fn from_pairs(pairs: Vec<KeyValuePair>) -> Self {
        let known = pairs
            .iter()
            .filter_map(ExtensionHeader::from_key_value_pair)
            .collect();
        Self { known, raw: pairs }
    }

    pub fn decode_all(buf: &mut crate::byte_buffer::ByteBuffer, count: u64) -> CoreResult<Self> {
        let mut pairs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            pairs.push(KeyValuePair::decode(buf)?);
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn encode_all(&self, buf: &mut crate::byte_buffer::ByteBuffer) {
        buf.put_vi(self.raw.len() as u64);
        for pair in &self.raw {
            pair.encode(buf);
        }
    }
}
