//! `MoqtObject`: one application data unit at a [`Location`], immutable once
//! constructed.
//!
//! Grounded on the teacher's object/track models spread across
//! `media-streaming-format/src/track.rs` and
//! `moqt/src/modules/moqt/data_plane/object/subgroup.rs`'s per-object fields,
//! unified here into a single value type since this core has no wire-framing
//! concept that needs the fields split across a header and a trailing field
//! (that split is `SubgroupHeader`/`SubgroupObjectField`'s job, not the
//! object's).

use crate::extension_header::ExtensionHeaders;
use crate::key_value_pair::KeyValuePair;
use crate::location::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoqtObject {
    pub track_alias: u64,
    pub location: Location,
    pub subgroup_id: u64,
    pub publisher_priority: u8,
    pub extension_headers: Vec<KeyValuePair>,
    pub payload: Vec<u8>,
}

impl MoqtObject {
    pub fn new(
        track_alias: u64,
        location: Location,
        subgroup_id: u64,
        publisher_priority: u8,
        extension_headers: Vec<KeyValuePair>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            track_alias,
            location,
            subgroup_id,
            publisher_priority,
            extension_headers,
            payload,
        }
    }

    /// Parses [`ExtensionHeader`](crate::extension_header::ExtensionHeader)
    /// variants out of the raw key/value pairs carried on the wire, dropping
    /// any unrecognised ones (§4.3).
    pub fn known_extension_headers(&self) -> ExtensionHeaders {
        ExtensionHeaders::from_pairs(self.extension_headers.clone())
    }
}
