//! `SubgroupHeader` and its per-object field, leading type tags `0x08..0x0D`
//! (§3/§4.4).
//!
//! Grounded on the teacher's newer `SubgroupHeader`/`SubgroupId` (moqt
//! `data_plane/object/subgroup.rs`), which picks field presence from a type
//! tag over a 3-axis table (subgroup-id shape, explicit-object-id, extensions
//! presence). That table is defined there over tags `0x10..0x1D` with an
//! extra end-of-group axis this spec does not have; re-based onto the six
//! tags `0x08..0x0D` named by §4.4 (two axes: subgroup-id shape, extensions
//! presence — the "explicit-object-id" axis is folded into the subgroup-id
//! shape as the `FirstObjectId` variant), this is the resolution recorded for
//! the open question in SPEC_FULL.md §9.
//!
//! | Tag  | Subgroup ID          | Extensions |
//! |------|----------------------|------------|
//! | 0x08 | implicit zero        | no         |
//! | 0x09 | implicit zero        | yes        |
//! | 0x0A | = first object id    | no         |
//! | 0x0B | = first object id    | yes        |
//! | 0x0C | explicit value       | no         |
//! | 0x0D | explicit value       | yes        |

use crate::byte_buffer::ByteBuffer;
use crate::error::{CoreError, CoreResult};
use crate::extension_header::ExtensionHeaders;
use crate::key_value_pair::KeyValuePair;

pub const SUBGROUP_HEADER_TYPE_MIN: u64 = 0x08;
pub const SUBGROUP_HEADER_TYPE_MAX: u64 = 0x0D;

pub fn is_subgroup_header_type(type_tag: u64) -> bool {
    (SUBGROUP_HEADER_TYPE_MIN..=SUBGROUP_HEADER_TYPE_MAX).contains(&type_tag)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubgroupId {
    /// Tags 0x08/0x09: the subgroup id is implicitly zero.
    ImplicitZero,
    /// Tags 0x0A/0x0B: the subgroup id equals the id of the first object in
    /// the subgroup (carried out-of-band, not on the wire).
    FirstObjectId,
    /// Tags 0x0C/0x0D: the subgroup id is carried explicitly on the wire.
    Explicit(u64),
}

impl SubgroupId {
    fn has_extensions(type_tag: u64) -> bool {
        type_tag % 2 == 1
    }

    fn from_type_tag(type_tag: u64, buf: &mut ByteBuffer) -> CoreResult<Self> {
        match type_tag {
            0x08 | 0x09 => Ok(SubgroupId::ImplicitZero),
            0x0A | 0x0B => Ok(SubgroupId::FirstObjectId),
            0x0C | 0x0D => Ok(SubgroupId::Explicit(buf.get_vi()?)),
            _ => Err(CoreError::invalid_type(format!(
                "{type_tag:#x} is not a subgroup header type"
            ))),
        }
    }

    fn type_tag(&self, extensions_present: bool) -> u64 {
        let base = match self {
            SubgroupId::ImplicitZero => 0x08,
            SubgroupId::FirstObjectId => 0x0A,
            SubgroupId::Explicit(_) => 0x0C,
        };
        base + extensions_present as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubgroupHeader {
    pub track_alias: u64,
    pub group_id: u64,
    pub subgroup_id: SubgroupId,
    pub publisher_priority: u8,
    pub extensions_present: bool,
}

impl SubgroupHeader {
    /// Decodes the fields following the leading type tag, which the caller
    /// has already read (per §4.4) and passes back in so field presence can
    /// be resolved.
    pub fn decode(type_tag: u64, buf: &mut ByteBuffer) -> CoreResult<Self> {
        if !is_subgroup_header_type(type_tag) {
            return Err(CoreError::invalid_type(format!(
                "{type_tag:#x} is not a subgroup header type"
            )));
        }
        let track_alias = buf.get_vi()?;
        let group_id = buf.get_vi()?;
        let subgroup_id = SubgroupId::from_type_tag(type_tag, buf)?;
        let publisher_priority = buf.get_u8()?;
        Ok(Self {
            track_alias,
            group_id,
            subgroup_id,
            publisher_priority,
            extensions_present: SubgroupId::has_extensions(type_tag),
        })
    }

    pub fn encode(&self, buf: &mut ByteBuffer) {
        buf.put_vi(self.subgroup_id.type_tag(self.extensions_present));
        buf.put_vi(self.track_alias);
        buf.put_vi(self.group_id);
        if let SubgroupId::Explicit(v) = self.subgroup_id {
            buf.put_vi(v);
        }
        buf.put_u8(self.publisher_priority);
    }
}

/// One object carried on a subgroup stream, following the subgroup header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgroupObjectField {
    pub object_id_delta: u64,
    pub extension_headers: Vec<KeyValuePair>,
    pub payload: Vec<u8>,
}

impl SubgroupObjectField {
    pub fn decode(extensions_present: bool, buf: &mut ByteBuffer) -> CoreResult<Self> {
        let object_id_delta = buf.get_vi()?;
        let extension_headers = if extensions_present {
            let count = buf.get_vi()?;
            ExtensionHeaders::decode_all(buf, count)?.raw
        } else {
            Vec::new()
        };
        let payload_len = buf.get_vi()?;
        let payload = buf.get_bytes(payload_len as usize)?;
        Ok(Self {
            object_id_delta,
            extension_headers,
            payload,
        })
    }

    /// `extensions_present` must be the enclosing `SubgroupHeader`'s flag,
    /// not inferred from whether `extension_headers` happens to be empty —
    /// the count field's presence on the wire is governed by the header's
    /// flag alone, so `decode` and `encode` have to gate on the same value.
    pub fn encode(&self, extensions_present: bool, buf: &mut ByteBuffer) {
        buf.put_vi(self.object_id_delta);
        if extensions_present {
            buf.put_vi(self.extension_headers.len() as u64);
            for header in &self.extension_headers {
                header.encode(buf);
            }
        }
        buf.put_vi(self.payload.len() as u64);
        buf.put_bytes(&self.payload);
    }
}
