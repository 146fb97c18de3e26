//! Transport-agnostic core of a Media-over-QUIC Transport (MoQT) client:
//! control-stream framing, the binary wire-format model, and track content
//! sources over cached and live objects.

pub mod byte_buffer;
pub mod cache;
pub mod control_stream;
pub mod error;
pub mod extension_header;
pub mod headers;
pub mod key_value_pair;
pub mod location;
pub mod object;
pub mod priority;
pub mod track;

pub use byte_buffer::{ByteBuffer, FrozenBuffer};
pub use cache::{ObjectCache, RingBufferObjectCache};
pub use control_stream::{ControlMessage, ControlStream};
pub use error::{CoreError, CoreResult, TerminationErrorCode};
pub use extension_header::{ExtensionHeader, ExtensionHeaders};
pub use headers::{FetchHeader, Header, SubgroupHeader, SubgroupId, SubgroupObjectField};
pub use key_value_pair::{KeyValuePair, Value as KeyValue};
pub use location::Location;
pub use object::MoqtObject;
pub use priority::get_transport_priority;
pub use track::{ForwardingPreference, HybridTrackSource, LiveTrackSource, Track, TrackSource};
