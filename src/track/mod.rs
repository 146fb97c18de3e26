//! Track content sources: past (cache), live (push fan-out), and hybrid
//! compositions of the two (§3, §4.6, §4.7).

pub mod hybrid_track_source;
pub mod live_track_source;
pub mod track;
pub mod track_source;

pub use hybrid_track_source::HybridTrackSource;
pub use live_track_source::{DoneListener, LiveTrackSource, ObjectListener, Unsubscribe};
pub use track::{ForwardingPreference, Track};
pub use track_source::TrackSource;
