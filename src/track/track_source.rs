//! `TrackSource`: the composition of a past (cache-backed) source and/or a
//! live (stream-backed) source for one track (§3).

use crate::cache::ObjectCache;
use crate::track::live_track_source::LiveTrackSource;

/// At least one facet is expected to be present in practice; both being
/// `None` simply yields an empty track with no content to query or observe.
#[derive(Clone, Default)]
pub struct TrackSource {
    pub past: Option<ObjectCache>,
    pub live: Option<LiveTrackSource>,
}

impl TrackSource {
    pub fn past_only(cache: ObjectCache) -> Self {
        Self {
            past: Some(cache),
            live: None,
        }
    }

    pub fn live_only(live: LiveTrackSource) -> Self {
        Self {
            past: None,
            live: Some(live),
        }
    }

    pub fn hybrid(cache: ObjectCache, live: LiveTrackSource) -> Self {
        Self {
            past: Some(cache),
            live: Some(live),
        }
    }
}

impl std::fmt::Debug for TrackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackSource")
            .field("past", &self.past.as_ref().map(ObjectCache::size))
            .field("live", &self.live.is_some())
            .finish()
    }
}
