//! `Track`: a named published resource and the unit of subscription (§3).
//!
//! Grounded on the teacher's `Track`/`ForwardingPreference`
//! (`moqt-core/src/modules/models/tracks.rs`) for the forwarding-preference
//! closed set (§2.2); the rest of the fields (`full_track_name`,
//! `publisher_priority`, `track_source`) are this spec's own, since the
//! teacher's `Track` carries a namespace/name pair for the control plane
//! rather than a content source.

use crate::track::track_source::TrackSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ForwardingPreference {
    Datagram,
    Track,
    Subgroup,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub full_track_name: String,
    pub forwarding_preference: ForwardingPreference,
    pub track_source: TrackSource,
    publisher_priority: u8,
    pub track_alias: Option<u64>,
}

impl Track {
    pub fn new(
        full_track_name: String,
        forwarding_preference: ForwardingPreference,
        track_source: TrackSource,
        publisher_priority: f64,
        track_alias: Option<u64>,
    ) -> Self {
        Self {
            full_track_name,
            forwarding_preference,
            track_source,
            publisher_priority: clamp_priority(publisher_priority),
            track_alias,
        }
    }

    pub fn publisher_priority(&self) -> u8 {
        self.publisher_priority
    }

    /// Replaces the priority, rounding and clamping to `[0, 255]` as on
    /// construction (§3).
    pub fn set_publisher_priority(&mut self, priority: f64) {
        self.publisher_priority = clamp_priority(priority);
    }
}

fn clamp_priority(priority: f64) -> u8 {
    priority.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_priority_rounds_and_clamps_on_construction() {
        let track = Track::new(
            "ns/name".to_string(),
            ForwardingPreference::Subgroup,
            TrackSource::default(),
            -5.0,
            None,
        );
        assert_eq!(track.publisher_priority(), 0);

        let track = Track::new(
            "ns/name".to_string(),
            ForwardingPreference::Subgroup,
            TrackSource::default(),
            300.4,
            None,
        );
        assert_eq!(track.publisher_priority(), 255);

        let track = Track::new(
            "ns/name".to_string(),
            ForwardingPreference::Subgroup,
            TrackSource::default(),
            10.6,
            None,
        );
        assert_eq!(track.publisher_priority(), 11);
    }
}
