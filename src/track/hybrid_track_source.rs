//! `HybridTrackSource`: mirrors every live arrival into a cache before
//! fanning it out to subscribers (§4.7).

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::cache::ObjectCache;
use crate::location::Location;
use crate::object::MoqtObject;
use crate::track::live_track_source::{DoneListener, LiveTrackSource, ObjectListener, Unsubscribe};

#[derive(Clone)]
pub struct HybridTrackSource {
    past: Arc<Mutex<ObjectCache>>,
    live: LiveTrackSource,
}

impl HybridTrackSource {
    pub fn new(past: ObjectCache) -> Self {
        Self {
            past: Arc::new(Mutex::new(past)),
            live: LiveTrackSource::new(),
        }
    }

    /// Starts ingesting `reader`; every arrival lands in the cache before
    /// being fanned out to live subscribers (§4.7).
    pub fn start(&self, reader: mpsc::Receiver<MoqtObject>) {
        let past = self.past.clone();
        let mirror_subscription = self.live.on_new_object(Box::new(move |obj: &MoqtObject| {
            past.lock().unwrap().add(obj.clone());
        }));
        // The mirror listener stays registered in `self.live`'s listener map
        // regardless; discarding this handle only gives up the ability to
        // unsubscribe it early, which this source never wants to do.
        std::mem::forget(mirror_subscription);
        self.live.start(reader);
    }

    pub fn get_range(&self, start: Option<Location>, end: Option<Location>) -> Vec<MoqtObject> {
        self.past.lock().unwrap().get_range(start, end).to_vec()
    }

    pub fn on_new_object(&self, listener: ObjectListener) -> Unsubscribe {
        self.live.on_new_object(listener)
    }

    pub fn on_done(&self, listener: DoneListener) -> Unsubscribe {
        self.live.on_done(listener)
    }

    pub fn largest_location(&self) -> Option<Location> {
        self.live.largest_location()
    }

    pub fn stop(&self) {
        self.live.stop();
    }
}
