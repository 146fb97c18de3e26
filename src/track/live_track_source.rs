//! Async push fan-out over a live stream of [`MoqtObject`]s (§4.6).
//!
//! Grounded on the teacher's `ControlMessageReceiveThread` (moqt
//! `control_plane/threads/control_message_receive_thread.rs`): a single
//! spawned `tokio::task` owns the receive loop and forwards decoded values
//! onward, logging with `tracing` rather than propagating every error. The
//! listener/subscription bookkeeping (`on_new_object`/`on_done` returning an
//! unsubscribe handle) is this spec's own contract, since the teacher's
//! thread forwards to a single fixed `event_sender` rather than a dynamic
//! subscriber set.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Notify};

use crate::location::Location;
use crate::object::MoqtObject;

pub type ObjectListener = Box<dyn Fn(&MoqtObject) + Send + Sync + 'static>;
pub type DoneListener = Box<dyn Fn() + Send + Sync + 'static>;

/// Removes the exact callback it was returned for. Calling it more than once
/// is a harmless no-op.
pub struct Unsubscribe {
    remove: Box<dyn FnOnce() + Send + 'static>,
}

impl Unsubscribe {
    pub fn unsubscribe(self) {
        (self.remove)();
    }
}

struct Inner {
    largest_location: Mutex<Option<Location>>,
    listeners: Mutex<std::collections::HashMap<u64, mpsc::UnboundedSender<MoqtObject>>>,
    done_listeners: Mutex<std::collections::HashMap<u64, Arc<DoneListener>>>,
    ingest_active: AtomicBool,
    next_id: AtomicU64,
    stop: Notify,
}

impl Inner {
    /// Hands each arrival to every listener's own queue, preserving arrival
    /// order without a happens-before race: a fresh `tokio::spawn` per
    /// (arrival, listener) pair has no ordering guarantee across spawns, so
    /// delivery to one listener is instead serialized through a single
    /// worker task per listener (§5, §9) draining an unbounded channel.
    fn dispatch_new_object(self: &Arc<Self>, obj: MoqtObject) {
        let senders: Vec<mpsc::UnboundedSender<MoqtObject>> =
            self.listeners.lock().unwrap().values().cloned().collect();
        for sender in senders {
            let _ = sender.send(obj.clone());
        }
    }

    fn dispatch_done(self: &Arc<Self>) {
        let snapshot: Vec<Arc<DoneListener>> =
            self.done_listeners.lock().unwrap().values().cloned().collect();
        for listener in snapshot {
            tokio::spawn(async move {
                if std::panic::catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                    tracing::warn!("live track done-listener panicked");
                }
            });
        }
    }
}

#[derive(Clone)]
pub struct LiveTrackSource {
    inner: Arc<Inner>,
}

impl Default for LiveTrackSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveTrackSource {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                largest_location: Mutex::new(None),
                listeners: Mutex::new(std::collections::HashMap::new()),
                done_listeners: Mutex::new(std::collections::HashMap::new()),
                ingest_active: AtomicBool::new(false),
                next_id: AtomicU64::new(0),
                stop: Notify::new(),
            }),
        }
    }

    pub fn largest_location(&self) -> Option<Location> {
        *self.inner.largest_location.lock().unwrap()
    }

    pub fn is_ingest_active(&self) -> bool {
        self.inner.ingest_active.load(Ordering::SeqCst)
    }

    /// The listener itself is moved into a single dedicated worker task that
    /// drains its queue in order; unsubscribing drops the sender, which ends
    /// the queue and lets the worker task exit.
    pub fn on_new_object(&self, listener: ObjectListener) -> Unsubscribe {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, mut rx) = mpsc::unbounded_channel::<MoqtObject>();
        self.inner.listeners.lock().unwrap().insert(id, tx);
        tokio::spawn(async move {
            while let Some(obj) = rx.recv().await {
                if std::panic::catch_unwind(AssertUnwindSafe(|| listener(&obj))).is_err() {
                    tracing::warn!("live track listener panicked, dropping arrival dispatch");
                }
            }
        });
        let inner = self.inner.clone();
        Unsubscribe {
            remove: Box::new(move || {
                inner.listeners.lock().unwrap().remove(&id);
            }),
        }
    }

    pub fn on_done(&self, listener: DoneListener) -> Unsubscribe {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.done_listeners.lock().unwrap().insert(id, Arc::new(listener));
        let inner = self.inner.clone();
        Unsubscribe {
            remove: Box::new(move || {
                inner.done_listeners.lock().unwrap().remove(&id);
            }),
        }
    }

    /// Single-flight: a second call while ingest is active is a no-op (§4.6).
    pub fn start(&self, mut reader: mpsc::Receiver<MoqtObject>) {
        if self.inner.ingest_active.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = self.inner.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = inner.stop.notified() => break,
                    received = reader.recv() => {
                        match received {
                            Some(obj) => {
                                let mut largest = inner.largest_location.lock().unwrap();
                                let is_new_max = match *largest {
                                    Some(current) => obj.location > current,
                                    None => true,
                                };
                                if is_new_max {
                                    *largest = Some(obj.location);
                                }
                                drop(largest);
                                inner.dispatch_new_object(obj);
                            }
                            None => break,
                        }
                    }
                }
            }
            inner.ingest_active.store(false, Ordering::SeqCst);
            inner.dispatch_done();
        });
    }

    /// Idempotent: cancels the underlying reader and marks ingest inactive.
    /// Subsequent arrivals already in flight are dropped.
    pub fn stop(&self) {
        self.inner.ingest_active.store(false, Ordering::SeqCst);
        self.inner.stop.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn fans_out_arrivals_in_order_to_all_subscribers() {
        let source = LiveTrackSource::new();
        let (tx, rx) = mpsc::channel(8);

        let count_a = Arc::new(AtomicUsize::new(0));
        let count_b = Arc::new(AtomicUsize::new(0));
        let ca = count_a.clone();
        let cb = count_b.clone();
        let _sub_a = source.on_new_object(Box::new(move |_obj| {
            ca.fetch_add(1, Ordering::SeqCst);
        }));
        let _sub_b = source.on_new_object(Box::new(move |_obj| {
            cb.fetch_add(1, Ordering::SeqCst);
        }));

        source.start(rx);
        for i in 0..3u64 {
            tx.send(MoqtObject::new(1, Location::new(0, i), 0, 1, vec![], vec![]))
                .await
                .unwrap();
        }
        drop(tx);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(count_a.load(Ordering::SeqCst), 3);
        assert_eq!(count_b.load(Ordering::SeqCst), 3);
        assert_eq!(source.largest_location(), Some(Location::new(0, 2)));
    }

    #[tokio::test]
    async fn done_listener_fires_exactly_once_on_stream_end() {
        let source = LiveTrackSource::new();
        let (tx, rx) = mpsc::channel(8);
        let done_count = Arc::new(AtomicUsize::new(0));
        let dc = done_count.clone();
        let _sub = source.on_done(Box::new(move || {
            dc.fetch_add(1, Ordering::SeqCst);
        }));

        source.start(rx);
        drop(tx);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(done_count.load(Ordering::SeqCst), 1);
        assert!(!source.is_ingest_active());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_drops_later_arrivals() {
        let source = LiveTrackSource::new();
        let (tx, rx) = mpsc::channel(8);
        source.start(rx);
        source.stop();
        source.stop();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(!source.is_ingest_active());
        // Sending after stop should not panic even though nothing reads it.
        let _ = tx.try_send(MoqtObject::new(1, Location::new(0, 0), 0, 1, vec![], vec![]));
    }

    #[tokio::test]
    async fn second_start_call_is_a_noop() {
        let source = LiveTrackSource::new();
        let (_tx1, rx1) = mpsc::channel(8);
        let (_tx2, rx2) = mpsc::channel(8);
        source.start(rx1);
        assert!(source.is_ingest_active());
        source.start(rx2); // no-op, rx2 is simply dropped
        assert!(source.is_ingest_active());
    }

    #[tokio::test]
    async fn unsubscribe_stops_further_delivery() {
        let source = LiveTrackSource::new();
        let (tx, rx) = mpsc::channel(8);
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sub = source.on_new_object(Box::new(move |_obj| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        source.start(rx);
        tx.send(MoqtObject::new(1, Location::new(0, 0), 0, 1, vec![], vec![]))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        sub.unsubscribe();
        tx.send(MoqtObject::new(1, Location::new(0, 1), 0, 1, vec![], vec![]))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
