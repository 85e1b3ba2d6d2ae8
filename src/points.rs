//! Points ledger: the single authoritative score, its observers, and the
//! cloud-save cadence around it.
//!
//! The ledger is built once in `main` and inserted as a resource.  Every
//! mutation notifies observers synchronously and then persists.  On top of
//! that the ledger autosaves on a fixed interval, saves when the app is
//! paused or loses focus, and performs one deferred load shortly after start.

use crate::constants::{AUTOSAVE_INTERVAL, POINTS_PER_COLLISION};
use crate::error::{PetError, PetResult};
use crate::persistence::{current_unix_timestamp, CloudStore, SaveRecord};
use bevy::prelude::*;

/// Ledger knobs taken from [`crate::config::PetConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerSettings {
    /// Points granted by [`PointsLedger::add_for_collision`].
    pub per_collision: u64,
    /// Seconds between autosaves.
    pub autosave_interval: f32,
    /// Log every change and save to the console.
    pub log_changes: bool,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            per_collision: POINTS_PER_COLLISION,
            autosave_interval: AUTOSAVE_INTERVAL,
            log_changes: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(u64) + Send + Sync>;

#[derive(Resource)]
pub struct PointsLedger {
    points: u64,
    settings: LedgerSettings,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    store: Option<Box<dyn CloudStore>>,
    since_autosave: f32,
    pending_load: Option<f32>,
    last_saved: Option<u64>,
}

impl PointsLedger {
    pub fn new(settings: LedgerSettings, store: Option<Box<dyn CloudStore>>) -> Self {
        Self {
            points: 0,
            settings,
            observers: Vec::new(),
            next_subscription: 0,
            store,
            since_autosave: 0.0,
            pending_load: None,
            last_saved: None,
        }
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.points
    }

    #[inline]
    pub fn settings(&self) -> LedgerSettings {
        self.settings
    }

    /// Unix seconds of the last successful save, if any.
    #[inline]
    pub fn last_saved(&self) -> Option<u64> {
        self.last_saved
    }

    #[inline]
    pub fn has_pending_load(&self) -> bool {
        self.pending_load.is_some()
    }

    pub fn add(&mut self, amount: u64) {
        self.points = self.points.saturating_add(amount);
        if self.settings.log_changes {
            info!("Points +{} -> {}", amount, self.points);
        }
        self.notify();
        self.save_now();
    }

    pub fn add_for_collision(&mut self) {
        self.add(self.settings.per_collision);
    }

    pub fn reset(&mut self) {
        self.points = 0;
        if self.settings.log_changes {
            info!("Points reset");
        }
        self.notify();
        self.save_now();
    }

    pub fn subscribe(&mut self, observer: impl FnMut(u64) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        let points = self.points;
        for (_, observer) in self.observers.iter_mut() {
            observer(points);
        }
    }

    fn usable_store(&mut self) -> PetResult<&mut Box<dyn CloudStore>> {
        match self.store.as_mut() {
            Some(store) if store.is_available() => Ok(store),
            Some(store) => Err(PetError::StoreUnavailable {
                backend: store.describe(),
            }),
            None => Err(PetError::StoreUnavailable {
                backend: "none".to_string(),
            }),
        }
    }

    /// Persist the current total.  Returns `true` if the store accepted it.
    pub fn save_now(&mut self) -> bool {
        let record = SaveRecord::new(self.points);
        let blob = match record.encode() {
            Ok(blob) => blob,
            Err(err) => {
                error!("{}", err);
                return false;
            }
        };

        let log_changes = self.settings.log_changes;
        let store = match self.usable_store() {
            Ok(store) => store,
            Err(err) => {
                warn!("{} - save skipped", err);
                return false;
            }
        };
        if !store.save(&blob) {
            return false;
        }

        self.last_saved = Some(record.last_saved);
        if log_changes {
            debug!("Saved {} points", record.points);
        }
        true
    }

    /// Replace the total with whatever the store holds.
    ///
    /// No store leaves the total untouched.  An empty store or an unreadable
    /// record both reset to zero, and observers are notified either way.
    pub fn load_now(&mut self) {
        let store = match self.usable_store() {
            Ok(store) => store,
            Err(err) => {
                warn!("{} - load skipped", err);
                return;
            }
        };

        let blob = store.load();
        self.points = match blob {
            Some(blob) => match SaveRecord::decode(&blob) {
                Ok(record) => {
                    info!("Loaded {} points", record.points);
                    record.points
                }
                Err(err) => {
                    error!("{} - starting from 0", err);
                    0
                }
            },
            None => 0,
        };
        self.notify();
    }

    /// Run [`Self::load_now`] once after `delay` seconds of [`Self::tick`].
    pub fn schedule_load(&mut self, delay: f32) {
        self.pending_load = Some(delay.max(0.0));
    }

    /// Advance the deferred load and the autosave clock.
    pub fn tick(&mut self, dt: f32) {
        if let Some(remaining) = self.pending_load {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.pending_load = None;
                self.load_now();
            } else {
                self.pending_load = Some(remaining);
            }
        }

        self.since_autosave += dt;
        if self.since_autosave >= self.settings.autosave_interval {
            self.since_autosave = 0.0;
            self.save_now();
        }
    }

    pub fn on_pause(&mut self, paused: bool) {
        if paused {
            self.save_now();
        }
    }

    pub fn on_focus(&mut self, focused: bool) {
        if !focused {
            self.save_now();
        }
    }

    pub fn force_save(&mut self) -> bool {
        info!("Force save requested");
        self.save_now()
    }

    pub fn force_load(&mut self) {
        info!("Force load requested");
        self.load_now();
    }

    pub fn log_store_info(&self) {
        match &self.store {
            Some(store) if store.is_available() => {
                info!("Cloud store: {}", store.describe());
                match self.last_saved {
                    Some(at) => info!(
                        "Last saved {}s ago ({} points held)",
                        current_unix_timestamp().saturating_sub(at),
                        self.points
                    ),
                    None => info!("Not saved this session ({} points held)", self.points),
                }
            }
            Some(store) => warn!("Cloud store unavailable: {}", store.describe()),
            None => warn!("No cloud store configured"),
        }
    }
}

// ── ECS plumbing ──────────────────────────────────────────────────────────────

/// Broadcast whenever the ledger total changes (including loads).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsChanged {
    pub points: u64,
}

/// Receiving end of the ledger observer that feeds [`PointsChanged`].
#[derive(Resource)]
pub struct PointsFeed(flume::Receiver<u64>);

impl PointsFeed {
    /// Subscribe a channel sender on `ledger` and keep the receiver.
    pub fn attach(ledger: &mut PointsLedger) -> Self {
        let (tx, rx) = flume::unbounded();
        ledger.subscribe(move |points| {
            let _ = tx.send(points);
        });
        Self(rx)
    }

    pub fn drain(&self) -> Vec<u64> {
        self.0.try_iter().collect()
    }
}

pub fn points_tick_system(time: Res<Time>, ledger: Option<ResMut<PointsLedger>>) {
    if let Some(mut ledger) = ledger {
        ledger.tick(time.delta_secs());
    }
}

pub fn points_feed_system(feed: Option<Res<PointsFeed>>, mut changed: MessageWriter<PointsChanged>) {
    let Some(feed) = feed else {
        return;
    };
    for points in feed.drain() {
        changed.write(PointsChanged { points });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryCloudStore;
    use std::sync::{Arc, Mutex};

    fn quiet() -> LedgerSettings {
        LedgerSettings {
            log_changes: false,
            ..LedgerSettings::default()
        }
    }

    fn recorder(ledger: &mut PointsLedger) -> Arc<Mutex<Vec<u64>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        ledger.subscribe(move |points| sink.lock().unwrap().push(points));
        seen
    }

    #[test]
    fn subscriber_sees_every_change() {
        let mut ledger = PointsLedger::new(quiet(), None);
        let seen = recorder(&mut ledger);

        ledger.add(1);
        ledger.add(1);
        ledger.add(1);
        assert_eq!(ledger.get(), 3);
        ledger.reset();
        assert_eq!(ledger.get(), 0);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 0]);
    }

    #[test]
    fn unsubscribed_observer_goes_quiet() {
        let mut ledger = PointsLedger::new(quiet(), None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = ledger.subscribe(move |points| sink.lock().unwrap().push(points));

        ledger.add(2);
        assert!(ledger.unsubscribe(id));
        assert!(!ledger.unsubscribe(id));
        ledger.add(2);

        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn collision_increment_uses_configured_amount() {
        let mut ledger = PointsLedger::new(
            LedgerSettings {
                per_collision: 3,
                ..quiet()
            },
            None,
        );
        ledger.add_for_collision();
        ledger.add_for_collision();
        assert_eq!(ledger.get(), 6);
    }

    #[test]
    fn add_saturates() {
        let mut ledger = PointsLedger::new(quiet(), None);
        ledger.add(u64::MAX);
        ledger.add(5);
        assert_eq!(ledger.get(), u64::MAX);
    }

    #[test]
    fn every_add_is_persisted() {
        let store = MemoryCloudStore::new();
        let mut ledger = PointsLedger::new(quiet(), Some(Box::new(store.clone())));

        ledger.add(4);
        let record = SaveRecord::decode(&store.blob().unwrap()).unwrap();
        assert_eq!(record.points, 4);
        assert!(ledger.last_saved().is_some());
    }

    #[test]
    fn load_without_store_leaves_points_alone() {
        let mut ledger = PointsLedger::new(quiet(), None);
        ledger.add(9);
        let seen = recorder(&mut ledger);

        ledger.load_now();
        assert_eq!(ledger.get(), 9);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_save_loads_as_zero_and_notifies() {
        let mut ledger = PointsLedger::new(quiet(), Some(Box::new(MemoryCloudStore::new())));
        let seen = recorder(&mut ledger);

        ledger.load_now();
        assert_eq!(ledger.get(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn malformed_save_loads_as_zero_and_notifies() {
        let store = MemoryCloudStore::with_blob("{ definitely not a record");
        let mut ledger = PointsLedger::new(quiet(), Some(Box::new(store)));
        ledger.points = 12;
        let seen = recorder(&mut ledger);

        ledger.load_now();
        assert_eq!(ledger.get(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn autosave_fires_on_interval() {
        let store = MemoryCloudStore::new();
        let mut ledger = PointsLedger::new(
            LedgerSettings {
                autosave_interval: 5.0,
                ..quiet()
            },
            Some(Box::new(store.clone())),
        );

        ledger.tick(4.0);
        assert!(store.blob().is_none());
        ledger.tick(1.0);
        assert!(store.blob().is_some());
    }

    #[test]
    fn deferred_load_runs_once() {
        let store = MemoryCloudStore::with_blob(r#"{ "points": 8, "lastSaved": 1 }"#);
        let mut ledger = PointsLedger::new(quiet(), Some(Box::new(store.clone())));
        let seen = recorder(&mut ledger);
        ledger.schedule_load(0.1);

        ledger.tick(0.05);
        assert_eq!(ledger.get(), 0);
        assert!(ledger.has_pending_load());

        ledger.tick(0.06);
        assert_eq!(ledger.get(), 8);
        assert!(!ledger.has_pending_load());

        store.set_blob(Some(r#"{ "points": 100 }"#.to_string()));
        ledger.tick(0.5);
        assert_eq!(ledger.get(), 8);
        assert_eq!(*seen.lock().unwrap(), vec![8]);
    }

    #[test]
    fn pause_and_focus_loss_save() {
        let store = MemoryCloudStore::new();
        let mut ledger = PointsLedger::new(quiet(), Some(Box::new(store.clone())));

        ledger.on_pause(false);
        ledger.on_focus(true);
        assert!(store.blob().is_none());

        ledger.on_focus(false);
        assert!(store.blob().is_some());

        store.set_blob(None);
        ledger.on_pause(true);
        assert!(store.blob().is_some());
    }

    #[test]
    fn feed_forwards_changes() {
        let mut ledger = PointsLedger::new(quiet(), None);
        let feed = PointsFeed::attach(&mut ledger);
        ledger.add(1);
        ledger.add(2);
        assert_eq!(feed.drain(), vec![1, 3]);
        assert!(feed.drain().is_empty());
    }

    #[test]
    fn feed_drains_from_another_thread() {
        fn shareable<T: Send + Sync>(_: &T) {}

        let mut ledger = PointsLedger::new(quiet(), None);
        let feed = Arc::new(PointsFeed::attach(&mut ledger));
        shareable(&*feed);

        ledger.add(4);
        let remote = feed.clone();
        let drained = std::thread::spawn(move || remote.drain()).join().unwrap();
        assert_eq!(drained, vec![4]);
    }
}
