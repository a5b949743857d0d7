//! In-memory diagnostic log
//!
//! A bounded ring of [`LogRecord`]s with category tracking and synchronous
//! subscribers. Each subscriber is handed an immutable snapshot after every
//! append, in registration order.
//!
//! The store is single-threaded in practice. It sits behind a mutex
//! ([`SharedLogStore`]) because the global hooks in `hooks` must be
//! `Send + Sync`. Listeners run while the store is locked and must not log
//! back into it.

mod hooks;

pub use hooks::{init_global_hooks, report_rejection};

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Records kept before the oldest are dropped
pub const LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub id: u64,
    pub category: String,
    pub message: String,
    pub level: LogLevel,
    /// Seconds, from the store's clock
    pub timestamp: f64,
    pub data: Option<String>,
}

/// Optional fields for [`LogStore::log`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogOptions {
    pub level: LogLevel,
    pub data: Option<String>,
}

impl LogOptions {
    pub fn level(level: LogLevel) -> Self {
        Self { level, data: None }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

pub type Snapshot = Arc<[LogRecord]>;
pub type Listener = Box<dyn FnMut(&Snapshot) + Send>;
pub type Clock = Box<dyn Fn() -> f64 + Send>;

/// Identifies one listener on one store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct LogStore {
    records: VecDeque<LogRecord>,
    capacity: usize,
    next_id: u64,
    categories: BTreeSet<String>,
    subscribers: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    clock: Clock,
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("records", &self.records.len())
            .field("capacity", &self.capacity)
            .field("next_id", &self.next_id)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl LogStore {
    /// Store with the given clock and [`LOG_CAPACITY`]
    pub fn new(clock: Clock) -> Self {
        Self::with_capacity(LOG_CAPACITY, clock)
    }

    pub fn with_capacity(capacity: usize, clock: Clock) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(LOG_CAPACITY)),
            capacity: capacity.max(1),
            next_id: 1,
            categories: BTreeSet::new(),
            subscribers: Vec::new(),
            next_subscription: 1,
            clock,
        }
    }

    pub fn into_shared(self) -> SharedLogStore {
        Arc::new(Mutex::new(self))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record, trim to capacity, notify subscribers. Returns the id.
    pub fn log(&mut self, category: &str, message: impl Into<String>, options: LogOptions) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.categories.insert(category.to_string());
        self.records.push_back(LogRecord {
            id,
            category: category.to_string(),
            message: message.into(),
            level: options.level,
            timestamp: (self.clock)(),
            data: options.data,
        });
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }

        if !self.subscribers.is_empty() {
            let snapshot = self.snapshot();
            for (_, listener) in self.subscribers.iter_mut() {
                listener(&snapshot);
            }
        }
        id
    }

    pub fn snapshot(&self) -> Snapshot {
        self.records.iter().cloned().collect()
    }

    /// Every category ever logged, sorted. Never shrinks.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Register a listener. It receives the current snapshot immediately.
    pub fn subscribe(&mut self, mut listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        listener(&self.snapshot());
        self.subscribers.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

pub type SharedLogStore = Arc<Mutex<LogStore>>;

/// Lock, recovering the guard if a panic poisoned the mutex
pub fn lock(store: &SharedLogStore) -> MutexGuard<'_, LogStore> {
    match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Handle returned by [`subscribe`]; dropping it keeps the subscription
#[must_use = "call unsubscribe() to stop deliveries"]
#[derive(Debug)]
pub struct Unsubscribe {
    store: Weak<Mutex<LogStore>>,
    id: SubscriptionId,
}

impl Unsubscribe {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Stop deliveries. A no-op once the store is gone.
    pub fn unsubscribe(self) {
        if let Some(store) = self.store.upgrade() {
            lock(&store).unsubscribe(self.id);
        }
    }
}

/// Subscribe to a shared store
pub fn subscribe(store: &SharedLogStore, listener: Listener) -> Unsubscribe {
    let id = lock(store).subscribe(listener);
    Unsubscribe { store: Arc::downgrade(store), id }
}

#[cfg(test)]
pub(crate) fn counter_clock() -> Clock {
    use std::sync::atomic::{AtomicU64, Ordering};
    let ticks = AtomicU64::new(0);
    Box::new(move || ticks.fetch_add(1, Ordering::Relaxed) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LogStore {
        LogStore::new(counter_clock())
    }

    #[test]
    fn test_capacity_keeps_newest_in_order() {
        let mut store = store();
        for i in 0..(LOG_CAPACITY + 37) {
            store.log(if i % 2 == 0 { "even" } else { "odd" }, format!("m{}", i), LogOptions::default());
        }
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), LOG_CAPACITY);
        assert_eq!(snapshot[0].id, 38);
        assert_eq!(snapshot[LOG_CAPACITY - 1].id, (LOG_CAPACITY + 37) as u64);
        assert!(snapshot.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_categories_survive_trimming() {
        let mut store = LogStore::with_capacity(3, counter_clock());
        store.log("boot", "first", LogOptions::default());
        for i in 0..10 {
            store.log("tick", format!("{}", i), LogOptions::default());
        }
        assert!(store.snapshot().iter().all(|r| r.category == "tick"));
        let categories: Vec<&str> = store.categories().iter().map(String::as_str).collect();
        assert_eq!(categories, vec!["boot", "tick"]);
    }

    #[test]
    fn test_level_defaults_to_info() {
        let mut store = store();
        store.log("a", "x", LogOptions::default());
        store.log("a", "y", LogOptions::level(LogLevel::Error).with_data("ctx"));
        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].level, LogLevel::Info);
        assert_eq!(snapshot[0].data, None);
        assert_eq!(snapshot[1].level, LogLevel::Error);
        assert_eq!(snapshot[1].data.as_deref(), Some("ctx"));
        assert!(snapshot[0].timestamp < snapshot[1].timestamp);
    }

    #[test]
    fn test_subscribe_delivers_current_snapshot_then_updates() {
        let shared = store().into_shared();
        lock(&shared).log("a", "before", LogOptions::default());

        let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
        let sink = seen.clone();
        let handle = subscribe(&shared, Box::new(move |snap| sink.lock().unwrap().push(snap.len())));
        assert_eq!(*seen.lock().unwrap(), vec![1]);

        lock(&shared).log("a", "after", LogOptions::default());
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);

        handle.unsubscribe();
        lock(&shared).log("a", "ignored", LogOptions::default());
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(lock(&shared).subscriber_count(), 0);
    }

    #[test]
    fn test_subscribers_notified_in_registration_order() {
        let mut store = store();
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::default();
        for name in ["first", "second", "third"] {
            let order = order.clone();
            store.subscribe(Box::new(move |_| order.lock().unwrap().push(name)));
        }
        order.lock().unwrap().clear();
        store.log("a", "x", LogOptions::default());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_unknown_id() {
        let mut store = store();
        let id = store.subscribe(Box::new(|_| {}));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_unsubscribe_after_store_dropped() {
        let shared = store().into_shared();
        let handle = subscribe(&shared, Box::new(|_| {}));
        drop(shared);
        handle.unsubscribe();
    }
}
