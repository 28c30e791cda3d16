/// Realtime change notifications
///
/// Storage backends publish a [`ChangeEvent`] after each successful write;
/// callers register callbacks with a [`ChangeFilter`] and get notified for
/// matching events until they unsubscribe.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::Serialize;

/// The tables a change can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Habits,
    HabitCompletions,
    Tasks,
    Homework,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single committed change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
    /// The calendar day the changed row belongs to, if it belongs to one
    ///
    /// Habit changes carry no date because they affect every day's totals.
    pub date: Option<NaiveDate>,
}

impl ChangeEvent {
    pub fn new(collection: Collection, kind: ChangeKind, date: Option<NaiveDate>) -> Self {
        Self { collection, kind, date }
    }
}

/// Which events a subscriber wants to see
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeFilter {
    /// `None` matches every collection
    pub collections: Option<Vec<Collection>>,
    /// Only events for this day (undated events always match)
    pub date: Option<NaiveDate>,
}

impl ChangeFilter {
    /// Every change
    pub fn all() -> Self {
        Self::default()
    }

    /// Changes that can alter whether `date` is fully complete
    pub fn day_items(date: NaiveDate) -> Self {
        Self {
            collections: Some(vec![
                Collection::Habits,
                Collection::HabitCompletions,
                Collection::Tasks,
                Collection::Homework,
            ]),
            date: Some(date),
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        let collection_ok = self
            .collections
            .as_ref()
            .map(|wanted| wanted.contains(&event.collection))
            .unwrap_or(true);

        let date_ok = match (self.date, event.date) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        };

        collection_ok && date_ok
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

pub type ChangeCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Registry of change subscribers
#[derive(Default)]
pub struct ChangeFeed {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriptionId, (ChangeFilter, ChangeCallback)>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, filter: ChangeFilter, callback: ChangeCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(id, (filter, callback));
        tracing::debug!("Registered change subscription {}", id);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            tracing::debug!("Removed change subscription {}", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Deliver `event` to every matching subscriber
    ///
    /// Callbacks run after the registry lock is released, so a callback may
    /// subscribe or unsubscribe without deadlocking.
    pub fn publish(&self, event: ChangeEvent) {
        let targets: Vec<ChangeCallback> = self
            .lock()
            .values()
            .filter(|(filter, _)| filter.matches(&event))
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in targets {
            callback(&event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SubscriptionId, (ChangeFilter, ChangeCallback)>> {
        // callbacks never run under this lock
        self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn test_day_filter_matching() {
        let filter = ChangeFilter::day_items(day(10));

        assert!(filter.matches(&ChangeEvent::new(Collection::Tasks, ChangeKind::Update, Some(day(10)))));
        assert!(!filter.matches(&ChangeEvent::new(Collection::Tasks, ChangeKind::Update, Some(day(11)))));
        assert!(filter.matches(&ChangeEvent::new(Collection::Habits, ChangeKind::Update, None)));
        assert!(!filter.matches(&ChangeEvent::new(Collection::Profile, ChangeKind::Update, None)));
    }

    #[test]
    fn test_publish_and_unsubscribe() {
        let feed = ChangeFeed::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let id = feed.subscribe(
            ChangeFilter::all(),
            Arc::new(move |_: &ChangeEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        feed.publish(ChangeEvent::new(Collection::Habits, ChangeKind::Insert, None));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(feed.unsubscribe(id));
        assert!(!feed.unsubscribe(id));
        feed.publish(ChangeEvent::new(Collection::Habits, ChangeKind::Insert, None));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(feed.subscriber_count(), 0);
    }
}
