use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{Notification, NotificationDraft};
use crate::records::first_per_id;

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_notification_id() -> String {
    let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("notif-{id:06}")
}

/// Failure reported by a feed observer. Logged and otherwise ignored.
#[derive(Debug, thiserror::Error)]
#[error("subscriber failed: {0}")]
pub struct SubscriberError(pub String);

/// Handle returned by [`NotificationCenter::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn() -> Result<(), SubscriberError> + Send + Sync>;

/// Notification feed with read state and observer fan-out.
///
/// Every successful mutation notifies all subscribers, in registration order,
/// before the mutating call returns. Observers carry no payload and are
/// expected to re-query [`NotificationCenter::all`] or
/// [`NotificationCenter::unread_count`]. They may read the center but must
/// not mutate it from inside the callback.
pub struct NotificationCenter {
    feed: RwLock<Vec<Notification>>,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
    dispatch: Mutex<()>,
    next_subscription: AtomicU64,
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("notifications", &self.len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl NotificationCenter {
    pub fn new(seed: Vec<Notification>) -> Self {
        Self {
            feed: RwLock::new(unique(seed)),
            subscribers: Mutex::new(Vec::new()),
            dispatch: Mutex::new(()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn add(&self, draft: NotificationDraft) -> Notification {
        self.add_at(draft, Utc::now())
    }

    /// Add a notification stamped with an explicit creation time.
    pub fn add_at(&self, draft: NotificationDraft, created_at: DateTime<Utc>) -> Notification {
        let notification = Notification {
            id: next_notification_id(),
            title: draft.title,
            message: draft.message,
            kind: draft.kind,
            is_read: false,
            created_at,
            action_url: draft.action_url,
            action_label: draft.action_label,
        };

        self.mutate(|feed| {
            feed.push(notification.clone());
            Some(())
        });
        notification
    }

    /// Mark one notification read. Already-read notifications still succeed.
    pub fn mark_read(&self, id: &str) -> bool {
        self.mutate(|feed| {
            let notification = feed.iter_mut().find(|n| n.id == id)?;
            notification.is_read = true;
            Some(())
        })
        .is_some()
    }

    /// Mark everything read; subscribers hear about it even when nothing changed.
    pub fn mark_all_read(&self) -> usize {
        self.mutate(|feed| {
            let mut changed = 0;
            for notification in feed.iter_mut().filter(|n| !n.is_read) {
                notification.is_read = true;
                changed += 1;
            }
            Some(changed)
        })
        .unwrap_or_default()
    }

    pub fn delete(&self, id: &str) -> bool {
        self.mutate(|feed| {
            let position = feed.iter().position(|n| n.id == id)?;
            Some(feed.remove(position))
        })
        .is_some()
    }

    /// Replace the feed with a collaborator snapshot. Repeated ids keep the first record.
    pub fn replace(&self, notifications: Vec<Notification>) {
        let notifications = unique(notifications);
        self.mutate(|feed| {
            *feed = notifications;
            Some(())
        });
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        let feed = self.feed.read().expect("notification feed lock poisoned");
        feed.iter().find(|n| n.id == id).cloned()
    }

    /// Every notification, newest first.
    pub fn all(&self) -> Vec<Notification> {
        let mut notifications = self
            .feed
            .read()
            .expect("notification feed lock poisoned")
            .clone();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }

    /// Unread notifications, newest first.
    pub fn unread(&self) -> Vec<Notification> {
        let mut unread: Vec<Notification> = {
            let feed = self.feed.read().expect("notification feed lock poisoned");
            feed.iter().filter(|n| !n.is_read).cloned().collect()
        };
        unread.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        unread
    }

    pub fn unread_count(&self) -> usize {
        let feed = self.feed.read().expect("notification feed lock poisoned");
        feed.iter().filter(|n| !n.is_read).count()
    }

    pub fn len(&self) -> usize {
        self.feed.read().expect("notification feed lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let mut subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        subscribers.push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false when the handle was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        let before = subscribers.len();
        subscribers.retain(|(registered, _)| *registered != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .len()
    }

    /// Apply `change` under the feed lock and fan out when it reports `Some`.
    ///
    /// The dispatch lock spans both steps so observers see mutations in order.
    fn mutate<T, F>(&self, change: F) -> Option<T>
    where
        F: FnOnce(&mut Vec<Notification>) -> Option<T>,
    {
        let _dispatch = self.dispatch.lock().expect("dispatch lock poisoned");
        let outcome = {
            let mut feed = self.feed.write().expect("notification feed lock poisoned");
            change(&mut feed)
        };

        if outcome.is_some() {
            self.fan_out();
        }
        outcome
    }

    fn fan_out(&self) {
        let callbacks: Vec<(SubscriptionId, Callback)> = self
            .subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .clone();

        for (id, callback) in callbacks {
            match panic::catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(subscription = id.0, error = %err, "feed subscriber failed"),
                Err(_) => warn!(subscription = id.0, "feed subscriber panicked"),
            }
        }
        debug!("notification fan-out complete");
    }
}

fn unique(notifications: Vec<Notification>) -> Vec<Notification> {
    first_per_id("notifications", notifications, |notification| {
        notification.id.as_str()
    })
}
