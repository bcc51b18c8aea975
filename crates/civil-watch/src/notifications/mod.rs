//! Notification feed with read/unread tracking and observer fan-out.

mod center;
pub mod domain;

pub use center::{NotificationCenter, SubscriberError, SubscriptionId};
pub use domain::{Notification, NotificationDraft, NotificationType};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn draft(title: &str) -> NotificationDraft {
        NotificationDraft::new(title, "Stay indoors", NotificationType::Warning)
    }

    fn counter(center: &NotificationCenter) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&calls);
        center.subscribe(move || {
            observed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        calls
    }

    #[test]
    fn add_creates_unread_entries_with_unique_ids() {
        let center = NotificationCenter::default();
        let first = center.add(draft("Wind warning"));
        let second = center.add(draft("Wind warning"));

        assert_ne!(first.id, second.id);
        assert!(!first.is_read);
        assert_eq!(center.unread_count(), 2);
        assert_eq!(center.get(&first.id), Some(first));
    }

    #[test]
    fn all_lists_newest_first_regardless_of_insertion_order() {
        let center = NotificationCenter::default();
        let base = Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap();
        let middle = center.add_at(draft("middle"), base);
        let newest = center.add_at(draft("newest"), base + Duration::hours(1));
        let oldest = center.add_at(draft("oldest"), base - Duration::hours(1));

        let ids: Vec<String> = center.all().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);
    }

    #[test]
    fn mark_read_is_idempotent_and_reports_unknown_ids() {
        let center = NotificationCenter::default();
        let calls = counter(&center);
        let notification = center.add(draft("Heat"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(center.mark_read(&notification.id));
        assert!(center.mark_read(&notification.id));
        assert_eq!(center.unread_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        assert!(!center.mark_read("notif-missing"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn mark_all_read_always_fans_out() {
        let center = NotificationCenter::default();
        let calls = counter(&center);

        assert_eq!(center.mark_all_read(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        center.add(draft("a"));
        center.add(draft("b"));
        assert_eq!(center.mark_all_read(), 2);
        assert_eq!(center.unread_count(), 0);
        assert!(center.unread().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn delete_only_fans_out_when_something_was_removed() {
        let center = NotificationCenter::default();
        let notification = center.add(draft("Flood"));
        let calls = counter(&center);

        assert!(!center.delete("notif-missing"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(center.delete(&notification.id));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(center.all().is_empty());
        assert!(!center.delete(&notification.id));
    }

    #[test]
    fn failing_subscribers_are_isolated() {
        let center = NotificationCenter::default();
        center.subscribe(|| Err(SubscriberError("renderer offline".to_string())));
        center.subscribe(|| panic!("observer bug"));
        let calls = counter(&center);

        center.add(draft("Storm"));

        assert_eq!(center.unread_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscribers_run_in_registration_order_and_can_requery() {
        let center = Arc::new(NotificationCenter::default());
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["header", "badge"] {
            let log = Arc::clone(&log);
            let observed = Arc::downgrade(&center);
            center.subscribe(move || {
                let unread = observed.upgrade().map_or(0, |center| center.unread_count());
                log.lock().expect("log lock").push(format!("{name}:{unread}"));
                Ok(())
            });
        }

        center.add(draft("one"));
        center.add(draft("two"));

        let log = log.lock().expect("log lock").clone();
        assert_eq!(log, vec!["header:1", "badge:1", "header:2", "badge:2"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let center = NotificationCenter::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&calls);
        let handle = center.subscribe(move || {
            observed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        center.add(draft("first"));
        assert!(center.unsubscribe(handle));
        assert!(!center.unsubscribe(handle));
        center.add(draft("second"));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(center.subscriber_count(), 0);
    }

    #[test]
    fn display_tables_have_a_default_arm() {
        let kind: NotificationType = serde_json::from_str("\"digest\"").expect("lenient type");
        assert_eq!(kind, NotificationType::Unknown);
        assert_eq!(kind.color(), "#9E9E9E");
        assert_eq!(NotificationType::Emergency.icon(), "🚨");
    }

    #[test]
    fn drafts_carry_optional_actions() {
        let center = NotificationCenter::default();
        let notification = center.add(
            NotificationDraft::new("Evacuate", "Leave zone B", NotificationType::Emergency)
                .with_action("/shelters/nearest", "Find shelter"),
        );
        assert_eq!(notification.action_label.as_deref(), Some("Find shelter"));

        let json = serde_json::to_value(&notification).expect("serializes");
        assert_eq!(json["type"], "emergency");
    }

    #[test]
    fn repeated_seed_ids_are_deleted_in_one_step() {
        let created_at = Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap();
        let notification = Notification {
            id: "notif_1".to_string(),
            title: "Flood watch".to_string(),
            message: "River levels rising".to_string(),
            kind: NotificationType::Warning,
            is_read: false,
            created_at,
            action_url: None,
            action_label: None,
        };
        let center = NotificationCenter::new(vec![notification.clone(), notification.clone()]);
        assert_eq!(center.len(), 1);

        center.replace(vec![notification.clone(), notification]);
        assert_eq!(center.len(), 1);
        assert!(center.delete("notif_1"));
        assert!(center.get("notif_1").is_none());
        assert!(center.is_empty());
    }
}
