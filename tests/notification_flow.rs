use std::sync::{Arc, Mutex};

use scheduleAssistant::events::queue::{NotificationKind, StoreNotification};
use scheduleAssistant::events::worker::{
    NotificationSink, drain_notifications, run_notification_worker,
};
use scheduleAssistant::models::schedule_event::{ScheduleEvent, Weekday};
use scheduleAssistant::service::schedule_store::ScheduleStore;
use scheduleAssistant::storage::MemoryStorage;

#[derive(Default)]
struct RecordingSink {
    seen: Mutex<Vec<StoreNotification>>,
}

impl NotificationSink for RecordingSink {
    fn show(&self, notification: &StoreNotification) {
        self.seen.lock().unwrap().push(notification.clone());
    }
}

#[tokio::test]
async fn worker_shows_every_notification_until_store_is_dropped() {
    let mut store = ScheduleStore::open(Box::new(MemoryStorage::new()));
    let sink = Arc::new(RecordingSink::default());
    let worker = tokio::spawn(run_notification_worker(store.subscribe(), sink.clone()));

    let event = ScheduleEvent::new("Piano", Weekday::Sunday, "16:00", "17:00").unwrap();
    let id = event.id.clone();
    store.add_event(event).unwrap();
    store.add_events_from_suggestion("nothing useful here").unwrap_err();
    store.remove_event(&id);
    drop(store);
    worker.await.unwrap();

    let seen = sink.seen.lock().unwrap();
    let kinds: Vec<NotificationKind> = seen.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::EventAdded,
            NotificationKind::SuggestionRejected,
            NotificationKind::EventRemoved,
        ]
    );
    assert_eq!(seen[0].description, "\"Piano\" was added to your schedule.");
    assert_eq!(seen[2].description, "An event was removed from your schedule.");
}

#[test]
fn drain_shows_only_what_is_queued() {
    let mut store = ScheduleStore::open(Box::new(MemoryStorage::new()));
    let mut rx = store.subscribe();
    let sink = RecordingSink::default();

    assert_eq!(drain_notifications(&mut rx, &sink), 0);

    let event = ScheduleEvent::new("Piano", Weekday::Sunday, "16:00", "17:00").unwrap();
    let mut edited = event.clone();
    edited.end_time = "17:30".to_string();
    store.add_event(event).unwrap();
    store.update_event(edited);

    assert_eq!(drain_notifications(&mut rx, &sink), 2);
    let seen = sink.seen.lock().unwrap();
    assert_eq!(seen[1].title, "Event Updated");
    assert_eq!(seen[1].description, "\"Piano\" was updated.");
}
