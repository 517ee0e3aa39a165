use scheduleAssistant::error::ScheduleError;
use scheduleAssistant::events::queue::NotificationKind;
use scheduleAssistant::models::schedule_event::{ScheduleEvent, Weekday};
use scheduleAssistant::service::schedule_store::ScheduleStore;
use scheduleAssistant::storage::{MemoryStorage, SCHEDULE_KEY};

#[test]
fn mwf_suggestion_adds_three_independent_events() {
    let storage = MemoryStorage::new();
    let mut store = ScheduleStore::open(Box::new(storage.clone()));
    let mut rx = store.subscribe();

    let added = store
        .add_events_from_suggestion("Math 101: MWF 9:00am - 9:50am")
        .unwrap();
    assert_eq!(added, 3);

    let days: Vec<Weekday> = store.events().iter().map(|e| e.day).collect();
    assert_eq!(days, vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday]);
    for event in store.events() {
        assert_eq!(event.title, "Math 101");
        assert_eq!(event.start_time, "09:00");
        assert_eq!(event.end_time, "09:50");
    }

    let notification = rx.try_recv().unwrap();
    assert_eq!(notification.kind, NotificationKind::SuggestionImported);
    assert_eq!(notification.title, "Schedule Updated");
    assert!(storage.raw(SCHEDULE_KEY).unwrap().contains("\"wednesday\""));

    // Each expanded day can be removed on its own.
    let wednesday = store.events()[1].id.clone();
    store.remove_event(&wednesday);
    let days: Vec<Weekday> = store.events().iter().map(|e| e.day).collect();
    assert_eq!(days, vec![Weekday::Monday, Weekday::Friday]);
}

#[test]
fn unparseable_suggestion_changes_nothing() {
    let storage = MemoryStorage::new();
    let mut store = ScheduleStore::open(Box::new(storage.clone()));
    let existing = ScheduleEvent::new("Gym", Weekday::Saturday, "10:00", "11:00").unwrap();
    store.add_event(existing.clone()).unwrap();
    let persisted = storage.raw(SCHEDULE_KEY);
    let mut rx = store.subscribe();

    let result = store.add_events_from_suggestion("I like mornings");
    assert!(matches!(result, Err(ScheduleError::ParseYieldedNothing)));

    assert_eq!(store.events(), &[existing]);
    assert_eq!(storage.raw(SCHEDULE_KEY), persisted);
    let notification = rx.try_recv().unwrap();
    assert_eq!(notification.kind, NotificationKind::SuggestionRejected);
    assert_eq!(notification.title, "Parsing Error");
    assert_eq!(
        notification.description,
        "Could not automatically parse the schedule suggestion."
    );
}

#[test]
fn suggestion_appends_after_existing_events_in_line_order() {
    let mut store = ScheduleStore::open(Box::new(MemoryStorage::new()));
    store
        .add_event(ScheduleEvent::new("Gym", Weekday::Saturday, "10:00", "11:00").unwrap())
        .unwrap();

    let text = "Sure! Here is a balanced week:\n\
                Art History: Tu 2:15pm - 3:30pm\n\
                Piano: Sunday 12:00pm - 1:00pm\n\
                Enjoy!";
    assert_eq!(store.add_events_from_suggestion(text).unwrap(), 2);

    let titles: Vec<&str> = store.events().iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Gym", "Art History", "Piano"]);
    let art = &store.events()[1];
    assert_eq!(art.day, Weekday::Tuesday);
    assert_eq!(art.start_time, "14:15");
    assert_eq!(art.end_time, "15:30");
    assert_eq!(store.events()[2].start_time, "12:00");
}
