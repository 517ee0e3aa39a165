use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ScheduleError;
use crate::events::queue::{NotificationBus, NotificationKind, StoreNotification};
use crate::models::schedule_event::{ScheduleEvent, Weekday};
use crate::service::suggestion_parser::parse_suggestion_report;
use crate::storage::codec::{decode_events, encode_events};
use crate::storage::{KeyValueStorage, SCHEDULE_KEY};

/// Owner of every schedule event. Hydrates in [`ScheduleStore::open`] and
/// writes the full collection back after each mutation.
pub struct ScheduleStore {
    events: Vec<ScheduleEvent>,
    storage: Box<dyn KeyValueStorage>,
    bus: NotificationBus,
}

impl ScheduleStore {
    pub fn open(storage: Box<dyn KeyValueStorage>) -> Self {
        let events = load_or_empty(storage.as_ref());
        info!(count = events.len(), "schedule loaded");
        Self {
            events,
            storage,
            bus: NotificationBus::new(),
        }
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StoreNotification> {
        self.bus.subscribe()
    }

    pub fn events(&self) -> &[ScheduleEvent] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&ScheduleEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events_for_day(&self, day: Weekday) -> Vec<&ScheduleEvent> {
        let mut events: Vec<&ScheduleEvent> = self.events.iter().filter(|e| e.day == day).collect();
        events.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        events
    }

    /// One column per weekday, Monday first.
    pub fn week(&self) -> Vec<(Weekday, Vec<&ScheduleEvent>)> {
        Weekday::ALL
            .into_iter()
            .map(|day| (day, self.events_for_day(day)))
            .collect()
    }

    /// The caller assigns the id and validates the event beforehand.
    pub fn add_event(&mut self, event: ScheduleEvent) -> Result<(), ScheduleError> {
        if self.get(&event.id).is_some() {
            return Err(ScheduleError::DuplicateId(event.id));
        }
        let description = format!("\"{}\" was added to your schedule.", event.title);
        debug!(id = %event.id, day = %event.day, "adding event");
        self.events.push(event);
        self.persist();
        self.notify(NotificationKind::EventAdded, "Event Added", description);
        Ok(())
    }

    /// Full replacement by id. Returns false, and does nothing, for an unknown id.
    pub fn update_event(&mut self, event: ScheduleEvent) -> bool {
        let Some(slot) = self.events.iter_mut().find(|e| e.id == event.id) else {
            debug!(id = %event.id, "update for unknown event ignored");
            return false;
        };
        let description = format!("\"{}\" was updated.", event.title);
        *slot = event;
        self.persist();
        self.notify(NotificationKind::EventUpdated, "Event Updated", description);
        true
    }

    pub fn remove_event(&mut self, id: &str) -> Option<ScheduleEvent> {
        let Some(idx) = self.events.iter().position(|e| e.id == id) else {
            debug!(id, "remove for unknown event ignored");
            return None;
        };
        let removed = self.events.remove(idx);
        self.persist();
        self.notify(
            NotificationKind::EventRemoved,
            "Event Removed",
            "An event was removed from your schedule.",
        );
        Some(removed)
    }

    /// Parses an assistant suggestion and appends every event it yields, in
    /// order. Nothing is changed when the text yields no events.
    pub fn add_events_from_suggestion(&mut self, text: &str) -> Result<usize, ScheduleError> {
        let report = parse_suggestion_report(text);
        for skipped in &report.skipped {
            debug!(
                line = skipped.line_number,
                reason = ?skipped.reason,
                text = %skipped.text,
                "suggestion line skipped"
            );
        }

        if report.events.is_empty() {
            self.notify(
                NotificationKind::SuggestionRejected,
                "Parsing Error",
                "Could not automatically parse the schedule suggestion.",
            );
            return Err(ScheduleError::ParseYieldedNothing);
        }

        let count = report.events.len();
        self.events.extend(report.events);
        self.persist();
        info!(count, skipped = report.skipped.len(), "suggestion imported");
        self.notify(
            NotificationKind::SuggestionImported,
            "Schedule Updated",
            "AI suggestions have been added to your calendar.",
        );
        Ok(count)
    }

    // Write failures are logged and otherwise swallowed; the in-memory state
    // stays authoritative for the session.
    fn persist(&self) {
        let result = encode_events(&self.events)
            .and_then(|raw| self.storage.save(SCHEDULE_KEY, &raw));
        if let Err(err) = result {
            warn!(error = %err, "failed to persist schedule");
        }
    }

    fn notify(&mut self, kind: NotificationKind, title: &str, description: impl Into<String>) {
        self.bus.emit(StoreNotification::new(kind, title, description));
    }
}

fn load_or_empty(storage: &dyn KeyValueStorage) -> Vec<ScheduleEvent> {
    let raw = match storage.load(SCHEDULE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(error = %err, "could not read stored schedule, starting empty");
            return Vec::new();
        }
    };
    match decode_events(&raw) {
        Ok(events) => events,
        Err(err) => {
            warn!(error = %err, "stored schedule is corrupt, starting empty");
            Vec::new()
        }
    }
}
