use std::collections::HashSet;

use crate::models::schedule_event::ScheduleEvent;

use super::StorageError;

pub fn encode_events(events: &[ScheduleEvent]) -> Result<String, StorageError> {
    serde_json::to_string(events).map_err(|e| StorageError::Codec(e.to_string()))
}

/// Decodes a persisted collection. A record with an empty title, a badly
/// formatted time, or a repeated id makes the whole payload malformed.
pub fn decode_events(raw: &str) -> Result<Vec<ScheduleEvent>, StorageError> {
    let events: Vec<ScheduleEvent> =
        serde_json::from_str(raw).map_err(|e| StorageError::Codec(e.to_string()))?;

    let mut seen = HashSet::new();
    for event in &events {
        event
            .validate_fields()
            .map_err(|e| StorageError::Codec(format!("event {}: {}", event.id, e)))?;
        if !seen.insert(event.id.as_str()) {
            return Err(StorageError::Codec(format!("duplicate event id {}", event.id)));
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule_event::Weekday;

    fn event(id: &str, day: Weekday) -> ScheduleEvent {
        ScheduleEvent {
            id: id.to_string(),
            title: "Reading".to_string(),
            day,
            start_time: "18:00".to_string(),
            end_time: "19:30".to_string(),
        }
    }

    #[test]
    fn decodes_wire_format() {
        let raw = r#"[{"id":"a","title":"Reading","day":"sunday","startTime":"18:00","endTime":"19:30"}]"#;
        let events = decode_events(raw).unwrap();
        assert_eq!(events, vec![event("a", Weekday::Sunday)]);
    }

    #[test]
    fn encode_then_decode_keeps_order() {
        let events = vec![event("b", Weekday::Friday), event("a", Weekday::Monday)];
        let raw = encode_events(&events).unwrap();
        assert_eq!(decode_events(&raw).unwrap(), events);
    }

    #[test]
    fn rejects_unknown_day_and_bad_json() {
        let raw = r#"[{"id":"a","title":"x","day":"someday","startTime":"18:00","endTime":"19:30"}]"#;
        assert!(matches!(decode_events(raw), Err(StorageError::Codec(_))));
        assert!(matches!(decode_events("{not json"), Err(StorageError::Codec(_))));
    }

    #[test]
    fn keeps_inverted_range_from_imports() {
        let mut inverted = event("a", Weekday::Monday);
        inverted.start_time = "20:00".to_string();
        let raw = serde_json::to_string(&vec![inverted.clone()]).unwrap();
        assert_eq!(decode_events(&raw).unwrap(), vec![inverted]);
    }

    #[test]
    fn rejects_bad_fields_and_duplicate_ids() {
        let mut unpadded = event("a", Weekday::Monday);
        unpadded.start_time = "9:00".to_string();
        let raw = serde_json::to_string(&vec![unpadded]).unwrap();
        assert!(decode_events(&raw).is_err());

        let raw =
            serde_json::to_string(&vec![event("a", Weekday::Monday), event("a", Weekday::Tuesday)])
                .unwrap();
        assert!(decode_events(&raw).is_err());
    }
}
