use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::models::schedule_event::ScheduleEvent;

/// Turns the weekly schedule into a calendar file for one concrete week.
pub trait ScheduleExporter {
    fn export(&self, events: &[ScheduleEvent], week_start: NaiveDate) -> String;
}

pub struct IcsExporter {
    generated_at: DateTime<Utc>,
}

impl IcsExporter {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
        }
    }

    pub fn at(generated_at: DateTime<Utc>) -> Self {
        Self { generated_at }
    }
}

impl Default for IcsExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

impl ScheduleExporter for IcsExporter {
    fn export(&self, events: &[ScheduleEvent], week_start: NaiveDate) -> String {
        let monday = monday_of(week_start);
        let stamp = self.generated_at.format("%Y%m%dT%H%M%SZ").to_string();

        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//scheduleAssistant//weekly schedule//EN".to_string(),
            "CALSCALE:GREGORIAN".to_string(),
        ];

        for event in events {
            let Some((start, end)) = event_bounds(event, monday) else {
                continue;
            };
            lines.push("BEGIN:VEVENT".to_string());
            lines.push(format!("UID:{}@scheduleassistant", event.id));
            lines.push(format!("DTSTAMP:{}", stamp));
            lines.push(format!("DTSTART:{}", start.format("%Y%m%dT%H%M%S")));
            lines.push(format!("DTEND:{}", end.format("%Y%m%dT%H%M%S")));
            lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
            lines.push("END:VEVENT".to_string());
        }

        lines.push("END:VCALENDAR".to_string());
        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold_line(line));
            out.push_str("\r\n");
        }
        out
    }
}

// Floating local times. An end at or before the start runs into the next day.
fn event_bounds(
    event: &ScheduleEvent,
    monday: NaiveDate,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let date = monday + Duration::days(event.day.days_from_monday());
    let start = NaiveTime::parse_from_str(&event.start_time, "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(&event.end_time, "%H:%M").ok()?;
    let end_date = if end <= start { date + Duration::days(1) } else { date };
    Some((date.and_time(start), end_date.and_time(end)))
}

// CRLF and bare CR or LF all become a literal `\n`.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "\\n")
}

const MAX_LINE_OCTETS: usize = 75;

/// Folds a content line so no physical line exceeds 75 octets. Continuation
/// lines start with a single space, which counts toward their length, and
/// breaks only fall on char boundaries.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut limit = MAX_LINE_OCTETS;
    let mut used = 0;
    for ch in line.chars() {
        if used + ch.len_utf8() > limit {
            out.push_str("\r\n ");
            limit = MAX_LINE_OCTETS - 1;
            used = 0;
        }
        out.push(ch);
        used += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule_event::Weekday;
    use crate::service::suggestion_parser::parse_suggestion;
    use chrono::TimeZone;

    fn event(title: &str, day: Weekday, start: &str, end: &str) -> ScheduleEvent {
        ScheduleEvent {
            id: format!("{}-{}", title, day),
            title: title.to_string(),
            day,
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    #[test]
    fn monday_of_walks_back() {
        let thursday = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(monday_of(thursday), NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(monday_of(sunday), NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
    }

    #[test]
    fn places_events_on_their_weekday() {
        let exporter = IcsExporter::at(Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap());
        let events = vec![
            event("Math 101", Weekday::Wednesday, "09:00", "09:50"),
            event("Brunch, late", Weekday::Sunday, "11:00", "12:30"),
        ];
        let ics = exporter.export(&events, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("DTSTART:20261014T090000\r\nDTEND:20261014T095000"));
        assert!(ics.contains("DTSTART:20261018T110000"));
        assert!(ics.contains("SUMMARY:Brunch\\, late"));
        assert!(ics.contains("DTSTAMP:20261001T080000Z"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    }

    #[test]
    fn inverted_range_ends_next_day() {
        let exporter = IcsExporter::at(Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap());
        let events = vec![event("Night shift", Weekday::Sunday, "23:00", "07:00")];
        let ics = exporter.export(&events, NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        assert!(ics.contains("DTSTART:20261018T230000\r\nDTEND:20261019T070000"));
    }

    fn unfold(ics: &str) -> String {
        ics.replace("\r\n ", "")
    }

    #[test]
    fn long_titles_are_folded_at_75_octets() {
        let exporter = IcsExporter::at(Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap());
        let title = "Study block ".repeat(10) + "end";
        assert!(title.len() >= 120);
        let events = vec![event(&title, Weekday::Monday, "09:00", "10:00")];
        let ics = exporter.export(&events, NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());

        assert!(ics.split("\r\n").all(|line| line.len() <= 75));
        assert!(ics.contains("\r\n "));
        assert!(unfold(&ics).contains(&format!("SUMMARY:{}\r\n", title)));
    }

    #[test]
    fn folding_respects_multibyte_chars() {
        let title = "Café ☕ ".repeat(20);
        let folded = fold_line(&format!("SUMMARY:{}", title));
        for line in folded.split("\r\n") {
            assert!(line.len() <= 75);
        }
        assert_eq!(folded.replace("\r\n ", ""), format!("SUMMARY:{}", title));
    }

    #[test]
    fn carriage_returns_in_titles_are_escaped() {
        let exporter = IcsExporter::at(Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap());
        let imported = parse_suggestion("Lab\rX: M 9:00am - 10:00am");
        assert_eq!(imported.len(), 1);
        let events = vec![
            imported[0].clone(),
            event("Two\r\nLines", Weekday::Tuesday, "09:00", "10:00"),
        ];
        let ics = exporter.export(&events, NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());

        assert!(ics.contains("SUMMARY:Lab\\nX\r\n"));
        assert!(ics.contains("SUMMARY:Two\\nLines\r\n"));
        assert!(!ics.replace("\r\n", "").contains('\r'));
    }
}
