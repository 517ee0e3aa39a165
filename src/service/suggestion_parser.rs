//! Turns an assistant's free-text schedule into calendar events.
//!
//! Each usable line has the shape
//!
//! ```text
//! <title>: <day-token>[,<day-token>...] <h:mm>(am|pm) - <h:mm>(am|pm)
//! ```
//!
//! for example `Math 101: MWF 9:00am - 9:50am`. Lines that do not fit are
//! skipped; a suggestion usually mixes schedule lines with prose.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::schedule_event::{new_event_id, ScheduleEvent, Weekday};

pub const LINE_PATTERN: &str =
    r"^(.*): (\w+(?:,\w+)*) (\d{1,2}:\d{2}[ap]m) - (\d{1,2}:\d{2}[ap]m)$";

static LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(LINE_PATTERN).expect("LINE_PATTERN should compile - this is a bug"));

/// Shorthand day codes. Anything else is read as a spelled-out weekday name.
pub const DAY_TOKENS: &[(&str, &[Weekday])] = &[
    ("M", &[Weekday::Monday]),
    ("Tu", &[Weekday::Tuesday]),
    ("W", &[Weekday::Wednesday]),
    ("Th", &[Weekday::Thursday]),
    ("F", &[Weekday::Friday]),
    ("MWF", &[Weekday::Monday, Weekday::Wednesday, Weekday::Friday]),
    ("TTh", &[Weekday::Tuesday, Weekday::Thursday]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoMatch,
    EmptyTitle,
    UnknownDay(String),
    InvalidTime(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based, counted over the raw input including blank lines.
    pub line_number: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub events: Vec<ScheduleEvent>,
    pub skipped: Vec<SkippedLine>,
}

pub fn parse_suggestion(text: &str) -> Vec<ScheduleEvent> {
    parse_suggestion_report(text).events
}

pub fn parse_suggestion_report(text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (idx, raw_line) in text.lines().enumerate() {
        if raw_line.trim().is_empty() {
            continue;
        }
        // Tolerate CRLF input; the grammar itself is anchored on both ends.
        let line = raw_line.trim_end_matches('\r');
        match parse_line(line) {
            Ok(events) => report.events.extend(events),
            Err(reason) => report.skipped.push(SkippedLine {
                line_number: idx + 1,
                text: line.to_string(),
                reason,
            }),
        }
    }

    report
}

fn parse_line(line: &str) -> Result<Vec<ScheduleEvent>, SkipReason> {
    let caps = LINE_RE.captures(line).ok_or(SkipReason::NoMatch)?;

    let title = caps[1].trim();
    if title.is_empty() {
        return Err(SkipReason::EmptyTitle);
    }

    let days = expand_days(&caps[2])?;
    let start_time =
        to_24_hour(&caps[3]).ok_or_else(|| SkipReason::InvalidTime(caps[3].to_string()))?;
    let end_time =
        to_24_hour(&caps[4]).ok_or_else(|| SkipReason::InvalidTime(caps[4].to_string()))?;

    Ok(days
        .into_iter()
        .map(|day| ScheduleEvent {
            id: new_event_id(),
            title: title.to_string(),
            day,
            start_time: start_time.clone(),
            end_time: end_time.clone(),
        })
        .collect())
}

/// Resolves a comma-separated day field to weekdays, in the order written.
pub fn expand_days(field: &str) -> Result<Vec<Weekday>, SkipReason> {
    let mut days = Vec::new();
    for token in field.split(',') {
        match lookup_day_token(token) {
            Some(found) => days.extend_from_slice(found),
            None => {
                let day = Weekday::from_name(token)
                    .ok_or_else(|| SkipReason::UnknownDay(token.to_string()))?;
                days.push(day);
            }
        }
    }
    Ok(days)
}

pub fn lookup_day_token(token: &str) -> Option<&'static [Weekday]> {
    DAY_TOKENS
        .iter()
        .find(|(code, _)| *code == token)
        .map(|(_, days)| *days)
}

/// `h:mm(am|pm)` to zero-padded `HH:MM`. `None` when the hour is outside 1-12
/// or the minutes are past 59.
pub fn to_24_hour(time: &str) -> Option<String> {
    let (clock, pm) = match time.strip_suffix("am") {
        Some(clock) => (clock, false),
        None => (time.strip_suffix("pm")?, true),
    };
    let (hour, minute) = clock.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }

    let hour = match (pm, hour) {
        (false, 12) => 0,
        (true, 12) => 12,
        (false, h) => h,
        (true, h) => h + 12,
    };
    Some(format!("{:02}:{:02}", hour, minute))
}
