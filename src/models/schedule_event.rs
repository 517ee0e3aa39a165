use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    // Calendar columns run Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    /// Parses a spelled-out weekday name in any case.
    pub fn from_name(name: &str) -> Option<Weekday> {
        let lower = name.trim().to_lowercase();
        Weekday::ALL.into_iter().find(|day| day.as_str() == lower)
    }

    /// Days since Monday, used to place the event inside a concrete week.
    pub fn days_from_monday(&self) -> i64 {
        match self {
            Weekday::Monday => 0,
            Weekday::Tuesday => 1,
            Weekday::Wednesday => 2,
            Weekday::Thursday => 3,
            Weekday::Friday => 4,
            Weekday::Saturday => 5,
            Weekday::Sunday => 6,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("event title must not be empty")]
    EmptyTitle,
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("end time {end} must be after start time {start}")]
    EndNotAfterStart { start: String, end: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub id: String,
    pub title: String,
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
}

impl ScheduleEvent {
    /// Builds a validated event with a fresh id.
    pub fn new(
        title: &str,
        day: Weekday,
        start_time: &str,
        end_time: &str,
    ) -> Result<Self, EventError> {
        let event = ScheduleEvent {
            id: new_event_id(),
            title: title.trim().to_string(),
            day,
            start_time: normalize_clock(start_time)?,
            end_time: normalize_clock(end_time)?,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn validate(&self) -> Result<(), EventError> {
        self.validate_fields()?;
        // Zero-padded HH:MM compares lexicographically in clock order.
        if self.start_time >= self.end_time {
            return Err(EventError::EndNotAfterStart {
                start: self.start_time.clone(),
                end: self.end_time.clone(),
            });
        }
        Ok(())
    }

    /// Checks title and clock format only. Imported suggestions may carry an
    /// inverted range, and those still have to survive a reload.
    pub fn validate_fields(&self) -> Result<(), EventError> {
        if self.title.trim().is_empty() {
            return Err(EventError::EmptyTitle);
        }
        for time in [&self.start_time, &self.end_time] {
            if !is_clock(time) {
                return Err(EventError::InvalidTime(time.clone()));
            }
        }
        Ok(())
    }

    /// Calendar order: weekday, then start time.
    pub fn calendar_cmp(&self, other: &ScheduleEvent) -> Ordering {
        self.day
            .cmp(&other.day)
            .then_with(|| self.start_time.cmp(&other.start_time))
    }
}

pub fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}

/// Accepts `H:MM` or `HH:MM` in 24-hour form and returns zero-padded `HH:MM`.
pub fn normalize_clock(value: &str) -> Result<String, EventError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map(|time| time.format("%H:%M").to_string())
        .map_err(|_| EventError::InvalidTime(trimmed.to_string()))
}

fn is_clock(value: &str) -> bool {
    value.len() == 5 && NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}
