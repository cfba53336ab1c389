use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::kinds::{Category, Recurrence};

/// Width of the VARCHAR columns (`title`, `location`) in the events table.
pub const MAX_TEXT_LEN: usize = 255;

/// A row of the `events` table as the store returns it.
/// `id`, `created_at` and `updated_at` are owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub category: Category,
    pub description: Option<String>,
    pub location: Option<String>,
    pub is_all_day: bool,
    /// Minutes before the event.
    pub reminder: Option<i32>,
    pub recurring: Option<Recurrence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for the `events` table.
///
/// Every key is always serialized (nulls included) so a batch of these
/// shares one column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub category: Category,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    pub reminder: Option<i32>,
    pub recurring: Option<Recurrence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("{field} is {len} characters, limit is {}", MAX_TEXT_LEN)]
    TooLong { field: &'static str, len: usize },

    #[error("all-day event must not carry start/end times")]
    AllDayWithTimes,

    #[error("timed event needs both start and end time")]
    MissingTimes,

    #[error("end time {end} is before start time {start}")]
    EndBeforeStart { start: NaiveTime, end: NaiveTime },

    #[error("reminder must be non-negative, got {0}")]
    NegativeReminder(i32),
}

impl NewEvent {
    /// A timed event with no description, location, reminder or recurrence.
    pub fn timed(
        title: impl Into<String>,
        category: Category,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Self {
        Self {
            title: title.into(),
            date,
            start_time: Some(start),
            end_time: Some(end),
            category,
            description: None,
            location: None,
            is_all_day: false,
            reminder: None,
            recurring: None,
        }
    }

    pub fn all_day(title: impl Into<String>, category: Category, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            start_time: None,
            end_time: None,
            category,
            description: None,
            location: None,
            is_all_day: true,
            reminder: None,
            recurring: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Checks the row-level invariants the store would otherwise reject
    /// (or silently accept, in the case of the time/all-day pairing).
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        check_len("title", &self.title)?;
        if let Some(location) = &self.location {
            check_len("location", location)?;
        }

        match (self.is_all_day, self.start_time, self.end_time) {
            (true, None, None) => {}
            (true, _, _) => return Err(EventValidationError::AllDayWithTimes),
            (false, Some(start), Some(end)) if end < start => {
                return Err(EventValidationError::EndBeforeStart { start, end });
            }
            (false, Some(_), Some(_)) => {}
            (false, _, _) => return Err(EventValidationError::MissingTimes),
        }

        if let Some(minutes) = self.reminder {
            if minutes < 0 {
                return Err(EventValidationError::NegativeReminder(minutes));
            }
        }

        Ok(())
    }
}

fn check_len(field: &'static str, value: &str) -> Result<(), EventValidationError> {
    let len = value.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(EventValidationError::TooLong { field, len });
    }
    Ok(())
}
